//! Marker Module
//!
//! Turns root annotations into the ordered, labeled marker sequence
//! that gets embedded into the WAV container. Clustered comments are
//! collapsed under a group-summary marker so a busy review session
//! does not flood the DAW marker list.

mod generator;

pub use generator::generate_markers;

use serde::{Deserialize, Serialize};

use crate::core::annotations::{AnnotationKind, Priority};
use crate::core::{format_timecode, TimeSec};

// =============================================================================
// Tuning Constants
// =============================================================================

/// Consecutive root annotations closer than this are clustered into one group.
pub const GROUP_GAP_SEC: TimeSec = 3.0;

/// A singleton closer than this to the next group gets the compact label form.
pub const COMPACT_GAP_SEC: TimeSec = 5.0;

/// Label text limit for the compact singleton form.
pub const COMPACT_LABEL_LIMIT: usize = 35;

/// Label text limit for the verbose singleton form.
pub const VERBOSE_LABEL_LIMIT: usize = 60;

/// Label text limit for group-member markers.
pub const GROUP_MEMBER_LABEL_LIMIT: usize = 25;

/// Timestamp offset applied per group member to keep ordering strict.
pub const GROUP_MEMBER_OFFSET_SEC: TimeSec = 0.1;

// =============================================================================
// Marker Types
// =============================================================================

/// How a marker should be rendered in the editor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerKind {
    /// Plain navigation cue
    Cue,
    /// Synthetic group-summary marker
    Marker,
    /// Time-range marker (reserved for section spans)
    Region,
}

/// Display color for a marker
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerColor {
    Green,
    Yellow,
    Orange,
    Red,
    Blue,
    Purple,
    Teal,
}

impl MarkerColor {
    /// Priority-driven color, falling back to a per-kind color when the
    /// author set no priority.
    pub fn for_annotation(kind: AnnotationKind, priority: Option<Priority>) -> Self {
        match priority {
            Some(Priority::Low) => MarkerColor::Green,
            Some(Priority::Medium) => MarkerColor::Yellow,
            Some(Priority::High) => MarkerColor::Orange,
            Some(Priority::Critical) => MarkerColor::Red,
            None => match kind {
                AnnotationKind::Comment => MarkerColor::Blue,
                AnnotationKind::Marker => MarkerColor::Green,
                AnnotationKind::Voice => MarkerColor::Purple,
                AnnotationKind::Section => MarkerColor::Teal,
                AnnotationKind::Issue => MarkerColor::Orange,
                AnnotationKind::Approval => MarkerColor::Green,
            },
        }
    }
}

/// One labeled position on the export timeline
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    /// Position in seconds (group members carry their strict-ordering offset)
    pub timestamp: TimeSec,
    /// Display label, possibly truncated
    pub label: String,
    /// Untruncated, trimmed source text
    pub full_text: String,
    pub kind: MarkerKind,
    pub color: MarkerColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    pub author_name: String,
    /// Uppercase tag of the source annotation kind (`GROUP` for summaries)
    pub tag: String,
}

impl Marker {
    /// Full label text embedded into the container's label chunk.
    ///
    /// `[m:ss] <PRIORITY> <TAG> by <author>: <full text>`, restricted to
    /// printable ASCII since `labl` consumers do not agree on encodings.
    pub fn detailed_label(&self) -> String {
        let priority = self
            .priority
            .map(|p| format!("{} ", p.name()))
            .unwrap_or_default();

        let raw = format!(
            "[{}] {}{} by {}: {}",
            format_timecode(self.timestamp),
            priority,
            self.tag,
            self.author_name,
            self.full_text
        );

        raw.chars()
            .filter(|c| (' '..='~').contains(c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_colors_override_kind_fallback() {
        assert_eq!(
            MarkerColor::for_annotation(AnnotationKind::Comment, Some(Priority::Critical)),
            MarkerColor::Red
        );
        assert_eq!(
            MarkerColor::for_annotation(AnnotationKind::Issue, Some(Priority::Low)),
            MarkerColor::Green
        );
    }

    #[test]
    fn kind_fallback_colors_apply_without_priority() {
        assert_eq!(
            MarkerColor::for_annotation(AnnotationKind::Voice, None),
            MarkerColor::Purple
        );
        assert_eq!(
            MarkerColor::for_annotation(AnnotationKind::Issue, None),
            MarkerColor::Orange
        );
    }

    #[test]
    fn detailed_label_includes_timecode_priority_and_full_text() {
        let marker = Marker {
            timestamp: 75.0,
            label: "#1 ISSUE: kick is late".to_string(),
            full_text: "kick is late on the second bar".to_string(),
            kind: MarkerKind::Cue,
            color: MarkerColor::Orange,
            priority: Some(Priority::High),
            author_name: "Riley".to_string(),
            tag: "ISSUE".to_string(),
        };

        assert_eq!(
            marker.detailed_label(),
            "[1:15] HIGH ISSUE by Riley: kick is late on the second bar"
        );
    }

    #[test]
    fn detailed_label_strips_non_printable_ascii() {
        let marker = Marker {
            timestamp: 0.0,
            label: "#1".to_string(),
            full_text: "snare \u{1F941} too hot\n".to_string(),
            kind: MarkerKind::Cue,
            color: MarkerColor::Blue,
            priority: None,
            author_name: "Søren".to_string(),
            tag: "COMMENT".to_string(),
        };

        let label = marker.detailed_label();
        assert!(label.is_ascii());
        assert!(!label.contains('\n'));
        assert!(label.contains("too hot"));
    }
}
