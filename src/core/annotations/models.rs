//! Annotation Data Models
//!
//! Defines the annotation records consumed by the export pipeline.
//! The schema matches the collaboration service's wire format (camelCase).

use serde::{Deserialize, Serialize};

use crate::core::{AnnotationId, AuthorId, StorageRef, TimeSec};

// =============================================================================
// Annotation Kind
// =============================================================================

/// What kind of comment an annotation is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnnotationKind {
    /// Free-form text comment
    Comment,
    /// Explicit position marker
    Marker,
    /// Comment with an attached voice clip
    Voice,
    /// Section boundary (intro, verse, drop, ...)
    Section,
    /// Problem report that needs a fix
    Issue,
    /// Sign-off on the mix at this position
    Approval,
}

impl AnnotationKind {
    /// Short uppercase tag used in marker labels
    pub fn tag(&self) -> &'static str {
        match self {
            AnnotationKind::Comment => "COMMENT",
            AnnotationKind::Marker => "MARK",
            AnnotationKind::Voice => "VOICE",
            AnnotationKind::Section => "SECTION",
            AnnotationKind::Issue => "ISSUE",
            AnnotationKind::Approval => "APPROVED",
        }
    }
}

// =============================================================================
// Priority
// =============================================================================

/// Annotation priority, when the author set one
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Bracketed tag prepended to verbose marker labels
    pub fn tag(&self) -> &'static str {
        match self {
            Priority::Low => "[LOW] ",
            Priority::Medium => "[MED] ",
            Priority::High => "[HIGH] ",
            Priority::Critical => "[CRIT] ",
        }
    }

    /// Uppercase name used in embedded label text
    pub fn name(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Critical => "CRITICAL",
        }
    }
}

// =============================================================================
// Author
// =============================================================================

/// Annotation author
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: AuthorId,
    pub display_name: String,
}

// =============================================================================
// Annotation
// =============================================================================

/// One timestamped collaboration comment.
///
/// Only root annotations (`parent_id == None`) participate in marker
/// generation; replies are excluded. Voice clips are carried by any
/// annotation whose kind is [`AnnotationKind::Voice`] with a clip
/// reference set, replies included.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: AnnotationId,
    /// Position on the shared timeline, seconds from the start.
    /// Expected non-negative and finite.
    pub timestamp: TimeSec,
    pub text: String,
    pub kind: AnnotationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<AnnotationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_clip_ref: Option<StorageRef>,
    pub author: Author,
}

impl Annotation {
    /// Whether this annotation is a thread root (not a reply)
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether this annotation carries a retrievable voice clip
    pub fn has_voice_clip(&self) -> bool {
        self.kind == AnnotationKind::Voice && self.voice_clip_ref.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotation(kind: AnnotationKind) -> Annotation {
        Annotation {
            id: "a1".to_string(),
            timestamp: 12.5,
            text: "too much reverb here".to_string(),
            kind,
            priority: None,
            parent_id: None,
            voice_clip_ref: None,
            author: Author {
                id: "u1".to_string(),
                display_name: "Sam".to_string(),
            },
        }
    }

    #[test]
    fn deserializes_camel_case_wire_format() {
        let json = r#"{
            "id": "a42",
            "timestamp": 93.25,
            "text": "kick is late",
            "kind": "issue",
            "priority": "high",
            "parentId": null,
            "voiceClipRef": null,
            "author": { "id": "u9", "displayName": "Riley" }
        }"#;

        let ann: Annotation = serde_json::from_str(json).unwrap();
        assert_eq!(ann.kind, AnnotationKind::Issue);
        assert_eq!(ann.priority, Some(Priority::High));
        assert!(ann.is_root());
        assert_eq!(ann.author.display_name, "Riley");
    }

    #[test]
    fn missing_optional_fields_default_to_none() {
        let json = r#"{
            "id": "a1",
            "timestamp": 1.0,
            "text": "nice",
            "kind": "approval",
            "author": { "id": "u1", "displayName": "Sam" }
        }"#;

        let ann: Annotation = serde_json::from_str(json).unwrap();
        assert!(ann.priority.is_none());
        assert!(ann.parent_id.is_none());
        assert!(ann.voice_clip_ref.is_none());
    }

    #[test]
    fn voice_clip_requires_kind_and_ref() {
        let mut ann = annotation(AnnotationKind::Voice);
        assert!(!ann.has_voice_clip());

        ann.voice_clip_ref = Some("clips/a1.webm".to_string());
        assert!(ann.has_voice_clip());

        ann.kind = AnnotationKind::Comment;
        assert!(!ann.has_voice_clip());
    }

    #[test]
    fn replies_are_not_roots() {
        let mut ann = annotation(AnnotationKind::Comment);
        ann.parent_id = Some("a0".to_string());
        assert!(!ann.is_root());
    }
}
