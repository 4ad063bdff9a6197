//! Marker Generator
//!
//! Pure annotations → markers transformation. Never fails: malformed
//! corners (empty input, replies only) just produce fewer markers.

use std::cmp::Ordering;

use crate::core::annotations::Annotation;
use crate::core::{format_timecode, TimeSec};

use super::{
    Marker, MarkerColor, MarkerKind, COMPACT_GAP_SEC, COMPACT_LABEL_LIMIT, GROUP_GAP_SEC,
    GROUP_MEMBER_LABEL_LIMIT, GROUP_MEMBER_OFFSET_SEC, VERBOSE_LABEL_LIMIT,
};

/// Generates the ordered marker sequence for a list of annotations.
///
/// Only root annotations participate. Consecutive roots whose timestamp
/// gap is at most [`GROUP_GAP_SEC`] collapse into a group: one summary
/// marker at the first member's position, then one member marker per
/// annotation with a [`GROUP_MEMBER_OFFSET_SEC`] step to keep ordering
/// strict (the step shrinks when a very large group would otherwise
/// run into the next group). Marker numbers run 1-based across the
/// whole sequence and
/// increment once per source annotation, not per synthesized marker.
pub fn generate_markers(annotations: &[Annotation]) -> Vec<Marker> {
    let mut roots: Vec<&Annotation> = annotations.iter().filter(|a| a.is_root()).collect();
    roots.sort_by(|a, b| {
        a.timestamp
            .partial_cmp(&b.timestamp)
            .unwrap_or(Ordering::Equal)
    });

    let groups = partition_groups(&roots);

    let mut markers = Vec::new();
    let mut number: usize = 1;

    for (group_idx, group) in groups.iter().enumerate() {
        let gap_to_next = groups
            .get(group_idx + 1)
            .map(|next| next[0].timestamp - group[group.len() - 1].timestamp)
            .unwrap_or(TimeSec::INFINITY);

        if group.len() == 1 {
            markers.push(singleton_marker(group[0], number, gap_to_next));
            number += 1;
        } else {
            // The per-member offset must not push the last member past
            // the next group's first marker, or the sequence would no
            // longer embed in timestamp order. Groups large enough to
            // exhaust the inter-group gap get a proportionally smaller
            // step.
            let member_step =
                GROUP_MEMBER_OFFSET_SEC.min(gap_to_next / group.len() as TimeSec);

            markers.push(group_summary_marker(group, number));
            for (member_idx, ann) in group.iter().enumerate() {
                markers.push(group_member_marker(ann, number, member_idx, member_step));
                number += 1;
            }
        }
    }

    markers
}

/// Greedy left-to-right scan: a new group starts whenever the gap from
/// the previous member exceeds [`GROUP_GAP_SEC`].
fn partition_groups<'a>(sorted_roots: &[&'a Annotation]) -> Vec<Vec<&'a Annotation>> {
    let mut groups: Vec<Vec<&Annotation>> = Vec::new();

    for &ann in sorted_roots {
        match groups.last_mut() {
            Some(group)
                if ann.timestamp - group[group.len() - 1].timestamp <= GROUP_GAP_SEC =>
            {
                group.push(ann);
            }
            _ => groups.push(vec![ann]),
        }
    }

    groups
}

fn singleton_marker(ann: &Annotation, number: usize, gap_to_next: TimeSec) -> Marker {
    let text = ann.text.trim();

    // Close to the next group the label competes for horizontal space,
    // so drop the author and priority and truncate harder.
    let label = if gap_to_next < COMPACT_GAP_SEC {
        format!(
            "#{} {}: {}",
            number,
            ann.kind.tag(),
            truncate_text(text, COMPACT_LABEL_LIMIT)
        )
    } else {
        format!(
            "#{} {}{} {}: {}",
            number,
            ann.priority.map(|p| p.tag()).unwrap_or(""),
            ann.kind.tag(),
            ann.author.display_name,
            truncate_text(text, VERBOSE_LABEL_LIMIT)
        )
    };

    Marker {
        timestamp: ann.timestamp,
        label,
        full_text: text.to_string(),
        kind: MarkerKind::Cue,
        color: MarkerColor::for_annotation(ann.kind, ann.priority),
        priority: ann.priority,
        author_name: ann.author.display_name.clone(),
        tag: ann.kind.tag().to_string(),
    }
}

fn group_summary_marker(group: &[&Annotation], first_number: usize) -> Marker {
    let first = group[0];
    let last_number = first_number + group.len() - 1;
    let label = format!(
        "#{}-{} [{} comments] {}",
        first_number,
        last_number,
        group.len(),
        format_timecode(first.timestamp)
    );

    Marker {
        timestamp: first.timestamp,
        label: label.clone(),
        full_text: label,
        kind: MarkerKind::Marker,
        color: MarkerColor::for_annotation(first.kind, first.priority),
        priority: None,
        author_name: first.author.display_name.clone(),
        tag: "GROUP".to_string(),
    }
}

fn group_member_marker(
    ann: &Annotation,
    number: usize,
    member_idx: usize,
    member_step: TimeSec,
) -> Marker {
    let text = ann.text.trim();

    Marker {
        timestamp: ann.timestamp + member_idx as TimeSec * member_step,
        label: format!(
            "#{} {}: {}",
            number,
            ann.kind.tag(),
            truncate_text(text, GROUP_MEMBER_LABEL_LIMIT)
        ),
        full_text: text.to_string(),
        kind: MarkerKind::Cue,
        color: MarkerColor::for_annotation(ann.kind, ann.priority),
        priority: ann.priority,
        author_name: ann.author.display_name.clone(),
        tag: ann.kind.tag().to_string(),
    }
}

/// Truncates to `limit` characters, appending `...` only when the text
/// actually exceeds the limit.
fn truncate_text(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(limit).collect();
        format!("{}...", truncated)
    }
}
