//! Cuenote Core Type Definitions
//!
//! Defines fundamental types shared across the export pipeline.

// =============================================================================
// ID Types
// =============================================================================

/// Annotation unique identifier (opaque, assigned upstream)
pub type AnnotationId = String;

/// Author unique identifier (opaque, assigned upstream)
pub type AuthorId = String;

/// Storage reference for a retrievable asset (opaque byte-fetch capability)
pub type StorageRef = String;

// =============================================================================
// Time Types
// =============================================================================

/// Time in seconds (floating point)
pub type TimeSec = f64;

/// Formats a time position as `m:ss` for marker labels.
///
/// Positions of an hour or more keep accumulating minutes (`93:07`),
/// which is what DAW marker lists conventionally display.
pub fn format_timecode(time_sec: TimeSec) -> String {
    let total = time_sec.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Formats a time position as `<m>m<s>s` for use inside filenames.
pub fn format_timecode_for_filename(time_sec: TimeSec) -> String {
    let total = time_sec.max(0.0).floor() as u64;
    format!("{}m{}s", total / 60, total % 60)
}

// =============================================================================
// Filename Sanitization
// =============================================================================

/// Replaces filesystem-hostile characters so a display title or author
/// name can be used as a filename component.
///
/// Keeps ASCII alphanumerics, `-` and `.`; whitespace becomes `_`;
/// everything else becomes `_`. An input with no usable characters
/// falls back to `"untitled"`.
pub fn sanitize_filename_component(raw: &str) -> String {
    let sanitized: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.chars().all(|c| c == '_' || c == '.') {
        "untitled".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timecode_formats_minutes_and_seconds() {
        assert_eq!(format_timecode(0.0), "0:00");
        assert_eq!(format_timecode(75.4), "1:15");
        assert_eq!(format_timecode(600.0), "10:00");
    }

    #[test]
    fn timecode_keeps_accumulating_minutes_past_an_hour() {
        assert_eq!(format_timecode(5587.0), "93:07");
    }

    #[test]
    fn timecode_clamps_negative_input() {
        assert_eq!(format_timecode(-3.0), "0:00");
    }

    #[test]
    fn filename_timecode_is_compact() {
        assert_eq!(format_timecode_for_filename(125.9), "2m5s");
    }

    #[test]
    fn sanitize_replaces_hostile_characters() {
        assert_eq!(
            sanitize_filename_component("Final Mix v2 (client)"),
            "Final_Mix_v2__client_"
        );
        assert_eq!(sanitize_filename_component("../../etc/passwd"), ".._.._etc_passwd");
    }

    #[test]
    fn sanitize_falls_back_when_nothing_usable() {
        assert_eq!(sanitize_filename_component("???"), "untitled");
        assert_eq!(sanitize_filename_component(""), "untitled");
    }
}
