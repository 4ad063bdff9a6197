//! FFmpeg Detection
//!
//! Locates ffmpeg/ffprobe binaries on the system and validates them.

use std::path::PathBuf;
use std::process::Command;

use crate::core::process::configure_std_command;
use crate::core::{ExportError, ExportResult};

/// Information about a detected FFmpeg installation
#[derive(Debug, Clone)]
pub struct FfmpegInfo {
    /// Path to the ffmpeg binary
    pub ffmpeg_path: PathBuf,
    /// Path to the ffprobe binary
    pub ffprobe_path: PathBuf,
    /// FFmpeg version string
    pub version: String,
}

/// Detects FFmpeg from common install locations and the system PATH.
pub fn detect_system_ffmpeg() -> ExportResult<FfmpegInfo> {
    let ffmpeg_path = locate_binary("ffmpeg")?;
    let ffprobe_path = locate_binary("ffprobe")?;
    let version = ffmpeg_version(&ffmpeg_path)?;

    Ok(FfmpegInfo {
        ffmpeg_path,
        ffprobe_path,
        version,
    })
}

fn locate_binary(name: &str) -> ExportResult<PathBuf> {
    #[cfg(target_os = "windows")]
    let file_name = format!("{name}.exe");
    #[cfg(not(target_os = "windows"))]
    let file_name = name.to_string();

    for dir in common_tool_dirs() {
        let candidate = dir.join(&file_name);
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    // Fall back to PATH search via `where` (Windows) or `which` (Unix).
    #[cfg(target_os = "windows")]
    let mut cmd = Command::new("where");
    #[cfg(not(target_os = "windows"))]
    let mut cmd = Command::new("which");

    configure_std_command(&mut cmd);
    let output = cmd.arg(name).output().map_err(|_| ExportError::ToolNotFound)?;

    if output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        if let Some(first_line) = stdout.lines().next() {
            let trimmed = first_line.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }
    }

    Err(ExportError::ToolNotFound)
}

fn common_tool_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    #[cfg(target_os = "windows")]
    {
        dirs.push(PathBuf::from(r"C:\ffmpeg\bin"));
        dirs.push(PathBuf::from(r"C:\Program Files\ffmpeg\bin"));
        if let Ok(programdata) = std::env::var("ProgramData") {
            dirs.push(PathBuf::from(programdata).join("chocolatey").join("bin"));
        }
    }

    #[cfg(target_os = "macos")]
    {
        dirs.push(PathBuf::from("/opt/homebrew/bin"));
        dirs.push(PathBuf::from("/usr/local/bin"));
        dirs.push(PathBuf::from("/opt/local/bin"));
    }

    #[cfg(target_os = "linux")]
    {
        dirs.push(PathBuf::from("/usr/bin"));
        dirs.push(PathBuf::from("/usr/local/bin"));
        dirs.push(PathBuf::from("/snap/bin"));
    }

    dirs
}

/// Parses the version out of `ffmpeg -version` output.
fn ffmpeg_version(ffmpeg_path: &PathBuf) -> ExportResult<String> {
    let mut cmd = Command::new(ffmpeg_path);
    configure_std_command(&mut cmd);
    let output = cmd.arg("-version").output()?;

    if !output.status.success() {
        return Err(ExportError::Probe(
            "ffmpeg -version returned a failure status".to_string(),
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    if let Some(first_line) = stdout.lines().next() {
        // "ffmpeg version X.Y.Z ..."
        if let Some(rest) = first_line.strip_prefix("ffmpeg version ") {
            if let Some(version) = rest.split_whitespace().next() {
                return Ok(version.to_string());
            }
        }
        return Ok(first_line.to_string());
    }

    Err(ExportError::Probe(
        "could not parse ffmpeg version output".to_string(),
    ))
}
