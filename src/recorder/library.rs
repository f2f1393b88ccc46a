//! Recordings library
//!
//! Lists and deletes finished recordings in the recordings directory.

use super::encoder::{RecordingError, RecordingResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// A finished recording on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingEntry {
    pub id: String,
    pub path: PathBuf,
    pub name: String,
    pub size_bytes: u64,
    /// Last modification, milliseconds since the Unix epoch
    pub modified_ms: u64,
}

/// Non-empty `.mp4` files in `dir`, newest first.
///
/// A missing directory is an empty library.
pub fn list_recordings(dir: &Path) -> RecordingResult<Vec<RecordingEntry>> {
    let read_dir = match std::fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = entry?;
        let path = entry.path();
        if !is_recording_file(&path) {
            continue;
        }

        let metadata = entry.metadata()?;
        if !metadata.is_file() || metadata.len() == 0 {
            continue;
        }

        let modified_ms = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let name = entry.file_name().to_string_lossy().to_string();
        entries.push(RecordingEntry {
            id: name.trim_end_matches(".mp4").to_string(),
            path,
            name,
            size_bytes: metadata.len(),
            modified_ms,
        });
    }

    entries.sort_by(|a, b| {
        b.modified_ms
            .cmp(&a.modified_ms)
            .then_with(|| b.name.cmp(&a.name))
    });
    Ok(entries)
}

/// Delete one recording. Only files inside `dir` may be removed.
///
/// Returns `false` if the file was already gone.
pub fn delete_recording(dir: &Path, path: &Path) -> RecordingResult<bool> {
    if !is_recording_file(path) || path.parent() != Some(dir) {
        return Err(RecordingError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Not a recording in {:?}: {:?}", dir, path),
        )));
    }

    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::info!("Deleted recording {:?}", path);
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Delete every recording in `dir`, returning how many were removed
pub fn delete_all_recordings(dir: &Path) -> RecordingResult<usize> {
    let recordings = list_recordings(dir)?;
    let mut removed = 0;
    for recording in &recordings {
        if delete_recording(dir, &recording.path)? {
            removed += 1;
        }
    }
    tracing::info!("Deleted {} recordings", removed);
    Ok(removed)
}

fn is_recording_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mp4"))
}

/// `MM:SS`, or `H:MM:SS` from one hour up
pub fn format_duration(ms: u64) -> String {
    let seconds = ms / 1000;
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let value = bytes as f64;
    if value < KB {
        format!("{} B", bytes)
    } else if value < MB {
        format!("{:.1} KB", value / KB)
    } else if value < GB {
        format!("{:.1} MB", value / MB)
    } else {
        format!("{:.2} GB", value / GB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "00:00");
        assert_eq!(format_duration(65_432), "01:05");
        assert_eq!(format_duration(3_599_999), "59:59");
        assert_eq!(format_duration(3_723_000), "1:02:03");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn test_list_skips_empty_and_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("recording_20250101_120000.mp4"), b"data").unwrap();
        std::fs::write(dir.path().join("recording_20250101_120500.mp4"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();

        let entries = list_recordings(dir.path()).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "recording_20250101_120000.mp4");
        assert_eq!(entries[0].id, "recording_20250101_120000");
        assert_eq!(entries[0].size_bytes, 4);
    }

    #[test]
    fn test_missing_dir_is_empty_library() {
        let dir = tempfile::tempdir().unwrap();
        let entries = list_recordings(&dir.path().join("recordings")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_delete_refuses_paths_outside_library() {
        let dir = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let outside = other.path().join("recording_1.mp4");
        std::fs::write(&outside, b"data").unwrap();

        assert!(delete_recording(dir.path(), &outside).is_err());
        assert!(outside.exists());
    }

    #[test]
    fn test_delete_all() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["recording_1.mp4", "recording_2.mp4"] {
            std::fs::write(dir.path().join(name), b"data").unwrap();
        }

        assert_eq!(delete_all_recordings(dir.path()).unwrap(), 2);
        assert!(list_recordings(dir.path()).unwrap().is_empty());
        assert!(!delete_recording(dir.path(), &dir.path().join("recording_1.mp4")).unwrap());
    }
}
