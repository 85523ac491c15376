//! Transcript export
//!
//! Writes a loaded transcript to a markdown file named after the video.

use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Longest title slug used in a file name
const MAX_SLUG_CHARS: usize = 60;

#[derive(Debug, thiserror::Error)]
pub(crate) enum ExportError {
    #[error("No transcript to export")]
    NoTranscript,

    #[error("No Documents directory to export into; pass one with --export DIR")]
    NoExportDir,

    #[error("Could not write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// `Documents/vidscript/transcripts`, if the platform has a Documents folder
pub(crate) fn default_export_dir() -> Option<PathBuf> {
    dirs::document_dir().map(|d| d.join("vidscript").join("transcripts"))
}

/// Write `# {title}` and the transcript into `dir` (or the default directory).
///
/// Returns the path of the new file.
pub(crate) fn write_markdown(
    dir: Option<&Path>,
    title: &str,
    transcript: &str,
) -> Result<PathBuf, ExportError> {
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => default_export_dir().ok_or(ExportError::NoExportDir)?,
    };
    fs::create_dir_all(&dir).map_err(|source| ExportError::Io {
        path: dir.clone(),
        source,
    })?;

    let timestamp = Local::now().format("%Y-%m-%d-%H-%M-%S").to_string();
    let path = dir.join(file_name(title, &timestamp));
    fs::write(&path, format!("# {}\n\n{}\n", title, transcript)).map_err(|source| {
        ExportError::Io {
            path: path.clone(),
            source,
        }
    })?;

    info!(path = %path.display(), "Exported transcript");
    Ok(path)
}

fn file_name(title: &str, timestamp: &str) -> String {
    let slug = slug(title);
    let stem = if slug.is_empty() { "transcript" } else { &slug };
    format!("{}-{}.md", stem, timestamp)
}

/// Lowercase alphanumeric runs joined by single dashes
fn slug(title: &str) -> String {
    let words: Vec<String> = title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect();
    let slug = words.join("-");
    match slug.char_indices().nth(MAX_SLUG_CHARS) {
        Some((end, _)) => slug[..end].trim_end_matches('-').to_string(),
        None => slug,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_export_dir() {
        if let Some(path) = default_export_dir() {
            assert!(path.ends_with("vidscript/transcripts"));
        }
    }

    #[test]
    fn test_file_name_from_title() {
        assert_eq!(
            file_name("Rust in 100 Seconds!", "2024-01-02-03-04-05"),
            "rust-in-100-seconds-2024-01-02-03-04-05.md"
        );
        assert_eq!(file_name("  ?? ", "ts"), "transcript-ts.md");
        assert_eq!(file_name("Café / Über", "ts"), "café-über-ts.md");
    }

    #[test]
    fn test_long_title_is_shortened() {
        let title = "word ".repeat(40);
        let slug = slug(&title);
        assert!(slug.chars().count() <= MAX_SLUG_CHARS);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn test_write_markdown_creates_nested_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a").join("b");

        let path = write_markdown(Some(&dir), "Demo", "Hello world").unwrap();

        assert!(path.starts_with(&dir));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("demo-") && name.ends_with(".md"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Demo\n\nHello world\n");
    }

    #[test]
    fn test_unwritable_dir_reports_path() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, "").unwrap();

        let err = write_markdown(Some(&blocker.join("sub")), "Demo", "x").unwrap_err();
        assert!(matches!(err, ExportError::Io { ref path, .. } if path.ends_with("sub")));
    }
}
