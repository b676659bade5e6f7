//! File naming helpers shared by the pipeline stages.
//!
//! Canonical names are built from dash-separated segments:
//! `{index}[-{form}][-{frame}]` in the working directories and
//! `{sprite_set}[-{form}][-{frame}]` in the repository.

use std::path::{Path, PathBuf};

/// Separator between the index, form and frame segments of a name.
pub const NAME_DELIMITER: char = '-';

/// Join name segments with [`NAME_DELIMITER`], skipping empty segments.
///
/// `join_name(["25", "", "3"])` -> `25-3`
pub fn join_name<'a, I>(segments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut name = String::new();
    for segment in segments.into_iter().filter(|s| !s.is_empty()) {
        if !name.is_empty() {
            name.push(NAME_DELIMITER);
        }
        name.push_str(segment);
    }
    name
}

/// Parse the leading entity index of a stem (`"386-attack"` -> 386).
pub fn parse_index(stem: &str) -> Option<u32> {
    stem.split(NAME_DELIMITER).next()?.parse().ok()
}

/// Split a trailing numeric frame segment off a stem.
///
/// `"201-a-3"` -> `Some(("201-a", 3))`. A stem made of a single segment
/// never has a frame, so `"25"` -> `None`.
pub fn split_frame_suffix(stem: &str) -> Option<(&str, u32)> {
    let (head, tail) = stem.rsplit_once(NAME_DELIMITER)?;
    if head.is_empty() || tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    tail.parse().ok().map(|frame| (head, frame))
}

/// File stem as an owned string (lossy for non-UTF-8 names).
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Lowercase file extension without the dot.
pub fn extension(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}

/// Replace the stem of a path, keeping its directory and extension.
pub fn with_stem(path: &Path, stem: &str) -> PathBuf {
    let file_name = match path.extension() {
        Some(ext) => format!("{}.{}", stem, ext.to_string_lossy()),
        None => stem.to_string(),
    };
    path.with_file_name(file_name)
}

/// Path of `path` relative to `root`, always with forward slashes.
pub fn relative_slash_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Create parent directories for a path if they don't exist
pub fn ensure_parent_dirs(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_name() {
        assert_eq!(join_name(["25"]), "25");
        assert_eq!(join_name(["25", "", "3"]), "25-3");
        assert_eq!(join_name(["gold", "mega-x", "0"]), "gold-mega-x-0");
        assert_eq!(join_name(["", "", ""]), "");
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("386-attack"), Some(386));
        assert_eq!(parse_index("25"), Some(25));
        assert_eq!(parse_index("003"), Some(3));
        assert_eq!(parse_index("egg"), None);
        assert_eq!(parse_index(""), None);
    }

    #[test]
    fn test_split_frame_suffix() {
        assert_eq!(split_frame_suffix("201-a-3"), Some(("201-a", 3)));
        assert_eq!(split_frame_suffix("25-0"), Some(("25", 0)));
        assert_eq!(split_frame_suffix("25"), None);
        assert_eq!(split_frame_suffix("718-10-percent"), None);
        assert_eq!(split_frame_suffix("-3"), None);
        assert_eq!(split_frame_suffix("25-"), None);
    }

    #[test]
    fn test_with_stem() {
        assert_eq!(
            with_stem(Path::new("gold/201.png"), "201-u"),
            PathBuf::from("gold/201-u.png")
        );
        assert_eq!(with_stem(Path::new("gold/egg"), "x"), PathBuf::from("gold/x"));
    }

    #[test]
    fn test_relative_slash_path() {
        let root = Path::new("/tmp/scratch");
        assert_eq!(
            relative_slash_path(root, Path::new("/tmp/scratch/icons/493-bug.png")),
            "icons/493-bug.png"
        );
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension(Path::new("a/b.PNG")), Some("png".to_string()));
        assert_eq!(extension(Path::new("a/b")), None);
    }
}
