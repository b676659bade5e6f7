//! Byte-exact duplicate removal within one sprite set.
//!
//! Sources often ship the same image under several names, e.g. an
//! explicit normal alias next to the numbered original. Sorting by the
//! canonical identity puts such pairs next to each other.

use anyhow::{Context, Result};
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::paths;

/// Sort key parsed from a canonical stem `{index}[-{form}][-{frame}]`.
///
/// A missing frame sorts before any frame number.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DuplicateKey {
    pub index: u32,
    pub form: String,
    pub frame: Option<u32>,
}

impl DuplicateKey {
    pub fn parse(stem: &str) -> Option<Self> {
        let (head, frame) = match paths::split_frame_suffix(stem) {
            Some((head, frame)) => (head, Some(frame)),
            None => (stem, None),
        };
        let (index, form) = match head.split_once(paths::NAME_DELIMITER) {
            Some((index, form)) => (index, form),
            None => (head, ""),
        };
        Some(Self {
            index: index.parse().ok()?,
            form: form.to_string(),
            frame,
        })
    }

    fn from_path(path: &Path) -> Result<Self> {
        Self::parse(&paths::file_stem(path))
            .with_context(|| format!("Not a canonical file name: {}", path.display()))
    }
}

/// Delete every file that is byte-identical to its predecessor in key
/// order. Returns the removed paths.
///
/// Files with equal keys keep their path order.
pub fn deduplicate(files: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut keyed = files
        .iter()
        .map(|path| Ok((DuplicateKey::from_path(path)?, path)))
        .collect::<Result<Vec<_>>>()?;
    keyed.sort_by(|(a, pa), (b, pb)| match a.cmp(b) {
        Ordering::Equal => pa.cmp(pb),
        other => other,
    });

    let mut removed = Vec::new();
    let mut previous: Option<Vec<u8>> = None;

    for (_, path) in keyed {
        let content =
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

        if previous.as_deref() == Some(content.as_slice()) {
            debug!("Removing duplicate {}", path.display());
            fs::remove_file(path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
            removed.push(path.clone());
        }
        previous = Some(content);
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::list_files;
    use tempfile::tempdir;

    #[test]
    fn test_parse_key() {
        assert_eq!(
            DuplicateKey::parse("201-u-0"),
            Some(DuplicateKey {
                index: 201,
                form: "u".to_string(),
                frame: Some(0)
            })
        );
        assert_eq!(
            DuplicateKey::parse("6-mega-x"),
            Some(DuplicateKey {
                index: 6,
                form: "mega-x".to_string(),
                frame: None
            })
        );
        assert_eq!(
            DuplicateKey::parse("25-3"),
            Some(DuplicateKey {
                index: 25,
                form: String::new(),
                frame: Some(3)
            })
        );
        assert_eq!(DuplicateKey::parse("25").map(|k| k.frame), Some(None));
        assert_eq!(DuplicateKey::parse("front"), None);
    }

    #[test]
    fn test_absent_frame_sorts_first() {
        let none = DuplicateKey::parse("25").unwrap();
        let zero = DuplicateKey::parse("25-0").unwrap();
        let form = DuplicateKey::parse("25-f").unwrap();
        let next = DuplicateKey::parse("26").unwrap();
        assert!(none < zero);
        assert!(zero < form);
        assert!(form < next);
    }

    #[test]
    fn test_earlier_key_survives() -> Result<()> {
        let dir = tempdir()?;
        // Path order and key order disagree: "10" < "9" as text
        let early = dir.path().join("9.png");
        let late = dir.path().join("10.png");
        fs::write(&early, b"same")?;
        fs::write(&late, b"same")?;

        let removed = deduplicate(&[late.clone(), early.clone()])?;

        assert_eq!(removed, vec![late.clone()]);
        assert!(early.exists());
        assert!(!late.exists());
        Ok(())
    }

    #[test]
    fn test_only_adjacent_pairs_compared() -> Result<()> {
        let dir = tempdir()?;
        let a = dir.path().join("1.png");
        let b = dir.path().join("2.png");
        let c = dir.path().join("3.png");
        fs::write(&a, b"x")?;
        fs::write(&b, b"y")?;
        fs::write(&c, b"x")?;

        let removed = deduplicate(&[a.clone(), b.clone(), c.clone()])?;

        assert!(removed.is_empty());
        assert!(a.exists() && b.exists() && c.exists());
        Ok(())
    }

    #[test]
    fn test_runs_of_duplicates() -> Result<()> {
        let dir = tempdir()?;
        for name in ["201-a.png", "201-a-0.png", "201-a-1.png", "201-b.png"] {
            fs::write(dir.path().join(name), b"letter")?;
        }
        fs::write(dir.path().join("202.png"), b"other")?;

        let removed = deduplicate(&list_files(dir.path())?)?;

        let names: Vec<String> = removed
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["201-a-0.png", "201-a-1.png", "201-b.png"]);
        assert!(dir.path().join("201-a.png").exists());
        assert!(dir.path().join("202.png").exists());
        Ok(())
    }

    #[test]
    fn test_non_canonical_name_fails() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("front.png");
        fs::write(&path, b"x")?;
        assert!(deduplicate(&[path]).is_err());
        Ok(())
    }
}
