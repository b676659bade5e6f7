//! Image counts over the repository tree.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use walkdir::WalkDir;

use crate::paths;

/// Counts for `repository/{index}/{sprite_set}...png`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total: usize,
    pub per_sprite_set: BTreeMap<String, usize>,
    pub per_entity: BTreeMap<u32, usize>,
}

impl Stats {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize stats")
    }

    /// Write as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        paths::ensure_parent_dirs(path)
            .with_context(|| format!("Failed to create parent of {}", path.display()))?;
        std::fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// Known sprite set names, longest first.
///
/// Set names contain the name delimiter themselves, so a file is
/// attributed to the longest set its stem starts with.
#[derive(Debug, Clone, Default)]
pub struct SpriteSets {
    names: Vec<String>,
}

impl SpriteSets {
    pub fn new<I>(names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        names.dedup();
        Self { names }
    }

    /// Sprite set of a repository file stem. Unknown prefixes fall back to
    /// the first name segment.
    pub fn set_of<'a>(&'a self, stem: &'a str) -> &'a str {
        for set in &self.names {
            if let Some(rest) = stem.strip_prefix(set.as_str()) {
                if rest.is_empty() || rest.starts_with(paths::NAME_DELIMITER) {
                    return set;
                }
            }
        }
        stem.split(paths::NAME_DELIMITER).next().unwrap_or(stem)
    }

    /// Entity index and sprite set of `repository/{index}/{set}...png`.
    pub fn classify(&self, path: &Path) -> Option<(u32, String)> {
        let index = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .and_then(|n| n.parse::<u32>().ok())?;
        let stem = paths::file_stem(path);
        Some((index, self.set_of(&stem).to_string()))
    }
}

/// Count images in the repository.
pub fn collect(repository: &Path, sprite_sets: &SpriteSets) -> Result<Stats> {
    let mut stats = Stats::default();
    if !repository.exists() {
        return Ok(stats);
    }

    for entry in WalkDir::new(repository).min_depth(2).max_depth(2) {
        let entry =
            entry.with_context(|| format!("Failed to walk {}", repository.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Some((index, set)) = sprite_sets.classify(entry.path()) else {
            continue;
        };

        stats.total += 1;
        *stats.per_sprite_set.entry(set).or_default() += 1;
        *stats.per_entity.entry(index).or_default() += 1;
    }

    Ok(stats)
}
