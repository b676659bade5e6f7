//! Upstream sprite archives.
//!
//! Every source is plain data: where the archive comes from, its digest,
//! which folders hold sprite sets and how odd file names map onto forms.

mod battlers;
mod veekun;

use anyhow::Result;
use std::path::Path;

use crate::downloaders::DownloadSource;
use crate::overrides::PathOverrideTable;
use crate::paths::{self, NAME_DELIMITER};
use crate::pipeline::post_process::PostProcessor;

pub use battlers::battlers;
pub use veekun::{gen1, gen2, gen3, gen4, gen5, icons, sugimori};

/// One folder of an unpacked archive that becomes a flat sprite set.
#[derive(Debug, Clone)]
pub struct SpriteSetConfig {
    /// Folder inside the unpacked archive
    pub src: &'static str,
    /// File name pattern, matched non-recursively inside `src`
    pub glob: &'static str,
    /// Sprite set name, defaults to the last component of `src`
    pub dest: Option<&'static str>,
    /// Extra files moved in under a new name, relative to `src`
    pub extra: Vec<(&'static str, &'static str)>,
    pub post_processors: Vec<PostProcessor>,
}

impl SpriteSetConfig {
    pub fn new(src: &'static str, glob: &'static str) -> Self {
        Self {
            src,
            glob,
            dest: None,
            extra: Vec::new(),
            post_processors: Vec::new(),
        }
    }

    pub fn dest(mut self, dest: &'static str) -> Self {
        self.dest = Some(dest);
        self
    }

    pub fn extra(mut self, extra: &[(&'static str, &'static str)]) -> Self {
        self.extra.extend_from_slice(extra);
        self
    }

    pub fn post_process(mut self, processor: PostProcessor) -> Self {
        self.post_processors.push(processor);
        self
    }

    /// Name of the flat sprite set directory.
    pub fn name(&self) -> &str {
        self.dest
            .unwrap_or_else(|| self.src.rsplit('/').next().unwrap_or(self.src))
    }
}

/// A downloadable archive and how to turn it into sprite sets.
#[derive(Debug, Clone)]
pub struct SourceDefinition {
    pub name: &'static str,
    pub download: DownloadSource,
    /// File name of the cached archive in the scratch directory
    pub archive_name: &'static str,
    /// Expected SHA-256, lowercase hex
    pub checksum: &'static str,
    /// Delete the cached archive when its digest does not match, so the
    /// next run downloads it again
    pub delete_on_mismatch: bool,
    pub sprite_sets: Vec<SpriteSetConfig>,
    pub overrides: PathOverrideTable,
    /// Separator between index and variant in raw file names
    pub index_delimiter: char,
}

impl SourceDefinition {
    /// Source fetched over HTTP, cached under the URL's file name.
    pub fn http(name: &'static str, url: &'static str, checksum: &'static str) -> Self {
        Self {
            name,
            download: DownloadSource::Http { url },
            archive_name: url.rsplit('/').next().unwrap_or(name),
            checksum,
            delete_on_mismatch: true,
            sprite_sets: Vec::new(),
            overrides: PathOverrideTable::new(),
            index_delimiter: NAME_DELIMITER,
        }
    }

    /// Source that has to be saved into the scratch directory by hand.
    pub fn manual(
        name: &'static str,
        url: &'static str,
        archive_name: &'static str,
        checksum: &'static str,
    ) -> Self {
        Self {
            download: DownloadSource::Manual { url },
            archive_name,
            delete_on_mismatch: false,
            ..Self::http(name, url, checksum)
        }
    }

    pub fn sprite_set(mut self, config: SpriteSetConfig) -> Self {
        self.sprite_sets.push(config);
        self
    }

    pub fn overrides(mut self, overrides: PathOverrideTable) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn index_delimiter(mut self, delimiter: char) -> Self {
        self.index_delimiter = delimiter;
        self
    }

    /// Entity index of a raw file stem, honoring the source's delimiter.
    pub fn parse_index(&self, stem: &str) -> Option<u32> {
        if self.index_delimiter == NAME_DELIMITER {
            paths::parse_index(stem)
        } else {
            paths::parse_index(&stem.replace(self.index_delimiter, &NAME_DELIMITER.to_string()))
        }
    }

    pub fn archive_path(&self, scratch_dir: &Path) -> std::path::PathBuf {
        scratch_dir.join(self.archive_name)
    }
}

/// All sources in build order.
pub fn all_sources() -> Result<Vec<SourceDefinition>> {
    Ok(vec![
        gen1()?,
        gen2()?,
        gen3()?,
        gen4()?,
        gen5()?,
        icons()?,
        sugimori()?,
        battlers()?,
    ])
}

/// Sources whose name matches one of `names` (case-insensitive), or all
/// sources when `names` is empty.
pub fn select_sources(names: &[String]) -> Result<Vec<SourceDefinition>> {
    let sources = all_sources()?;
    if names.is_empty() {
        return Ok(sources);
    }

    let unknown: Vec<_> = names
        .iter()
        .filter(|n| !sources.iter().any(|s| s.name.eq_ignore_ascii_case(n)))
        .collect();
    if !unknown.is_empty() {
        let known: Vec<_> = sources.iter().map(|s| s.name).collect();
        anyhow::bail!(
            "Unknown source(s): {:?}. Available: {}",
            unknown,
            known.join(", ")
        );
    }

    Ok(sources
        .into_iter()
        .filter(|s| names.iter().any(|n| s.name.eq_ignore_ascii_case(n)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sprite_set_name() {
        let plain = SpriteSetConfig::new("pokemon/main-sprites/red-blue", "*.png");
        assert_eq!(plain.name(), "red-blue");

        let renamed = SpriteSetConfig::new("pokemon/main-sprites/yellow/gbc", "*.png").dest("yellow-gbc");
        assert_eq!(renamed.name(), "yellow-gbc");
    }

    #[test]
    fn test_all_sources_build() -> Result<()> {
        let sources = all_sources()?;
        assert_eq!(sources.len(), 8);

        let names: HashSet<_> = sources.iter().map(|s| s.name).collect();
        assert_eq!(names.len(), sources.len());

        for source in &sources {
            assert_eq!(source.checksum.len(), 64, "{}", source.name);
            assert!(source.checksum.bytes().all(|b| b.is_ascii_hexdigit()));
            assert!(!source.sprite_sets.is_empty(), "{}", source.name);
        }
        Ok(())
    }

    #[test]
    fn test_sprite_set_names_unique() -> Result<()> {
        let mut seen = HashSet::new();
        for source in all_sources()? {
            for set in &source.sprite_sets {
                assert!(seen.insert(set.name().to_string()), "duplicate {}", set.name());
            }
        }
        Ok(())
    }

    #[test]
    fn test_archive_names() -> Result<()> {
        let gen1 = gen1()?;
        assert_eq!(gen1.archive_name, "generation-1.tar.gz");
        assert!(gen1.delete_on_mismatch);

        let battlers = battlers()?;
        assert_eq!(battlers.archive_name, "3D Battlers [All].7z");
        assert!(battlers.download.requires_manual());
        assert!(!battlers.delete_on_mismatch);
        Ok(())
    }

    #[test]
    fn test_parse_index_with_delimiter() -> Result<()> {
        let battlers = battlers()?;
        assert_eq!(battlers.parse_index("025_1"), Some(25));
        assert_eq!(battlers.parse_index("521-female"), Some(521));
        assert_eq!(gen1()?.parse_index("151"), Some(151));
        Ok(())
    }

    #[test]
    fn test_select_sources() -> Result<()> {
        let selected = select_sources(&["gen2".to_string(), "Icons".to_string()])?;
        let names: Vec<_> = selected.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Gen2", "Icons"]);

        assert_eq!(select_sources(&[])?.len(), 8);
        assert!(select_sources(&["Gen9".to_string()]).is_err());
        Ok(())
    }
}
