//! Dataset build orchestration.
//!
//! Runs every source pipeline to completion, removes duplicates per
//! sprite set, normalizes the union of all images in parallel and copies
//! them into `repository/{index}/`.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::config::BuildConfig;
use crate::dedupe;
use crate::downloaders::HttpClient;
use crate::normalize::Normalizer;
use crate::paths;
use crate::pipeline::{RawImageRecord, SourcePipeline};
use crate::progress;
use crate::sources::SourceDefinition;

/// Per-run switches that are not part of the persistent config.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub force_download: bool,
    pub skip_normalize: bool,
}

/// Summary of one build.
#[derive(Debug, Default)]
pub struct BuildStats {
    pub sources_built: usize,
    /// Source name and error message
    pub failed_sources: Vec<(String, String)>,
    pub images: usize,
    pub duplicates_removed: usize,
    pub normalize_failures: Vec<(PathBuf, String)>,
    pub copied: usize,
    pub elapsed: Duration,
}

impl BuildStats {
    pub fn is_success(&self) -> bool {
        self.failed_sources.is_empty() && self.normalize_failures.is_empty()
    }
}

pub struct DatasetBuilder {
    config: BuildConfig,
    client: HttpClient,
}

impl DatasetBuilder {
    pub fn new(config: BuildConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            client: HttpClient::new()?,
        })
    }

    /// Build the repository from `sources`.
    ///
    /// A failing source is logged and skipped; the other sources still
    /// make it into the repository.
    pub async fn build(
        &self,
        sources: &[SourceDefinition],
        options: &BuildOptions,
    ) -> Result<BuildStats> {
        let start = Instant::now();
        let mut stats = BuildStats::default();
        let force = options.force_download || self.config.force_download;

        fs::create_dir_all(&self.config.scratch_dir).with_context(|| {
            format!("Failed to create {}", self.config.scratch_dir.display())
        })?;

        let mut records = Vec::new();
        for source in sources {
            let phase = Instant::now();
            info!("Running {}", source.name);
            let mut pipeline = SourcePipeline::new(source, &self.config.scratch_dir);
            match pipeline.run(&self.client, force).await {
                Ok(mut built) => {
                    info!(
                        source = source.name,
                        images = built.len(),
                        elapsed_ms = phase.elapsed().as_millis() as u64,
                        "Source done"
                    );
                    stats.sources_built += 1;
                    records.append(&mut built);
                }
                Err(e) => {
                    error!("{} failed at stage {:?}: {:#}", source.name, pipeline.stage(), e);
                    stats.failed_sources.push((source.name.to_string(), format!("{:#}", e)));
                }
            }
        }

        let records = self.deduplicate(records, &mut stats)?;

        if options.skip_normalize {
            info!("Skipping normalization");
        } else {
            self.normalize(&records, &mut stats);
        }

        let failed: HashSet<&PathBuf> = stats.normalize_failures.iter().map(|(p, _)| p).collect();
        let to_copy: Vec<&RawImageRecord> =
            records.iter().filter(|r| !failed.contains(&r.path)).collect();
        stats.copied = self.copy_to_repository(&to_copy)?;
        stats.images = records.len();
        stats.elapsed = start.elapsed();

        info!(
            sources = stats.sources_built,
            failed = stats.failed_sources.len(),
            images = stats.images,
            duplicates = stats.duplicates_removed,
            copied = stats.copied,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "Build finished"
        );

        Ok(stats)
    }

    /// Remove byte-identical neighbors within each sprite set.
    fn deduplicate(
        &self,
        records: Vec<RawImageRecord>,
        stats: &mut BuildStats,
    ) -> Result<Vec<RawImageRecord>> {
        let phase = Instant::now();
        let mut by_set: BTreeMap<&str, Vec<PathBuf>> = BTreeMap::new();
        for record in &records {
            by_set
                .entry(record.sprite_set.as_str())
                .or_default()
                .push(record.path.clone());
        }

        let mut removed = HashSet::new();
        for (set, files) in by_set {
            let gone = dedupe::deduplicate(&files)
                .with_context(|| format!("Failed to deduplicate sprite set {}", set))?;
            if !gone.is_empty() {
                info!("{}: removed {} duplicates", set, gone.len());
            }
            removed.extend(gone);
        }

        stats.duplicates_removed = removed.len();
        info!(
            removed = removed.len(),
            elapsed_ms = phase.elapsed().as_millis() as u64,
            "Deduplication done"
        );

        Ok(records
            .into_iter()
            .filter(|r| !removed.contains(&r.path))
            .collect())
    }

    fn normalize(&self, records: &[RawImageRecord], stats: &mut BuildStats) {
        let phase = Instant::now();
        let normalizer = Normalizer::from_config(&self.config);
        let pb = progress::count_bar(records.len() as u64, "Normalizing");
        let failed_count = AtomicUsize::new(0);

        let failures: Vec<(PathBuf, String)> = records
            .par_iter()
            .filter_map(|record| {
                let result =
                    normalizer.normalize_in_set(&record.path, &record.sprite_set, record.form.index);
                pb.inc(1);
                match result {
                    Ok(()) => None,
                    Err(e) => {
                        let failed = failed_count.fetch_add(1, Ordering::Relaxed) + 1;
                        pb.set_message(format!("Failed:{}", failed));
                        warn!("Failed to normalize {}: {:#}", record.path.display(), e);
                        Some((record.path.clone(), format!("{:#}", e)))
                    }
                }
            })
            .collect();

        pb.finish_and_clear();
        info!(
            images = records.len(),
            failed = failures.len(),
            elapsed_ms = phase.elapsed().as_millis() as u64,
            "Normalization done"
        );
        stats.normalize_failures = failures;
    }

    /// Copy records to `repository/{index}/{repository_name}`.
    fn copy_to_repository(&self, records: &[&RawImageRecord]) -> Result<usize> {
        let phase = Instant::now();
        let mut copied = 0;
        for record in records {
            let dest = self
                .config
                .repository_dir
                .join(record.form.index.to_string())
                .join(record.repository_name());
            paths::ensure_parent_dirs(&dest)
                .with_context(|| format!("Failed to create parent of {}", dest.display()))?;
            fs::copy(&record.path, &dest).with_context(|| {
                format!(
                    "Failed to copy {} to {}",
                    record.path.display(),
                    dest.display()
                )
            })?;
            copied += 1;
        }
        info!(
            copied,
            elapsed_ms = phase.elapsed().as_millis() as u64,
            "Copied to {}",
            self.config.repository_dir.display()
        );
        Ok(copied)
    }
}
