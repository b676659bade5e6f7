//! Per-source processing.
//!
//! A [`SourcePipeline`] walks one archive through its stages in strict
//! order:
//!
//! 1. Fetch: reuse the cached archive or download it
//! 2. Verify: SHA-256 against the source's digest
//! 3. Unpack: extract into the private root `scratch/__{Source}`
//! 4. Arrange: move each sprite set into a flat `scratch/{set}` folder
//! 5. Post-process: split animations, whiten backgrounds
//! 6. Assign forms: overrides first, registry fallback
//! 7. Rename: delete dismissed files, rename the rest canonically
//!
//! Every stage visits files in sorted path order.

pub mod post_process;

use anyhow::{bail, Context, Result};
use glob::Pattern;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::archive;
use crate::downloaders::{download_file, with_retry, DownloadSource, HttpClient, MAX_RETRIES};
use crate::error::DatasetError;
use crate::forms::{registry, FormIdentity};
use crate::hash;
use crate::overrides::OverrideLookup;
use crate::paths;
use crate::progress;
use crate::sources::{SourceDefinition, SpriteSetConfig};

use post_process::{Phase, PostProcessor};

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Fetched,
    Verified,
    Unpacked,
    Arranged,
    PostProcessed,
    FormAssigned,
    Renamed,
}

impl Stage {
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Fetched => Some(Stage::Verified),
            Stage::Verified => Some(Stage::Unpacked),
            Stage::Unpacked => Some(Stage::Arranged),
            Stage::Arranged => Some(Stage::PostProcessed),
            Stage::PostProcessed => Some(Stage::FormAssigned),
            Stage::FormAssigned => Some(Stage::Renamed),
            Stage::Renamed => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetched => "fetched",
            Stage::Verified => "verified",
            Stage::Unpacked => "unpacked",
            Stage::Arranged => "arranged",
            Stage::PostProcessed => "post-processed",
            Stage::FormAssigned => "form-assigned",
            Stage::Renamed => "renamed",
        };
        f.write_str(name)
    }
}

/// A canonically named image in a flat sprite set folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImageRecord {
    pub path: PathBuf,
    pub sprite_set: String,
    pub form: FormIdentity,
    pub frame: Option<u32>,
    /// Lowercase file extension
    pub format: String,
}

impl RawImageRecord {
    /// `{index}[-{form}][-{frame}]`
    pub fn canonical_stem(&self) -> String {
        canonical_stem(&self.form, self.frame)
    }

    /// File name inside `repository/{index}/`.
    pub fn repository_name(&self) -> String {
        let form = if self.form.is_normal() {
            String::new()
        } else {
            self.form.name.clone()
        };
        let frame = self.frame.map(|f| f.to_string()).unwrap_or_default();
        format!(
            "{}.png",
            paths::join_name([self.sprite_set.as_str(), form.as_str(), frame.as_str()])
        )
    }
}

fn canonical_stem(form: &FormIdentity, frame: Option<u32>) -> String {
    let canonical = form.canonical_name();
    let frame = frame.map(|f| f.to_string()).unwrap_or_default();
    paths::join_name([canonical.as_str(), frame.as_str()])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    Symlink,
    Override,
}

/// What form assignment decided for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Form(FormIdentity),
    Dismiss(DismissReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub path: PathBuf,
    pub sprite_set: String,
    pub frame: Option<u32>,
    pub resolution: Resolution,
}

/// Regular files and symlinks directly inside `dir`, sorted by path.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_file() || file_type.is_symlink() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Drives one source through its stages.
pub struct SourcePipeline<'a> {
    source: &'a SourceDefinition,
    scratch_dir: PathBuf,
    stage: Option<Stage>,
    /// Frame numbers of files written by frame splitting
    frames: HashMap<PathBuf, u32>,
}

impl<'a> SourcePipeline<'a> {
    pub fn new(source: &'a SourceDefinition, scratch_dir: &Path) -> Self {
        Self {
            source,
            scratch_dir: scratch_dir.to_path_buf(),
            stage: None,
            frames: HashMap::new(),
        }
    }

    /// Last completed stage.
    pub fn stage(&self) -> Option<Stage> {
        self.stage
    }

    /// Private unpack root of this source.
    pub fn root(&self) -> PathBuf {
        self.scratch_dir.join(format!("__{}", self.source.name))
    }

    pub fn archive_path(&self) -> PathBuf {
        self.source.archive_path(&self.scratch_dir)
    }

    pub fn sprite_set_dir(&self, set: &SpriteSetConfig) -> PathBuf {
        self.scratch_dir.join(set.name())
    }

    /// Fail unless `stage` directly follows the last completed one.
    fn check(&self, stage: Stage) -> Result<()> {
        let expected = match self.stage {
            None => Some(Stage::Fetched),
            Some(done) => done.next(),
        };
        if expected != Some(stage) {
            bail!(
                "{}: cannot enter stage '{}' after {}",
                self.source.name,
                stage,
                self.stage
                    .map(|s| format!("'{}'", s))
                    .unwrap_or_else(|| "start".to_string())
            );
        }
        Ok(())
    }

    fn enter(&mut self, stage: Stage) -> Result<()> {
        self.check(stage)?;
        self.stage = Some(stage);
        debug!("{}: {}", self.source.name, stage);
        Ok(())
    }

    /// Cached archive, or a fresh download when missing or `force` is set.
    pub async fn fetch(&mut self, client: &HttpClient, force: bool) -> Result<PathBuf> {
        self.check(Stage::Fetched)?;
        let archive = self.archive_path();
        let cached = archive.exists();

        match self.source.download {
            DownloadSource::Manual { url } => {
                if !cached {
                    return Err(DatasetError::ManualDownload {
                        source_name: self.source.name.to_string(),
                        url: url.to_string(),
                        path: archive,
                    }
                    .into());
                }
                if force {
                    warn!(
                        "{}: archive must be downloaded by hand, reusing {}",
                        self.source.name,
                        archive.display()
                    );
                }
            }
            DownloadSource::Http { url } => {
                if cached && !force {
                    info!("{}: using cached {}", self.source.name, archive.display());
                } else {
                    info!("{}: downloading {}", self.source.name, url);
                    let pb = progress::download_bar(self.source.archive_name);
                    let operation = format!("Download of {}", self.source.archive_name);
                    let bytes = with_retry(&operation, MAX_RETRIES, || {
                        pb.reset();
                        download_file(client, url, &archive, Some(&pb))
                    })
                    .await?;
                    pb.finish_and_clear();
                    info!("{}: downloaded {} bytes", self.source.name, bytes);
                }
            }
        }

        self.enter(Stage::Fetched)?;
        Ok(archive)
    }

    /// Check the archive digest. A mismatching archive is deleted when the
    /// source allows it, so the next run fetches it again.
    pub fn verify(&mut self, archive: &Path) -> Result<()> {
        self.check(Stage::Verified)?;
        if let Err(e) = hash::verify_file_hash(archive, self.source.checksum) {
            if self.source.delete_on_mismatch && archive.exists() {
                warn!("{}: deleting corrupt {}", self.source.name, archive.display());
                fs::remove_file(archive)
                    .with_context(|| format!("Failed to delete {}", archive.display()))?;
            }
            return Err(e);
        }
        self.enter(Stage::Verified)
    }

    pub fn unpack(&mut self, archive: &Path) -> Result<()> {
        self.check(Stage::Unpacked)?;
        let root = self.root();
        if root.exists() {
            fs::remove_dir_all(&root)
                .with_context(|| format!("Failed to clear {}", root.display()))?;
        }
        archive::extract_all(archive, &root)?;
        self.enter(Stage::Unpacked)
    }

    /// Move every sprite set into its flat folder and drop the unpack root.
    pub fn arrange(&mut self) -> Result<()> {
        self.check(Stage::Arranged)?;
        let root = self.root();
        for set in &self.source.sprite_sets {
            let src = root.join(set.src);
            let dest = self.sprite_set_dir(set);
            if dest.exists() {
                debug!("Removing existing {}", dest.display());
                fs::remove_dir_all(&dest)
                    .with_context(|| format!("Failed to clear {}", dest.display()))?;
            }
            fs::create_dir_all(&dest)
                .with_context(|| format!("Failed to create {}", dest.display()))?;

            let pattern = Pattern::new(set.glob)
                .with_context(|| format!("Invalid sprite set glob: {}", set.glob))?;
            let mut moved = 0;
            for file in list_files(&src)? {
                let Some(name) = file.file_name() else {
                    continue;
                };
                if pattern.matches(&name.to_string_lossy()) {
                    fs::rename(&file, dest.join(name))
                        .with_context(|| format!("Failed to move {}", file.display()))?;
                    moved += 1;
                }
            }
            for (from, to) in &set.extra {
                let from = src.join(from);
                fs::rename(&from, dest.join(to))
                    .with_context(|| format!("Failed to move {}", from.display()))?;
                moved += 1;
            }
            info!("{}: arranged {} files into {}", self.source.name, moved, set.name());
        }

        if root.exists() {
            fs::remove_dir_all(&root)
                .with_context(|| format!("Failed to remove {}", root.display()))?;
        }
        self.enter(Stage::Arranged)
    }

    /// Run the processors that work on raw file names.
    pub fn post_process(&mut self) -> Result<()> {
        self.check(Stage::PostProcessed)?;
        let source = self.source;
        for set in &source.sprite_sets {
            let dir = self.sprite_set_dir(set);
            for processor in &set.post_processors {
                if processor.phase() != Phase::BeforeAssignment {
                    continue;
                }
                debug!("{}: {} on {}", source.name, processor.name(), set.name());
                match processor {
                    PostProcessor::SplitFrames => {
                        for file in list_files(&dir)? {
                            if paths::extension(&file).as_deref() != Some("gif") {
                                continue;
                            }
                            for frame in post_process::split_frames(&file)? {
                                self.frames.insert(frame.path, frame.frame);
                            }
                        }
                    }
                    PostProcessor::WhitenAreas(targets) => {
                        post_process::whiten_areas(&dir, targets)?;
                    }
                    PostProcessor::ExtractSheetFrames => {}
                }
            }
        }
        self.enter(Stage::PostProcessed)
    }

    /// Resolve every file to a form or a dismissal.
    pub fn assign_forms(&mut self) -> Result<Vec<Assignment>> {
        self.check(Stage::FormAssigned)?;
        let source = self.source;
        let mut assignments = Vec::new();
        for set in &source.sprite_sets {
            for path in list_files(&self.sprite_set_dir(set))? {
                let frame = self.frames.get(&path).copied();
                let resolution = self.resolve(&path, frame)?;
                assignments.push(Assignment {
                    path,
                    sprite_set: set.name().to_string(),
                    frame,
                    resolution,
                });
            }
        }
        self.enter(Stage::FormAssigned)?;
        Ok(assignments)
    }

    fn resolve(&self, path: &Path, frame: Option<u32>) -> Result<Resolution> {
        let metadata = fs::symlink_metadata(path)?;
        if metadata.file_type().is_symlink() {
            let target = fs::read_link(path).unwrap_or_default();
            info!(
                "Dismissing symlink {} => {}",
                path.display(),
                target.display()
            );
            return Ok(Resolution::Dismiss(DismissReason::Symlink));
        }

        let relative = paths::relative_slash_path(&self.scratch_dir, path);
        match self.source.overrides.lookup(&relative) {
            OverrideLookup::Form(form) => Ok(Resolution::Form(form.clone())),
            OverrideLookup::Dismiss => Ok(Resolution::Dismiss(DismissReason::Override)),
            OverrideLookup::Unresolved => {
                let form = self
                    .resolve_from_registry(path, frame)
                    .with_context(|| format!("Cannot assign a form to {}", relative))?;
                Ok(Resolution::Form(form))
            }
        }
    }

    /// The stem, minus any frame suffix, must be a canonical form name.
    fn resolve_from_registry(&self, path: &Path, frame: Option<u32>) -> Result<FormIdentity> {
        let stem = paths::file_stem(path);
        let base = match frame {
            Some(_) => paths::split_frame_suffix(&stem)
                .map(|(head, _)| head)
                .unwrap_or(stem.as_str()),
            None => stem.as_str(),
        };
        let index = self
            .source
            .parse_index(base)
            .ok_or_else(|| DatasetError::UnresolvedFile {
                path: path.to_path_buf(),
            })?;
        Ok(registry().by_canonical_name(index, base)?.clone())
    }

    /// Delete dismissed files and give the rest their canonical names.
    ///
    /// Two files resolving to the same name must be identical; the later
    /// one is then deleted. Nothing is touched on disk until every
    /// assignment is planned. Returns the final records, after sprite
    /// sheets have been cut into frames.
    pub fn rename(&mut self, assignments: Vec<Assignment>) -> Result<Vec<RawImageRecord>> {
        self.check(Stage::Renamed)?;
        let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
        let mut records = Vec::new();
        let mut moves = Vec::new();
        let mut deletions = Vec::new();

        for assignment in assignments {
            let path = assignment.path;
            let form = match assignment.resolution {
                Resolution::Dismiss(reason) => {
                    info!("Dismissing {} ({:?})", path.display(), reason);
                    deletions.push(path);
                    continue;
                }
                Resolution::Form(form) => form,
            };

            let format = paths::extension(&path).unwrap_or_default();
            let stem = canonical_stem(&form, assignment.frame);
            let target = if format.is_empty() {
                path.with_file_name(&stem)
            } else {
                path.with_file_name(format!("{}.{}", stem, format))
            };

            if let Some(first) = claimed.get(&target) {
                if hash::compute_file_hash(first)? != hash::compute_file_hash(&path)? {
                    return Err(DatasetError::NameCollision {
                        name: stem,
                        first: first.clone(),
                        second: path,
                    }
                    .into());
                }
                debug!(
                    "{} is identical to {} and resolves to {}, dropping it",
                    path.display(),
                    first.display(),
                    stem
                );
                deletions.push(path);
                continue;
            }
            claimed.insert(target.clone(), path.clone());

            if target != path {
                moves.push((path, target.clone()));
            }
            records.push(RawImageRecord {
                path: target,
                sprite_set: assignment.sprite_set,
                form,
                frame: assignment.frame,
                format,
            });
        }

        for path in deletions {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to delete {}", path.display()))?;
        }

        // Two passes so a rename never clobbers a file that is renamed later
        let mut staged = Vec::with_capacity(moves.len());
        for (from, to) in moves {
            let mut name = from.file_name().map(|n| n.to_os_string()).unwrap_or_default();
            name.push(".renaming");
            let temp = from.with_file_name(name);
            fs::rename(&from, &temp)
                .with_context(|| format!("Failed to rename {}", from.display()))?;
            staged.push((from, temp, to));
        }
        for (from, temp, to) in staged {
            debug!("Renaming {} -> {}", from.display(), to.display());
            fs::rename(&temp, &to)
                .with_context(|| format!("Failed to rename {} to {}", from.display(), to.display()))?;
        }

        self.enter(Stage::Renamed)?;

        let mut records = self.extract_sheets(records)?;
        records.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(records)
    }

    fn extract_sheets(&self, records: Vec<RawImageRecord>) -> Result<Vec<RawImageRecord>> {
        let sheet_sets: Vec<&str> = self
            .source
            .sprite_sets
            .iter()
            .filter(|set| {
                set.post_processors
                    .iter()
                    .any(|p| p.phase() == Phase::AfterRename)
            })
            .map(|set| set.name())
            .collect();
        if sheet_sets.is_empty() {
            return Ok(records);
        }

        let mut sorted = records;
        sorted.sort_by(|a, b| a.path.cmp(&b.path));

        let mut result = Vec::with_capacity(sorted.len());
        for record in sorted {
            if !sheet_sets.contains(&record.sprite_set.as_str()) {
                result.push(record);
                continue;
            }
            for frame in post_process::extract_sheet_frames(&record.path)? {
                result.push(RawImageRecord {
                    path: frame.path,
                    frame: Some(frame.frame),
                    format: "png".to_string(),
                    ..record.clone()
                });
            }
        }
        Ok(result)
    }

    /// Everything after fetching.
    pub fn process(&mut self, archive: &Path) -> Result<Vec<RawImageRecord>> {
        self.verify(archive)?;
        self.unpack(archive)?;
        self.arrange()?;
        self.post_process()?;
        let assignments = self.assign_forms()?;
        self.rename(assignments)
    }

    /// Run the whole pipeline.
    pub async fn run(&mut self, client: &HttpClient, force: bool) -> Result<Vec<RawImageRecord>> {
        let archive = self.fetch(client, force).await?;
        self.process(&archive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::{form, OverrideValue, PathOverrideTable};
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::fs::File;
    use tempfile::tempdir;

    /// A tiny PNG whose content depends on `seed`.
    fn png_bytes(seed: u8) -> Vec<u8> {
        let mut image = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        image.put_pixel(1, 1, Rgba([seed, 0, 0, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn write_tarball(path: &Path, entries: &[(&str, Vec<u8>)]) -> Result<()> {
        let file = File::create(path)?;
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, data.as_slice())?;
        }
        builder.into_inner()?.finish()?;
        Ok(())
    }

    fn leak(s: String) -> &'static str {
        Box::leak(s.into_boxed_str())
    }

    /// Source over a local tarball with one sprite set.
    fn test_source(scratch: &Path, entries: &[(&str, Vec<u8>)]) -> Result<SourceDefinition> {
        let archive = scratch.join("generation-test.tar.gz");
        write_tarball(&archive, entries)?;
        let checksum = leak(hash::compute_file_hash(&archive)?);

        let overrides = PathOverrideTable::from_entries([
            ("red-blue/201", form(201, "a")?),
            ("red-blue/egg", OverrideValue::Dismiss),
        ])?;

        Ok(SourceDefinition::http(
            "Test",
            "https://example.invalid/generation-test.tar.gz",
            checksum,
        )
        .sprite_set(
            SpriteSetConfig::new("pokemon/main-sprites/red-blue", "*.png")
                .extra(&[("female/521.png", "521-female.png")]),
        )
        .overrides(overrides))
    }

    fn default_entries() -> Vec<(&'static str, Vec<u8>)> {
        vec![
            ("pokemon/main-sprites/red-blue/1.png", png_bytes(1)),
            ("pokemon/main-sprites/red-blue/25.png", png_bytes(25)),
            ("pokemon/main-sprites/red-blue/201.png", png_bytes(201)),
            ("pokemon/main-sprites/red-blue/egg.png", png_bytes(7)),
            ("pokemon/main-sprites/red-blue/notes.txt", b"ignored".to_vec()),
            ("pokemon/main-sprites/red-blue/female/521.png", png_bytes(52)),
        ]
    }

    fn file_names(dir: &Path) -> Result<Vec<String>> {
        Ok(list_files(dir)?
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect())
    }

    #[test]
    fn test_stage_order() {
        let mut stage = Stage::Fetched;
        let mut seen = vec![stage];
        while let Some(next) = stage.next() {
            assert!(next > stage);
            seen.push(next);
            stage = next;
        }
        assert_eq!(seen.len(), 7);
        assert_eq!(Stage::PostProcessed.to_string(), "post-processed");
    }

    #[test]
    fn test_repository_name() {
        let record = RawImageRecord {
            path: PathBuf::from("gold/6-mega-x-2.png"),
            sprite_set: "gold".to_string(),
            form: FormIdentity::new(6, "mega-x"),
            frame: Some(2),
            format: "png".to_string(),
        };
        assert_eq!(record.canonical_stem(), "6-mega-x-2");
        assert_eq!(record.repository_name(), "gold-mega-x-2.png");

        let normal = RawImageRecord {
            frame: None,
            form: FormIdentity::normal(6),
            ..record
        };
        assert_eq!(normal.canonical_stem(), "6");
        assert_eq!(normal.repository_name(), "gold.png");
    }

    #[test]
    fn test_stages_must_run_in_order() -> Result<()> {
        let dir = tempdir()?;
        let source = test_source(dir.path(), &default_entries())?;
        let mut pipeline = SourcePipeline::new(&source, dir.path());
        assert!(pipeline.arrange().is_err());
        assert_eq!(pipeline.stage(), None);
        Ok(())
    }

    #[tokio::test]
    async fn test_full_run_from_cache() -> Result<()> {
        let dir = tempdir()?;
        let source = test_source(dir.path(), &default_entries())?;
        let client = HttpClient::new()?;

        let mut pipeline = SourcePipeline::new(&source, dir.path());
        let records = pipeline.run(&client, false).await?;
        assert_eq!(pipeline.stage(), Some(Stage::Renamed));

        let set_dir = dir.path().join("red-blue");
        assert_eq!(
            file_names(&set_dir)?,
            vec!["1.png", "201-a.png", "25.png", "521-female.png"]
        );
        assert!(!pipeline.root().exists());

        let names: Vec<_> = records.iter().map(|r| r.canonical_stem()).collect();
        assert_eq!(names, vec!["1", "201-a", "25", "521-female"]);
        assert!(records.iter().all(|r| r.sprite_set == "red-blue"));
        Ok(())
    }

    #[test]
    fn test_arrange_is_idempotent() -> Result<()> {
        let dir = tempdir()?;
        let source = test_source(dir.path(), &default_entries())?;
        let archive = source.archive_path(dir.path());

        let mut snapshots = Vec::new();
        for _ in 0..2 {
            let mut pipeline = SourcePipeline::new(&source, dir.path());
            pipeline.enter(Stage::Fetched)?;
            pipeline.verify(&archive)?;
            pipeline.unpack(&archive)?;
            pipeline.arrange()?;

            let set_dir = dir.path().join("red-blue");
            let mut snapshot = Vec::new();
            for file in list_files(&set_dir)? {
                snapshot.push((file.clone(), fs::read(&file)?));
            }
            snapshots.push(snapshot);
        }

        assert_eq!(snapshots[0], snapshots[1]);
        assert_eq!(snapshots[0].len(), 5);
        Ok(())
    }

    #[test]
    fn test_unresolved_file_is_fatal() -> Result<()> {
        let dir = tempdir()?;
        let mut entries = default_entries();
        entries.push(("pokemon/main-sprites/red-blue/25-unknown.png", png_bytes(9)));
        let source = test_source(dir.path(), &entries)?;
        let archive = source.archive_path(dir.path());

        let mut pipeline = SourcePipeline::new(&source, dir.path());
        pipeline.enter(Stage::Fetched)?;
        let err = pipeline.process(&archive).unwrap_err();
        assert!(format!("{:#}", err).contains("red-blue/25-unknown.png"));
        assert_eq!(pipeline.stage(), Some(Stage::PostProcessed));
        Ok(())
    }

    #[test]
    fn test_checksum_mismatch_deletes_archive() -> Result<()> {
        let dir = tempdir()?;
        let mut source = test_source(dir.path(), &default_entries())?;
        source.checksum = "0000000000000000000000000000000000000000000000000000000000000000";
        let archive = source.archive_path(dir.path());

        let mut pipeline = SourcePipeline::new(&source, dir.path());
        pipeline.enter(Stage::Fetched)?;
        let err = pipeline.verify(&archive).unwrap_err();
        assert!(err.downcast_ref::<DatasetError>().is_some());
        assert!(!archive.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_manual_source_missing() -> Result<()> {
        let dir = tempdir()?;
        let source = SourceDefinition::manual(
            "Manual",
            "https://example.invalid/folder",
            "pack.7z",
            "a282265f827aaf309f08c1be7ea98726de14bca942823ea85e6d7c77338d1205",
        );
        let client = HttpClient::new()?;
        let mut pipeline = SourcePipeline::new(&source, dir.path());

        let err = pipeline.fetch(&client, false).await.unwrap_err();
        match err.downcast_ref::<DatasetError>() {
            Some(DatasetError::ManualDownload { path, .. }) => {
                assert_eq!(path, &dir.path().join("pack.7z"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(pipeline.stage(), None);
        Ok(())
    }

    /// Pipeline positioned just before renaming an `icons` set.
    fn collision_pipeline<'a>(
        source: &'a SourceDefinition,
        dir: &Path,
    ) -> (SourcePipeline<'a>, impl Fn(&str, FormIdentity) -> Assignment) {
        let set_dir = dir.join("icons");
        let mut pipeline = SourcePipeline::new(source, dir);
        pipeline.stage = Some(Stage::FormAssigned);
        let assign = move |name: &str, form: FormIdentity| Assignment {
            path: set_dir.join(name),
            sprite_set: "icons".to_string(),
            frame: None,
            resolution: Resolution::Form(form),
        };
        (pipeline, assign)
    }

    #[test]
    fn test_rename_drops_identical_collision() -> Result<()> {
        let dir = tempdir()?;
        let set_dir = dir.path().join("icons");
        fs::create_dir_all(&set_dir)?;
        fs::write(set_dir.join("555-standard.png"), "standard")?;
        fs::write(set_dir.join("555.png"), "standard")?;
        fs::write(set_dir.join("555-zen.png"), "zen")?;

        let source = SourceDefinition::http("Rename", "https://example.invalid/a.tar.gz", "00")
            .sprite_set(SpriteSetConfig::new("pokemon/icons", "*.png"));
        let (mut pipeline, assign) = collision_pipeline(&source, dir.path());
        let records = pipeline.rename(vec![
            assign("555-standard.png", FormIdentity::normal(555)),
            assign("555-zen.png", FormIdentity::new(555, "zen")),
            assign("555.png", FormIdentity::normal(555)),
        ])?;

        assert_eq!(records.len(), 2);
        assert_eq!(file_names(&set_dir)?, vec!["555-zen.png", "555.png"]);
        assert_eq!(fs::read_to_string(set_dir.join("555.png"))?, "standard");
        assert_eq!(pipeline.stage(), Some(Stage::Renamed));
        Ok(())
    }

    #[test]
    fn test_rename_rejects_differing_collision() -> Result<()> {
        let dir = tempdir()?;
        let set_dir = dir.path().join("icons");
        fs::create_dir_all(&set_dir)?;
        for name in ["555-standard.png", "555.png", "egg.png"] {
            fs::write(set_dir.join(name), name)?;
        }

        let source = SourceDefinition::http("Rename", "https://example.invalid/a.tar.gz", "00")
            .sprite_set(SpriteSetConfig::new("pokemon/icons", "*.png"));
        let (mut pipeline, assign) = collision_pipeline(&source, dir.path());
        let mut egg = assign("egg.png", FormIdentity::normal(1));
        egg.resolution = Resolution::Dismiss(DismissReason::Override);

        let err = pipeline
            .rename(vec![
                egg,
                assign("555-standard.png", FormIdentity::normal(555)),
                assign("555.png", FormIdentity::normal(555)),
            ])
            .unwrap_err();

        match err.downcast_ref::<DatasetError>() {
            Some(DatasetError::NameCollision { name, first, second }) => {
                assert_eq!(name, "555");
                assert_eq!(first, &set_dir.join("555-standard.png"));
                assert_eq!(second, &set_dir.join("555.png"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // Nothing is deleted or renamed
        assert_eq!(
            file_names(&set_dir)?,
            vec!["555-standard.png", "555.png", "egg.png"]
        );
        assert_eq!(fs::read_to_string(set_dir.join("555.png"))?, "555.png");
        assert_eq!(pipeline.stage(), Some(Stage::FormAssigned));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_is_dismissed() -> Result<()> {
        let dir = tempdir()?;
        let source = test_source(dir.path(), &default_entries())?;
        let archive = source.archive_path(dir.path());

        let mut pipeline = SourcePipeline::new(&source, dir.path());
        pipeline.enter(Stage::Fetched)?;
        pipeline.verify(&archive)?;
        pipeline.unpack(&archive)?;
        pipeline.arrange()?;
        pipeline.post_process()?;

        let set_dir = dir.path().join("red-blue");
        let link = set_dir.join("26.png");
        std::os::unix::fs::symlink("25.png", &link)?;

        let assignments = pipeline.assign_forms()?;
        let linked = assignments
            .iter()
            .find(|a| a.path == link)
            .map(|a| a.resolution.clone());
        assert_eq!(linked, Some(Resolution::Dismiss(DismissReason::Symlink)));

        let records = pipeline.rename(assignments)?;

        assert!(fs::symlink_metadata(&link).is_err());
        assert!(set_dir.join("25.png").exists());
        assert!(records.iter().all(|r| r.canonical_stem() != "26"));
        assert!(records.iter().any(|r| r.canonical_stem() == "25"));
        Ok(())
    }

    #[test]
    fn test_split_frames_keep_override() -> Result<()> {
        use image::codecs::gif::GifEncoder;
        use image::{Delay, Frame};

        let dir = tempdir()?;
        let gif_path = dir.path().join("201.gif");
        {
            let file = File::create(&gif_path)?;
            let mut encoder = GifEncoder::new(file);
            let delay = Delay::from_numer_denom_ms(100, 1);
            for shade in [10u8, 200] {
                let mut frame = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
                frame.put_pixel(2, 2, Rgba([shade, 0, 0, 255]));
                encoder.encode_frame(Frame::from_parts(frame, 0, 0, delay))?;
            }
        }
        let gif = fs::read(&gif_path)?;
        fs::remove_file(&gif_path)?;

        let archive = dir.path().join("generation-2.tar.gz");
        write_tarball(
            &archive,
            &[
                ("pokemon/main-sprites/crystal/animated/201.gif", gif),
                ("pokemon/main-sprites/crystal/animated/25.gif", {
                    let mut other = Vec::new();
                    let mut encoder = GifEncoder::new(&mut other);
                    let mut frame = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
                    frame.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
                    encoder.encode_frame(Frame::new(frame))?;
                    drop(encoder);
                    other
                }),
            ],
        )?;
        let checksum = leak(hash::compute_file_hash(&archive)?);
        let source = SourceDefinition::http(
            "Gen2",
            "https://example.invalid/generation-2.tar.gz",
            checksum,
        )
        .sprite_set(
            SpriteSetConfig::new("pokemon/main-sprites/crystal/animated", "*.gif")
                .dest("crystal-animated")
                .post_process(PostProcessor::SplitFrames),
        )
        .overrides(PathOverrideTable::from_entries([(
            "crystal-animated/201",
            form(201, "u")?,
        )])?);

        let mut pipeline = SourcePipeline::new(&source, dir.path());
        pipeline.enter(Stage::Fetched)?;
        let records = pipeline.process(&archive)?;

        let names: Vec<_> = records.iter().map(|r| r.canonical_stem()).collect();
        assert_eq!(names, vec!["201-u-0", "201-u-1", "25-0"]);
        assert_eq!(records[0].frame, Some(0));
        assert_eq!(
            file_names(&dir.path().join("crystal-animated"))?,
            vec!["201-u-0.png", "201-u-1.png", "25-0.png"]
        );
        Ok(())
    }
}
