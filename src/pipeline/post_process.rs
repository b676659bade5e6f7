//! Post-processors for arranged sprite sets.
//!
//! Each sprite set carries an ordered list of processors. Frame
//! splitting and area whitening work on the raw arranged files; sprite
//! sheet extraction runs on the renamed files so frames inherit the
//! canonical stem.

use anyhow::{Context, Result};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, ImageFormat, Rgba, RgbaImage};
use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::DatasetError;
use crate::paths;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// When a processor runs relative to form assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    BeforeAssignment,
    AfterRename,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostProcessor {
    /// Explode animated GIFs into one PNG per frame
    SplitFrames,
    /// Flood-fill background pockets with white
    WhitenAreas(Vec<WhitenTarget>),
    /// Cut horizontal sprite sheets into square frames
    ExtractSheetFrames,
}

impl PostProcessor {
    pub fn phase(&self) -> Phase {
        match self {
            PostProcessor::SplitFrames | PostProcessor::WhitenAreas(_) => Phase::BeforeAssignment,
            PostProcessor::ExtractSheetFrames => Phase::AfterRename,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PostProcessor::SplitFrames => "split-frames",
            PostProcessor::WhitenAreas(_) => "whiten-areas",
            PostProcessor::ExtractSheetFrames => "extract-sheet-frames",
        }
    }
}

/// A file to whiten, by raw stem, and the seed pixels to fill from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitenTarget {
    pub stem: String,
    pub seeds: Vec<(u32, u32)>,
}

impl WhitenTarget {
    /// Fill from the top-left corner only.
    pub fn new(stem: impl Into<String>) -> Self {
        Self::with_seeds(stem, &[(0, 0)])
    }

    pub fn with_seeds(stem: impl Into<String>, seeds: &[(u32, u32)]) -> Self {
        Self {
            stem: stem.into(),
            seeds: seeds.to_vec(),
        }
    }
}

/// A single frame written by a processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameFile {
    pub path: PathBuf,
    pub frame: u32,
}

fn frame_path(source: &Path, frame: u32) -> PathBuf {
    let stem = paths::file_stem(source);
    let name = paths::join_name([stem.as_str(), frame.to_string().as_str()]);
    source.with_file_name(format!("{}.png", name))
}

fn is_single_color(image: &RgbaImage) -> bool {
    let mut pixels = image.pixels();
    match pixels.next() {
        Some(first) => pixels.all(|p| p == first),
        None => true,
    }
}

/// Split an animated GIF into `{stem}-{i}.png` frames and delete it.
///
/// Frames made of a single color are skipped. Frame numbers keep their
/// position in the animation, so skipped frames leave gaps.
pub fn split_frames(path: &Path) -> Result<Vec<FrameFile>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let decoder = GifDecoder::new(BufReader::new(file))
        .with_context(|| format!("Failed to decode GIF: {}", path.display()))?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .with_context(|| format!("Failed to read GIF frames: {}", path.display()))?;

    let mut written = Vec::new();
    for (i, frame) in frames.into_iter().enumerate() {
        let buffer = frame.into_buffer();
        if is_single_color(&buffer) {
            debug!("Skipping single-color frame {} of {}", i, path.display());
            continue;
        }
        let frame = i as u32;
        let out = frame_path(path, frame);
        buffer
            .save_with_format(&out, ImageFormat::Png)
            .with_context(|| format!("Failed to write {}", out.display()))?;
        written.push(FrameFile { path: out, frame });
    }

    fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    debug!("Split {} into {} frames", path.display(), written.len());
    Ok(written)
}

/// 4-connected flood fill replacing the seed's exact color with `fill`.
///
/// Returns the number of pixels changed.
pub fn flood_fill(image: &mut RgbaImage, seed: (u32, u32), fill: Rgba<u8>) -> usize {
    let (width, height) = image.dimensions();
    let (sx, sy) = seed;
    if sx >= width || sy >= height {
        return 0;
    }
    let target = *image.get_pixel(sx, sy);
    if target == fill {
        return 0;
    }

    let mut queue = VecDeque::new();
    image.put_pixel(sx, sy, fill);
    queue.push_back((sx, sy));
    let mut changed = 1;

    while let Some((x, y)) = queue.pop_front() {
        let neighbors = [
            (x.checked_sub(1), Some(y)),
            (x.checked_add(1).filter(|&nx| nx < width), Some(y)),
            (Some(x), y.checked_sub(1)),
            (Some(x), y.checked_add(1).filter(|&ny| ny < height)),
        ];
        for (nx, ny) in neighbors {
            let (Some(nx), Some(ny)) = (nx, ny) else {
                continue;
            };
            if *image.get_pixel(nx, ny) == target {
                image.put_pixel(nx, ny, fill);
                changed += 1;
                queue.push_back((nx, ny));
            }
        }
    }

    changed
}

/// Whiten the listed files of a flat sprite set directory.
///
/// Targets whose file is missing are skipped with a warning.
pub fn whiten_areas(dir: &Path, targets: &[WhitenTarget]) -> Result<usize> {
    let mut processed = 0;
    for target in targets {
        let path = dir.join(format!("{}.png", target.stem));
        if !path.exists() {
            warn!("Whitening target not found: {}", path.display());
            continue;
        }

        let mut image = image::open(&path)
            .with_context(|| format!("Failed to load {}", path.display()))?
            .to_rgba8();
        let (width, height) = image.dimensions();

        let mut changed = 0;
        for &seed in &target.seeds {
            if seed.0 >= width || seed.1 >= height {
                warn!(
                    "Seed {:?} outside {}x{} image {}",
                    seed,
                    width,
                    height,
                    path.display()
                );
                continue;
            }
            changed += flood_fill(&mut image, seed, WHITE);
        }

        image
            .save_with_format(&path, ImageFormat::Png)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Whitened {} pixels in {}", changed, path.display());
        processed += 1;
    }
    Ok(processed)
}

/// Cut a horizontal strip of square cells into `{stem}-{i}.png` frames.
///
/// The animation loop ends at the first cell identical to cell 0; that
/// cell and everything after it are dropped. The sheet is deleted.
pub fn extract_sheet_frames(path: &Path) -> Result<Vec<FrameFile>> {
    let sheet = image::open(path)
        .with_context(|| format!("Failed to load {}", path.display()))?
        .to_rgba8();
    let (width, height) = sheet.dimensions();
    if height == 0 || width % height != 0 {
        return Err(DatasetError::BadSpriteSheet {
            path: path.to_path_buf(),
            width,
            height,
        }
        .into());
    }

    let cell = height;
    let cells = width / cell;
    let first = image::imageops::crop_imm(&sheet, 0, 0, cell, cell).to_image();

    let mut written = Vec::new();
    for i in 0..cells {
        let frame = if i == 0 {
            first.clone()
        } else {
            let frame = image::imageops::crop_imm(&sheet, i * cell, 0, cell, cell).to_image();
            if frame == first {
                debug!("Found animation loop at frame {} of {}", i, path.display());
                break;
            }
            frame
        };

        let out = frame_path(path, i);
        frame
            .save_with_format(&out, ImageFormat::Png)
            .with_context(|| format!("Failed to write {}", out.display()))?;
        written.push(FrameFile { path: out, frame: i });
    }

    fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    info!("Extracted {} frames from {}", written.len(), path.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifEncoder;
    use image::{Delay, Frame};
    use tempfile::tempdir;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn cell_with_mark(size: u32, mark: u32) -> RgbaImage {
        let mut cell = RgbaImage::from_pixel(size, size, WHITE);
        cell.put_pixel(mark, mark, RED);
        cell
    }

    fn write_sheet(path: &Path, cells: &[RgbaImage]) -> Result<()> {
        let size = cells[0].height();
        let mut sheet = RgbaImage::new(size * cells.len() as u32, size);
        for (i, cell) in cells.iter().enumerate() {
            image::imageops::replace(&mut sheet, cell, (i as u32 * size) as i64, 0);
        }
        sheet.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }

    #[test]
    fn test_phase() {
        assert_eq!(PostProcessor::SplitFrames.phase(), Phase::BeforeAssignment);
        assert_eq!(PostProcessor::WhitenAreas(vec![]).phase(), Phase::BeforeAssignment);
        assert_eq!(PostProcessor::ExtractSheetFrames.phase(), Phase::AfterRename);
    }

    #[test]
    fn test_sheet_stops_at_loop() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("25.png");
        let a = cell_with_mark(96, 10);
        let b = cell_with_mark(96, 20);
        write_sheet(&path, &[a.clone(), b, a])?;

        let frames = extract_sheet_frames(&path)?;
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].path, dir.path().join("25-0.png"));
        assert_eq!(frames[1].path, dir.path().join("25-1.png"));
        assert!(!dir.path().join("25-2.png").exists());
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn test_sheet_without_loop() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("6-mega-x.png");
        write_sheet(
            &path,
            &[
                cell_with_mark(96, 10),
                cell_with_mark(96, 20),
                cell_with_mark(96, 30),
            ],
        )?;

        let frames = extract_sheet_frames(&path)?;
        let numbers: Vec<_> = frames.iter().map(|f| f.frame).collect();
        assert_eq!(numbers, vec![0, 1, 2]);
        assert!(dir.path().join("6-mega-x-2.png").exists());

        let second = image::open(dir.path().join("6-mega-x-1.png"))?.to_rgba8();
        assert_eq!(second.dimensions(), (96, 96));
        assert_eq!(*second.get_pixel(20, 20), RED);
        Ok(())
    }

    #[test]
    fn test_sheet_288x96_three_frames() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("25.png");
        let colors = [RED, BLUE, BLACK];
        let sheet = RgbaImage::from_fn(288, 96, |x, _| colors[(x / 96) as usize]);
        sheet.save_with_format(&path, ImageFormat::Png)?;

        let frames = extract_sheet_frames(&path)?;

        assert_eq!(frames.len(), 3);
        for (i, (frame, color)) in frames.iter().zip(colors).enumerate() {
            assert_eq!(frame.frame, i as u32);
            assert_eq!(frame.path, dir.path().join(format!("25-{}.png", i)));
            let image = image::open(&frame.path)?.to_rgba8();
            assert_eq!(image.dimensions(), (96, 96));
            assert!(image.pixels().all(|p| *p == color));
        }
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn test_sheet_bad_ratio() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("1.png");
        RgbaImage::from_pixel(100, 96, WHITE).save_with_format(&path, ImageFormat::Png)?;

        let err = extract_sheet_frames(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DatasetError>(),
            Some(DatasetError::BadSpriteSheet { width: 100, height: 96, .. })
        ));
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn test_split_frames_skips_single_color() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("201.gif");
        {
            let file = File::create(&path)?;
            let mut encoder = GifEncoder::new(file);
            let delay = Delay::from_numer_denom_ms(100, 1);
            encoder.encode_frame(Frame::from_parts(cell_with_mark(8, 1), 0, 0, delay))?;
            encoder.encode_frame(Frame::from_parts(
                RgbaImage::from_pixel(8, 8, WHITE),
                0,
                0,
                delay,
            ))?;
            encoder.encode_frame(Frame::from_parts(cell_with_mark(8, 5), 0, 0, delay))?;
        }

        let frames = split_frames(&path)?;
        let numbers: Vec<_> = frames.iter().map(|f| f.frame).collect();
        assert_eq!(numbers, vec![0, 2]);
        assert!(dir.path().join("201-0.png").exists());
        assert!(!dir.path().join("201-1.png").exists());
        assert!(dir.path().join("201-2.png").exists());
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn test_flood_fill_stays_in_region() {
        // Black frame with a blue pocket enclosed by a red ring
        let mut image = RgbaImage::from_pixel(7, 7, BLACK);
        for i in 1..6 {
            image.put_pixel(i, 1, RED);
            image.put_pixel(i, 5, RED);
            image.put_pixel(1, i, RED);
            image.put_pixel(5, i, RED);
        }
        for y in 2..5 {
            for x in 2..5 {
                image.put_pixel(x, y, BLUE);
            }
        }

        let changed = flood_fill(&mut image, (0, 0), WHITE);
        assert_eq!(changed, 49 - 16 - 9);
        assert_eq!(*image.get_pixel(6, 6), WHITE);
        assert_eq!(*image.get_pixel(1, 1), RED);
        assert_eq!(*image.get_pixel(3, 3), BLUE);

        assert_eq!(flood_fill(&mut image, (3, 3), WHITE), 9);
        assert_eq!(flood_fill(&mut image, (3, 3), WHITE), 0);
        assert_eq!(flood_fill(&mut image, (10, 10), WHITE), 0);
    }

    #[test]
    fn test_whiten_areas() -> Result<()> {
        let dir = tempdir()?;
        let mut image = RgbaImage::from_pixel(4, 4, BLACK);
        image.put_pixel(2, 2, RED);
        image.save_with_format(dir.path().join("201-b.png"), ImageFormat::Png)?;

        let targets = vec![
            WhitenTarget::new("201-b"),
            WhitenTarget::with_seeds("201-missing", &[(0, 0), (1, 1)]),
        ];
        assert_eq!(whiten_areas(dir.path(), &targets)?, 1);

        let result = image::open(dir.path().join("201-b.png"))?.to_rgba8();
        assert_eq!(*result.get_pixel(0, 0), WHITE);
        assert_eq!(*result.get_pixel(3, 3), WHITE);
        assert_eq!(*result.get_pixel(2, 2), RED);
        Ok(())
    }
}
