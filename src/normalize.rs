//! Image normalization.
//!
//! Every repository image ends up as an RGB PNG of the configured canvas
//! size: the largest foreground blob is cropped, scaled to fit inside the
//! padding and centered on white.

use anyhow::{Context, Result};
use image::{imageops, ColorType, DynamicImage, GrayImage, ImageFormat, ImageReader, Rgb, RgbImage};
use std::collections::VecDeque;
use std::io::BufWriter;
use std::path::Path;
use tracing::debug;

use crate::config::{BuildConfig, NormalizeConfig};
use crate::error::DatasetError;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Axis-aligned box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

pub struct Normalizer {
    config: BuildConfig,
}

impl Normalizer {
    pub fn from_config(config: &BuildConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Normalize a repository image in place.
    pub fn normalize(&self, path: &Path) -> Result<()> {
        self.normalize_file(path, false)
    }

    /// Normalize an image of `entity` from `sprite_set` in place, applying
    /// the black background workaround when configured for that pair.
    pub fn normalize_in_set(&self, path: &Path, sprite_set: &str, entity: u32) -> Result<()> {
        let black = self.config.has_black_background(sprite_set, entity);
        self.normalize_file(path, black)
    }

    fn normalize_file(&self, path: &Path, black_background: bool) -> Result<()> {
        let image = ImageReader::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?
            .with_guessed_format()
            .with_context(|| format!("Failed to read {}", path.display()))?
            .decode()
            .with_context(|| format!("Failed to decode {}", path.display()))?;

        let mut rgb = flatten(image, path)?;
        if black_background {
            replace_black_background(&mut rgb);
        }

        let canvas = self.normalize_image(&rgb, path)?;
        write_png_atomic(&canvas, path)
    }

    /// Crop, scale and center a flattened image onto a fresh canvas.
    ///
    /// `path` is only used for error reporting.
    pub fn normalize_image(&self, image: &RgbImage, path: &Path) -> Result<RgbImage> {
        let gray = imageops::grayscale(image);
        let bbox = largest_component(&gray, self.config.normalize.white_threshold).ok_or_else(|| {
            DatasetError::NoForeground {
                path: path.to_path_buf(),
            }
        })?;

        let cropped = imageops::crop_imm(image, bbox.x, bbox.y, bbox.width, bbox.height).to_image();

        let scale = self.fit_scale(bbox.width, bbox.height);
        let (width, height) = self.scaled_size(bbox.width, bbox.height, scale);

        let resized = if width != bbox.width || height != bbox.height {
            debug!(
                "Resizing {}x{} -> {}x{} ({})",
                bbox.width,
                bbox.height,
                width,
                height,
                path.display()
            );
            DynamicImage::ImageRgb8(cropped)
                .resize_exact(width, height, imageops::FilterType::Lanczos3)
                .into_rgb8()
        } else {
            cropped
        };

        let NormalizeConfig {
            target_width,
            target_height,
            ..
        } = self.config.normalize;
        let mut canvas = RgbImage::from_pixel(target_width, target_height, WHITE);
        let x = (target_width - width) / 2;
        let y = (target_height - height) / 2;
        imageops::replace(&mut canvas, &resized, x as i64, y as i64);

        Ok(canvas)
    }

    /// Largest factor that fits a `width`x`height` box inside the padded canvas.
    pub fn fit_scale(&self, width: u32, height: u32) -> f64 {
        let NormalizeConfig {
            target_width,
            target_height,
            padding,
            ..
        } = self.config.normalize;
        let inner_w = target_width.saturating_sub(2 * padding) as f64;
        let inner_h = target_height.saturating_sub(2 * padding) as f64;
        (inner_w / width as f64).min(inner_h / height as f64)
    }

    fn scaled_size(&self, width: u32, height: u32, scale: f64) -> (u32, u32) {
        let NormalizeConfig {
            target_width,
            target_height,
            padding,
            ..
        } = self.config.normalize;
        let max_w = target_width - 2 * padding;
        let max_h = target_height - 2 * padding;
        let w = ((width as f64 * scale).round() as u32).clamp(1, max_w);
        let h = ((height as f64 * scale).round() as u32).clamp(1, max_h);
        (w, h)
    }
}

/// Bring any supported layout down to 8-bit RGB.
///
/// Alpha is composited over white before it is dropped.
pub fn flatten(image: DynamicImage, path: &Path) -> Result<RgbImage> {
    match image.color() {
        ColorType::Rgb8 => Ok(image.into_rgb8()),
        ColorType::L8 | ColorType::L16 | ColorType::Rgb16 => Ok(image.to_rgb8()),
        ColorType::La8 | ColorType::La16 | ColorType::Rgba8 | ColorType::Rgba16 => {
            let rgba = image.to_rgba8();
            let (width, height) = rgba.dimensions();
            Ok(RgbImage::from_fn(width, height, |x, y| {
                let [r, g, b, a] = rgba.get_pixel(x, y).0;
                let a = a as u32;
                let over = |c: u8| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
                Rgb([over(r), over(g), over(b)])
            }))
        }
        other => Err(DatasetError::UnsupportedColorLayout {
            path: path.to_path_buf(),
            color: format!("{:?}", other),
        }
        .into()),
    }
}

/// Turn pure black into white when the top-left pixel is pure black.
///
/// Returns whether anything was replaced.
pub fn replace_black_background(image: &mut RgbImage) -> bool {
    if image.width() == 0 || image.height() == 0 || *image.get_pixel(0, 0) != BLACK {
        return false;
    }
    for pixel in image.pixels_mut() {
        if *pixel == BLACK {
            *pixel = WHITE;
        }
    }
    true
}

/// Bounding box of the 8-connected foreground component with the largest
/// bounding box. Foreground is luma below `threshold`.
///
/// Ties go to the component found first in row-major order.
pub fn largest_component(gray: &GrayImage, threshold: u8) -> Option<BoundingBox> {
    let width = gray.width() as usize;
    let height = gray.height() as usize;
    let foreground: Vec<bool> = gray.pixels().map(|p| p.0[0] < threshold).collect();
    let mut visited = vec![false; width * height];
    let mut queue = VecDeque::new();
    let mut best: Option<BoundingBox> = None;

    for start in 0..foreground.len() {
        if visited[start] || !foreground[start] {
            continue;
        }

        visited[start] = true;
        queue.push_back(start);

        let mut min_x = width;
        let mut min_y = height;
        let mut max_x = 0usize;
        let mut max_y = 0usize;

        while let Some(idx) = queue.pop_front() {
            let x = idx % width;
            let y = idx / width;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);

            let x_range = x.saturating_sub(1)..=(x + 1).min(width - 1);
            for ny in y.saturating_sub(1)..=(y + 1).min(height - 1) {
                for nx in x_range.clone() {
                    let n = ny * width + nx;
                    if !visited[n] && foreground[n] {
                        visited[n] = true;
                        queue.push_back(n);
                    }
                }
            }
        }

        let bbox = BoundingBox {
            x: min_x as u32,
            y: min_y as u32,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        };
        if best.map_or(true, |b| bbox.area() > b.area()) {
            best = Some(bbox);
        }
    }

    best
}

/// Write `image` as PNG next to `path` and move it into place.
fn write_png_atomic(image: &RgbImage, path: &Path) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;

    {
        let mut writer = BufWriter::new(tmp.as_file());
        image
            .write_to(&mut writer, ImageFormat::Png)
            .with_context(|| format!("Failed to encode {}", path.display()))?;
    }

    tmp.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}
