//! Image preparation for leaf-photo analysis.
//!
//! Pure transforms over in-memory buffers — no I/O, no model calls.
//! Every operation is total: validation failures come back as a verdict,
//! enhancement falls back to the input, decode failures return `None`.

use std::io::Cursor;

use base64::Engine as _;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage, ImageOutputFormat, Rgb, RgbImage};
use ndarray::Array4;
use tracing::debug;

/// Model input tensor: `(batch, height, width, channel)` of f32.
pub type Tensor = Array4<f32>;

// ═══════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════

/// Classifier input edge length.
pub const MODEL_INPUT_SIZE: u32 = 224;

/// ImageNet channel statistics applied after scaling to [0,1].
pub const CHANNEL_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const CHANNEL_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Validation bounds. Fixed, not configurable.
const MIN_DIMENSION: u32 = 100;
const MAX_DIMENSION: u32 = 4000;
const MIN_PIXEL_STDDEV: f64 = 10.0;
const MIN_MEAN_BRIGHTNESS: f64 = 30.0;
const MAX_MEAN_BRIGHTNESS: f64 = 220.0;

/// Display resize bounds.
pub const DISPLAY_MAX_WIDTH: u32 = 800;
pub const DISPLAY_MAX_HEIGHT: u32 = 800;

/// JPEG quality for the base64 transport round trip.
const TRANSPORT_JPEG_QUALITY: u8 = 85;

/// Contrast-limited histogram equalization parameters.
const CLAHE_CLIP_LIMIT: f32 = 2.0;
const CLAHE_TILE_GRID: u32 = 8;

// ═══════════════════════════════════════════════════════════
// Validation
// ═══════════════════════════════════════════════════════════

/// Verdict on whether an image is suitable for disease analysis.
#[derive(Debug, Clone)]
pub struct ImageVerdict {
    pub ok: bool,
    pub reason: String,
}

impl ImageVerdict {
    fn reject(reason: &str) -> Self {
        Self { ok: false, reason: reason.to_string() }
    }
}

/// Check size, content variance and brightness, in that order.
/// Returns on the first failing check.
pub fn validate(image: &DynamicImage) -> ImageVerdict {
    let (width, height) = image.dimensions();

    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        return ImageVerdict::reject("Image too small. Please upload a larger image.");
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return ImageVerdict::reject("Image too large. Please upload a smaller image.");
    }

    let (mean, stddev) = pixel_statistics(&image.to_rgb8());
    if stddev < MIN_PIXEL_STDDEV {
        return ImageVerdict::reject("Image appears to be blank or too uniform.");
    }
    if mean < MIN_MEAN_BRIGHTNESS || mean > MAX_MEAN_BRIGHTNESS {
        return ImageVerdict::reject("Image too dark or too bright. Please adjust lighting.");
    }

    ImageVerdict {
        ok: true,
        reason: "Image is valid for analysis.".to_string(),
    }
}

/// Mean and standard deviation over all channel bytes.
fn pixel_statistics(rgb: &RgbImage) -> (f64, f64) {
    let raw = rgb.as_raw();
    if raw.is_empty() {
        return (0.0, 0.0);
    }

    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    for &v in raw {
        let v = v as f64;
        sum += v;
        sum_sq += v * v;
    }

    let count = raw.len() as f64;
    let mean = sum / count;
    let variance = (sum_sq / count) - (mean * mean);
    (mean, variance.max(0.0).sqrt())
}

// ═══════════════════════════════════════════════════════════
// Normalization — classifier input
// ═══════════════════════════════════════════════════════════

/// Convert to RGB, resize directly to 224x224 (aspect ratio not preserved),
/// scale to [0,1] and apply per-channel ImageNet standardization.
/// Output shape is `(1, 224, 224, 3)` regardless of input aspect ratio.
pub fn normalize(image: &DynamicImage) -> Tensor {
    let rgb = image
        .resize_exact(MODEL_INPUT_SIZE, MODEL_INPUT_SIZE, FilterType::CatmullRom)
        .to_rgb8();

    let size = MODEL_INPUT_SIZE as usize;
    Array4::from_shape_fn((1, size, size, 3), |(_, y, x, c)| {
        let scaled = rgb.get_pixel(x as u32, y as u32).0[c] as f32 / 255.0;
        (scaled - CHANNEL_MEAN[c]) / CHANNEL_STD[c]
    })
}

// ═══════════════════════════════════════════════════════════
// Enhancement — adaptive histogram equalization
// ═══════════════════════════════════════════════════════════

/// Improve local contrast via CLAHE (clip 2.0, 8x8 tiles) on the luminance
/// channel only, leaving chrominance untouched. Grayscale images are
/// equalized directly. Degenerate inputs come back unchanged — enhancement
/// is best-effort, never fatal.
pub fn enhance(image: &DynamicImage) -> DynamicImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    match image {
        DynamicImage::ImageLuma8(gray) => {
            DynamicImage::ImageLuma8(clahe(gray, CLAHE_CLIP_LIMIT, CLAHE_TILE_GRID))
        }
        _ => {
            let rgb = image.to_rgb8();
            let (luma, cb, cr) = rgb_to_ycbcr_planes(&rgb);
            let equalized = clahe(&luma, CLAHE_CLIP_LIMIT, CLAHE_TILE_GRID);
            DynamicImage::ImageRgb8(ycbcr_planes_to_rgb(&equalized, &cb, &cr))
        }
    }
}

/// Split an RGB image into full-range JPEG YCbCr planes.
fn rgb_to_ycbcr_planes(rgb: &RgbImage) -> (GrayImage, GrayImage, GrayImage) {
    let (w, h) = (rgb.width(), rgb.height());
    let mut luma = GrayImage::new(w, h);
    let mut cb = GrayImage::new(w, h);
    let mut cr = GrayImage::new(w, h);

    for (x, y, p) in rgb.enumerate_pixels() {
        let r = p.0[0] as f32;
        let g = p.0[1] as f32;
        let b = p.0[2] as f32;

        let yv = 0.299 * r + 0.587 * g + 0.114 * b;
        let cbv = 128.0 - 0.168_736 * r - 0.331_264 * g + 0.5 * b;
        let crv = 128.0 + 0.5 * r - 0.418_688 * g - 0.081_312 * b;

        luma.put_pixel(x, y, image::Luma([yv.round().clamp(0.0, 255.0) as u8]));
        cb.put_pixel(x, y, image::Luma([cbv.round().clamp(0.0, 255.0) as u8]));
        cr.put_pixel(x, y, image::Luma([crv.round().clamp(0.0, 255.0) as u8]));
    }

    (luma, cb, cr)
}

/// Recompose YCbCr planes back into RGB.
fn ycbcr_planes_to_rgb(luma: &GrayImage, cb: &GrayImage, cr: &GrayImage) -> RgbImage {
    let (w, h) = (luma.width(), luma.height());
    let mut rgb = RgbImage::new(w, h);

    for y in 0..h {
        for x in 0..w {
            let yv = luma.get_pixel(x, y).0[0] as f32;
            let cbv = cb.get_pixel(x, y).0[0] as f32 - 128.0;
            let crv = cr.get_pixel(x, y).0[0] as f32 - 128.0;

            let r = yv + 1.402 * crv;
            let g = yv - 0.344_136 * cbv - 0.714_136 * crv;
            let b = yv + 1.772 * cbv;

            rgb.put_pixel(
                x,
                y,
                Rgb([
                    r.round().clamp(0.0, 255.0) as u8,
                    g.round().clamp(0.0, 255.0) as u8,
                    b.round().clamp(0.0, 255.0) as u8,
                ]),
            );
        }
    }

    rgb
}

/// Contrast-limited adaptive histogram equalization over a tile grid.
///
/// Per-tile histograms are clipped at `clip_limit` times the uniform bin
/// count, the excess redistributed evenly, and the resulting CDFs turned
/// into per-tile lookup tables. Output pixels bilinearly interpolate between
/// the four nearest tile tables so tile seams stay invisible.
fn clahe(input: &GrayImage, clip_limit: f32, grid: u32) -> GrayImage {
    let (w, h) = (input.width(), input.height());
    if w == 0 || h == 0 {
        return input.clone();
    }

    let grid = grid.max(1);
    let tile_w = (w + grid - 1) / grid;
    let tile_h = (h + grid - 1) / grid;
    // Recomputing the grid from the tile size keeps every tile non-empty
    // when a dimension is smaller than grid * tile size.
    let grid_x = (w + tile_w - 1) / tile_w;
    let grid_y = (h + tile_h - 1) / tile_h;

    // Build one 256-entry LUT per tile.
    let mut luts = vec![[0u8; 256]; (grid_x * grid_y) as usize];
    for ty in 0..grid_y {
        for tx in 0..grid_x {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(w);
            let y1 = (y0 + tile_h).min(h);

            let mut hist = [0u32; 256];
            let mut count = 0u32;
            for y in y0..y1 {
                for x in x0..x1 {
                    hist[input.get_pixel(x, y).0[0] as usize] += 1;
                    count += 1;
                }
            }

            // Clip and redistribute the excess uniformly.
            let limit = ((clip_limit * count as f32 / 256.0).ceil() as u32).max(1);
            let mut excess = 0u32;
            for bin in hist.iter_mut() {
                if *bin > limit {
                    excess += *bin - limit;
                    *bin = limit;
                }
            }
            let bonus = excess / 256;
            let remainder = (excess % 256) as usize;
            for (i, bin) in hist.iter_mut().enumerate() {
                *bin += bonus + u32::from(i < remainder);
            }

            let lut = &mut luts[(ty * grid_x + tx) as usize];
            let mut cdf = 0u64;
            for (i, &bin) in hist.iter().enumerate() {
                cdf += bin as u64;
                lut[i] = ((cdf * 255) / count as u64).min(255) as u8;
            }
        }
    }

    // Interpolate between tile LUTs, clamping at the borders.
    let mut output = GrayImage::new(w, h);
    let last_tile_x = (grid_x - 1) as f32;
    let last_tile_y = (grid_y - 1) as f32;
    for y in 0..h {
        let fy = (y as f32 + 0.5) / tile_h as f32 - 0.5;
        let ty0 = fy.floor().clamp(0.0, last_tile_y);
        let ty1 = (ty0 + 1.0).min(last_tile_y);
        let wy = (fy - ty0).clamp(0.0, 1.0);

        for x in 0..w {
            let fx = (x as f32 + 0.5) / tile_w as f32 - 0.5;
            let tx0 = fx.floor().clamp(0.0, last_tile_x);
            let tx1 = (tx0 + 1.0).min(last_tile_x);
            let wx = (fx - tx0).clamp(0.0, 1.0);

            let v = input.get_pixel(x, y).0[0] as usize;
            let tl = luts[(ty0 as u32 * grid_x + tx0 as u32) as usize][v] as f32;
            let tr = luts[(ty0 as u32 * grid_x + tx1 as u32) as usize][v] as f32;
            let bl = luts[(ty1 as u32 * grid_x + tx0 as u32) as usize][v] as f32;
            let br = luts[(ty1 as u32 * grid_x + tx1 as u32) as usize][v] as f32;

            let top = tl + (tr - tl) * wx;
            let bottom = bl + (br - bl) * wx;
            let value = top + (bottom - top) * wy;
            output.put_pixel(x, y, image::Luma([value.round().clamp(0.0, 255.0) as u8]));
        }
    }

    output
}

// ═══════════════════════════════════════════════════════════
// Display resize + transport codec
// ═══════════════════════════════════════════════════════════

/// Scale down to fit within the display bounds, preserving aspect ratio.
/// Images already within bounds come back unchanged.
pub fn resize_for_display(image: &DynamicImage, max_w: u32, max_h: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    if width <= max_w && height <= max_h {
        return image.clone();
    }

    let ratio = (max_w as f32 / width as f32).min(max_h as f32 / height as f32);
    let new_w = ((width as f32 * ratio) as u32).max(1);
    let new_h = ((height as f32 * ratio) as u32).max(1);

    debug!(from = format!("{width}x{height}"), to = format!("{new_w}x{new_h}"), "Resizing for display");
    image.resize_exact(new_w, new_h, FilterType::Lanczos3)
}

/// Encode as JPEG (quality 85) and base64 for transport.
/// Returns an empty string only if JPEG encoding itself fails.
pub fn to_base64(image: &DynamicImage) -> String {
    let mut cursor = Cursor::new(Vec::new());
    // Alpha is not representable in JPEG.
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    match rgb.write_to(&mut cursor, ImageOutputFormat::Jpeg(TRANSPORT_JPEG_QUALITY)) {
        Ok(()) => base64::engine::general_purpose::STANDARD.encode(cursor.into_inner()),
        Err(e) => {
            debug!(error = %e, "JPEG encoding failed");
            String::new()
        }
    }
}

/// Decode a base64 transport string back into an image.
/// Malformed base64 or image bytes yield `None`, never an error.
pub fn from_base64(encoded: &str) -> Option<DynamicImage> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    image::load_from_memory(&bytes).ok()
}
