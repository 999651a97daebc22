//! Plant-region detection via HSV green-band segmentation.
//!
//! Foliage is isolated by masking pixels inside a fixed green hue band,
//! taking the largest connected region of the mask, and cropping the source
//! to that region's padded bounding box. Photos with no green at all come
//! back unchanged with no box.

use std::collections::VecDeque;

use image::{DynamicImage, GenericImageView};
use serde::Serialize;
use tracing::debug;

/// Green hue band on a 0-255 hue scale, with minimum saturation and value.
const HUE_MIN: u8 = 35;
const HUE_MAX: u8 = 85;
const SAT_MIN: u8 = 50;
const VAL_MIN: u8 = 50;

/// Padding added around the detected bounding box, clamped to image bounds.
const REGION_PADDING: u32 = 20;

/// Bounding box in source-image pixel coordinates. Width and height are
/// always positive when a region is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegionBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Detect the dominant green region and crop the image to it.
///
/// Returns the cropped image plus the padded bounding box, or the original
/// image and `None` when no green region exists.
pub fn detect_plant_region(image: &DynamicImage) -> (DynamicImage, Option<RegionBox>) {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return (image.clone(), None);
    }

    let mask = green_mask(image);
    let Some(bbox) = largest_region_bbox(&mask, width, height) else {
        debug!("No green region found, returning image unchanged");
        return (image.clone(), None);
    };

    let boxed = pad_and_clamp(bbox, width, height);
    let cropped = image.crop_imm(boxed.x, boxed.y, boxed.width, boxed.height);
    debug!(x = boxed.x, y = boxed.y, w = boxed.width, h = boxed.height, "Cropped to plant region");
    (cropped, Some(boxed))
}

/// Per-pixel mask of the green HSV band.
fn green_mask(image: &DynamicImage) -> Vec<bool> {
    let rgb = image.to_rgb8();
    rgb.pixels()
        .map(|p| {
            let (h, s, v) = rgb_to_hsv(p.0[0], p.0[1], p.0[2]);
            (HUE_MIN..=HUE_MAX).contains(&h) && s >= SAT_MIN && v >= VAL_MIN
        })
        .collect()
}

/// RGB to HSV with all three channels on a 0-255 scale.
fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let rf = r as f32 / 255.0;
    let gf = g as f32 / 255.0;
    let bf = b as f32 / 255.0;

    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let hue_deg = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (((gf - bf) / delta).rem_euclid(6.0))
    } else if max == gf {
        60.0 * ((bf - rf) / delta + 2.0)
    } else {
        60.0 * ((rf - gf) / delta + 4.0)
    };

    let sat = if max == 0.0 { 0.0 } else { delta / max };

    let h = (hue_deg / 360.0 * 255.0).round().clamp(0.0, 255.0) as u8;
    let s = (sat * 255.0).round() as u8;
    let v = (max * 255.0).round() as u8;
    (h, s, v)
}

/// Bounding box of the largest 4-connected region of set mask pixels.
fn largest_region_bbox(mask: &[bool], width: u32, height: u32) -> Option<RegionBox> {
    let w = width as usize;
    let h = height as usize;
    let mut visited = vec![false; mask.len()];
    let mut best: Option<(usize, RegionBox)> = None;

    for start in 0..mask.len() {
        if !mask[start] || visited[start] {
            continue;
        }

        // Flood fill this component, tracking extent and size.
        let mut queue = VecDeque::from([start]);
        visited[start] = true;
        let (mut min_x, mut min_y) = (w - 1, h - 1);
        let (mut max_x, mut max_y) = (0usize, 0usize);
        let mut size = 0usize;

        while let Some(idx) = queue.pop_front() {
            let x = idx % w;
            let y = idx / w;
            size += 1;
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);

            let mut push = |nx: usize, ny: usize| {
                let nidx = ny * w + nx;
                if mask[nidx] && !visited[nidx] {
                    visited[nidx] = true;
                    queue.push_back(nidx);
                }
            };
            if x > 0 {
                push(x - 1, y);
            }
            if x + 1 < w {
                push(x + 1, y);
            }
            if y > 0 {
                push(x, y - 1);
            }
            if y + 1 < h {
                push(x, y + 1);
            }
        }

        let bbox = RegionBox {
            x: min_x as u32,
            y: min_y as u32,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        };
        if best.as_ref().map_or(true, |(best_size, _)| size > *best_size) {
            best = Some((size, bbox));
        }
    }

    best.map(|(_, bbox)| bbox)
}

/// Expand the box by the fixed padding on all sides, clamped to the image.
fn pad_and_clamp(bbox: RegionBox, width: u32, height: u32) -> RegionBox {
    let x = bbox.x.saturating_sub(REGION_PADDING);
    let y = bbox.y.saturating_sub(REGION_PADDING);
    let w = (bbox.width + 2 * REGION_PADDING).min(width - x);
    let h = (bbox.height + 2 * REGION_PADDING).min(height - y);
    RegionBox { x, y, width: w, height: h }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn red_field(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb([200, 30, 30]))
    }

    #[test]
    fn all_red_image_yields_no_box() {
        let img = DynamicImage::ImageRgb8(red_field(200, 200));
        let (out, bbox) = detect_plant_region(&img);
        assert!(bbox.is_none());
        assert_eq!(out.dimensions(), (200, 200));
    }

    #[test]
    fn green_patch_is_cropped_with_padding() {
        let mut img = red_field(300, 300);
        for y in 100..180 {
            for x in 120..220 {
                img.put_pixel(x, y, Rgb([40, 200, 30]));
            }
        }

        let (cropped, bbox) = detect_plant_region(&DynamicImage::ImageRgb8(img));
        let bbox = bbox.expect("green patch should be detected");

        assert_eq!(bbox.x, 100); // 120 - 20 padding
        assert_eq!(bbox.y, 80);
        assert_eq!(bbox.width, 140); // 100 + 2 * 20
        assert_eq!(bbox.height, 120);
        assert_eq!(cropped.dimensions(), (bbox.width, bbox.height));
    }

    #[test]
    fn padding_clamps_at_image_border() {
        let mut img = red_field(100, 100);
        for y in 0..30 {
            for x in 0..30 {
                img.put_pixel(x, y, Rgb([40, 200, 30]));
            }
        }

        let (_, bbox) = detect_plant_region(&DynamicImage::ImageRgb8(img));
        let bbox = bbox.unwrap();
        assert_eq!((bbox.x, bbox.y), (0, 0));
        assert!(bbox.x + bbox.width <= 100);
        assert!(bbox.y + bbox.height <= 100);
    }

    #[test]
    fn largest_of_two_regions_wins() {
        let mut img = red_field(300, 100);
        // Small patch on the left, large patch on the right.
        for y in 10..20 {
            for x in 10..20 {
                img.put_pixel(x, y, Rgb([40, 200, 30]));
            }
        }
        for y in 10..90 {
            for x in 150..280 {
                img.put_pixel(x, y, Rgb([40, 200, 30]));
            }
        }

        let (_, bbox) = detect_plant_region(&DynamicImage::ImageRgb8(img));
        let bbox = bbox.unwrap();
        assert_eq!(bbox.x, 130); // 150 - 20 padding
    }

    #[test]
    fn hsv_green_lands_in_band() {
        let (h, s, v) = rgb_to_hsv(40, 200, 30);
        assert!((HUE_MIN..=HUE_MAX).contains(&h), "hue {h}");
        assert!(s >= SAT_MIN && v >= VAL_MIN);
    }

    #[test]
    fn hsv_red_misses_band() {
        let (h, _, _) = rgb_to_hsv(200, 30, 30);
        assert!(!(HUE_MIN..=HUE_MAX).contains(&h), "hue {h}");
    }
}
