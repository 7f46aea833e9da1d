//! Screenshot palette quantization and legend composition
//!
//! K-means quantization (in Lab space) of a JPEG screenshot into its dominant
//! colors, and a legend strip of those colors appended below the screenshot
//! for the vision model.

use crate::types::ExtractionError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageBuffer, Rgb, RgbImage};
use kmeans_colors::get_kmeans;
use palette::{IntoColor, Lab, LinSrgb, Srgb};
use std::collections::HashSet;
use tracing::debug;

/// Palette used when quantization fails
pub const FALLBACK_PALETTE: [&str; 10] = [
    "#FF5733", "#33FF57", "#3357FF", "#FFD700", "#800080", "#FF1493", "#00CED1", "#32CD32",
    "#FF6347", "#9370DB",
];

/// Legend strip height relative to the screenshot
const LEGEND_HEIGHT_RATIO: f32 = 0.2;

/// JPEG quality of the composed legend image
const LEGEND_QUALITY: u8 = 90;

/// Upper bound on sampled pixels; larger images are sampled with a stride
const MAX_SAMPLES: usize = 250_000;

/// Channel value above which a pixel counts as near-white and is skipped
const NEAR_WHITE: u8 = 250;

/// K-means iteration cap and convergence threshold
const KMEANS_MAX_ITER: usize = 20;
const KMEANS_CONVERGE: f32 = 1e-4;

/// Cluster indices are stored as u8
const MAX_CLUSTERS: usize = u8::MAX as usize + 1;

/// Decode JPEG (or any supported format) bytes
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ExtractionError> {
    image::load_from_memory(bytes)
        .map_err(|e| ExtractionError::Image(format!("Failed to decode image: {}", e)))
}

/// Encode an image as baseline JPEG at `quality`
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, ExtractionError> {
    let rgb = image.to_rgb8();
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(|e| ExtractionError::Image(format!("Failed to encode JPEG: {}", e)))?;
    Ok(buffer)
}

/// Dominant colors of an image, most populous first
///
/// # Arguments
/// * `bytes` - Encoded screenshot
/// * `count` - Requested palette size (at least 1)
///
/// # Returns
/// Up to `count` uppercase `#RRGGBB` strings. Fewer are returned when the
/// image does not hold enough distinct colors.
///
/// # Errors
/// Fails if the image cannot be decoded or holds no usable pixels (for
/// example an all-white page).
pub fn dominant_colors(bytes: &[u8], count: usize) -> Result<Vec<String>, ExtractionError> {
    let rgb = decode(bytes)?.to_rgb8();
    let pixels = sample_pixels(&rgb);

    if pixels.is_empty() {
        return Err(ExtractionError::Image(
            "Screenshot has no non-white pixels to quantize".to_string(),
        ));
    }

    // k-means++ seeding needs at least k distinct points
    let distinct = pixels.iter().collect::<HashSet<_>>().len();
    let k = count.max(1).min(distinct).min(MAX_CLUSTERS);

    let lab_pixels: Vec<Lab> = pixels
        .iter()
        .map(|&[r, g, b]| -> Lab {
            let linear: LinSrgb<f32> = Srgb::<u8>::new(r, g, b).into_linear();
            linear.into_color()
        })
        .collect();

    let kmeans = get_kmeans(k, KMEANS_MAX_ITER, KMEANS_CONVERGE, false, &lab_pixels, 0);

    let mut population = vec![0usize; kmeans.centroids.len()];
    for &index in &kmeans.indices {
        population[index as usize] += 1;
    }

    let mut clusters: Vec<(usize, Lab)> = population
        .into_iter()
        .zip(kmeans.centroids.iter().copied())
        .filter(|(members, _)| *members > 0)
        .collect();
    clusters.sort_by(|a, b| b.0.cmp(&a.0));

    let colors: Vec<String> = clusters
        .iter()
        .map(|(_, lab)| {
            let linear: LinSrgb<f32> = (*lab).into_color();
            let rgb: Srgb<u8> = Srgb::<f32>::from_linear(linear).into_format();
            format!("#{:02X}{:02X}{:02X}", rgb.red, rgb.green, rgb.blue)
        })
        .collect();

    debug!(
        requested = count,
        clusters = k,
        extracted = colors.len(),
        score = kmeans.score,
        "Quantized screenshot palette"
    );
    Ok(colors)
}

/// Append a legend strip of `colors` below the screenshot
///
/// The strip is 20% of the screenshot height with one equal-width swatch per
/// color, left to right. Each swatch carries a centred marker bar in white or
/// black, whichever reads better on the swatch.
pub fn compose_legend(bytes: &[u8], colors: &[String]) -> Result<Vec<u8>, ExtractionError> {
    let parsed: Vec<[u8; 3]> = colors
        .iter()
        .map(|hex| {
            crate::palette::parse_hex_rgb(hex)
                .ok_or_else(|| ExtractionError::Image(format!("Invalid palette color: {}", hex)))
        })
        .collect::<Result<_, _>>()?;

    if parsed.is_empty() {
        return Err(ExtractionError::Image("No palette colors to draw".to_string()));
    }

    let screenshot = decode(bytes)?.to_rgb8();
    let (width, height) = screenshot.dimensions();
    let legend_height = ((height as f32 * LEGEND_HEIGHT_RATIO) as u32).max(1);
    let swatch_width = width / parsed.len() as u32;

    if swatch_width == 0 {
        return Err(ExtractionError::Image(format!(
            "Screenshot too narrow ({}px) for {} swatches",
            width,
            parsed.len()
        )));
    }

    let mut combined: RgbImage =
        ImageBuffer::from_pixel(width, height + legend_height, Rgb([255, 255, 255]));

    for (x, y, pixel) in screenshot.enumerate_pixels() {
        combined.put_pixel(x, y, *pixel);
    }

    let marker_height = (legend_height / 6).max(1);
    let marker_top = (legend_height - marker_height) / 2;
    let marker_inset = swatch_width / 4;

    for (i, color) in parsed.iter().enumerate() {
        let x0 = i as u32 * swatch_width;
        let marker = Rgb(marker_color(*color));

        for dx in 0..swatch_width {
            for dy in 0..legend_height {
                let in_marker = dx >= marker_inset
                    && dx < swatch_width - marker_inset
                    && dy >= marker_top
                    && dy < marker_top + marker_height;
                let fill = if in_marker { marker } else { Rgb(*color) };
                combined.put_pixel(x0 + dx, height + dy, fill);
            }
        }
    }

    let encoded = encode_jpeg(&DynamicImage::ImageRgb8(combined), LEGEND_QUALITY)?;
    debug!(size_bytes = encoded.len(), swatches = parsed.len(), "Composed palette legend");
    Ok(encoded)
}

/// White on dark swatches, black on light ones
pub fn marker_color([r, g, b]: [u8; 3]) -> [u8; 3] {
    let brightness = (r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000;
    if brightness < 128 {
        [255, 255, 255]
    } else {
        [0, 0, 0]
    }
}

fn sample_pixels(image: &RgbImage) -> Vec<[u8; 3]> {
    let total = image.width() as usize * image.height() as usize;
    let stride = (total / MAX_SAMPLES).max(1);

    image
        .pixels()
        .step_by(stride)
        .map(|p| p.0)
        .filter(|[r, g, b]| !(*r > NEAR_WHITE && *g > NEAR_WHITE && *b > NEAR_WHITE))
        .collect()
}
