// DCT perceptual hash for avatar comparison.
//
// The image is reduced to 32x32 grayscale, transformed with a 2-D DCT-II,
// and the top-left 8x8 block of low-frequency coefficients is compared
// against its median: one bit per coefficient, 64 bits total. Two images
// that look alike have hashes that differ in few bits.
//
// This is a lossy proxy, not exact matching. Re-encoding, small resizes and
// mild colour changes barely move the hash, but a tight crop or a heavy
// filter can flip many bits, and unrelated images with similar composition
// can land close together.

use image::imageops::FilterType;
use image::DynamicImage;

const SAMPLE_SIZE: usize = 32;
const HASH_SIZE: usize = 8;

/// Number of bits in a perceptual hash.
pub const HASH_BITS: u32 = (HASH_SIZE * HASH_SIZE) as u32;

/// Compute the 64-bit perceptual hash of an image.
pub fn perceptual_hash(image: &DynamicImage) -> u64 {
    let gray = image
        .grayscale()
        .resize_exact(SAMPLE_SIZE as u32, SAMPLE_SIZE as u32, FilterType::Lanczos3)
        .to_luma8();

    let mut pixels = vec![[0.0_f64; SAMPLE_SIZE]; SAMPLE_SIZE];
    for (x, y, pixel) in gray.enumerate_pixels() {
        pixels[y as usize][x as usize] = pixel.0[0] as f64;
    }

    let coefficients = dct_2d(&pixels);

    let mut low: Vec<f64> = Vec::with_capacity(HASH_SIZE * HASH_SIZE);
    for row in coefficients.iter().take(HASH_SIZE) {
        low.extend(row.iter().take(HASH_SIZE));
    }

    let median = median(&low);

    low.iter().enumerate().fold(0u64, |hash, (i, &c)| {
        if c > median {
            hash | (1u64 << i)
        } else {
            hash
        }
    })
}

/// Similarity of two hashes: `1 - hamming / 64`, in 0.0-1.0.
pub fn hash_similarity(a: u64, b: u64) -> f64 {
    let distance = (a ^ b).count_ones();
    (1.0 - distance as f64 / HASH_BITS as f64).clamp(0.0, 1.0)
}

/// Unnormalised 1-D DCT-II. Scale is irrelevant for a median threshold.
fn dct_1d(input: &[f64]) -> Vec<f64> {
    let n = input.len();
    let factor = std::f64::consts::PI / (2.0 * n as f64);
    (0..n)
        .map(|k| {
            input
                .iter()
                .enumerate()
                .map(|(i, &x)| x * ((2 * i + 1) as f64 * k as f64 * factor).cos())
                .sum::<f64>()
                * 2.0
        })
        .collect()
}

/// Separable 2-D DCT: columns first, then rows.
fn dct_2d(pixels: &[[f64; SAMPLE_SIZE]]) -> Vec<Vec<f64>> {
    let size = pixels.len();

    let mut columns = vec![vec![0.0_f64; size]; size];
    for x in 0..size {
        let column: Vec<f64> = pixels.iter().map(|row| row[x]).collect();
        for (y, value) in dct_1d(&column).into_iter().enumerate() {
            columns[y][x] = value;
        }
    }

    columns.iter().map(|row| dct_1d(row)).collect()
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    /// 8x8 grid of pseudo-random gray levels, scaled to `size` pixels.
    fn block_noise(size: u32, seed: u32) -> DynamicImage {
        let levels: Vec<u8> = (0..64u32)
            .map(|i| {
                let v = (i + 1).wrapping_mul(2_654_435_761).wrapping_add(seed.wrapping_mul(40_503));
                (v >> 24) as u8
            })
            .collect();
        let cell = size / 8;
        DynamicImage::ImageRgb8(RgbImage::from_fn(size, size, |x, y| {
            let v = levels[((y / cell).min(7) * 8 + (x / cell).min(7)) as usize];
            Rgb([v, v, v])
        }))
    }

    fn inverted(image: &DynamicImage) -> DynamicImage {
        let mut copy = image.clone();
        copy.invert();
        copy
    }

    #[test]
    fn test_identical_images_hash_equal() {
        let img = block_noise(64, 7);
        assert_eq!(perceptual_hash(&img), perceptual_hash(&img));
    }

    #[test]
    fn test_resized_image_stays_close() {
        let small = block_noise(64, 7);
        let large = block_noise(128, 7);
        let sim = hash_similarity(perceptual_hash(&small), perceptual_hash(&large));
        assert!(sim >= 0.9, "Rescaled copy should stay close, got {sim}");
    }

    #[test]
    fn test_inverted_image_diverges() {
        let img = block_noise(64, 7);
        let a = perceptual_hash(&img);
        let b = perceptual_hash(&inverted(&img));
        let sim = hash_similarity(a, b);
        assert!(sim < 0.25, "Negative image should flip most bits, got {sim}");
    }

    #[test]
    fn test_hash_similarity_bounds() {
        assert!((hash_similarity(0, 0) - 1.0).abs() < f64::EPSILON);
        assert!(hash_similarity(0, u64::MAX).abs() < f64::EPSILON);
        assert!((hash_similarity(0, 0b1111) - 60.0 / 64.0).abs() < 1e-12);
    }

    #[test]
    fn test_median_even_and_odd() {
        assert!((median(&[1.0, 3.0, 2.0]) - 2.0).abs() < f64::EPSILON);
        assert!((median(&[4.0, 1.0, 3.0, 2.0]) - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_dct_of_constant_signal_is_dc_only() {
        let out = dct_1d(&[5.0; 8]);
        assert!(out[0] > 0.0);
        for value in &out[1..] {
            assert!(value.abs() < 1e-9);
        }
    }
}
