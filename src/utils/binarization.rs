use crate::models::BitMatrix;

/// Otsu's optimal global threshold; pixels below it are dark.
///
/// Uniform images have no between-class variance and fall back to 128.
pub fn otsu_threshold(gray: &[u8]) -> u8 {
    let mut histogram = [0u64; 256];
    for &pixel in gray {
        histogram[pixel as usize] += 1;
    }

    let total = gray.len() as u64;
    let total_sum: u64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &c)| i as u64 * c)
        .sum();

    let mut dark_pixels = 0u64;
    let mut dark_sum = 0u64;
    let mut max_variance = 0.0f64;
    let mut optimal = 128u8;

    for threshold in 1..=255usize {
        dark_pixels += histogram[threshold - 1];
        dark_sum += (threshold as u64 - 1) * histogram[threshold - 1];

        let light_pixels = total - dark_pixels;
        if dark_pixels == 0 || light_pixels == 0 {
            continue;
        }

        let dark_mean = dark_sum as f64 / dark_pixels as f64;
        let light_mean = (total_sum - dark_sum) as f64 / light_pixels as f64;
        let w1 = dark_pixels as f64 / total as f64;
        let w2 = light_pixels as f64 / total as f64;
        let variance = w1 * w2 * (dark_mean - light_mean).powi(2);

        if variance > max_variance {
            max_variance = variance;
            optimal = threshold as u8;
        }
    }

    optimal
}

/// Threshold `gray` into `binary`, which must already have the image geometry
pub fn binarize_into(gray: &[u8], threshold: u8, binary: &mut BitMatrix) {
    let width = binary.width();
    for (y, row) in gray.chunks_exact(width).take(binary.height()).enumerate() {
        for (x, &pixel) in row.iter().enumerate() {
            binary.set(x, y, pixel < threshold);
        }
    }
}
