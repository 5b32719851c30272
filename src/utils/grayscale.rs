//! Reduce captured frames to 8-bit luma.
//!
//! Integer BT.601 weights: Y = (76*R + 150*G + 29*B) >> 8. Rows are converted
//! in parallel with rayon; every entry point writes into a caller-owned buffer
//! so the decoder's working memory is reused across frames.

use image::ImageFormat;
use rayon::prelude::*;

use crate::error::FrameError;
use crate::models::{Frame, PixelFormat};

const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8;
    lum.min(255) as u8
}

/// Expand one big-endian RGB565 pixel to luma
#[inline]
fn rgb565_luma(hi: u8, lo: u8) -> u8 {
    let r5 = hi >> 3;
    let g6 = ((hi & 0x07) << 3) | (lo >> 5);
    let b5 = lo & 0x1F;
    luma((r5 << 3) | (r5 >> 2), (g6 << 2) | (g6 >> 4), (b5 << 3) | (b5 >> 2))
}

/// Convert `frame` into `out`, which must hold exactly `width * height` bytes.
pub fn convert_into(frame: &Frame, out: &mut [u8]) -> Result<(), FrameError> {
    let expected = frame.pixel_count();
    if out.len() != expected {
        return Err(FrameError::LoadSizeMismatch {
            expected,
            actual: out.len(),
        });
    }

    let width = frame.width();
    let src = frame.buffer();
    match frame.pixel_format() {
        PixelFormat::Grayscale => out.copy_from_slice(&src[..expected]),
        PixelFormat::Rgb888 => rgb_to_grayscale_into(src, width, out),
        PixelFormat::Rgb565 => rgb565_to_grayscale_into(src, width, out),
        PixelFormat::Yuv422 => yuyv_to_grayscale_into(src, width, out),
        PixelFormat::Jpeg => jpeg_to_grayscale_into(src, width, frame.height(), out)?,
    }
    Ok(())
}

/// Packed R G B rows to luma
pub fn rgb_to_grayscale_into(rgb: &[u8], width: usize, out: &mut [u8]) {
    out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let src = &rgb[y * width * 3..(y + 1) * width * 3];
        for (dst, px) in row.iter_mut().zip(src.chunks_exact(3)) {
            *dst = luma(px[0], px[1], px[2]);
        }
    });
}

/// Big-endian RGB565 rows to luma
pub fn rgb565_to_grayscale_into(rgb565: &[u8], width: usize, out: &mut [u8]) {
    out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let src = &rgb565[y * width * 2..(y + 1) * width * 2];
        for (dst, px) in row.iter_mut().zip(src.chunks_exact(2)) {
            *dst = rgb565_luma(px[0], px[1]);
        }
    });
}

/// YUYV rows to luma; the Y samples are simply picked out
pub fn yuyv_to_grayscale_into(yuyv: &[u8], width: usize, out: &mut [u8]) {
    out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let src = &yuyv[y * width * 2..(y + 1) * width * 2];
        for (dst, px) in row.iter_mut().zip(src.chunks_exact(2)) {
            *dst = px[0];
        }
    });
}

fn jpeg_to_grayscale_into(
    data: &[u8],
    width: usize,
    height: usize,
    out: &mut [u8],
) -> Result<(), FrameError> {
    let decoded = image::load_from_memory_with_format(data, ImageFormat::Jpeg)
        .map_err(|e| FrameError::Compressed(e.to_string()))?
        .to_luma8();
    let (actual_width, actual_height) = (decoded.width() as usize, decoded.height() as usize);
    if actual_width != width || actual_height != height {
        return Err(FrameError::GeometryMismatch {
            width,
            height,
            actual_width,
            actual_height,
        });
    }
    out.copy_from_slice(decoded.as_raw());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_to_grayscale() {
        let rgb = vec![255, 255, 255, 0, 0, 0, 255, 0, 0, 0, 255, 0];
        let mut gray = vec![0u8; 4];
        rgb_to_grayscale_into(&rgb, 2, &mut gray);
        assert!(gray[0] >= 254);
        assert_eq!(gray[1], 0);
        assert!(gray[2] > 0 && gray[2] < 255);
        assert!(gray[3] > 100);
    }

    #[test]
    fn test_rgb565_extremes() {
        assert!(rgb565_luma(0xFF, 0xFF) >= 254);
        assert_eq!(rgb565_luma(0x00, 0x00), 0);
        // pure green carries the most weight
        assert!(rgb565_luma(0x07, 0xE0) > rgb565_luma(0xF8, 0x00));
    }

    #[test]
    fn test_yuyv_picks_luma() {
        let frame = Frame::new(2, 1, PixelFormat::Yuv422, vec![10, 128, 200, 128]).unwrap();
        let mut gray = vec![0u8; 2];
        convert_into(&frame, &mut gray).unwrap();
        assert_eq!(gray, vec![10, 200]);
    }

    #[test]
    fn test_grayscale_ignores_trailing_bytes() {
        let frame = Frame::grayscale(2, 2, vec![1, 2, 3, 4, 99, 99]).unwrap();
        let mut gray = vec![0u8; 4];
        convert_into(&frame, &mut gray).unwrap();
        assert_eq!(gray, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_size_mismatch() {
        let frame = Frame::grayscale(2, 2, vec![0; 4]).unwrap();
        let mut gray = vec![0u8; 3];
        assert_eq!(
            convert_into(&frame, &mut gray),
            Err(FrameError::LoadSizeMismatch {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn test_jpeg_roundtrip_geometry() {
        let img = image::GrayImage::from_pixel(8, 8, image::Luma([200]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageLuma8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Jpeg)
            .unwrap();

        let frame = Frame::new(8, 8, PixelFormat::Jpeg, bytes.clone()).unwrap();
        let mut gray = vec![0u8; 64];
        convert_into(&frame, &mut gray).unwrap();
        assert!(gray.iter().all(|&v| (190..=210).contains(&v)));

        let wrong = Frame::new(4, 16, PixelFormat::Jpeg, bytes).unwrap();
        assert!(matches!(
            convert_into(&wrong, &mut gray),
            Err(FrameError::GeometryMismatch { .. })
        ));
    }

    #[test]
    fn test_garbage_jpeg() {
        let frame = Frame::new(2, 2, PixelFormat::Jpeg, vec![1, 2, 3]).unwrap();
        let mut gray = vec![0u8; 4];
        assert!(matches!(
            convert_into(&frame, &mut gray),
            Err(FrameError::Compressed(_))
        ));
    }
}
