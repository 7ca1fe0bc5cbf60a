// SPDX-License-Identifier: MPL-2.0
//! Software image decoding and scaling with the `image` crate.
//!
//! Stands in for the hardware JPEG engine and 2D scaler on hosts without
//! them. Output is RGB565 little-endian, like the display hardware expects.

use crate::application::port::{DecodeEngine, ImageDecoder, ImageProcessor};
use crate::config::{BYTES_PER_PIXEL, MAX_DECODE_HEIGHT, MAX_DECODE_WIDTH};
use crate::domain::media::{DecodedImage, ImageFormat, ImageInfo, ProcessPlan};
use crate::error::{Error, Result};
use image_rs::imageops::{self, FilterType};
use image_rs::{ImageError, ImageReader, RgbImage};
use std::io::Cursor;

fn codec_format(format: ImageFormat) -> image_rs::ImageFormat {
    match format {
        ImageFormat::Jpeg => image_rs::ImageFormat::Jpeg,
        ImageFormat::Png => image_rs::ImageFormat::Png,
    }
}

fn map_image_error(err: ImageError) -> Error {
    match err {
        ImageError::Unsupported(e) => Error::Unsupported(e.to_string()),
        ImageError::Limits(e) => Error::ResourceExhausted(e.to_string()),
        ImageError::IoError(e) => Error::from(e),
        other => Error::Internal(other.to_string()),
    }
}

fn check_envelope(info: ImageInfo) -> Result<()> {
    if info.width > MAX_DECODE_WIDTH || info.height > MAX_DECODE_HEIGHT {
        return Err(Error::Unsupported(format!(
            "{}x{} exceeds {MAX_DECODE_WIDTH}x{MAX_DECODE_HEIGHT}",
            info.width, info.height
        )));
    }
    Ok(())
}

fn read_info(bytes: &[u8], format: image_rs::ImageFormat) -> Result<ImageInfo> {
    let (width, height) = ImageReader::with_format(Cursor::new(bytes), format)
        .into_dimensions()
        .map_err(map_image_error)?;
    Ok(ImageInfo::new(width, height))
}

fn decode_rgb(bytes: &[u8], format: image_rs::ImageFormat) -> Result<RgbImage> {
    check_envelope(read_info(bytes, format)?)?;
    let image = image_rs::load_from_memory_with_format(bytes, format).map_err(map_image_error)?;
    Ok(image.to_rgb8())
}

/// Packs 8-bit RGB into RGB565.
fn pack_rgb565(rgb: &RgbImage, out: &mut [u8]) {
    for (pixel, dst) in rgb.pixels().zip(out.chunks_exact_mut(BYTES_PER_PIXEL)) {
        let [r, g, b] = pixel.0;
        let value = (u16::from(r >> 3) << 11) | (u16::from(g >> 2) << 5) | u16::from(b >> 3);
        dst.copy_from_slice(&value.to_le_bytes());
    }
}

/// Expands RGB565 back to 8-bit RGB, replicating high bits into the low ones.
fn unpack_rgb565(image: &DecodedImage) -> Result<RgbImage> {
    let mut raw = Vec::with_capacity(image.width() as usize * image.height() as usize * 3);
    for chunk in image.pixels().chunks_exact(BYTES_PER_PIXEL) {
        let value = u16::from_le_bytes([chunk[0], chunk[1]]);
        let r = ((value >> 11) & 0x1f) as u8;
        let g = ((value >> 5) & 0x3f) as u8;
        let b = (value & 0x1f) as u8;
        raw.extend_from_slice(&[(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]);
    }
    RgbImage::from_raw(image.width(), image.height(), raw)
        .ok_or_else(|| Error::Internal("RGB565 buffer does not match its dimensions".into()))
}

fn to_decoded(rgb: &RgbImage) -> Result<DecodedImage> {
    let mut pixels = vec![0; rgb.width() as usize * rgb.height() as usize * BYTES_PER_PIXEL];
    pack_rgb565(rgb, &mut pixels);
    DecodedImage::new(rgb.width(), rgb.height(), pixels)
        .ok_or_else(|| Error::Internal("decoded buffer size mismatch".into()))
}

/// JPEG/PNG decoder. Also serves as the frame decode engine for MJPEG video.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageRsDecoder;

impl ImageDecoder for ImageRsDecoder {
    fn decode(&self, bytes: &[u8], format: ImageFormat) -> Result<DecodedImage> {
        to_decoded(&decode_rgb(bytes, codec_format(format))?)
    }

    fn get_info(&self, bytes: &[u8], format: ImageFormat) -> Result<ImageInfo> {
        read_info(bytes, codec_format(format))
    }
}

impl DecodeEngine for ImageRsDecoder {
    fn open(&self) -> Result<()> {
        Ok(())
    }

    fn close(&self) {}

    fn frame_info(&self, compressed: &[u8]) -> Result<ImageInfo> {
        read_info(compressed, image_rs::ImageFormat::Jpeg)
    }

    fn decode_into(&self, compressed: &[u8], out: &mut [u8]) -> Result<usize> {
        let rgb = decode_rgb(compressed, image_rs::ImageFormat::Jpeg)?;
        let needed = rgb.width() as usize * rgb.height() as usize * BYTES_PER_PIXEL;
        let available = out.len();
        let dst = out.get_mut(..needed).ok_or_else(|| {
            Error::ResourceExhausted(format!(
                "frame needs {needed} bytes, buffer holds {available}"
            ))
        })?;
        pack_rgb565(&rgb, dst);
        Ok(needed)
    }
}

/// Crop and scale on the CPU.
#[derive(Debug, Clone, Copy)]
pub struct SoftwareProcessor {
    filter: FilterType,
}

impl Default for SoftwareProcessor {
    fn default() -> Self {
        Self {
            filter: FilterType::Triangle,
        }
    }
}

impl ImageProcessor for SoftwareProcessor {
    fn apply(&self, input: DecodedImage, plan: &ProcessPlan) -> Result<DecodedImage> {
        if plan.is_identity_for(input.info()) {
            return Ok(input);
        }

        let rgb = unpack_rgb565(&input)?;
        let crop = plan.crop;
        let cropped = imageops::crop_imm(&rgb, crop.x, crop.y, crop.width, crop.height).to_image();

        let target = plan.target;
        let output = if cropped.dimensions() == (target.width, target.height) {
            cropped
        } else {
            imageops::resize(&cropped, target.width, target.height, self.filter)
        };
        to_decoded(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::media::ScaleMode;
    use image_rs::Rgb;

    fn encode(width: u32, height: u32, format: image_rs::ImageFormat) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, Rgb([255, 0, 0]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), format)
            .expect("encode test image");
        bytes
    }

    #[test]
    fn decodes_png_to_rgb565() {
        let bytes = encode(4, 3, image_rs::ImageFormat::Png);
        let image = ImageRsDecoder.decode(&bytes, ImageFormat::Png).expect("decode");

        assert_eq!(image.info(), ImageInfo::new(4, 3));
        assert_eq!(image.pixels().len(), 4 * 3 * BYTES_PER_PIXEL);
        assert_eq!(&image.pixels()[..2], &0xf800u16.to_le_bytes());
    }

    #[test]
    fn reads_info_without_decoding() {
        let bytes = encode(16, 8, image_rs::ImageFormat::Jpeg);
        let info = ImageRsDecoder
            .get_info(&bytes, ImageFormat::Jpeg)
            .expect("info");
        assert_eq!(info, ImageInfo::new(16, 8));
    }

    #[test]
    fn garbage_is_rejected() {
        let result = ImageRsDecoder.decode(&[0u8; 64], ImageFormat::Jpeg);
        assert!(result.is_err());
    }

    #[test]
    fn images_beyond_envelope_are_unsupported() {
        let bytes = encode(MAX_DECODE_WIDTH + 8, 8, image_rs::ImageFormat::Png);
        let result = ImageRsDecoder.decode(&bytes, ImageFormat::Png);
        assert!(matches!(result, Err(Error::Unsupported(_))));
    }

    #[test]
    fn engine_decodes_into_caller_buffer() {
        let bytes = encode(8, 8, image_rs::ImageFormat::Jpeg);
        let mut out = vec![0u8; 8 * 8 * BYTES_PER_PIXEL];
        let written = ImageRsDecoder.decode_into(&bytes, &mut out).expect("decode");
        assert_eq!(written, out.len());

        let mut small = vec![0u8; 16];
        let result = ImageRsDecoder.decode_into(&bytes, &mut small);
        assert!(matches!(
            result,
            Err(Error::ResourceExhausted(msg)) if msg.contains("holds 16")
        ));
    }

    #[test]
    fn crop_only_plan_cuts_the_center() {
        let src = ImageInfo::new(40, 20);
        let image = DecodedImage::new(40, 20, vec![0; 40 * 20 * BYTES_PER_PIXEL]).expect("image");
        let plan = ProcessPlan::compute(src, ImageInfo::new(10, 10), ScaleMode::CropOnly)
            .expect("plan");

        let out = SoftwareProcessor::default().apply(image, &plan).expect("apply");
        assert_eq!(out.info(), ImageInfo::new(10, 10));
    }

    #[test]
    fn fit_plan_scales_down() {
        let src = ImageInfo::new(20, 40);
        let image = DecodedImage::new(20, 40, vec![0xff; 20 * 40 * BYTES_PER_PIXEL]).expect("image");
        let plan =
            ProcessPlan::compute(src, ImageInfo::new(10, 10), ScaleMode::Fit).expect("plan");

        let out = SoftwareProcessor::default().apply(image, &plan).expect("apply");
        assert_eq!(out.info(), plan.target);
        assert!(out.width() <= 10 && out.height() <= 10);
    }

    #[test]
    fn identity_plan_returns_input() {
        let src = ImageInfo::new(8, 8);
        let image = DecodedImage::new(8, 8, vec![1; 8 * 8 * BYTES_PER_PIXEL]).expect("image");
        let plan = ProcessPlan::compute(src, ImageInfo::new(16, 16), ScaleMode::Center)
            .expect("plan");

        let out = SoftwareProcessor::default()
            .apply(image.clone(), &plan)
            .expect("apply");
        assert!(out.shares_pixels_with(&image));
    }

    #[test]
    fn rgb565_round_trip_keeps_primary_colors() {
        let rgb = RgbImage::from_pixel(2, 1, Rgb([0, 255, 0]));
        let decoded = to_decoded(&rgb).expect("pack");
        let back = unpack_rgb565(&decoded).expect("unpack");
        assert_eq!(back.get_pixel(0, 0), &Rgb([0, 255, 0]));
    }
}
