// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Visible watermark for generated images

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use thiserror::Error;

/// Maximum decoded image size (20MB)
const MAX_IMAGE_SIZE: usize = 20 * 1024 * 1024;

/// Share of the image height covered by the bottom band, in percent
const BAND_HEIGHT_PERCENT: u32 = 8;

/// Distance between diagonal stripes in pixels
const STRIPE_SPACING: u32 = 48;

/// Width of each diagonal stripe in pixels
const STRIPE_WIDTH: u32 = 6;

#[derive(Debug, Error)]
pub enum WatermarkError {
    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Image data is empty")]
    EmptyData,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Failed to encode image: {0}")]
    EncodeFailed(String),
}

/// Stamp a watermark onto a base64-encoded image and return base64 PNG.
///
/// An `opacity` of 0 returns the input unchanged.
pub fn apply_watermark(base64_image: &str, opacity: u8) -> Result<String, WatermarkError> {
    if opacity == 0 {
        return Ok(base64_image.to_string());
    }

    let bytes = STANDARD.decode(base64_image.trim())?;
    if bytes.is_empty() {
        return Err(WatermarkError::EmptyData);
    }
    if bytes.len() > MAX_IMAGE_SIZE {
        return Err(WatermarkError::TooLarge(bytes.len(), MAX_IMAGE_SIZE));
    }

    let decoded =
        image::load_from_memory(&bytes).map_err(|e| WatermarkError::DecodeFailed(e.to_string()))?;
    let mut canvas = decoded.to_rgba8();
    stamp(&mut canvas, opacity);

    let mut out = Cursor::new(Vec::new());
    canvas
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| WatermarkError::EncodeFailed(e.to_string()))?;
    Ok(STANDARD.encode(out.into_inner()))
}

fn stamp(canvas: &mut RgbaImage, opacity: u8) {
    let height = canvas.height();
    let band_top = height - (height * BAND_HEIGHT_PERCENT / 100).max(1).min(height);
    let stripe_alpha = opacity / 3;

    for (x, y, pixel) in canvas.enumerate_pixels_mut() {
        if y >= band_top {
            blend(pixel, [0, 0, 0], opacity);
        } else if (x + y) % STRIPE_SPACING < STRIPE_WIDTH {
            blend(pixel, [255, 255, 255], stripe_alpha);
        }
    }
}

fn blend(pixel: &mut Rgba<u8>, color: [u8; 3], alpha: u8) {
    let a = alpha as u32;
    for (channel, target) in pixel.0.iter_mut().take(3).zip(color) {
        *channel = ((*channel as u32 * (255 - a) + target as u32 * a) / 255) as u8;
    }
}
