//! # Logo Decoding
//!
//! The form hands the logo over as a `data:image/...;base64,` URL. JPEG
//! logos are embedded as-is (DCTDecode); PNG logos are decoded to RGB with
//! a separate alpha channel for the PDF soft mask.

use std::io::Cursor;

use base64::Engine;

use crate::error::FolioError;
use crate::model::Logo;

/// A decoded logo, ready for embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Raw JPEG bytes.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// RGB pixels plus alpha when any pixel is not fully opaque.
    Decoded { rgb: Vec<u8>, alpha: Option<Vec<u8>> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

impl JpegColorSpace {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            JpegColorSpace::DeviceRGB => "DeviceRGB",
            JpegColorSpace::DeviceGray => "DeviceGray",
        }
    }
}

/// Decode the invoice logo. `Ok(None)` when no logo is set.
pub fn load_logo(logo: &Logo) -> Result<Option<LoadedImage>, FolioError> {
    match logo.data_url.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(src) => load_image(src).map(Some),
    }
}

/// Decode a data URL or a bare base64 string.
pub fn load_image(src: &str) -> Result<LoadedImage, FolioError> {
    let raw = read_source_bytes(src)?;
    decode_image_bytes(&raw)
}

fn read_source_bytes(src: &str) -> Result<Vec<u8>, FolioError> {
    let payload = if let Some(rest) = src.strip_prefix("data:") {
        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| FolioError::Image("data URL is missing its comma".to_string()))?;
        if !header.starts_with("image/") {
            return Err(FolioError::Image(format!("data URL is not an image: {header}")));
        }
        if !header.ends_with(";base64") {
            return Err(FolioError::Image("only base64 data URLs are supported".to_string()));
        }
        data
    } else {
        src
    };

    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| FolioError::Image(format!("base64 decode error: {e}")))
}

fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage, FolioError> {
    if data.len() < 4 {
        return Err(FolioError::Image("image data too short".to_string()));
    }

    if is_jpeg(data) {
        decode_jpeg(data)
    } else if is_png(data) {
        decode_png(data)
    } else {
        Err(FolioError::Image("unsupported image format (expected JPEG or PNG)".to_string()))
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.starts_with(&[0xFF, 0xD8])
}

fn is_png(data: &[u8]) -> bool {
    data.starts_with(&[0x89, b'P', b'N', b'G'])
}

fn decode_jpeg(data: &[u8]) -> Result<LoadedImage, FolioError> {
    let (width, height) = image::io::Reader::with_format(Cursor::new(data), image::ImageFormat::Jpeg)
        .into_dimensions()
        .map_err(|e| FolioError::Image(format!("failed to read JPEG dimensions: {e}")))?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space: jpeg_color_space(data),
        },
        width_px: width,
        height_px: height,
    })
}

/// Read the component count from the first SOF segment.
fn jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut i = 2;
    while i + 3 < data.len() && data[i] == 0xFF {
        let marker = data[i + 1];
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof {
            return match data.get(i + 9) {
                Some(1) => JpegColorSpace::DeviceGray,
                _ => JpegColorSpace::DeviceRGB,
            };
        }
        let segment_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        i += 2 + segment_len;
    }
    JpegColorSpace::DeviceRGB
}

fn decode_png(data: &[u8]) -> Result<LoadedImage, FolioError> {
    let img = image::load_from_memory_with_format(data, image::ImageFormat::Png)
        .map_err(|e| FolioError::Image(format!("failed to decode PNG: {e}")))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let pixel_count = width as usize * height as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }
    let opaque = alpha.iter().all(|&a| a == 255);

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: (!opaque).then_some(alpha),
        },
        width_px: width,
        height_px: height,
    })
}
