use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use teeshot_contracts::{DataUrl, ImageSource};

use crate::error::RenderError;

pub const COLLAGE_IMAGE_COUNT: usize = 5;
pub const COLLAGE_LARGE_SIZE: u32 = 1024;
pub const COLLAGE_PADDING: u32 = 20;
pub const COLLAGE_BACKGROUND: Rgb<u8> = Rgb([0x11, 0x18, 0x27]);
pub const COLLAGE_JPEG_QUALITY: u8 = 95;

/// Largest surface we agree to allocate, in pixels.
pub(crate) const MAX_CANVAS_PIXELS: u64 = 268_435_456;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub x: u32,
    pub y: u32,
    pub size: u32,
}

/// One large square on the left, a 2×2 grid of half-size squares on the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollageLayout {
    pub width: u32,
    pub height: u32,
    pub slots: [Slot; COLLAGE_IMAGE_COUNT],
}

impl CollageLayout {
    /// Fails with [`RenderError::Surface`] when the canvas would not fit in `u32`.
    pub fn compute(large: u32, small: u32, padding: u32) -> Result<Self, RenderError> {
        let total_width = u64::from(large) + u64::from(small) * 2 + u64::from(padding) * 3;
        let total_height = u64::from(large) + u64::from(padding) * 2;
        let (Ok(width), Ok(height)) = (u32::try_from(total_width), u32::try_from(total_height))
        else {
            return Err(RenderError::Surface {
                width: u32::try_from(total_width).unwrap_or(u32::MAX),
                height: u32::try_from(total_height).unwrap_or(u32::MAX),
            });
        };

        // Every offset below is bounded by `width`.
        let grid_x = large + padding * 2;
        let second_col = grid_x + small + padding;
        let second_row = padding + small + padding;
        Ok(Self {
            width,
            height,
            slots: [
                Slot {
                    x: padding,
                    y: padding,
                    size: large,
                },
                Slot {
                    x: grid_x,
                    y: padding,
                    size: small,
                },
                Slot {
                    x: second_col,
                    y: padding,
                    size: small,
                },
                Slot {
                    x: grid_x,
                    y: second_row,
                    size: small,
                },
                Slot {
                    x: second_col,
                    y: second_row,
                    size: small,
                },
            ],
        })
    }

    pub fn standard() -> Result<Self, RenderError> {
        Self::compute(COLLAGE_LARGE_SIZE, COLLAGE_LARGE_SIZE / 2, COLLAGE_PADDING)
    }
}

pub(crate) fn check_surface(width: u32, height: u32) -> Result<(), RenderError> {
    let area = width as u64 * height as u64;
    if area == 0 || area > MAX_CANVAS_PIXELS {
        return Err(RenderError::Surface { width, height });
    }
    Ok(())
}

pub(crate) fn acquire_canvas(width: u32, height: u32, fill: Rgb<u8>) -> Result<RgbImage, RenderError> {
    check_surface(width, height)?;
    Ok(RgbImage::from_pixel(width, height, fill))
}

pub(crate) fn decode_source(index: usize, source: &ImageSource) -> Result<DynamicImage, RenderError> {
    let decode_error = |detail: String| RenderError::Decode {
        index,
        label: source.describe(),
        detail,
    };
    let bytes = source.bytes().map_err(|err| decode_error(format!("{err:#}")))?;
    image::load_from_memory(&bytes).map_err(|err| decode_error(err.to_string()))
}

/// Draws the first five images into `layout`; extras are ignored.
pub fn render_collage(layout: &CollageLayout, images: &[DynamicImage]) -> Result<RgbImage, RenderError> {
    if images.len() < COLLAGE_IMAGE_COUNT {
        return Err(RenderError::NotEnoughImages { got: images.len() });
    }
    let mut canvas = acquire_canvas(layout.width, layout.height, COLLAGE_BACKGROUND)?;
    for (image, slot) in images.iter().zip(layout.slots.iter()) {
        let scaled = image
            .resize_exact(slot.size, slot.size, FilterType::Lanczos3)
            .to_rgb8();
        imageops::overlay(&mut canvas, &scaled, slot.x as i64, slot.y as i64);
    }
    Ok(canvas)
}

/// Builds the 1-large + 4-small collage and returns it as a JPEG data URL.
pub fn compose_collage(sources: &[ImageSource]) -> Result<DataUrl, RenderError> {
    if sources.len() < COLLAGE_IMAGE_COUNT {
        return Err(RenderError::NotEnoughImages { got: sources.len() });
    }
    let layout = CollageLayout::standard()?;
    check_surface(layout.width, layout.height)?;

    let images = sources
        .iter()
        .take(COLLAGE_IMAGE_COUNT)
        .enumerate()
        .map(|(index, source)| decode_source(index, source))
        .collect::<Result<Vec<DynamicImage>, RenderError>>()?;

    let canvas = render_collage(&layout, &images)?;
    let bytes = encode_jpeg(canvas, COLLAGE_JPEG_QUALITY)?;
    Ok(DataUrl::from_bytes("image/jpeg", &bytes))
}

pub(crate) fn encode_jpeg(canvas: RgbImage, quality: u8) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode_image(&DynamicImage::ImageRgb8(canvas))
        .map_err(|err| RenderError::Encode {
            format: "jpeg",
            detail: err.to_string(),
        })?;
    Ok(bytes)
}
