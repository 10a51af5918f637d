//! Local rendering of print sheets.

use crate::task::domain::LayoutGrid;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{ImageError, Rgb, RgbImage};
use thiserror::Error;

const SHEET_BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Errors returned while rendering a sheet.
#[derive(Debug, Error)]
pub enum CompositorError {
    /// The variant image could not be decoded.
    #[error("variant image could not be decoded: {0}")]
    Decode(#[source] ImageError),

    /// The sheet could not be encoded as JPEG.
    #[error("layout sheet could not be encoded: {0}")]
    Encode(#[source] ImageError),

    /// The rendering task stopped before producing a sheet.
    #[error("layout rendering was interrupted: {0}")]
    Interrupted(#[source] tokio::task::JoinError),
}

/// Renders a sheet on the blocking thread pool.
///
/// # Errors
///
/// Returns [`CompositorError`] when rendering fails or the worker stops.
pub async fn render_layout_blocking(
    variant: Vec<u8>,
    grid: LayoutGrid,
    quality: u8,
) -> Result<Vec<u8>, CompositorError> {
    tokio::task::spawn_blocking(move || render_layout(&variant, &grid, quality))
        .await
        .map_err(CompositorError::Interrupted)?
}

/// Tiles `variant` over a white sheet following `grid` and encodes it as
/// JPEG at `quality`.
///
/// The variant is resized to the tile size when its dimensions differ.
///
/// # Errors
///
/// Returns [`CompositorError`] when decoding or encoding fails.
pub fn render_layout(variant: &[u8], grid: &LayoutGrid, quality: u8) -> Result<Vec<u8>, CompositorError> {
    let source = image::load_from_memory(variant).map_err(CompositorError::Decode)?;
    let tile_size = grid.tile();
    let tile = if source.width() == tile_size.width && source.height() == tile_size.height {
        source.to_rgb8()
    } else {
        source
            .resize_exact(tile_size.width, tile_size.height, FilterType::Lanczos3)
            .to_rgb8()
    };

    let sheet = grid.sheet();
    let mut canvas = RgbImage::from_pixel(sheet.width, sheet.height, SHEET_BACKGROUND);
    for placement in grid.placements() {
        imageops::overlay(
            &mut canvas,
            &tile,
            i64::from(placement.x),
            i64::from(placement.y),
        );
    }

    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, quality)
        .encode_image(&canvas)
        .map_err(CompositorError::Encode)?;
    Ok(encoded)
}
