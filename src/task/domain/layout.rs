//! Print-sheet grid computation.
//!
//! A layout tiles copies of one variant on a 6×4 inch sheet. Tiles are
//! separated by a fixed gap and the whole grid is centered, with the leftover
//! split before the first and after the last tile. Geometry is pure integer
//! arithmetic; rendering lives in the service layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Gap between adjacent tiles, in pixels.
pub const LAYOUT_GAP_PX: u32 = 20;

/// Kind name of the 6×4 inch print sheet.
pub const SIX_INCH_LAYOUT: &str = "6inch";

const JPEG_QUALITY: u8 = 85;
const JPEG_QUALITY_SMALL_TARGET: u8 = 70;
const SMALL_TARGET_KB: u32 = 200;

/// Errors returned while fitting tiles on a sheet.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// The resolution is zero or overflows the sheet size.
    #[error("invalid layout dpi: {0}")]
    InvalidDpi(u32),

    /// A tile dimension is zero.
    #[error("invalid tile size {width}x{height}")]
    InvalidTile {
        /// Tile width.
        width: u32,
        /// Tile height.
        height: u32,
    },

    /// Not even one tile fits on the sheet.
    #[error("tile {tile_width}x{tile_height} does not fit sheet {sheet_width}x{sheet_height}")]
    TileDoesNotFit {
        /// Tile width.
        tile_width: u32,
        /// Tile height.
        tile_height: u32,
        /// Sheet width.
        sheet_width: u32,
        /// Sheet height.
        sheet_height: u32,
    },
}

/// Pixel size of the print sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSize {
    /// Sheet width in pixels.
    pub width: u32,
    /// Sheet height in pixels.
    pub height: u32,
}

impl SheetSize {
    /// Returns the landscape 6×4 inch sheet at `dpi`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidDpi`] when `dpi` is zero or too large.
    pub const fn six_by_four(dpi: u32) -> Result<Self, LayoutError> {
        if dpi == 0 {
            return Err(LayoutError::InvalidDpi(dpi));
        }
        match (dpi.checked_mul(6), dpi.checked_mul(4)) {
            (Some(width), Some(height)) => Ok(Self { width, height }),
            _ => Err(LayoutError::InvalidDpi(dpi)),
        }
    }
}

/// Pixel size of one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSize {
    /// Tile width in pixels.
    pub width: u32,
    /// Tile height in pixels.
    pub height: u32,
}

/// Top-left corner of a tile on the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Horizontal offset in pixels.
    pub x: u32,
    /// Vertical offset in pixels.
    pub y: u32,
}

/// Tiles fitted on a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutGrid {
    sheet: SheetSize,
    tile: TileSize,
    gap: u32,
    columns: u32,
    rows: u32,
    origin: Placement,
}

impl LayoutGrid {
    /// Fits as many tiles as possible on `sheet`.
    ///
    /// The count per axis is the largest `n` with `n * (tile + gap) - gap`
    /// not exceeding the sheet.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidTile`] for zero tile dimensions and
    /// [`LayoutError::TileDoesNotFit`] when no tile fits on either axis.
    pub fn fit(sheet: SheetSize, tile: TileSize, gap: u32) -> Result<Self, LayoutError> {
        if tile.width == 0 || tile.height == 0 {
            return Err(LayoutError::InvalidTile {
                width: tile.width,
                height: tile.height,
            });
        }
        let does_not_fit = LayoutError::TileDoesNotFit {
            tile_width: tile.width,
            tile_height: tile.height,
            sheet_width: sheet.width,
            sheet_height: sheet.height,
        };
        let (columns, origin_x) = fit_axis(sheet.width, tile.width, gap).ok_or(does_not_fit)?;
        let (rows, origin_y) = fit_axis(sheet.height, tile.height, gap).ok_or(does_not_fit)?;
        Ok(Self {
            sheet,
            tile,
            gap,
            columns,
            rows,
            origin: Placement {
                x: origin_x,
                y: origin_y,
            },
        })
    }

    /// Returns the sheet size.
    #[must_use]
    pub const fn sheet(&self) -> SheetSize {
        self.sheet
    }

    /// Returns the tile size.
    #[must_use]
    pub const fn tile(&self) -> TileSize {
        self.tile
    }

    /// Returns the number of columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Returns the number of rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Returns the top-left corner of the first tile.
    #[must_use]
    pub const fn origin(&self) -> Placement {
        self.origin
    }

    /// Returns the total number of tiles.
    #[must_use]
    pub const fn tile_count(&self) -> u32 {
        self.columns.saturating_mul(self.rows)
    }

    /// Returns the top-left corner of every tile, row by row.
    #[must_use]
    pub fn placements(&self) -> Vec<Placement> {
        let step_x = self.tile.width.saturating_add(self.gap);
        let step_y = self.tile.height.saturating_add(self.gap);
        (0..self.rows)
            .flat_map(|row| {
                (0..self.columns).map(move |column| Placement {
                    x: self.origin.x.saturating_add(column.saturating_mul(step_x)),
                    y: self.origin.y.saturating_add(row.saturating_mul(step_y)),
                })
            })
            .collect()
    }
}

fn fit_axis(sheet: u32, tile: u32, gap: u32) -> Option<(u32, u32)> {
    let step = tile.checked_add(gap)?;
    let count = sheet.checked_add(gap)?.checked_div(step)?;
    if count == 0 {
        return None;
    }
    let used = count.checked_mul(step)?.checked_sub(gap)?;
    let start = sheet.checked_sub(used)?.div_euclid(2);
    Some((count, start))
}

/// Returns the JPEG quality for a sheet with an optional size target.
///
/// A positive target under 200 KB lowers the quality; the value is a
/// heuristic and the output is not guaranteed to meet the target.
#[must_use]
pub const fn jpeg_quality(target_kb: u32) -> u8 {
    if target_kb > 0 && target_kb < SMALL_TARGET_KB {
        JPEG_QUALITY_SMALL_TARGET
    } else {
        JPEG_QUALITY
    }
}
