use std::fmt;

use image::Rgba;
use serde::Serialize;

use super::compose_error::ComposeError;

pub const DEFAULT_COLUMNS: u32 = 8;
pub const DEFAULT_PADDING: u32 = 2;
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Largest canvas `compose` will allocate, in bytes of RGBA8.
pub const MAX_SHEET_BYTES: u64 = 512 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
  pub width: u32,
  pub height: u32,
}

impl Dimensions {
  pub fn new(width: u32, height: u32) -> Dimensions {
    Dimensions { width, height }
  }
}

impl fmt::Display for Dimensions {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}x{}", self.width, self.height)
  }
}

/// How frames are arranged on the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutConfig {
  pub columns: u32,
  pub padding: u32,
  pub background: Rgba<u8>,
}

impl Default for LayoutConfig {
  fn default() -> LayoutConfig {
    LayoutConfig {
      columns: DEFAULT_COLUMNS,
      padding: DEFAULT_PADDING,
      background: TRANSPARENT,
    }
  }
}

impl LayoutConfig {
  /// Builds a layout from caller-supplied integers, which may be
  /// negative or larger than the sheet math allows.
  pub fn from_signed(
    columns: i64,
    padding: i64,
    background: Rgba<u8>,
  ) -> Result<LayoutConfig, ComposeError> {
    if columns < 1 {
      return Err(ComposeError::InvalidLayout(format!(
        "columns must be at least 1, got {}",
        columns,
      )));
    }
    if padding < 0 {
      return Err(ComposeError::InvalidLayout(format!(
        "padding must not be negative, got {}",
        padding,
      )));
    }
    let columns = u32::try_from(columns).map_err(|_| {
      ComposeError::InvalidLayout(format!("columns {} is too large", columns))
    })?;
    let padding = u32::try_from(padding).map_err(|_| {
      ComposeError::InvalidLayout(format!("padding {} is too large", padding))
    })?;

    Ok(LayoutConfig {
      columns,
      padding,
      background,
    })
  }
}

/// Grid derived from the frame count, the frame size and a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
  pub frame: Dimensions,
  pub columns: u32,
  pub rows: u32,
  pub padding: u32,
  pub sheet: Dimensions,
}

impl GridGeometry {
  pub fn plan(
    frame_count: usize,
    frame: Dimensions,
    layout: &LayoutConfig,
  ) -> Result<GridGeometry, ComposeError> {
    let columns = layout.columns;
    if columns == 0 {
      return Err(ComposeError::InvalidLayout(
        String::from("columns must be at least 1, got 0"),
      ));
    }

    let count = u32::try_from(frame_count)
      .map_err(|_| too_large(frame_count, frame, layout))?;
    let rows = count.div_ceil(columns);

    let width = span(columns, frame.width, layout.padding)
      .ok_or_else(|| too_large(frame_count, frame, layout))?;
    let height = span(rows, frame.height, layout.padding)
      .ok_or_else(|| too_large(frame_count, frame, layout))?;

    let bytes = u64::from(width) * u64::from(height) * 4;
    if bytes > MAX_SHEET_BYTES {
      return Err(ComposeError::InvalidLayout(format!(
        "a {}x{} sheet needs {} bytes, more than the {} byte limit",
        width,
        height,
        bytes,
        MAX_SHEET_BYTES,
      )));
    }

    Ok(GridGeometry {
      frame,
      columns,
      rows,
      padding: layout.padding,
      sheet: Dimensions::new(width, height),
    })
  }

  /// Top-left pixel of the cell holding frame `index`.
  pub fn cell_origin(&self, index: usize) -> (u32, u32) {
    let index = index as u64;
    let columns = u64::from(self.columns);
    let col = index % columns;
    let row = index / columns;
    let x = col * (u64::from(self.frame.width) + u64::from(self.padding));
    let y = row * (u64::from(self.frame.height) + u64::from(self.padding));
    (x as u32, y as u32)
  }
}

fn span(cells: u32, cell: u32, padding: u32) -> Option<u32> {
  if cells == 0 {
    return Some(0);
  }
  cells
    .checked_mul(cell)?
    .checked_add((cells - 1).checked_mul(padding)?)
}

fn too_large(
  frame_count: usize,
  frame: Dimensions,
  layout: &LayoutConfig,
) -> ComposeError {
  ComposeError::InvalidLayout(format!(
    "{} frames of {} in {} columns with {}px padding do not fit in one image",
    frame_count,
    frame,
    layout.columns,
    layout.padding,
  ))
}
