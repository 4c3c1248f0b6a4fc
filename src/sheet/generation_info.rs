use serde::Serialize;

use super::layout::{Dimensions, GridGeometry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridSize {
  pub cols: u32,
  pub rows: u32,
}

/// What a compose call produced, reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationResult {
  pub frames: usize,
  pub frame_size: Dimensions,
  #[serde(rename = "spritesheet_size")]
  pub sheet_size: Dimensions,
  pub grid: GridSize,
  pub padding: u32,
}

impl GenerationResult {
  pub fn new(frames: usize, geometry: &GridGeometry) -> GenerationResult {
    GenerationResult {
      frames,
      frame_size: geometry.frame,
      sheet_size: geometry.sheet,
      grid: GridSize {
        cols: geometry.columns,
        rows: geometry.rows,
      },
      padding: geometry.padding,
    }
  }
}
