mod compose_error;
mod generation_info;
mod layout;

pub use self::compose_error::ComposeError;
pub use self::generation_info::GenerationResult;
pub use self::layout::{
  Dimensions,
  LayoutConfig,
  DEFAULT_COLUMNS,
  DEFAULT_PADDING,
};

use self::layout::GridGeometry;

use image::{imageops, RgbaImage};

/// One decoded input image. `name` only shows up in error reports.
#[derive(Debug, Clone)]
pub struct Frame {
  pub name: String,
  pub image: RgbaImage,
}

impl Frame {
  pub fn new(name: impl Into<String>, image: RgbaImage) -> Frame {
    Frame {
      name: name.into(),
      image,
    }
  }

  pub fn dimensions(&self) -> Dimensions {
    let (width, height) = self.image.dimensions();
    Dimensions::new(width, height)
  }
}

/// Lays `frames` out left to right, top to bottom, in a grid of
/// `layout.columns` columns on a canvas filled with `layout.background`.
///
/// Frames replace the canvas pixels they cover, alpha included; nothing is
/// blended. Cells past the last frame keep the background.
///
/// Validation happens before the canvas is allocated, in this order: an
/// empty frame list, a frame whose size differs from the first one, then
/// the layout itself.
pub fn compose(
  frames: &[Frame],
  layout: &LayoutConfig,
) -> Result<(RgbaImage, GenerationResult), ComposeError> {
  let first = frames.first().ok_or(ComposeError::EmptyInput)?;
  let expected = first.dimensions();

  for (index, frame) in frames.iter().enumerate().skip(1) {
    let actual = frame.dimensions();
    if actual != expected {
      return Err(ComposeError::DimensionMismatch {
        index,
        name: frame.name.clone(),
        expected,
        actual,
      });
    }
  }

  let geometry = GridGeometry::plan(frames.len(), expected, layout)?;

  let mut sheet = RgbaImage::from_pixel(
    geometry.sheet.width,
    geometry.sheet.height,
    layout.background,
  );
  for (i, frame) in frames.iter().enumerate() {
    let (x, y) = geometry.cell_origin(i);
    imageops::replace(&mut sheet, &frame.image, i64::from(x), i64::from(y));
  }

  Ok((sheet, GenerationResult::new(frames.len(), &geometry)))
}
