use image::ImageFormat;

/// Upload formats accepted as frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
  PNG,
}

impl FrameFormat {
  pub fn from_file_name(name: &str) -> Option<FrameFormat> {
    let extension = name.rsplit_once('.')?.1;
    match extension.to_ascii_lowercase().as_ref() {
      "png" => Some(FrameFormat::PNG),
      _ => None,
    }
  }

  pub fn image_format(self) -> ImageFormat {
    match self {
      FrameFormat::PNG => ImageFormat::Png,
    }
  }
}
