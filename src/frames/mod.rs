mod image_formats;

pub use self::image_formats::FrameFormat;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::ImageError;
use rayon::prelude::*;

use crate::sheet::Frame;

#[derive(thiserror::Error, Debug)]
pub enum FrameError {
  #[error("could not read {}: {source}", .path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("could not decode {name}: {source}")]
  Decode {
    name: String,
    #[source]
    source: ImageError,
  },

  #[error("{0} is not a PNG")]
  UnsupportedFormat(String),
}

/// Decodes one PNG and converts it to RGBA8.
pub fn decode_frame(name: &str, bytes: &[u8]) -> Result<Frame, FrameError> {
  let format = FrameFormat::from_file_name(name)
    .ok_or_else(|| FrameError::UnsupportedFormat(String::from(name)))?;
  let image = image::load_from_memory_with_format(bytes, format.image_format())
    .map_err(|source| FrameError::Decode {
      name: String::from(name),
      source,
    })?;
  Ok(Frame::new(name, image.to_rgba8()))
}

pub fn read_frame(path: &Path) -> Result<Frame, FrameError> {
  read_named_frame(&display_name(path), path)
}

/// Reads `path` but reports the frame as `name`, e.g. an upload's client
/// side file name.
pub fn read_named_frame(name: &str, path: &Path) -> Result<Frame, FrameError> {
  let bytes = fs::read(path).map_err(|source| FrameError::Io {
    path: path.to_path_buf(),
    source,
  })?;
  decode_frame(name, &bytes)
}

/// Decodes `paths` in parallel. The result keeps the order of `paths`.
pub fn load_frames(paths: Vec<PathBuf>) -> Result<Vec<Frame>, FrameError> {
  paths
    .into_par_iter()
    .map(|path| read_frame(&path))
    .collect()
}

pub fn load_named_frames(
  entries: Vec<(String, PathBuf)>,
) -> Result<Vec<Frame>, FrameError> {
  entries
    .into_par_iter()
    .map(|(name, path)| read_named_frame(&name, &path))
    .collect()
}

/// Every PNG file directly inside `dir`, sorted by file name.
pub fn list_frame_files(dir: &Path) -> Result<Vec<PathBuf>, FrameError> {
  let io_err = |source| FrameError::Io {
    path: dir.to_path_buf(),
    source,
  };

  let mut files = Vec::new();
  for entry in fs::read_dir(dir).map_err(io_err)? {
    let entry = entry.map_err(io_err)?;
    if !entry.file_type().map_err(io_err)?.is_file() {
      continue;
    }
    let path = entry.path();
    let is_png = path
      .file_name()
      .and_then(|name| name.to_str())
      .map_or(false, |name| FrameFormat::from_file_name(name).is_some());
    if is_png {
      files.push(path);
    }
  }
  files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
  Ok(files)
}

fn display_name(path: &Path) -> String {
  path
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Cursor;
  use image::{Rgba, RgbaImage};

  fn png_bytes(image: &RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image
      .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
      .unwrap();
    buf
  }

  fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
      "gridsheet-frames-{}-{}",
      tag,
      rand::random::<u64>(),
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
  }

  #[test]
  fn decodes_png_to_rgba() {
    let mut image = RgbaImage::from_pixel(2, 3, Rgba([1, 2, 3, 4]));
    image.put_pixel(1, 2, Rgba([200, 100, 50, 255]));

    let frame = decode_frame("a.png", &png_bytes(&image)).unwrap();
    assert_eq!(frame.name, "a.png");
    assert_eq!(frame.image, image);
  }

  #[test]
  fn rgb_png_gains_opaque_alpha() {
    let rgb = image::RgbImage::from_pixel(1, 1, image::Rgb([9, 8, 7]));
    let mut buf = Vec::new();
    rgb
      .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
      .unwrap();

    let frame = decode_frame("rgb.png", &buf).unwrap();
    assert_eq!(*frame.image.get_pixel(0, 0), Rgba([9, 8, 7, 255]));
  }

  #[test]
  fn garbage_is_a_decode_error() {
    let err = decode_frame("broken.png", b"not a png").unwrap_err();
    assert!(matches!(err, FrameError::Decode { ref name, .. } if name == "broken.png"));
  }

  #[test]
  fn non_png_name_is_rejected() {
    let err = decode_frame("a.gif", &[]).unwrap_err();
    assert!(matches!(err, FrameError::UnsupportedFormat(_)));
  }

  #[test]
  fn lists_only_png_files_in_name_order() {
    let dir = scratch_dir("list");
    let image = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
    for name in ["b.png", "a.png", "c.png"] {
      fs::write(dir.join(name), png_bytes(&image)).unwrap();
    }
    fs::write(dir.join("notes.txt"), b"skip").unwrap();
    fs::create_dir_all(dir.join("nested.png")).unwrap();

    let files = list_frame_files(&dir).unwrap();
    let names: Vec<_> = files
      .iter()
      .map(|p| p.file_name().unwrap().to_str().unwrap().to_owned())
      .collect();
    assert_eq!(names, ["a.png", "b.png", "c.png"]);

    fs::remove_dir_all(&dir).unwrap();
  }

  #[test]
  fn load_keeps_input_order() {
    let dir = scratch_dir("load");
    let mut paths = Vec::new();
    for i in 0..16u8 {
      let path = dir.join(format!("f{:02}.png", i));
      let image = RgbaImage::from_pixel(2, 2, Rgba([i, 0, 0, 255]));
      fs::write(&path, png_bytes(&image)).unwrap();
      paths.push(path);
    }

    let frames = load_frames(paths).unwrap();
    for (i, frame) in frames.iter().enumerate() {
      assert_eq!(frame.name, format!("f{:02}.png", i));
      assert_eq!(*frame.image.get_pixel(0, 0), Rgba([i as u8, 0, 0, 255]));
    }

    fs::remove_dir_all(&dir).unwrap();
  }

  #[test]
  fn named_frames_report_their_given_name() {
    let dir = scratch_dir("named");
    let path = dir.join("frame_0000.png");
    fs::write(&path, png_bytes(&RgbaImage::new(1, 1))).unwrap();

    let frames = load_named_frames(vec![(String::from("hero_walk.png"), path)]).unwrap();
    assert_eq!(frames[0].name, "hero_walk.png");

    fs::remove_dir_all(&dir).unwrap();
  }

  #[test]
  fn missing_file_is_an_io_error() {
    let err = read_frame(Path::new("/definitely/not/here.png")).unwrap_err();
    assert!(matches!(err, FrameError::Io { .. }));
  }
}
