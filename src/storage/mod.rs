use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::{ImageError, ImageFormat, RgbaImage};

const UPLOADS_DIR: &str = "uploads";
const OUTPUTS_DIR: &str = "outputs";
const OUTPUT_PREFIX: &str = "spritesheet_";

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadError {
  #[error("File not found")]
  NotFound,
  #[error("Invalid file")]
  Forbidden,
}

/// Everything the upload service writes lives under one root:
/// `uploads/<session>/` for the frames of a request in flight and
/// `outputs/` for finished sheets.
#[derive(Debug, Clone)]
pub struct Storage {
  uploads: PathBuf,
  outputs: PathBuf,
}

impl Storage {
  pub fn open(root: &Path) -> io::Result<Storage> {
    let uploads = root.join(UPLOADS_DIR);
    let outputs = root.join(OUTPUTS_DIR);
    fs::create_dir_all(&uploads)?;
    fs::create_dir_all(&outputs)?;
    Ok(Storage { uploads, outputs })
  }

  /// Creates a fresh upload directory. It is removed when the returned
  /// guard is dropped.
  pub fn session(&self) -> io::Result<SessionDir> {
    let id = session_id();
    let path = self.uploads.join(&id);
    fs::create_dir(&path)?;
    tracing::debug!(session = %id, "created session directory");
    Ok(SessionDir { id, path })
  }

  pub fn output_path(&self, filename: &str) -> PathBuf {
    self.outputs.join(filename)
  }

  /// Maps a client-supplied file name to a finished sheet on disk.
  pub fn resolve_download(&self, filename: &str) -> Result<PathBuf, DownloadError> {
    if filename.is_empty()
      || filename.contains('/')
      || filename.contains('\\')
      || filename.contains("..")
    {
      return Err(DownloadError::Forbidden);
    }

    let path = self.outputs.join(filename);
    if !path.is_file() {
      return Err(DownloadError::NotFound);
    }
    if !filename.starts_with(OUTPUT_PREFIX) {
      return Err(DownloadError::Forbidden);
    }
    Ok(path)
  }
}

pub fn output_name(session_id: &str) -> String {
  format!("{}{}.png", OUTPUT_PREFIX, session_id)
}

/// Writes `sheet` as a PNG at `path`. The bytes go to a hidden sibling
/// first and are renamed into place, so `path` never holds a partial file.
pub fn save_sheet(sheet: &RgbaImage, path: &Path) -> Result<(), ImageError> {
  let partial = partial_path(path);
  let written = sheet
    .save_with_format(&partial, ImageFormat::Png)
    .and_then(|()| fs::rename(&partial, path).map_err(ImageError::IoError));
  if written.is_err() {
    let _ = fs::remove_file(&partial);
  }
  written
}

fn partial_path(path: &Path) -> PathBuf {
  let name = path
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_default();
  path.with_file_name(format!(".{}.partial", name))
}

/// Scratch directory for one request.
#[derive(Debug)]
pub struct SessionDir {
  id: String,
  path: PathBuf,
}

impl SessionDir {
  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn frame_path(&self, index: usize) -> PathBuf {
    self.path.join(format!("frame_{:04}.png", index))
  }
}

impl Drop for SessionDir {
  fn drop(&mut self) {
    match fs::remove_dir_all(&self.path) {
      Ok(()) => tracing::debug!(session = %self.id, "removed session directory"),
      Err(err) if err.kind() == io::ErrorKind::NotFound => {},
      Err(err) => tracing::warn!(
        session = %self.id,
        error = %err,
        "could not remove session directory"
      ),
    }
  }
}

fn session_id() -> String {
  format!("{:032x}", rand::random::<u128>())
}
