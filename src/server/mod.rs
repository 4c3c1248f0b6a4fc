mod api_error;
mod config;
mod cors;

pub use self::config::{figment, AppConfig};

use std::path::PathBuf;

use anyhow::anyhow;
use clap::Args;
use image::Rgba;
use rocket::fairing::AdHoc;
use rocket::figment::Figment;
use rocket::form::{self, Form};
use rocket::fs::{NamedFile, TempFile};
use rocket::http::{Header, Status};
use rocket::serde::json::{json, Json, Value};
use rocket::tokio::task;
use rocket::{Build, Request, Rocket, State};
use serde::Serialize;

use self::api_error::{ApiError, ErrorBody};
use crate::frames::{self, FrameFormat};
use crate::sheet::{self, GenerationResult, LayoutConfig, DEFAULT_COLUMNS, DEFAULT_PADDING};
use crate::storage::{self, SessionDir, Storage};
use crate::timestamp::{iso_now, timestamp};

#[derive(Args, Debug)]
pub struct ServeArgs {
  /// Directory for uploads and generated sheets. Overrides `storage_root`
  /// from Rocket.toml.
  #[arg(long)]
  pub storage_root: Option<PathBuf>,
}

#[derive(FromForm)]
pub struct GenerateForm<'r> {
  files: Vec<TempFile<'r>>,
  #[field(default = i64::from(DEFAULT_COLUMNS))]
  cols: i64,
  #[field(default = i64::from(DEFAULT_PADDING))]
  padding: i64,
  #[field(default = 0)]
  bg_color_r: u8,
  #[field(default = 0)]
  bg_color_g: u8,
  #[field(default = 0)]
  bg_color_b: u8,
  #[field(default = 0)]
  bg_color_a: u8,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
  success: bool,
  message: &'static str,
  filename: String,
  download_url: String,
  info: GenerationResult,
}

#[derive(Responder)]
#[response(content_type = "image/png")]
pub struct SheetDownload {
  file: NamedFile,
  disposition: Header<'static>,
}

#[get("/")]
fn index() -> Value {
  json!({
    "message": "Spritesheet Generator API",
    "version": env!("CARGO_PKG_VERSION"),
    "endpoints": {
      "/generate": "POST - Generate spritesheet from uploaded frames",
      "/download/{filename}": "GET - Download generated spritesheet",
      "/health": "GET - Health check",
    },
  })
}

#[get("/health")]
fn health() -> Value {
  json!({
    "status": "healthy",
    "timestamp": iso_now(),
  })
}

#[post("/generate", data = "<form>")]
async fn generate<'r>(
  form: Result<Form<GenerateForm<'r>>, form::Errors<'r>>,
  storage: &State<Storage>,
) -> Result<Json<GenerateResponse>, ApiError> {
  let mut form = form
    .map_err(|errors| ApiError::bad_request(format!("Invalid form data: {}", errors)))?
    .into_inner();

  let layout = LayoutConfig::from_signed(
    form.cols,
    form.padding,
    Rgba([form.bg_color_r, form.bg_color_g, form.bg_color_b, form.bg_color_a]),
  )?;

  if form.files.is_empty() {
    return Err(ApiError::bad_request("No files uploaded"));
  }
  let names: Vec<String> = form
    .files
    .iter()
    .enumerate()
    .map(|(index, file)| upload_name(index, file))
    .collect();
  if let Some(name) = names.iter().find(|name| FrameFormat::from_file_name(name).is_none()) {
    return Err(ApiError::bad_request(format!("File {} is not a PNG", name)));
  }

  let session = storage.session().map_err(ApiError::internal)?;
  let mut entries = Vec::with_capacity(names.len());
  for (index, (file, name)) in form.files.iter_mut().zip(names).enumerate() {
    let path = session.frame_path(index);
    file.move_copy_to(&path).await.map_err(ApiError::internal)?;
    entries.push((name, path));
  }

  let filename = storage::output_name(session.id());
  let output = storage.output_path(&filename);
  let info = task::spawn_blocking(move || render(session, entries, &layout, output))
    .await
    .map_err(ApiError::internal)??;

  tracing::info!(
    file = %filename,
    frames = info.frames,
    sheet = %info.sheet_size,
    "generated spritesheet"
  );
  Ok(Json(GenerateResponse {
    success: true,
    message: "Spritesheet created successfully",
    download_url: format!("/download/{}", filename),
    filename,
    info,
  }))
}

#[get("/download/<filename>")]
async fn download(
  filename: &str,
  storage: &State<Storage>,
) -> Result<SheetDownload, ApiError> {
  let path = storage.resolve_download(filename)?;
  let file = NamedFile::open(&path)
    .await
    .map_err(|_| ApiError::from(storage::DownloadError::NotFound))?;
  Ok(SheetDownload {
    file,
    disposition: Header::new(
      "Content-Disposition",
      format!("attachment; filename=\"{}\"", filename),
    ),
  })
}

#[catch(default)]
fn default_catcher(status: Status, _req: &Request<'_>) -> (Status, Json<ErrorBody>) {
  let detail = status.reason().unwrap_or("Unknown error").to_string();
  (status, Json(ErrorBody { detail }))
}

/// Decodes the session's frames, composes them and writes the sheet. The
/// session directory goes away when this returns, whatever the outcome.
fn render(
  session: SessionDir,
  entries: Vec<(String, PathBuf)>,
  layout: &LayoutConfig,
  output: PathBuf,
) -> Result<GenerationResult, ApiError> {
  let decode_start = timestamp();
  let frames = frames::load_named_frames(entries)?;
  tracing::debug!(
    session = session.id(),
    dir = %session.path().display(),
    seconds = timestamp() - decode_start,
    "decoded frames"
  );

  let compose_start = timestamp();
  let (sheet, info) = sheet::compose(&frames, layout)?;
  tracing::debug!(
    session = session.id(),
    seconds = timestamp() - compose_start,
    "composed sheet"
  );

  storage::save_sheet(&sheet, &output).map_err(ApiError::internal)?;
  Ok(info)
}

fn upload_name(index: usize, file: &TempFile<'_>) -> String {
  let raw = file
    .raw_name()
    .map(|name| name.dangerous_unsafe_unsanitized_raw().as_str().to_string())
    .filter(|name| !name.is_empty());
  match raw {
    Some(name) => name,
    None if file.content_type().map_or(false, |ct| ct.is_png()) => {
      format!("upload_{:04}.png", index)
    },
    None => format!("upload {}", index),
  }
}

pub fn build(figment: Figment) -> Rocket<Build> {
  rocket::custom(figment)
    .attach(AdHoc::try_on_ignite("Storage", |rocket| async move {
      let config: AppConfig = match rocket.figment().extract() {
        Ok(config) => config,
        Err(err) => {
          tracing::error!(error = %err, "invalid app configuration");
          return Err(rocket);
        },
      };
      match Storage::open(&config.storage_root) {
        Ok(storage) => {
          tracing::info!(root = %config.storage_root.display(), "storage ready");
          Ok(rocket.manage(storage))
        },
        Err(err) => {
          tracing::error!(
            root = %config.storage_root.display(),
            error = %err,
            "could not open storage root"
          );
          Err(rocket)
        },
      }
    }))
    .attach(cors::Cors)
    .mount("/", routes![index, health, generate, download, cors::preflight])
    .register("/", catchers![default_catcher])
}

pub fn serve(args: ServeArgs) -> anyhow::Result<()> {
  let mut figment = figment();
  if let Some(root) = args.storage_root {
    figment = figment.merge(("storage_root", root));
  }

  rocket::execute(build(figment).launch())
    .map(|_| ())
    .map_err(|err| anyhow!("server failed: {}", err))
}
