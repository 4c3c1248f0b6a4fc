use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;
use image::Rgba;

use crate::frames;
use crate::storage;
use crate::sheet::{self, GenerationResult, LayoutConfig, DEFAULT_COLUMNS, DEFAULT_PADDING};
use crate::timestamp::timestamp;

#[derive(Args, Debug)]
pub struct ComposeArgs {
  /// Folder containing PNG frame files.
  pub input_folder: PathBuf,

  /// Output filename.
  #[arg(short, long, default_value = "spritesheet.png")]
  pub output: PathBuf,

  /// Number of columns.
  #[arg(short, long, default_value_t = i64::from(DEFAULT_COLUMNS), allow_negative_numbers = true)]
  pub cols: i64,

  /// Padding between sprites in pixels.
  #[arg(short, long, default_value_t = i64::from(DEFAULT_PADDING), allow_negative_numbers = true)]
  pub padding: i64,

  /// Background red (0-255).
  #[arg(long = "bg-r", default_value_t = 0)]
  pub bg_r: u8,

  /// Background green (0-255).
  #[arg(long = "bg-g", default_value_t = 0)]
  pub bg_g: u8,

  /// Background blue (0-255).
  #[arg(long = "bg-b", default_value_t = 0)]
  pub bg_b: u8,

  /// Background alpha (0-255, 0 is transparent).
  #[arg(long = "bg-a", default_value_t = 0)]
  pub bg_a: u8,

  /// Print the sheet info as JSON instead of text.
  #[arg(long)]
  pub json: bool,
}

pub fn run(args: ComposeArgs) -> anyhow::Result<()> {
  let info = generate(&args)?;
  if args.json {
    println!("{}", serde_json::to_string_pretty(&info)?);
  } else {
    print!("{}", summary(&info));
  }
  Ok(())
}

/// Reads the frames, writes the sheet and returns what was written.
pub fn generate(args: &ComposeArgs) -> anyhow::Result<GenerationResult> {
  let dir = &args.input_folder;
  if !dir.is_dir() {
    bail!("Folder '{}' does not exist", dir.display());
  }
  let layout = LayoutConfig::from_signed(
    args.cols,
    args.padding,
    Rgba([args.bg_r, args.bg_g, args.bg_b, args.bg_a]),
  )?;

  tracing::info!("loading frames from {}", dir.display());
  let files = frames::list_frame_files(dir)?;
  if files.is_empty() {
    bail!("No PNG frames found in the folder '{}'", dir.display());
  }

  let decode_start = timestamp();
  let frames = frames::load_frames(files)?;
  tracing::debug!(seconds = timestamp() - decode_start, "decoded frames");
  tracing::info!("loaded {} frames", frames.len());

  let compose_start = timestamp();
  let (sheet, info) = sheet::compose(&frames, &layout)?;
  tracing::debug!(seconds = timestamp() - compose_start, "composed sheet");
  tracing::info!(
    "created {} sheet, {} columns x {} rows",
    info.sheet_size,
    info.grid.cols,
    info.grid.rows
  );

  if let Some(parent) = args.output.parent() {
    if !parent.as_os_str().is_empty() {
      fs::create_dir_all(parent)
        .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
  }
  storage::save_sheet(&sheet, &args.output)
    .with_context(|| format!("write png '{}'", args.output.display()))?;
  tracing::info!("wrote {}", args.output.display());

  Ok(info)
}

fn summary(info: &GenerationResult) -> String {
  format!(
    "Spritesheet Info:\n  Frames: {}\n  Frame Size: {}\n  Spritesheet Size: {}\n  Grid: {}x{}\n  Padding: {}px\n",
    info.frames,
    info.frame_size,
    info.sheet_size,
    info.grid.cols,
    info.grid.rows,
    info.padding,
  )
}
