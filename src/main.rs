#[macro_use] extern crate rocket;

mod cli;
mod frames;
mod logging;
mod server;
mod sheet;
mod storage;
mod timestamp;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "gridsheet", version, about = "Lay out same-size PNG frames as a sprite sheet")]
struct Cli {
  #[command(subcommand)]
  cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Build a sprite sheet from a folder of PNG frames.
  Compose(cli::ComposeArgs),
  /// Run the upload and download HTTP service.
  Serve(server::ServeArgs),
}

fn main() -> anyhow::Result<()> {
  logging::init();
  let cli = Cli::parse();
  match cli.cmd {
    Command::Compose(args) => cli::run(args),
    Command::Serve(args) => server::serve(args),
  }
}
