use std::path::PathBuf;

use rocket::data::{Limits, ToByteUnit};
use rocket::figment::providers::{Env, Format, Serialized, Toml};
use rocket::figment::{Figment, Profile};
use serde::{Deserialize, Serialize};

/// App settings read from the same sources as rocket's own
/// (`Rocket.toml`, `ROCKET_*`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
  pub storage_root: PathBuf,
}

impl Default for AppConfig {
  fn default() -> AppConfig {
    AppConfig {
      storage_root: PathBuf::from("storage"),
    }
  }
}

fn default_limits() -> Limits {
  Limits::default()
    .limit("data-form", 64.mebibytes())
    .limit("file", 16.mebibytes())
}

/// rocket's standard provider chain with this service's defaults
/// underneath it.
pub fn figment() -> Figment {
  Figment::from(rocket::Config::default())
    .merge(Serialized::defaults(AppConfig::default()))
    .merge(Serialized::default("limits", default_limits()))
    .merge(Toml::file(Env::var_or("ROCKET_CONFIG", "Rocket.toml")).nested())
    .merge(Env::prefixed("ROCKET_").ignore(&["PROFILE"]).global())
    .select(Profile::from_env_or("ROCKET_PROFILE", rocket::Config::DEFAULT_PROFILE))
}
