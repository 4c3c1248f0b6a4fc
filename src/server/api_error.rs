use std::fmt;

use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use rocket::serde::json::Json;
use serde::Serialize;

use crate::frames::FrameError;
use crate::sheet::ComposeError;
use crate::storage::DownloadError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
  pub detail: String,
}

/// Failure surfaced to an HTTP client as `{"detail": ...}`.
#[derive(Debug)]
pub struct ApiError {
  status: Status,
  detail: String,
}

impl ApiError {
  pub fn new(status: Status, detail: impl Into<String>) -> ApiError {
    ApiError {
      status,
      detail: detail.into(),
    }
  }

  pub fn bad_request(detail: impl Into<String>) -> ApiError {
    ApiError::new(Status::BadRequest, detail)
  }

  pub fn internal(err: impl fmt::Display) -> ApiError {
    ApiError::new(
      Status::InternalServerError,
      format!("Error generating spritesheet: {}", err),
    )
  }
}

impl From<ComposeError> for ApiError {
  fn from(err: ComposeError) -> ApiError {
    ApiError::bad_request(err.to_string())
  }
}

impl From<FrameError> for ApiError {
  fn from(err: FrameError) -> ApiError {
    match err {
      FrameError::Io { .. } => ApiError::internal(err),
      FrameError::Decode { .. } | FrameError::UnsupportedFormat(_) => {
        ApiError::bad_request(err.to_string())
      },
    }
  }
}

impl From<DownloadError> for ApiError {
  fn from(err: DownloadError) -> ApiError {
    let status = match err {
      DownloadError::NotFound => Status::NotFound,
      DownloadError::Forbidden => Status::Forbidden,
    };
    ApiError::new(status, err.to_string())
  }
}

impl<'r> Responder<'r, 'static> for ApiError {
  fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
    if self.status.class().is_server_error() {
      tracing::error!(uri = %req.uri(), status = self.status.code, "{}", self.detail);
    } else {
      tracing::warn!(uri = %req.uri(), status = self.status.code, "{}", self.detail);
    }

    Response::build_from(Json(ErrorBody { detail: self.detail }).respond_to(req)?)
      .status(self.status)
      .ok()
  }
}
