use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::{Request, Response};

/// Lets browser front-ends on any origin call the API.
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
  fn info(&self) -> Info {
    Info {
      name: "CORS headers",
      kind: Kind::Response,
    }
  }

  async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
    match req.headers().get_one("Origin") {
      Some(origin) => {
        res.set_header(Header::new("Access-Control-Allow-Origin", origin.to_string()));
        res.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
        res.set_header(Header::new("Vary", "Origin"));
      },
      None => {
        res.set_header(Header::new("Access-Control-Allow-Origin", "*"));
      },
    }
    res.set_header(Header::new("Access-Control-Allow-Methods", "GET, POST, OPTIONS"));
    res.set_header(Header::new(
      "Access-Control-Allow-Headers",
      req
        .headers()
        .get_one("Access-Control-Request-Headers")
        .unwrap_or("Content-Type")
        .to_string(),
    ));
  }
}

#[options("/<_..>")]
pub fn preflight() -> Status {
  Status::NoContent
}
