// Middleware shared by every route: access log, compression, JSON content type

use actix_web::http::header::{HeaderValue, CONTENT_TYPE};
use actix_web::middleware::{Compress, DefaultHeaders, Logger};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

pub fn setup_middleware() -> (Logger, Compress) {
    let logger = Logger::new("%r %s %b %Dms");
    let compress = Compress::default();
    (logger, compress)
}

pub fn json_content_type() -> DefaultHeaders {
    DefaultHeaders::new().add((CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE)))
}
