//! Response body parsing.
//!
//! Parsing never fails: a body that claims JSON but does not parse is kept as
//! text, and an empty body is reported as absent.

use reqwest::header::{HeaderMap, CONTENT_TYPE};

use crate::outcome::ResponseBody;

/// Parse a response body according to its declared content type.
pub fn parse_body(headers: &HeaderMap, body: &[u8]) -> Option<ResponseBody> {
    if body.is_empty() {
        return None;
    }

    if declares_json(headers) {
        match serde_json::from_slice(body) {
            Ok(value) => return Some(ResponseBody::Json(value)),
            Err(e) => {
                tracing::debug!(error = %e, "Response declared JSON but did not parse, keeping text");
            }
        }
    }

    Some(ResponseBody::Text(String::from_utf8_lossy(body).into_owned()))
}

/// True for `application/json` and `+json` suffixed media types.
fn declares_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            let media_type = v.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
            media_type == "application/json" || media_type.ends_with("+json")
        })
        .unwrap_or(false)
}
