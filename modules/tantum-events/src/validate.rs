use bytes::Bytes;
use http::HeaderMap;
use tracing::error;

use crate::{Event, EventMetadata, ValidationError};

pub const USER_AGENT_HEADER: &str = "X-Tantum-Useragent";
pub const AUTHORIZATION_HEADER: &str = "X-Tantum-Authorization";
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

/// Build an [`Event`] from request headers and the raw body.
///
/// Every required header is checked so each missing one gets logged; the
/// error names the first missing header. Only the first value of a
/// repeated header is used. An empty value counts as missing.
pub fn validate_headers(headers: &HeaderMap, body: Bytes) -> Result<Event, ValidationError> {
    let user_agent = first_value(headers, USER_AGENT_HEADER);
    let authorization = first_value(headers, AUTHORIZATION_HEADER);
    let content_type = first_value(headers, CONTENT_TYPE_HEADER);

    let mut first_missing = None;
    for (name, value) in [
        (USER_AGENT_HEADER, &user_agent),
        (AUTHORIZATION_HEADER, &authorization),
        (CONTENT_TYPE_HEADER, &content_type),
    ] {
        if value.is_none() {
            error!(header = name, "Missing required headers");
            first_missing.get_or_insert(name);
        }
    }

    match (user_agent, authorization, content_type) {
        (Some(user_agent), Some(authorization), Some(content_type)) => Ok(Event::new(
            EventMetadata {
                user_agent,
                authorization,
                content_type,
            },
            body,
        )),
        _ => Err(ValidationError::MissingHeader(
            first_missing.unwrap_or(USER_AGENT_HEADER),
        )),
    }
}

fn first_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(name)
        .iter()
        .next()
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .filter(|v| !v.is_empty())
}
