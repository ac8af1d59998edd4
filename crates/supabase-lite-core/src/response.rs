use reqwest::header::{HeaderMap, CONTENT_RANGE};
use serde::de::DeserializeOwned;

use crate::error::{SupabaseError, SupabaseResult};
use crate::http::RawResponse;
use crate::value::JsonValue;

/// Metadata of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMetadata {
    /// Total row count, present only when the backend sent a numeric `Content-Range` total.
    pub count: Option<u64>,
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase for `status`.
    pub status_text: String,
}

/// Decoded response: a JSON tree plus its metadata.
#[derive(Debug, Clone)]
pub struct SupabaseResponse {
    pub data: JsonValue,
    pub metadata: ResponseMetadata,
}

impl SupabaseResponse {
    pub fn count(&self) -> Option<u64> {
        self.metadata.count
    }

    pub fn status(&self) -> u16 {
        self.metadata.status
    }

    /// Split into `(data, metadata)`.
    pub fn into_parts(self) -> (JsonValue, ResponseMetadata) {
        (self.data, self.metadata)
    }

    /// Rows of an array payload. Empty for any other shape.
    pub fn rows(&self) -> &[JsonValue] {
        match &self.data {
            JsonValue::Array(items) => items,
            _ => &[],
        }
    }

    /// Get the first row, or None if there are none.
    pub fn first(&self) -> Option<&JsonValue> {
        self.rows().first()
    }

    /// Decode the payload into a fixed type.
    pub fn into_typed<T: DeserializeOwned>(self) -> SupabaseResult<T> {
        self.data.deserialize_into()
    }

    /// Consume and return exactly one row, or error.
    pub fn into_single(self) -> SupabaseResult<JsonValue> {
        match self.data {
            JsonValue::Array(mut items) => match items.len() {
                1 => Ok(items.remove(0)),
                n => Err(SupabaseError::invalid_response(format!(
                    "Expected exactly one row, but got {}",
                    n
                ))),
            },
            JsonValue::Object(_) => Ok(self.data),
            other => Err(SupabaseError::invalid_response(format!(
                "Expected a row, got {}",
                other
            ))),
        }
    }
}

/// Decode a raw response into `(data, metadata)`.
///
/// An empty body decodes as `JsonValue::Null`. Malformed JSON is a
/// [`SupabaseError::Parse`]; an unusable `Content-Range` is a [`SupabaseError::InvalidResponse`].
pub fn decode_response(raw: RawResponse) -> SupabaseResult<SupabaseResponse> {
    let count = parse_content_range_count(&raw.headers)?;

    let data = if raw.body.iter().all(u8::is_ascii_whitespace) {
        JsonValue::Null
    } else {
        JsonValue::from_slice(&raw.body)?
    };

    Ok(SupabaseResponse {
        data,
        metadata: ResponseMetadata {
            count,
            status: raw.status,
            status_text: raw.status_text,
        },
    })
}

/// Extract the total from a `Content-Range` header (`<unit> <start>-<end>/<total>`).
///
/// PostgREST omits the unit (`0-9/42`) and reports an unknown total as `*`; both are
/// accepted, the latter as `None`.
pub fn parse_content_range_count(headers: &HeaderMap) -> SupabaseResult<Option<u64>> {
    let Some(value) = headers.get(CONTENT_RANGE) else {
        return Ok(None);
    };
    let text = value
        .to_str()
        .map_err(|_| SupabaseError::invalid_response("Content-Range header is not valid text"))?;
    parse_content_range_total(text)
}

fn parse_content_range_total(text: &str) -> SupabaseResult<Option<u64>> {
    let malformed =
        || SupabaseError::invalid_response(format!("Malformed Content-Range header: {}", text));

    let (range, total) = text.trim().rsplit_once('/').ok_or_else(malformed)?;

    // Optional unit token before the range.
    let range = match range.split_once(' ') {
        Some((_unit, range)) => range.trim(),
        None => range,
    };
    if range != "*" {
        let (start, end) = range.split_once('-').ok_or_else(malformed)?;
        start.parse::<u64>().map_err(|_| malformed())?;
        end.parse::<u64>().map_err(|_| malformed())?;
    }

    match total.trim() {
        "*" => Ok(None),
        total => total.parse::<u64>().map(Some).map_err(|_| malformed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn raw(status: u16, content_range: Option<&'static str>, body: &str) -> RawResponse {
        let mut headers = HeaderMap::new();
        if let Some(range) = content_range {
            headers.insert(CONTENT_RANGE, HeaderValue::from_static(range));
        }
        RawResponse::new(status, headers, body.as_bytes().to_vec())
    }

    #[test]
    fn test_count_from_content_range() {
        let resp = decode_response(raw(200, Some("items 0-9/42"), "[]")).unwrap();
        assert_eq!(resp.count(), Some(42));
    }

    #[test]
    fn test_count_without_unit() {
        let resp = decode_response(raw(206, Some("0-24/3573458"), "[]")).unwrap();
        assert_eq!(resp.count(), Some(3573458));
    }

    #[test]
    fn test_count_absent() {
        let resp = decode_response(raw(200, None, "[]")).unwrap();
        assert_eq!(resp.count(), None);
    }

    #[test]
    fn test_count_unknown_total() {
        let resp = decode_response(raw(200, Some("0-9/*"), "[]")).unwrap();
        assert_eq!(resp.count(), None);
    }

    #[test]
    fn test_count_with_empty_range() {
        let resp = decode_response(raw(200, Some("*/0"), "[]")).unwrap();
        assert_eq!(resp.count(), Some(0));
    }

    #[test]
    fn test_count_unparsable_is_fatal() {
        for header in [
            "items 0-9",
            "items 0-9/abc",
            "0-9/-3",
            "0-9/",
            "garbage/42",
            "items abc-xyz/42",
            "/42",
        ] {
            let err = decode_response(raw(200, Some(header), "[]")).unwrap_err();
            assert!(
                matches!(err, SupabaseError::InvalidResponse(_)),
                "header {header:?}"
            );
        }
    }

    #[test]
    fn test_metadata() {
        let resp = decode_response(raw(201, None, "[{\"id\":1}]")).unwrap();
        assert_eq!(
            resp.metadata,
            ResponseMetadata {
                count: None,
                status: 201,
                status_text: "Created".into()
            }
        );
        assert_eq!(resp.rows().len(), 1);
        assert_eq!(resp.first().and_then(|r| r.get("id")), Some(&JsonValue::Integer(1)));
    }

    #[test]
    fn test_empty_body_is_null() {
        let resp = decode_response(raw(204, None, "")).unwrap();
        assert!(resp.data.is_null());
        assert!(resp.rows().is_empty());
    }

    #[test]
    fn test_malformed_body() {
        let err = decode_response(raw(200, None, "[{\"id\":")).unwrap_err();
        assert!(matches!(err, SupabaseError::Parse(_)));
    }

    #[test]
    fn test_into_single() {
        let one = decode_response(raw(200, None, "[{\"id\":1}]")).unwrap();
        assert_eq!(one.into_single().unwrap().get("id").and_then(|v| v.as_i64()), Some(1));

        let many = decode_response(raw(200, None, "[{\"id\":1},{\"id\":2}]")).unwrap();
        assert!(matches!(
            many.into_single(),
            Err(SupabaseError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_into_parts() {
        let (data, meta) = decode_response(raw(200, Some("items 0-0/1"), "[1]"))
            .unwrap()
            .into_parts();
        assert_eq!(data, JsonValue::Array(vec![JsonValue::Integer(1)]));
        assert_eq!(meta.count, Some(1));
    }
}
