use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;

/// Splits `Content-Type` off a header map.
///
/// Header names are case-insensitive, so `content-type` and `Content-Type`
/// are the same entry.
pub(crate) fn split_content_type(headers: &HeaderMap) -> (HeaderMap, Option<HeaderValue>) {
    let mut rest = headers.clone();
    let content_type = rest.remove(CONTENT_TYPE);
    (rest, content_type)
}

/// Overlays `extra` on `base`, replacing entries with the same name.
pub(crate) fn merge_headers(base: &HeaderMap, extra: HeaderMap) -> HeaderMap {
    let mut merged = base.clone();
    let mut last_name = None;
    for (name, value) in extra {
        // `None` names continue a multi-valued header
        let name = match name {
            Some(name) => {
                merged.remove(&name);
                last_name = Some(name.clone());
                name
            }
            None => match &last_name {
                Some(name) => name.clone(),
                None => continue,
            },
        };
        merged.append(name, value);
    }
    merged
}

/// Header map as a JSON object for diagnostics.
pub(crate) fn headers_to_json(headers: &HeaderMap) -> Value {
    let mut map = serde_json::Map::new();
    for (key, value) in headers {
        let key_str = key.as_str().to_string();
        let value_str = value.to_str().unwrap_or("").to_string();
        map.insert(key_str, Value::String(value_str));
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderName;

    #[test]
    fn test_split_content_type_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_bytes(b"Content-Type").unwrap(),
            HeaderValue::from_static("text/plain"),
        );
        headers.insert("x-mbx-apikey", HeaderValue::from_static("key"));
        let (rest, content_type) = split_content_type(&headers);
        assert_eq!(content_type.unwrap(), "text/plain");
        assert!(rest.get("Content-Type").is_none());
        assert_eq!(rest.get("x-mbx-apikey").unwrap(), "key");
    }

    #[test]
    fn test_merge_overrides_defaults() {
        let mut base = HeaderMap::new();
        base.insert("accept", HeaderValue::from_static("*/*"));
        base.insert("x-default", HeaderValue::from_static("1"));
        let mut extra = HeaderMap::new();
        extra.insert("accept", HeaderValue::from_static("application/json"));
        let merged = merge_headers(&base, extra);
        assert_eq!(merged.get("ACCEPT").unwrap(), "application/json");
        assert_eq!(merged.get("x-default").unwrap(), "1");
    }
}
