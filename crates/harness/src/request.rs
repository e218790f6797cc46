//! Outbound request model and normalized results.
//!
//! [`OutboundRequest::build`] is a pure function: it decides where the payload
//! goes (query string or body), how the body is encoded, and which headers are
//! set, without touching the network.
//!
//! | Method | Payload goes to | Content-Type | Referer |
//! |--------|-----------------|--------------|---------|
//! | GET | query string | none | none |
//! | POST / PUT / DELETE (json) | body | `application/json` | base URL |
//! | POST / PUT / DELETE (form) | body | `application/x-www-form-urlencoded` | base URL |

use std::fmt;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, REFERER};
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::error::{ConfigurationError, HarnessError, HarnessResult};

/// Request payload: a string-keyed mapping of (mostly scalar) values.
pub type Payload = Map<String, Value>;

/// Converts a JSON value into a payload. Non-object values yield an empty payload.
pub fn to_payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        _ => Payload::new(),
    }
}

/// HTTP methods supported by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Returns the canonical upper-case method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a non-GET payload is encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentMode {
    /// `application/json`
    #[default]
    Json,
    /// `application/x-www-form-urlencoded`
    Form,
}

/// Encoding actually applied to a built request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Form,
    None,
}

/// A fully built request, immutable once constructed.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
    pub body_kind: BodyKind,
}

impl OutboundRequest {
    /// Builds the request for `method` against `base_url` + `endpoint`.
    pub fn build(
        method: HttpMethod,
        base_url: &str,
        endpoint: &str,
        payload: &Payload,
        mode: ContentMode,
    ) -> HarnessResult<Self> {
        let raw = format!("{}{}", base_url.trim_end_matches('/'), endpoint);
        let mut url = Url::parse(&raw).map_err(|e| invalid_base_url(base_url, e.to_string()))?;

        if method == HttpMethod::Get {
            if !payload.is_empty() {
                let mut pairs = url.query_pairs_mut();
                for (key, value) in payload {
                    pairs.append_pair(key, &scalar_to_string(value));
                }
            }
            return Ok(Self {
                method,
                url,
                headers: HeaderMap::new(),
                body: None,
                body_kind: BodyKind::None,
            });
        }

        let mut headers = HeaderMap::new();
        let referer =
            HeaderValue::from_str(base_url).map_err(|e| invalid_base_url(base_url, e.to_string()))?;
        headers.insert(REFERER, referer);

        let (body, body_kind, content_type) = match mode {
            ContentMode::Form => (
                encode_form(payload),
                BodyKind::Form,
                mime::APPLICATION_WWW_FORM_URLENCODED,
            ),
            ContentMode::Json => (
                Value::Object(payload.clone()).to_string(),
                BodyKind::Json,
                mime::APPLICATION_JSON,
            ),
        };
        let content_type = HeaderValue::from_str(content_type.as_ref())
            .map_err(|e| ConfigurationError::Invalid(vec![e.to_string()]))?;
        headers.insert(CONTENT_TYPE, content_type);

        Ok(Self {
            method,
            url,
            headers,
            body: Some(body),
            body_kind,
        })
    }

    /// Converts into a `reqwest` request on the given client.
    pub fn into_reqwest(self, client: &reqwest::Client) -> reqwest::RequestBuilder {
        let builder = client
            .request(self.method.to_reqwest(), self.url)
            .headers(self.headers);
        match self.body {
            Some(body) => builder.body(body),
            None => builder,
        }
    }
}

fn invalid_base_url(base_url: &str, reason: String) -> HarnessError {
    ConfigurationError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    }
    .into()
}

fn encode_form(payload: &Payload) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(payload.iter().map(|(k, v)| (k.as_str(), scalar_to_string(v))))
        .finish()
}

/// Renders a payload value the way a form field or query parameter carries it.
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// A response body: parsed JSON when possible, raw text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    /// Parses received bytes. Never fails: non-JSON falls back to text.
    pub fn parse(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    /// Returns the JSON value, if the body parsed as JSON.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    /// Looks up a top-level field of a JSON object body.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.as_json().and_then(|v| v.get(field))
    }
}

impl fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseBody::Json(value) => write!(f, "{}", value),
            ResponseBody::Text(text) => f.write_str(text),
        }
    }
}

/// The normalized result of one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl ApiResponse {
    /// The business response code embedded in the body (`responseCode`).
    pub fn response_code(&self) -> Option<i64> {
        self.body.get("responseCode").and_then(Value::as_i64)
    }

    /// The business message embedded in the body (`message`).
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }

    /// True for a 2xx HTTP status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Converts a non-2xx result into [`HarnessError::HttpErrorResponse`].
    pub fn error_for_status(self) -> HarnessResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(HarnessError::HttpErrorResponse {
                status: self.status,
                body: self.body.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = "https://api.example.test/api";

    fn payload(value: Value) -> Payload {
        to_payload(value)
    }

    #[test]
    fn test_get_puts_payload_in_query_and_has_no_body() {
        let req = OutboundRequest::build(
            HttpMethod::Get,
            BASE,
            "/getUserDetailByEmail",
            &payload(json!({"email": "a@b.com"})),
            ContentMode::Json,
        )
        .unwrap();

        assert!(req.body.is_none());
        assert_eq!(req.body_kind, BodyKind::None);
        assert!(req.headers.get(CONTENT_TYPE).is_none());
        assert!(req.headers.get(REFERER).is_none());
        assert_eq!(req.url.path(), "/api/getUserDetailByEmail");
        assert_eq!(req.url.query(), Some("email=a%40b.com"));
    }

    #[test]
    fn test_get_with_empty_payload_has_no_query() {
        let req = OutboundRequest::build(
            HttpMethod::Get,
            BASE,
            "/productsList",
            &Payload::new(),
            ContentMode::Form,
        )
        .unwrap();
        assert_eq!(req.url.as_str(), "https://api.example.test/api/productsList");
    }

    #[test]
    fn test_post_form_encodes_body_and_sets_referer() {
        let req = OutboundRequest::build(
            HttpMethod::Post,
            BASE,
            "/verifyLogin",
            &payload(json!({"email": "t1@x.com", "password": "p w"})),
            ContentMode::Form,
        )
        .unwrap();

        assert_eq!(req.body_kind, BodyKind::Form);
        assert_eq!(
            req.headers.get(CONTENT_TYPE).unwrap(),
            "application/x-www-form-urlencoded"
        );
        assert_eq!(req.headers.get(REFERER).unwrap(), BASE);
        assert_eq!(req.body.as_deref(), Some("email=t1%40x.com&password=p+w"));
        assert!(req.url.query().is_none());
    }

    #[test]
    fn test_put_defaults_to_json_body() {
        let req = OutboundRequest::build(
            HttpMethod::Put,
            BASE,
            "/brandsList",
            &payload(json!({"brand": "Polo", "count": 3})),
            ContentMode::default(),
        )
        .unwrap();

        assert_eq!(req.body_kind, BodyKind::Json);
        assert_eq!(req.headers.get(CONTENT_TYPE).unwrap(), "application/json");
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"brand": "Polo", "count": 3}));
    }

    #[test]
    fn test_delete_carries_body() {
        let req = OutboundRequest::build(
            HttpMethod::Delete,
            BASE,
            "/deleteAccount",
            &payload(json!({"email": "x@y.z", "password": "p"})),
            ContentMode::Form,
        )
        .unwrap();
        assert!(req.body.is_some());
    }

    #[test]
    fn test_invalid_base_url_is_configuration_error() {
        let err = OutboundRequest::build(
            HttpMethod::Get,
            "not a url",
            "/productsList",
            &Payload::new(),
            ContentMode::Json,
        )
        .unwrap_err();
        assert_eq!(err.category(), "configuration");
    }

    #[test]
    fn test_scalar_to_string() {
        assert_eq!(scalar_to_string(&json!(null)), "");
        assert_eq!(scalar_to_string(&json!("abc")), "abc");
        assert_eq!(scalar_to_string(&json!(12)), "12");
        assert_eq!(scalar_to_string(&json!(true)), "true");
    }

    #[test]
    fn test_body_parse_falls_back_to_text() {
        assert_eq!(
            ResponseBody::parse(br#"{"responseCode": 200}"#),
            ResponseBody::Json(json!({"responseCode": 200}))
        );
        assert_eq!(
            ResponseBody::parse(b"<html>oops</html>"),
            ResponseBody::Text("<html>oops</html>".to_string())
        );
    }

    #[test]
    fn test_business_fields() {
        let response = ApiResponse {
            status: 200,
            body: ResponseBody::Json(json!({"responseCode": 201, "message": "User created!"})),
        };
        assert_eq!(response.response_code(), Some(201));
        assert_eq!(response.message(), Some("User created!"));

        let text = ApiResponse {
            status: 502,
            body: ResponseBody::Text("Bad Gateway".to_string()),
        };
        assert_eq!(text.response_code(), None);
        assert!(matches!(
            text.error_for_status(),
            Err(HarnessError::HttpErrorResponse { status: 502, .. })
        ));
    }
}
