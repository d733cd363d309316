use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use serialdesk_core::{BackendConfig, DetailsResponse};

use crate::error::{ClientError, Result};
use crate::http::JsonClient;

/// The two endpoints the form assistant talks to.
#[async_trait]
pub trait SerialBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Serial numbers matching `query`, in the order the backend returns them.
    async fn search_serials(&self, query: &str) -> Result<Vec<String>>;

    /// Full record for one serial, classified into found / not found.
    async fn serial_details(&self, serial: &str) -> Result<DetailsResponse>;
}

/// `GET /search_serials` and `GET /get_serial_details` over HTTP.
pub struct HttpSerialBackend {
    client: JsonClient,
    base_url: String,
}

impl HttpSerialBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidBaseUrl(config.base_url.clone()));
        }

        let client = JsonClient::new(
            &config.user_agent,
            config.timeout_secs.map(Duration::from_secs),
        )?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Self::new(&BackendConfig {
            base_url: base_url.to_string(),
            ..BackendConfig::default()
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search_serials?query={}",
            self.base_url,
            urlencoding::encode(query)
        )
    }

    pub fn details_url(&self, serial: &str) -> String {
        format!(
            "{}/get_serial_details?serial_no={}",
            self.base_url,
            urlencoding::encode(serial)
        )
    }
}

#[async_trait]
impl SerialBackend for HttpSerialBackend {
    fn name(&self) -> &str {
        &self.base_url
    }

    async fn search_serials(&self, query: &str) -> Result<Vec<String>> {
        let val = self.client.get_json(&self.search_url(query)).await?;
        parse_suggestions(&val)
    }

    async fn serial_details(&self, serial: &str) -> Result<DetailsResponse> {
        let val = self.client.get_json(&self.details_url(serial)).await?;
        parse_details(&val)
    }
}

/// The suggestion payload must be an array; each element becomes one row.
pub fn parse_suggestions(val: &Value) -> Result<Vec<String>> {
    let items = val.as_array().ok_or_else(|| {
        ClientError::Parse(format!("expected an array of serials, got {}", kind(val)))
    })?;

    Ok(items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .collect())
}

/// Classify a details payload.
///
/// A `null` body, or a truthy `customer` that is not a string, cannot be
/// read at all and is a parse error rather than a not-found record. A falsy
/// non-string `customer` (`false`, `0`) counts as no customer.
pub fn parse_details(val: &Value) -> Result<DetailsResponse> {
    if val.is_null() {
        return Err(ClientError::Parse("details payload is null".into()));
    }

    let mut details = match DetailsResponse::from_json(val) {
        DetailsResponse::Found(details) => details,
        not_found => return Ok(not_found),
    };

    match val.get("customer") {
        None | Some(Value::Null) | Some(Value::String(_)) => {}
        Some(Value::Bool(false)) => details.customer = None,
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => details.customer = None,
        Some(other) => {
            return Err(ClientError::Parse(format!(
                "customer must be a string, got {}",
                kind(other)
            )));
        }
    }

    Ok(DetailsResponse::Found(details))
}

fn kind(val: &Value) -> &'static str {
    match val {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use serialdesk_core::MaintenanceStatus;

    #[test]
    fn rejects_non_http_base_url() {
        let err = HttpSerialBackend::with_base_url("ftp://serials").err().unwrap();
        assert!(matches!(err, ClientError::InvalidBaseUrl(_)));
    }

    #[test]
    fn urls_escape_their_argument() {
        let backend = HttpSerialBackend::with_base_url("http://serials.local/").unwrap();
        assert_eq!(backend.base_url(), "http://serials.local");
        assert_eq!(
            backend.search_url("AB 12&x"),
            "http://serials.local/search_serials?query=AB%2012%26x"
        );
        assert_eq!(
            backend.details_url("A/1"),
            "http://serials.local/get_serial_details?serial_no=A%2F1"
        );
    }

    #[test]
    fn suggestions_must_be_an_array() {
        let err = parse_suggestions(&json!({ "error": "boom" })).unwrap_err();
        assert!(matches!(err, ClientError::Parse(ref m) if m.contains("an object")));

        let rows = parse_suggestions(&json!(["AB123", 4021, null])).unwrap();
        assert_eq!(rows, vec!["AB123", "4021", ""]);
    }

    #[test]
    fn null_details_payload_is_parse_error() {
        let err = parse_details(&Value::Null).unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));
        assert!(!err.is_network());
    }

    #[test]
    fn non_string_customer() {
        let err = parse_details(&json!({ "customer": 4021 })).unwrap_err();
        assert!(matches!(err, ClientError::Parse(ref m) if m.contains("a number")));
        assert!(parse_details(&json!({ "customer": ["Acme"] })).is_err());

        // Falsy values read as a missing customer.
        for customer in [json!(0), json!(false), json!(null)] {
            let Ok(DetailsResponse::Found(details)) =
                parse_details(&json!({ "customer": customer, "item_name": "Tester" }))
            else {
                panic!("expected a found record");
            };
            assert!(!details.has_customer());
        }
    }

    #[test]
    fn error_field_wins_over_bad_customer() {
        let resp = parse_details(&json!({ "error": "not found", "customer": 4021 })).unwrap();
        assert!(matches!(resp, DetailsResponse::NotFound { .. }));
    }

    #[tokio::test]
    async fn search_serials_returns_rows_in_order() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/search_serials")
            .match_query(Matcher::UrlEncoded("query".into(), "AB12".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!(["AB123", "AB124"]).to_string())
            .create_async()
            .await;

        let backend = HttpSerialBackend::with_base_url(&server.url()).unwrap();
        let rows = backend.search_serials("AB12").await.unwrap();
        mock.assert_async().await;
        assert_eq!(rows, vec!["AB123", "AB124"]);
    }

    #[tokio::test]
    async fn serial_details_found() {
        let mut server = Server::new_async().await;
        let body = json!({
            "customer": "Acme Pharma",
            "customer_address": "Plot 12, MIDC",
            "warranty_expiry_date": "2027-03-31",
            "item_name": "Dissolution Tester",
            "maintenance_status": "Under Warranty",
            "zonal_manager": "Shivam Kumar",
            "amc_type": ""
        });
        let mock = server
            .mock("GET", "/get_serial_details")
            .match_query(Matcher::UrlEncoded("serial_no".into(), "XYZ 999".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let backend = HttpSerialBackend::with_base_url(&server.url()).unwrap();
        let resp = backend.serial_details("XYZ 999").await.unwrap();
        mock.assert_async().await;

        let DetailsResponse::Found(details) = resp else {
            panic!("expected a found record");
        };
        assert_eq!(details.customer.as_deref(), Some("Acme Pharma"));
        assert_eq!(details.maintenance_status, Some(MaintenanceStatus::UnderWarranty));
        assert_eq!(details.amc_type.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn serial_details_error_payload_with_success_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/get_serial_details")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({ "error": "Serial number not found" }).to_string())
            .create_async()
            .await;

        let backend = HttpSerialBackend::with_base_url(&server.url()).unwrap();
        let resp = backend.serial_details("NOPE").await.unwrap();
        assert!(matches!(resp, DetailsResponse::NotFound { .. }));
    }

    #[tokio::test]
    async fn serial_details_null_body_is_parse_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/get_serial_details")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("null")
            .create_async()
            .await;

        let backend = HttpSerialBackend::with_base_url(&server.url()).unwrap();
        let err = backend.serial_details("X1").await.unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));
    }

    #[tokio::test]
    async fn serial_details_404_is_a_status_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/get_serial_details")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(json!({ "error": "Serial number not found" }).to_string())
            .create_async()
            .await;

        let backend = HttpSerialBackend::with_base_url(&server.url()).unwrap();
        let err = backend.serial_details("NOPE").await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 404, .. }));
    }
}
