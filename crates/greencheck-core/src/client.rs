//! Dispatcher: the single outbound call to the remote verification service.

use std::time::Duration;

use serde::Deserialize;

use crate::outcome::ProductRecord;
use crate::request::WireRequest;
use crate::{Config, CoreError};

/// Response body from either service route, passed through verbatim.
///
/// The image route may add `nafdacNumber`/`ocrConfidence`/`extractedText`
/// from OCR extraction; the validator route may return a multi-match
/// `results` sequence instead of a single `productDetails` record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    pub success: bool,
    pub verification_id: Option<String>,
    pub nafdac_number: Option<String>,
    pub found: Option<bool>,
    pub product_details: Option<ProductRecord>,
    pub results: Option<Vec<ProductRecord>>,
    pub message: Option<String>,
    pub ocr_confidence: Option<f64>,
    pub extracted_text: Option<String>,
}

/// HTTP client for the verification API.
///
/// Performs at most one call per attempt and never retries; transport
/// resilience belongs to the surrounding deployment, not this engine.
pub struct GreenbookClient {
    http: reqwest::Client,
    base_url: String,
}

impl GreenbookClient {
    pub fn new(config: &Config) -> Result<Self, CoreError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            http: builder.build()?,
            base_url: config.api_base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// POST the built request to its route and parse the JSON response.
    ///
    /// Any transport failure, non-success status, or unparseable body comes
    /// back as a `CoreError`; the raw cause is logged here and the
    /// orchestrator substitutes the user-safe message.
    pub async fn submit(&self, wire: &WireRequest) -> Result<ServiceResponse, CoreError> {
        let (route, response) = match wire {
            WireRequest::FullVerify(body) => (
                "/verify",
                self.http
                    .post(format!("{}/verify", self.base_url))
                    .json(body)
                    .send()
                    .await,
            ),
            WireRequest::DirectValidate(body) => (
                "/validate",
                self.http
                    .post(format!("{}/validate", self.base_url))
                    .json(body)
                    .send()
                    .await,
            ),
        };

        let response = response.inspect_err(|e| {
            log::warn!("{route} request failed: {e}");
        })?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("{route} returned HTTP {status}");
            return Err(CoreError::Status(status));
        }

        response.json::<ServiceResponse>().await.map_err(|e| {
            log::warn!("{route} response body unparseable: {e}");
            CoreError::Http(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = GreenbookClient::new(&Config {
            api_base_url: "http://api.example/".into(),
            request_timeout_secs: None,
        })
        .unwrap();
        assert_eq!(client.base_url, "http://api.example");
    }

    #[test]
    fn response_parses_with_minimal_fields() {
        let resp: ServiceResponse = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(!resp.success);
        assert!(resp.found.is_none());
        assert!(resp.results.is_none());
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_error() {
        // Bind-then-drop guarantees nothing is listening on the port.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = GreenbookClient::new(&Config {
            api_base_url: format!("http://{addr}"),
            request_timeout_secs: None,
        })
        .unwrap();

        let req = crate::request::VerificationRequest::from_manual("A4-1234").unwrap();
        let err = client.submit(&req.to_wire()).await.unwrap_err();
        assert!(matches!(err, CoreError::Http(_)));
    }
}
