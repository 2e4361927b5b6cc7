//! The single normalized outcome shape every attempt settles into.

use serde::{Deserialize, Serialize};

use crate::client::ServiceResponse;

/// A registry record as received from the remote service, verbatim.
///
/// Wire names are camelCase; the snake_case aliases accept the registry
/// scraper's raw row keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    #[serde(alias = "product_name")]
    pub name: String,
    #[serde(alias = "active_ingredients")]
    pub active_ingredients: String,
    #[serde(alias = "product_category")]
    pub category: String,
    #[serde(rename = "nrn", alias = "registrationNumber")]
    pub registration_number: String,
    pub status: String,
}

impl ProductRecord {
    /// Whether the registry lists this product's registration as active.
    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case("active")
    }
}

/// Normalized result of one verification attempt, success or error, ready
/// for display. Every attempt path terminates in one of these.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    pub succeeded: bool,
    /// The service's own found/not-found verdict; None on transport failure.
    pub found: Option<bool>,
    /// All matching registry records, in service order. Possibly empty.
    pub products: Vec<ProductRecord>,
    /// Explanatory message from the service (e.g. for a not-found verdict).
    pub message: Option<String>,
    /// The registration number the service searched for or extracted.
    pub source_identifier: Option<String>,
    /// OCR confidence percentage, image mode only.
    pub extraction_confidence: Option<f64>,
    /// Full text extracted from the image, image mode only.
    pub raw_extracted_text: Option<String>,
    /// User-safe failure message; set only on transport/protocol failure.
    pub error_detail: Option<String>,
}

impl VerificationOutcome {
    /// Pass a structurally valid service response through unchanged. The
    /// service's found/not-found/multi-result semantics are preserved, not
    /// reinterpreted; a single `productDetails` record becomes a one-element
    /// products sequence.
    pub fn from_response(resp: ServiceResponse) -> Self {
        let products = match (resp.results, resp.product_details) {
            (Some(results), _) => results,
            (None, Some(record)) => vec![record],
            (None, None) => Vec::new(),
        };
        Self {
            succeeded: resp.success,
            found: resp.found,
            products,
            message: resp.message,
            source_identifier: resp.nafdac_number,
            extraction_confidence: resp.ocr_confidence,
            raw_extracted_text: resp.extracted_text,
            error_detail: None,
        }
    }

    /// Terminal failure outcome carrying only a user-safe message.
    pub fn failure(detail: &str) -> Self {
        Self {
            succeeded: false,
            error_detail: Some(detail.to_owned()),
            ..Self::default()
        }
    }

    /// A domain not-found verdict is a valid outcome, not an error.
    pub fn is_not_found(&self) -> bool {
        self.succeeded && self.found == Some(false)
    }
}
