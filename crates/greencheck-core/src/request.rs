//! Local validation and wire-body construction for a verification attempt.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;

use crate::CoreError;

/// Fixed ceiling on the raw (pre-encoding) image size.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Which input the user submitted. Immutable for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationMode {
    Image,
    Manual,
}

/// A validated submission payload. Exactly one of the two payload fields is
/// populated, matching `mode`. Created fresh per submission and discarded
/// once the attempt settles.
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    pub mode: VerificationMode,
    pub image_base64: Option<String>,
    pub nafdac_number: Option<String>,
}

/// Body for the full verification route (image mode).
#[derive(Debug, Clone, Serialize)]
pub struct FullVerifyBody {
    pub image: String,
}

/// Body for the direct validation route (manual mode).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectValidateBody {
    pub verification_id: String,
    pub timestamp: String,
    pub image_key: String,
    pub nafdac_number: String,
}

/// A transport-ready request, one variant per service route.
#[derive(Debug, Clone)]
pub enum WireRequest {
    FullVerify(FullVerifyBody),
    DirectValidate(DirectValidateBody),
}

impl VerificationRequest {
    /// Build an image-mode request from raw image bytes.
    pub fn from_image_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        if bytes.is_empty() {
            return Err(CoreError::Validation("Please select an image file".into()));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(CoreError::Validation(
                "File size must be less than 10MB".into(),
            ));
        }
        Ok(Self {
            mode: VerificationMode::Image,
            image_base64: Some(BASE64.encode(bytes)),
            nafdac_number: None,
        })
    }

    /// Build an image-mode request from an already-encoded body, stripping
    /// any `data:*;base64,` scheme prefix. The service expects the bare
    /// base64 body.
    pub fn from_image_data_url(data: &str) -> Result<Self, CoreError> {
        let body = strip_data_url_prefix(data);
        if body.is_empty() {
            return Err(CoreError::Validation("Please select an image file".into()));
        }
        // Base64 encodes n bytes as 4*ceil(n/3) chars; an exactly-10MB image
        // must pass here just as it does in from_image_bytes.
        if body.len() > MAX_IMAGE_BYTES.div_ceil(3) * 4 {
            return Err(CoreError::Validation(
                "File size must be less than 10MB".into(),
            ));
        }
        Ok(Self {
            mode: VerificationMode::Image,
            image_base64: Some(body.to_owned()),
            nafdac_number: None,
        })
    }

    /// Build a manual-mode request from a typed registration number.
    pub fn from_manual(number: &str) -> Result<Self, CoreError> {
        let trimmed = number.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation(
                "Please enter a NAFDAC number".into(),
            ));
        }
        Ok(Self {
            mode: VerificationMode::Manual,
            image_base64: None,
            nafdac_number: Some(trimmed.to_owned()),
        })
    }

    /// Produce the transport body for this request. Manual-mode bodies carry
    /// a fresh attempt identifier and submission timestamp, distinct per
    /// call.
    pub fn to_wire(&self) -> WireRequest {
        match self.mode {
            VerificationMode::Image => WireRequest::FullVerify(FullVerifyBody {
                image: self.image_base64.clone().unwrap_or_default(),
            }),
            VerificationMode::Manual => WireRequest::DirectValidate(DirectValidateBody {
                verification_id: uuid::Uuid::new_v4().to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                image_key: String::new(),
                nafdac_number: self.nafdac_number.clone().unwrap_or_default(),
            }),
        }
    }
}

fn strip_data_url_prefix(data: &str) -> &str {
    match data.split_once(',') {
        Some((scheme, body)) if scheme.starts_with("data:") => body,
        _ => data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_number_is_trimmed() {
        let req = VerificationRequest::from_manual("  A4-1234  ").unwrap();
        assert_eq!(req.mode, VerificationMode::Manual);
        assert_eq!(req.nafdac_number.as_deref(), Some("A4-1234"));
        assert!(req.image_base64.is_none());
    }

    #[test]
    fn whitespace_only_number_is_rejected() {
        let err = VerificationRequest::from_manual("   ").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Please enter a NAFDAC number");
    }

    #[test]
    fn empty_image_is_rejected() {
        let err = VerificationRequest::from_image_bytes(&[]).unwrap_err();
        assert_eq!(err.to_string(), "Please select an image file");
    }

    #[test]
    fn oversized_image_is_rejected() {
        let exact = vec![0u8; MAX_IMAGE_BYTES];
        assert!(VerificationRequest::from_image_bytes(&exact).is_ok());

        let big = vec![0u8; MAX_IMAGE_BYTES + 1];
        let err = VerificationRequest::from_image_bytes(&big).unwrap_err();
        assert_eq!(err.to_string(), "File size must be less than 10MB");
    }

    #[test]
    fn data_url_ceiling_agrees_with_raw_byte_ceiling() {
        // 4*ceil(n/3) chars encode an exactly-10MB image.
        let encoded_ceiling = MAX_IMAGE_BYTES.div_ceil(3) * 4;
        let exact = "A".repeat(encoded_ceiling);
        assert!(VerificationRequest::from_image_data_url(&exact).is_ok());

        let over = "A".repeat(encoded_ceiling + 4);
        let err = VerificationRequest::from_image_data_url(&over).unwrap_err();
        assert_eq!(err.to_string(), "File size must be less than 10MB");
    }

    #[test]
    fn data_url_prefix_is_stripped() {
        let req =
            VerificationRequest::from_image_data_url("data:image/jpeg;base64,aGVsbG8=").unwrap();
        assert_eq!(req.image_base64.as_deref(), Some("aGVsbG8="));
    }

    #[test]
    fn bare_base64_passes_through_unchanged() {
        let req = VerificationRequest::from_image_data_url("aGVsbG8=").unwrap();
        assert_eq!(req.image_base64.as_deref(), Some("aGVsbG8="));
    }

    #[test]
    fn manual_wire_body_has_fresh_identity_and_empty_image_key() {
        let req = VerificationRequest::from_manual("A4-1234").unwrap();
        let (first, second) = match (req.to_wire(), req.to_wire()) {
            (WireRequest::DirectValidate(a), WireRequest::DirectValidate(b)) => (a, b),
            other => panic!("expected direct-validate bodies, got {other:?}"),
        };
        assert_eq!(first.nafdac_number, "A4-1234");
        assert!(first.image_key.is_empty());
        assert!(!first.verification_id.is_empty());
        assert!(!first.timestamp.is_empty());
        // Fresh identifier per submission.
        assert_ne!(first.verification_id, second.verification_id);
    }

    #[test]
    fn image_wire_body_carries_bare_base64() {
        let req = VerificationRequest::from_image_bytes(b"hello").unwrap();
        match req.to_wire() {
            WireRequest::FullVerify(body) => assert_eq!(body.image, "aGVsbG8="),
            other => panic!("expected full-verify body, got {other:?}"),
        }
    }

    #[test]
    fn validate_body_serializes_camel_case() {
        let body = DirectValidateBody {
            verification_id: "id".into(),
            timestamp: "t".into(),
            image_key: String::new(),
            nafdac_number: "A4-1234".into(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["verificationId"], "id");
        assert_eq!(json["imageKey"], "");
        assert_eq!(json["nafdacNumber"], "A4-1234");
    }
}
