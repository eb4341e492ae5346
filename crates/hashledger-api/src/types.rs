use hashledger_core::{
    Metadata, NewReceipt, Receipt, ReceiptClaim, VerificationStatus, format_timestamp,
};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/v1/hashes/`. Field names are accepted in camelCase or
/// snake_case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashRegistrationRequest {
    #[serde(alias = "session_id")]
    pub session_id: String,
    #[serde(alias = "session_hash")]
    pub session_hash: String,
    #[serde(default, alias = "hash_version")]
    pub hash_version: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl HashRegistrationRequest {
    /// Returns the first field that must not be empty but is. The hash version is
    /// free-form and may be empty.
    pub fn empty_field(&self) -> Option<&'static str> {
        if self.session_id.is_empty() {
            Some("sessionId")
        } else if self.session_hash.is_empty() {
            Some("sessionHash")
        } else {
            None
        }
    }

    pub fn into_new_receipt(self) -> NewReceipt {
        let new = NewReceipt::new(self.session_id, self.session_hash).with_metadata(self.metadata);
        match self.hash_version {
            Some(v) => new.with_hash_version(v),
            None => new,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashRegistrationResponse {
    pub receipt_id: String,
    pub session_id: String,
    pub session_hash: String,
    pub hash_version: String,
    pub first_seen_at: String,
}

impl From<Receipt> for HashRegistrationResponse {
    fn from(r: Receipt) -> Self {
        Self {
            first_seen_at: format_timestamp(&r.first_seen_at),
            receipt_id: r.receipt_id,
            session_id: r.session_id,
            session_hash: r.session_hash,
            hash_version: r.hash_version,
        }
    }
}

/// Body of `POST /api/v1/hashes/verify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashVerificationRequest {
    #[serde(alias = "receipt_id")]
    pub receipt_id: String,
    #[serde(alias = "session_id")]
    pub session_id: String,
    #[serde(alias = "session_hash")]
    pub session_hash: String,
}

impl From<HashVerificationRequest> for ReceiptClaim {
    fn from(req: HashVerificationRequest) -> Self {
        Self {
            receipt_id: req.receipt_id,
            session_id: req.session_id,
            session_hash: req.session_hash,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashVerificationResponse {
    pub status: VerificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_seen_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl HashVerificationResponse {
    /// Builds the response for `claim`. A known receipt reports its own id and
    /// session; an unknown one echoes what the client sent.
    pub fn new(
        status: VerificationStatus,
        claim: &ReceiptClaim,
        stored: Option<&Receipt>,
    ) -> Self {
        match stored {
            Some(r) => Self {
                status,
                first_seen_at: Some(format_timestamp(&r.first_seen_at)),
                receipt_id: Some(r.receipt_id.clone()),
                session_id: Some(r.session_id.clone()),
            },
            None => Self {
                status,
                first_seen_at: None,
                receipt_id: Some(claim.receipt_id.clone()),
                session_id: Some(claim.session_id.clone()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashledger_core::DEFAULT_HASH_VERSION;

    #[test]
    fn registration_accepts_snake_case_fields() {
        let req: HashRegistrationRequest = serde_json::from_value(serde_json::json!({
            "session_id": "session-123",
            "session_hash": "abc123",
            "hash_version": "v1",
            "metadata": {"client": "test"},
        }))
        .unwrap();
        assert_eq!(req.session_id, "session-123");
        assert_eq!(req.hash_version.as_deref(), Some("v1"));
        assert_eq!(req.metadata["client"], "test");
    }

    #[test]
    fn registration_defaults_version_and_metadata() {
        let req: HashRegistrationRequest = serde_json::from_value(serde_json::json!({
            "sessionId": "session-456",
            "sessionHash": "good",
        }))
        .unwrap();
        assert_eq!(req.empty_field(), None);
        let new = req.into_new_receipt();
        assert_eq!(new.hash_version, DEFAULT_HASH_VERSION);
        assert!(new.metadata.is_empty());
    }

    #[test]
    fn registration_flags_empty_fields() {
        let req = HashRegistrationRequest {
            session_id: "s".to_string(),
            session_hash: String::new(),
            hash_version: None,
            metadata: Metadata::new(),
        };
        assert_eq!(req.empty_field(), Some("sessionHash"));
    }

    #[test]
    fn registration_keeps_an_explicit_empty_version() {
        let req: HashRegistrationRequest = serde_json::from_value(serde_json::json!({
            "sessionId": "s",
            "sessionHash": "h",
            "hashVersion": "",
        }))
        .unwrap();
        assert_eq!(req.empty_field(), None);
        assert_eq!(req.into_new_receipt().hash_version, "");
    }

    #[test]
    fn registration_response_is_camel_case() {
        let receipt = NewReceipt::new("session-123", "abc123").issue();
        let value = serde_json::to_value(HashRegistrationResponse::from(receipt.clone())).unwrap();
        assert_eq!(value["receiptId"], receipt.receipt_id.as_str());
        assert_eq!(value["sessionId"], "session-123");
        assert_eq!(value["sessionHash"], "abc123");
        assert_eq!(value["hashVersion"], "v1");
        assert!(value["firstSeenAt"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn unknown_verification_echoes_claim_without_timestamp() {
        let claim = ReceiptClaim {
            receipt_id: "missing".to_string(),
            session_id: "who".to_string(),
            session_hash: "what".to_string(),
        };
        let resp = HashVerificationResponse::new(VerificationStatus::Unknown, &claim, None);
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"status": "unknown", "receiptId": "missing", "sessionId": "who"})
        );
    }

    #[test]
    fn known_verification_reports_stored_receipt() {
        let stored = NewReceipt::new("session-456", "good").issue();
        let claim = ReceiptClaim {
            receipt_id: stored.receipt_id.clone(),
            session_id: "someone-else".to_string(),
            session_hash: "good".to_string(),
        };
        let resp =
            HashVerificationResponse::new(VerificationStatus::Mismatch, &claim, Some(&stored));
        assert_eq!(resp.session_id.as_deref(), Some("session-456"));
        assert_eq!(
            resp.first_seen_at,
            Some(format_timestamp(&stored.first_seen_at))
        );
    }
}
