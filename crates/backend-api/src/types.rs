//! Wire types for the CRM backend endpoints
//!
//! The backend wraps every response in the same envelope:
//!
//! ```json
//! { "code": 0, "message": "ok", "data": { ... } }
//! ```
//!
//! `code == 0` is success; any other value is a rejection and `message`
//! carries the operator-facing explanation. `data` may be absent on
//! rejection.

use serde::{Deserialize, Serialize};

/// Response envelope shared by all backend endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Backend status code; 0 means success
    pub code: i64,
    /// Human-readable status message
    #[serde(default)]
    pub message: String,
    /// Payload, present on success
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Whether the backend accepted the request.
    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// Request body for `POST voipcall_token/get`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
    /// Advertiser account id
    pub account_id: u64,
    /// Agent user id
    pub user_id: u64,
}

/// Success payload of `POST voipcall_token/get`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenData {
    /// Call-capability token to hand to the calling SDK's login
    pub token: String,
    /// Backend correlation id for this request
    #[serde(default)]
    pub request_id: String,
}

/// Request body for `POST voipcall/create`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCallRequest {
    /// Advertiser account id
    pub account_id: u64,
    /// Lead record id the call is placed against
    pub leads_id: u64,
    /// Agent user id placing the call
    pub user_id: u64,
    /// Callee phone number, sent as a string
    pub callee_number: String,
}

/// Success payload of `POST voipcall/create`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCallData {
    /// Backend contact record created for this call attempt
    pub contact_id: String,
    /// Backend correlation id for this request
    #[serde(default)]
    pub request_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_success_flag_follows_code() {
        let ok: ApiEnvelope<TokenData> = serde_json::from_str(
            r#"{"code":0,"message":"ok","data":{"token":"T1","request_id":"r-1"}}"#,
        )
        .unwrap();
        assert!(ok.is_success());
        assert_eq!(ok.data.unwrap().token, "T1");

        let rejected: ApiEnvelope<TokenData> =
            serde_json::from_str(r#"{"code":7,"message":"bad"}"#).unwrap();
        assert!(!rejected.is_success());
        assert_eq!(rejected.message, "bad");
        assert!(rejected.data.is_none());
    }

    #[test]
    fn create_call_request_serializes_number_as_string() {
        let req = CreateCallRequest {
            account_id: 20458,
            leads_id: 218001014,
            user_id: 20458,
            callee_number: "13810433402".to_string(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["account_id"], 20458);
        assert_eq!(json["leads_id"], 218001014);
        assert_eq!(json["callee_number"], "13810433402");
    }
}
