use chrono::{DateTime, Utc};

use crate::{data_objects::ErrorBody, error::EbayApiError};

/// eBay date-range filters want millisecond-precision RFC3339 with a Z suffix.
pub fn format_filter_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Map a non-2xx response to the local error taxonomy.
///
/// eBay reports failure detail in an `{ "errors": [...] }` body. Funding
/// problems on label purchase come back as a 4xx whose message names the
/// shortfall, so that check runs before the generic 4xx → validation mapping.
pub fn classify_error_response(status: u16, body: &str) -> EbayApiError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| {
            b.errors
                .iter()
                .map(|e| e.long_message.clone().unwrap_or_else(|| e.message.clone()))
                .collect::<Vec<String>>()
                .join("; ")
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        401 | 403 => EbayApiError::Auth(detail),
        400..=499 => {
            if detail.to_ascii_lowercase().contains("insufficient funds") {
                EbayApiError::InsufficientFunds(detail)
            } else {
                EbayApiError::Validation(detail)
            }
        },
        _ => EbayApiError::Vendor { status, message: detail },
    }
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn filter_timestamps_are_millisecond_rfc3339() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 4, 10, 30, 0).unwrap();
        assert_eq!(format_filter_timestamp(ts), "2024-05-04T10:30:00.000Z");
    }

    #[test]
    fn auth_failures_classify_as_auth() {
        let err = classify_error_response(401, r#"{"errors":[{"message":"Invalid access token"}]}"#);
        assert!(err.is_auth());
    }

    #[test]
    fn insufficient_funds_is_detected_from_the_message() {
        let body = r#"{"errors":[{"message":"Purchase failed","longMessage":"Insufficient funds in seller account"}]}"#;
        match classify_error_response(400, body) {
            EbayApiError::InsufficientFunds(m) => assert!(m.contains("Insufficient funds")),
            other => panic!("expected InsufficientFunds, got {other:?}"),
        }
    }

    #[test]
    fn other_client_errors_are_validation() {
        let body = r#"{"errors":[{"message":"Invalid postal code"}]}"#;
        assert!(matches!(classify_error_response(400, body), EbayApiError::Validation(_)));
    }

    #[test]
    fn server_errors_are_vendor_errors() {
        let err = classify_error_response(500, "boom");
        match err {
            EbayApiError::Vendor { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            },
            other => panic!("expected Vendor, got {other:?}"),
        }
    }
}
