use crate::module::verification::error::AppError;
use crate::module::verification::schema::VerificationRequest;

pub fn validate_verification_request(request: &VerificationRequest) -> Result<(), AppError> {
    if request.data_id.trim().is_empty() {
        return Err(AppError::bad_request(
            "VALIDATION_ERROR",
            "data_id is required",
        ));
    }
    if request.metadata.service_id.trim().is_empty() {
        return Err(AppError::bad_request(
            "VALIDATION_ERROR",
            "metadata.service_id is required",
        ));
    }
    if request.metadata.timestamp.trim().is_empty() {
        return Err(AppError::bad_request(
            "VALIDATION_ERROR",
            "metadata.timestamp is required",
        ));
    }
    if !request.payload.is_object() {
        return Err(AppError::bad_request(
            "VALIDATION_ERROR",
            "payload must be a json object",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::verification::schema::{DataType, Priority, RequestMetadata};
    use serde_json::json;

    fn valid_request() -> VerificationRequest {
        VerificationRequest {
            data_id: "acc-1".to_string(),
            data_type: DataType::Accessibility,
            payload: json!({"captions": true}),
            metadata: RequestMetadata {
                service_id: "accessibility-settings".to_string(),
                user_id: None,
                timestamp: "2026-01-01T00:00:00Z".to_string(),
                priority: Priority::Normal,
            },
        }
    }

    #[test]
    fn accepts_valid_request() {
        assert!(validate_verification_request(&valid_request()).is_ok());
    }

    #[test]
    fn rejects_blank_data_id() {
        let mut request = valid_request();
        request.data_id = "  ".to_string();
        let err = validate_verification_request(&request).unwrap_err();
        assert_eq!(err.code, "VALIDATION_ERROR");
    }

    #[test]
    fn rejects_non_object_payload() {
        let mut request = valid_request();
        request.payload = json!("just a string");
        assert!(validate_verification_request(&request).is_err());
    }
}
