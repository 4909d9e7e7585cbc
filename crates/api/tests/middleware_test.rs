use axum::http::StatusCode;
use slotbook_api::middleware::error_handling::{map_error, AppError};
use slotbook_core::errors::BookingError;

#[tokio::test]
async fn test_error_handling_not_found() {
    let error = BookingError::NotFound("booking".to_string());

    let response = map_error(error);

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_error_handling_validation() {
    let error = BookingError::Validation("start must be in the future".to_string());

    let response = map_error(error);

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_error_handling_business_rule() {
    let error = BookingError::BusinessRule("same-day reschedule is not allowed".to_string());

    let response = map_error(error);

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_error_handling_conflict() {
    let error = BookingError::Conflict("requested interval is no longer free".to_string());

    let response = map_error(error);

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_error_handling_database() {
    let error = BookingError::Database(eyre::eyre!("connection refused"));

    let response = map_error(error);

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_error_handling_internal() {
    let error = BookingError::Internal(Box::new(std::io::Error::new(
        std::io::ErrorKind::Other,
        "internal error",
    )));

    let response = map_error(error);

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_error_body_is_json_with_error_field() {
    let error = BookingError::Validation("duration must be positive".to_string());

    let response = map_error(error);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(
        body["error"],
        "Validation error: duration must be positive"
    );
}

#[tokio::test]
async fn test_app_error_from_booking_error() {
    let error = BookingError::NotFound("provider".to_string());

    let app_error: AppError = error.into();

    assert!(matches!(app_error.0, BookingError::NotFound(_)));
}

#[tokio::test]
async fn test_app_error_from_eyre_report() {
    let report = eyre::eyre!("row decode failed");

    let app_error: AppError = report.into();

    assert!(matches!(app_error.0, BookingError::Database(_)));
}
