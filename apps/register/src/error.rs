//! # API Error Type
//!
//! Unified error type for register commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Front end                   Register                                   │
//! │  ─────────                   ────────                                   │
//! │                                                                         │
//! │  checkout({ method: 'cash', tendered: 200000 })                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command → Result<T, ApiError>                                   │  │
//! │  │                                                                  │  │
//! │  │  CoreError::InsufficientPayment ──┐                              │  │
//! │  │  DbError::Domain(CoreError) ──────┼──► ApiError { code, message }│  │
//! │  │  DbError::TransactionFailed ──────┘        (logged if internal)  │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  { "code": "PAYMENT_ERROR",                                             │
//! │    "message": "Insufficient payment: total 249750, tendered 200000" }  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use partsdesk_core::CoreError;
use partsdesk_db::DbError;

/// Error returned from register commands.
///
/// ```json
/// { "code": "NOT_FOUND", "message": "Product not found: 6f1c..." }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable message for display
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    DatabaseError,
    /// A business rule said no (shift state, overflow)
    BusinessLogic,
    Internal,
    CartError,
    InsufficientStock,
    PaymentError,
    /// No one is signed in, or the token was rejected
    Unauthenticated,
    /// Signed in, but the role may not use this screen
    Forbidden,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthenticated, message)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => ApiError::from(core),
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::validation(format!(
                "{} '{}' already exists",
                field, value
            )),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database is busy, try again")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::InsufficientPayment { .. } => ErrorCode::PaymentError,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::ProductNotFound(_) => ErrorCode::NotFound,
            CoreError::EmptyCart | CoreError::CartTooLarge { .. } => ErrorCode::CartError,
            CoreError::QuantityTooLarge { .. } | CoreError::Validation(_) => {
                ErrorCode::ValidationError
            }
            CoreError::ShiftNotOpen { .. }
            | CoreError::ShiftAlreadyOpen { .. }
            | CoreError::AmountOverflow { .. } => ErrorCode::BusinessLogic,
            CoreError::Unauthenticated => ErrorCode::Unauthenticated,
            CoreError::Forbidden { .. } => ErrorCode::Forbidden,
        };
        ApiError::new(code, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use partsdesk_core::{Money, Section, ValidationError};

    #[test]
    fn test_payment_error_code() {
        let err = ApiError::from(CoreError::InsufficientPayment {
            total: Money::from_minor(249_750),
            tendered: Money::from_minor(200_000),
        });
        assert_eq!(err.code, ErrorCode::PaymentError);
        assert!(err.message.contains("249750"));
    }

    #[test]
    fn test_domain_errors_unwrap_through_db_error() {
        let err = ApiError::from(DbError::Domain(CoreError::EmptyCart));
        assert_eq!(err.code, ErrorCode::CartError);

        let err = ApiError::from(DbError::from(ValidationError::Required {
            field: "name".into(),
        }));
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = ApiError::from(DbError::QueryFailed("no such column: secret".into()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("secret"));
    }

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::from(CoreError::Forbidden {
            role: "shopkeeper".into(),
            section: Section::Reports,
        });
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "FORBIDDEN");
        assert_eq!(json["message"], "Role shopkeeper cannot access reports");
    }
}
