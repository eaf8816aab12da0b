//! # Error Types
//!
//! Domain-specific error types for tillpoint-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tillpoint-core errors (this file)                                      │
//! │  ├── OrderError       - Order engine rule violations                    │
//! │  ├── PaymentError     - Tender reconciliation failures                  │
//! │  └── ValidationError  - Field-level input validation failures           │
//! │                                                                         │
//! │  tillpoint-store errors (separate crate)                                │
//! │  └── StoreError       - Key-value persistence failures                  │
//! │                                                                         │
//! │  tillpoint-client errors (separate crate)                               │
//! │  └── ClientError      - API / network / session failures                │
//! │                                                                         │
//! │  Flow: ValidationError → OrderError/PaymentError → ClientError → caller │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Order Error
// =============================================================================

/// Order engine rule violations.
///
/// Every failed operation leaves the order untouched; an `Err` is a
/// rejection, never a partial mutation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// The product is already a line in the order. Adding is not a merge;
    /// callers increment the existing line instead.
    #[error("Product {0} is already in the order")]
    AlreadyInOrder(String),

    /// No line exists for the given product.
    #[error("Product {0} is not in the order")]
    LineNotFound(String),

    /// The catalog reported no sellable stock, so no line can satisfy
    /// quantity >= 1.
    #[error("Product {sku} is out of stock")]
    OutOfStock { sku: String },

    /// Increment would push the quantity past the stock ceiling captured at
    /// add-time.
    #[error("Quantity for {sku} is capped at {ceiling} by available stock")]
    StockCeilingReached { sku: String, ceiling: i64 },

    /// Decrement would drop the quantity below one. Removing the line is a
    /// distinct operation.
    #[error("Quantity for {sku} cannot go below 1; remove the line instead")]
    MinimumQuantity { sku: String },

    /// Direct quantity edit outside `1..=ceiling`; the prior quantity is
    /// retained.
    #[error("Quantity {requested} for {sku} must be between 1 and {ceiling}")]
    QuantityOutOfRange {
        sku: String,
        requested: i64,
        ceiling: i64,
    },

    /// Order has reached the maximum number of lines.
    #[error("Order cannot have more than {max} lines")]
    TooManyLines { max: usize },

    /// The operation requires at least one line (hold, settle).
    #[error("Order has no lines")]
    Empty,
}

// =============================================================================
// Payment Error
// =============================================================================

/// Tender reconciliation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentError {
    /// Cash payments require a tendered amount.
    #[error("Cash payment requires a tendered amount")]
    MissingTender,

    /// Cash tendered below the order total.
    #[error("Tendered {tendered} is less than the total {total}")]
    InsufficientTender { tendered: Money, total: Money },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Field-level input validation errors.
///
/// These are local and block submission; they are never sent over the
/// network.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (bad email, bad characters in a SKU, ...).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience alias for order engine results.
pub type OrderResult<T> = Result<T, OrderError>;

/// Convenience alias for reconciliation results.
pub type PaymentResult<T> = Result<T, PaymentError>;

/// Convenience alias for validation results.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_error_messages() {
        let err = OrderError::StockCeilingReached {
            sku: "COLA-330".to_string(),
            ceiling: 3,
        };
        assert_eq!(
            err.to_string(),
            "Quantity for COLA-330 is capped at 3 by available stock"
        );
    }

    #[test]
    fn test_payment_error_messages() {
        let err = PaymentError::InsufficientTender {
            tendered: Money::from_minor_units(5000),
            total: Money::from_minor_units(7500),
        };
        assert_eq!(err.to_string(), "Tendered 50.00 is less than the total 75.00");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "email".to_string(),
        };
        assert_eq!(err.to_string(), "email is required");
    }
}
