//! # Validation Module
//!
//! Field-level input validation for tillpoint.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE (local, field-level)                              │
//! │  ├── Blocks submission before any network round-trip                    │
//! │  └── Errors are never sent to the server                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Remote API (server-side)                                      │
//! │  └── Structured errors surfaced verbatim (message + field details)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tillpoint_core::validation::{validate_sku, validate_email};
//!
//! validate_sku("COLA-330").unwrap();
//! assert!(validate_email("not-an-email").is_err());
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::money::Money;
use crate::types::{CustomerInput, ProductInput};
use crate::MAX_PAYMENT_REFERENCE_LEN;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU.
///
/// ## Rules
/// - Must not be empty, at most 50 characters
/// - Alphanumeric characters, hyphens, and underscores only
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a display name (product or customer).
///
/// ## Rules
/// - Must not be empty, at most 200 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// Format check only (one `@` with text on both sides); deliverability is
/// the server's problem.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();

    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@example.com".to_string(),
        });
    }

    Ok(())
}

/// Validates a free-text payment reference.
pub fn validate_payment_reference(reference: &str) -> ValidationResult<()> {
    if reference.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "reference".to_string(),
        });
    }

    if reference.len() > MAX_PAYMENT_REFERENCE_LEN {
        return Err(ValidationError::TooLong {
            field: "reference".to_string(),
            max: MAX_PAYMENT_REFERENCE_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price entered in a product form.
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }
    Ok(())
}

/// Validates a tendered cash amount entered at the register.
pub fn validate_tendered(tendered: Money) -> ValidationResult<()> {
    if !tendered.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "tendered".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Form Validators
// =============================================================================

/// Validates a product create/update payload before it is sent.
pub fn validate_product_input(input: &ProductInput) -> ValidationResult<()> {
    validate_name("name", &input.name)?;
    validate_sku(&input.sku)?;
    validate_price(input.price)?;

    if input.stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a customer create/update payload before it is sent.
pub fn validate_customer_input(input: &CustomerInput) -> ValidationResult<()> {
    validate_name("name", &input.name)?;

    if let Some(email) = input.email.as_deref() {
        validate_email(email)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("COLA-330").is_ok());
        assert!(validate_sku("  COLA_330  ").is_ok());
        assert!(validate_sku("").is_err());
        assert!(validate_sku(&"A".repeat(51)).is_err());
        assert!(validate_sku("COLA 330").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("maria@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("name@nodot").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn test_validate_tendered() {
        assert!(validate_tendered(Money::from_minor_units(100)).is_ok());
        assert!(validate_tendered(Money::zero()).is_err());
        assert!(validate_tendered(Money::from_minor_units(-5)).is_err());
    }

    #[test]
    fn test_validate_product_input() {
        let input = ProductInput {
            name: "Cola 330ml".to_string(),
            sku: "COLA-330".to_string(),
            barcode: None,
            brand: None,
            category: None,
            price: Money::from_minor_units(250),
            stock: 12,
            is_active: true,
        };
        assert!(validate_product_input(&input).is_ok());

        let negative_stock = ProductInput { stock: -1, ..input };
        assert!(validate_product_input(&negative_stock).is_err());
    }

    #[test]
    fn test_validate_customer_input() {
        let input = CustomerInput {
            name: "Maria Lopez".to_string(),
            email: Some("maria@example.com".to_string()),
            phone: None,
            address: None,
        };
        assert!(validate_customer_input(&input).is_ok());

        let bad_email = CustomerInput {
            email: Some("nope".to_string()),
            ..input
        };
        assert!(validate_customer_input(&bad_email).is_err());
    }
}
