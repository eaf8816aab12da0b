//! # Payment Reconciliation
//!
//! Reconciles a tendered payment against a required order total.
//!
//! ## Reconciliation Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Payment Reconciliation                              │
//! │                                                                         │
//! │  CASH                                                                   │
//! │  ────                                                                   │
//! │  valid        tendered >= total                                         │
//! │  change       tendered - total                                          │
//! │  amount sent  tendered   (server records/verifies change)               │
//! │                                                                         │
//! │  CARD / TRANSFER / VOUCHER / OTHER                                      │
//! │  ─────────────────────────────────                                      │
//! │  valid        always                                                    │
//! │  change       0                                                         │
//! │  amount sent  total      (exact; no tender is asked of the user)        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{PaymentError, PaymentResult};
use crate::money::Money;
use crate::types::SalePaymentInput;

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash; the only method with a tendered amount and change.
    Cash,
    /// Card on an external terminal.
    Card,
    /// Bank transfer.
    Transfer,
    /// Gift or promotional voucher.
    Voucher,
    /// Anything else; carried with a free-text reference.
    Other,
}

impl PaymentMethod {
    /// Whether this method takes a tendered amount from the user.
    #[inline]
    pub const fn takes_tender(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

// =============================================================================
// Payment Intent
// =============================================================================

/// The cashier's chosen settlement before reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub method: PaymentMethod,

    /// Amount handed over; only meaningful for cash.
    pub tendered: Option<Money>,

    /// Free-text reference (auth code, transfer id, voucher code); only
    /// meaningful for non-cash methods.
    pub reference: Option<String>,
}

impl PaymentIntent {
    /// A cash intent with the given tendered amount.
    pub fn cash(tendered: Money) -> Self {
        PaymentIntent {
            method: PaymentMethod::Cash,
            tendered: Some(tendered),
            reference: None,
        }
    }

    /// A non-cash intent with an optional reference.
    pub fn non_cash(method: PaymentMethod, reference: Option<String>) -> Self {
        PaymentIntent {
            method,
            tendered: None,
            reference,
        }
    }

    /// Reconciles this intent against the order total.
    ///
    /// Returns the settled plan, or an error when the intent cannot cover
    /// the total. Reconciliation is pure; nothing is transmitted here.
    ///
    /// ## Example
    /// ```rust
    /// use tillpoint_core::{Money, PaymentIntent};
    ///
    /// let plan = PaymentIntent::cash(Money::from_minor_units(10000))
    ///     .reconcile(Money::from_minor_units(7500))
    ///     .unwrap();
    /// assert_eq!(plan.change, Money::from_minor_units(2500));
    /// assert_eq!(plan.amount, Money::from_minor_units(10000));
    /// ```
    pub fn reconcile(&self, total: Money) -> PaymentResult<PaymentPlan> {
        if self.method.takes_tender() {
            let tendered = self.tendered.ok_or(PaymentError::MissingTender)?;

            if tendered < total {
                return Err(PaymentError::InsufficientTender { tendered, total });
            }

            Ok(PaymentPlan {
                method: self.method,
                amount: tendered,
                change: tendered.saturating_sub_zero(total),
                reference: None,
            })
        } else {
            Ok(PaymentPlan {
                method: self.method,
                amount: total,
                change: Money::zero(),
                reference: self.reference.clone(),
            })
        }
    }
}

// =============================================================================
// Payment Plan
// =============================================================================

/// A reconciled, transmittable settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPlan {
    pub method: PaymentMethod,

    /// Amount transmitted to the settlement collaborator: the tendered
    /// amount for cash, the exact total for everything else.
    pub amount: Money,

    /// Change owed to the customer; zero for non-cash.
    pub change: Money,

    pub reference: Option<String>,
}

impl From<&PaymentPlan> for SalePaymentInput {
    fn from(plan: &PaymentPlan) -> Self {
        SalePaymentInput {
            method: plan.method,
            amount: plan.amount,
            reference: plan.reference.clone(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
