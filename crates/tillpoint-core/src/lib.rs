//! # tillpoint-core: Pure Business Logic for tillpoint
//!
//! This crate is the **heart** of tillpoint. It contains the point-of-sale
//! order engine and payment reconciliation as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       tillpoint Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 tillpoint-client (I/O layer)                    │   │
//! │  │   AuthApi ──► SessionManager      CatalogApi ──► Checkout      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ tillpoint-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   order   │  │  payment  │  │   │
//! │  │   │  Product  │  │   Money   │  │   Order   │  │ reconcile │  │   │
//! │  │   │ HeldOrder │  │   ops     │  │ OrderLine │  │ PaymentPlan│ │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, HeldOrder, sales DTOs)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`order`] - The order engine (line items bounded by stock ceilings)
//! - [`payment`] - Payment methods and tender reconciliation
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use tillpoint_core::{Money, Order, PaymentIntent};
//!
//! let mut order = Order::new();
//! # let cola = tillpoint_core::types::Product {
//! #     id: "p1".into(), name: "Cola 330ml".into(), sku: "COLA-330".into(),
//! #     barcode: None, brand: None, category: None,
//! #     price: Money::from_minor_units(250), stock: 12, is_active: true,
//! # };
//! order.add_product(&cola).unwrap();
//! order.increment("p1").unwrap();
//!
//! let intent = PaymentIntent::cash(Money::from_minor_units(1000));
//! let plan = intent.reconcile(order.total()).unwrap();
//! assert_eq!(plan.change, Money::from_minor_units(500));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod order;
pub mod payment;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{OrderError, PaymentError, ValidationError};
pub use money::Money;
pub use order::{Order, OrderLine};
pub use payment::{PaymentIntent, PaymentMethod, PaymentPlan};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single order.
///
/// Keeps a runaway cart from growing without bound; a held-order snapshot is
/// bounded by the same limit.
pub const MAX_ORDER_LINES: usize = 100;

/// Maximum length of a free-text payment reference (card auth code,
/// transfer id, voucher code).
pub const MAX_PAYMENT_REFERENCE_LEN: usize = 100;
