//! # Domain Types
//!
//! Core domain types shared between the order engine and the API layer.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Customer     │   │   HeldOrder     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id (server)    │       │
//! │  │  sku / barcode  │   │  contact fields │   │  customer_id    │       │
//! │  │  price (Money)  │   │  purchase aggr. │   │  line snapshot  │       │
//! │  │  stock          │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  Sales wire DTOs: SaleLineInput / SalePaymentInput / SaleReceipt        │
//! │  Read models:     StockMovement / SalesStatistics                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All wire-facing structs serialize camelCase; the remote API is a JSON
//! contract owned by the server and consumed opaquely here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::payment::PaymentMethod;

// =============================================================================
// Product
// =============================================================================

/// A catalog product as returned by the remote catalog API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Server-issued identifier.
    pub id: String,

    /// Display name shown to the cashier and on receipts.
    pub name: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Barcode (EAN-13, UPC-A, ...).
    pub barcode: Option<String>,

    /// Brand name, if categorized.
    pub brand: Option<String>,

    /// Category name, if categorized.
    pub category: Option<String>,

    /// Unit price in minor currency units.
    pub price: Money,

    /// Current stock level as known by the server.
    pub stock: i64,

    /// Whether the product is active (soft delete).
    pub is_active: bool,
}

impl Product {
    /// Checks whether at least one unit can be sold.
    #[inline]
    pub fn is_sellable(&self) -> bool {
        self.is_active && self.stock > 0
    }
}

/// Input payload for creating or updating a catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub sku: String,
    pub barcode: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub price: Money,
    pub stock: i64,
    pub is_active: bool,
}

// =============================================================================
// Stock History
// =============================================================================

/// One server-recorded stock movement for a product.
///
/// Stock history is computed and stored server-side; this is a read model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: String,
    pub product_id: String,
    /// Signed quantity delta (+receipt, -sale, ...).
    pub delta: i64,
    /// Server-side reason code ("sale", "restock", "adjustment", ...).
    pub reason: String,
    /// Stock level after the movement was applied.
    pub stock_after: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Customer
// =============================================================================

/// A customer record with server-computed purchase aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Number of completed sales attributed to this customer.
    pub purchase_count: i64,
    /// Lifetime spend across those sales.
    pub total_spent: Money,
    pub last_purchase_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Input payload for creating or updating a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

// =============================================================================
// Sales Wire DTOs
// =============================================================================

/// A line item as sent to the settlement API.
///
/// Uses the snapshot pattern: the price transmitted is the price frozen at
/// add-time, so a catalog price change mid-checkout cannot move the total.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineInput {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: Money,
}

/// A payment as sent to the settlement API.
///
/// For cash the amount is the tendered amount (the server records change);
/// for every other method it is the exact order total.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalePaymentInput {
    pub method: PaymentMethod,
    pub amount: Money,
    pub reference: Option<String>,
}

/// Request payload for creating a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleRequest {
    /// Client-generated reference; lets the server deduplicate a resubmitted
    /// settlement.
    pub client_reference: String,
    pub customer_id: Option<String>,
    pub items: Vec<SaleLineInput>,
    pub payments: Vec<SalePaymentInput>,
}

/// Server response for a completed sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleReceipt {
    pub id: String,
    pub receipt_number: String,
    pub total: Money,
    /// Change owed to the customer (zero for non-cash settlements).
    pub change: Money,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sales Statistics
// =============================================================================

/// Inclusive date range for statistics queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Per-method breakdown row inside [`SalesStatistics`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodBreakdown {
    pub method: PaymentMethod,
    pub sale_count: i64,
    pub total: Money,
}

/// Server-computed sales statistics for a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesStatistics {
    pub range: DateRange,
    pub sale_count: i64,
    pub total: Money,
    pub average_sale: Money,
    pub by_method: Vec<MethodBreakdown>,
}

// =============================================================================
// Held Orders
// =============================================================================

/// A frozen line inside a held order.
///
/// Carries the stock ceiling captured when the line was first added, so a
/// resumed order re-establishes the same quantity invariants it was held
/// with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeldOrderLine {
    pub product_id: String,
    pub name: String,
    pub sku: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub stock_ceiling: i64,
}

/// A paused checkout persisted remotely.
///
/// Immutable once created; it is consumed by resuming (restored into the
/// active order, then deleted) or deleted outright.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeldOrder {
    /// Server-issued identifier.
    pub id: String,
    pub customer_id: Option<String>,
    pub lines: Vec<HeldOrderLine>,
    pub created_at: DateTime<Utc>,
}

/// Client-side snapshot handed to the persistence collaborator when holding.
///
/// The server assigns the id and timestamp and answers with a [`HeldOrder`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeldOrderSnapshot {
    pub customer_id: Option<String>,
    pub lines: Vec<HeldOrderLine>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i64, active: bool) -> Product {
        Product {
            id: "p1".to_string(),
            name: "Cola 330ml".to_string(),
            sku: "COLA-330".to_string(),
            barcode: None,
            brand: None,
            category: None,
            price: Money::from_minor_units(250),
            stock,
            is_active: active,
        }
    }

    #[test]
    fn test_sellable() {
        assert!(product(3, true).is_sellable());
        assert!(!product(0, true).is_sellable());
        assert!(!product(3, false).is_sellable());
    }

    #[test]
    fn test_product_wire_shape() {
        let json = serde_json::to_value(product(3, true)).unwrap();
        // Wire contract fields per the remote catalog API
        assert_eq!(json["sku"], "COLA-330");
        assert_eq!(json["price"], 250);
        assert_eq!(json["isActive"], true);
    }

    #[test]
    fn test_held_order_roundtrip() {
        let held = HeldOrder {
            id: "h1".to_string(),
            customer_id: Some("c1".to_string()),
            lines: vec![HeldOrderLine {
                product_id: "p1".to_string(),
                name: "Cola 330ml".to_string(),
                sku: "COLA-330".to_string(),
                unit_price: Money::from_minor_units(250),
                quantity: 2,
                stock_ceiling: 12,
            }],
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&held).unwrap();
        let back: HeldOrder = serde_json::from_str(&json).unwrap();
        assert_eq!(back.lines, held.lines);
    }
}
