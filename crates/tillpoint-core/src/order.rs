//! # Order Engine
//!
//! In-memory mutable cart of line items against the remote catalog.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Engine Operations                           │
//! │                                                                         │
//! │  add_product(p)     ──► new line, qty=1, ceiling = p.stock at add-time │
//! │  increment(id)      ──► qty+1, rejected at the stock ceiling           │
//! │  decrement(id)      ──► qty-1, rejected at qty 1                       │
//! │  set_quantity(id,q) ──► accepted only for 1 <= q <= ceiling            │
//! │  remove(id)         ──► unconditional line delete                      │
//! │  total()            ──► Σ unit_price × quantity                        │
//! │  snapshot()/restore ──► hold & resume (restore REPLACES the cart)      │
//! │                                                                         │
//! │  Every rejected operation leaves the order unchanged.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `product_id`; adding a duplicate is a caller error,
//!   never a silent merge
//! - `1 <= quantity <= stock_ceiling` on every line at all times
//! - Reaching quantity zero is only possible via `remove`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{OrderError, OrderResult};
use crate::money::Money;
use crate::types::{HeldOrderLine, HeldOrderSnapshot, Product, SaleLineInput};
use crate::MAX_ORDER_LINES;

// =============================================================================
// Order Line
// =============================================================================

/// A line item in the order.
///
/// Product data is frozen at add-time (snapshot pattern): a catalog update
/// after the line was added changes neither the displayed name, the unit
/// price, nor the stock ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Catalog product id.
    pub product_id: String,

    /// Display name at add-time (frozen).
    pub name: String,

    /// SKU at add-time (frozen).
    pub sku: String,

    /// Unit price at add-time (frozen).
    pub unit_price: Money,

    /// Quantity, always within `1..=stock_ceiling`.
    pub quantity: i64,

    /// Maximum quantity permitted, captured from catalog stock at add-time.
    pub stock_ceiling: i64,

    /// When this line was added.
    pub added_at: DateTime<Utc>,
}

impl OrderLine {
    fn from_product(product: &Product) -> Self {
        OrderLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            sku: product.sku.clone(),
            unit_price: product.price,
            quantity: 1,
            stock_ceiling: product.stock,
            added_at: Utc::now(),
        }
    }

    /// Line total: `unit_price × quantity`.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

impl From<&OrderLine> for HeldOrderLine {
    fn from(line: &OrderLine) -> Self {
        HeldOrderLine {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            sku: line.sku.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            stock_ceiling: line.stock_ceiling,
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// The in-memory order being built at the register.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    lines: Vec<OrderLine>,
}

impl Order {
    /// Creates a new empty order.
    pub fn new() -> Self {
        Order { lines: Vec::new() }
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Adds a catalog product as a new line with quantity 1.
    ///
    /// The product's current stock becomes the line's quantity ceiling.
    /// Adding a product that is already in the order is a caller error; the
    /// UI increments the existing line instead.
    pub fn add_product(&mut self, product: &Product) -> OrderResult<()> {
        if self.lines.iter().any(|l| l.product_id == product.id) {
            return Err(OrderError::AlreadyInOrder(product.id.clone()));
        }

        if product.stock < 1 {
            return Err(OrderError::OutOfStock {
                sku: product.sku.clone(),
            });
        }

        if self.lines.len() >= MAX_ORDER_LINES {
            return Err(OrderError::TooManyLines {
                max: MAX_ORDER_LINES,
            });
        }

        self.lines.push(OrderLine::from_product(product));
        Ok(())
    }

    /// Increments a line's quantity by one.
    ///
    /// Rejected without mutation when the line already sits at its stock
    /// ceiling. Returns the new quantity.
    pub fn increment(&mut self, product_id: &str) -> OrderResult<i64> {
        let line = self.line_mut(product_id)?;

        if line.quantity >= line.stock_ceiling {
            return Err(OrderError::StockCeilingReached {
                sku: line.sku.clone(),
                ceiling: line.stock_ceiling,
            });
        }

        line.quantity += 1;
        Ok(line.quantity)
    }

    /// Decrements a line's quantity by one.
    ///
    /// Rejected without mutation at quantity 1; dropping to zero is only
    /// possible via [`Order::remove`]. Returns the new quantity.
    pub fn decrement(&mut self, product_id: &str) -> OrderResult<i64> {
        let line = self.line_mut(product_id)?;

        if line.quantity <= 1 {
            return Err(OrderError::MinimumQuantity {
                sku: line.sku.clone(),
            });
        }

        line.quantity -= 1;
        Ok(line.quantity)
    }

    /// Sets a line's quantity directly (cashier typed a number).
    ///
    /// Accepted only for `1 <= quantity <= ceiling`; otherwise the edit is
    /// discarded and the prior quantity retained.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> OrderResult<()> {
        let line = self.line_mut(product_id)?;

        if quantity < 1 || quantity > line.stock_ceiling {
            return Err(OrderError::QuantityOutOfRange {
                sku: line.sku.clone(),
                requested: quantity,
                ceiling: line.stock_ceiling,
            });
        }

        line.quantity = quantity;
        Ok(())
    }

    /// Removes a line unconditionally.
    pub fn remove(&mut self, product_id: &str) -> OrderResult<()> {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);

        if self.lines.len() == before {
            return Err(OrderError::LineNotFound(product_id.to_string()));
        }
        Ok(())
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Order total: Σ `unit_price × quantity` over all lines.
    pub fn total(&self) -> Money {
        self.lines.iter().map(OrderLine::line_total).sum()
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Checks if the order has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Read access to the lines, in add order.
    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// Looks up a line by product id.
    pub fn line(&self, product_id: &str) -> Option<&OrderLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    fn line_mut(&mut self, product_id: &str) -> OrderResult<&mut OrderLine> {
        self.lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or_else(|| OrderError::LineNotFound(product_id.to_string()))
    }

    // -------------------------------------------------------------------------
    // Hold / Resume
    // -------------------------------------------------------------------------

    /// Freezes the current lines into a held-order snapshot.
    ///
    /// The order itself is not mutated; clearing after a successful hold is
    /// the caller's decision (save-and-clear lives in the checkout service).
    pub fn snapshot(&self, customer_id: Option<String>) -> HeldOrderSnapshot {
        HeldOrderSnapshot {
            customer_id,
            lines: self.lines.iter().map(HeldOrderLine::from).collect(),
        }
    }

    /// Replaces the entire order contents with a held-order snapshot.
    ///
    /// Last-resume-wins: any lines already present are dropped, never
    /// merged.
    pub fn restore(&mut self, lines: &[HeldOrderLine]) {
        let now = Utc::now();
        self.lines = lines
            .iter()
            .map(|l| OrderLine {
                product_id: l.product_id.clone(),
                name: l.name.clone(),
                sku: l.sku.clone(),
                unit_price: l.unit_price,
                quantity: l.quantity,
                stock_ceiling: l.stock_ceiling,
                added_at: now,
            })
            .collect();
    }

    /// Lines shaped for the settlement API.
    pub fn sale_lines(&self) -> Vec<SaleLineInput> {
        self.lines
            .iter()
            .map(|l| SaleLineInput {
                product_id: l.product_id.clone(),
                quantity: l.quantity,
                unit_price: l.unit_price,
            })
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
