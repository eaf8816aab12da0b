//! # Checkout Service
//!
//! Drives the pure order engine against the remote settlement and
//! held-order collaborators.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Checkout Flow                                   │
//! │                                                                         │
//! │  Cashier scans ──► add_product / increment / set_quantity / remove     │
//! │       │             (synchronous, in-memory, bounded by stock)         │
//! │       ▼                                                                 │
//! │  ┌──────────────┐   hold   ┌──────────────────┐                        │
//! │  │ active Order │─────────►│ held order (API) │ cart cleared on OK     │
//! │  │              │◄─────────│                  │ cart REPLACED on       │
//! │  └──────┬───────┘  resume  └──────────────────┘ resume (no merge)      │
//! │         │                                                               │
//! │         │ settle(intent)                                                │
//! │         ▼                                                               │
//! │  reconcile locally (invalid tender never leaves the client)            │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  create sale (items + reconciled payment) ──► cart cleared on OK       │
//! │                                                                         │
//! │  EVERY remote failure leaves the in-memory cart exactly as it was.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use uuid::Uuid;

use tillpoint_core::error::OrderError;
use tillpoint_core::types::{
    CreateSaleRequest, HeldOrder, HeldOrderSnapshot, Product, SaleReceipt,
};
use tillpoint_core::{Money, Order, OrderLine, PaymentIntent, SalePaymentInput};

use crate::error::ClientResult;

// =============================================================================
// Settlement Gateway Seam
// =============================================================================

/// The remote persistence and settlement collaborator.
///
/// [`crate::api::SalesApi`] is the production implementation; tests drive
/// the checkout against in-memory doubles.
#[async_trait]
pub trait SettlementGateway: Send + Sync {
    /// Records a finalized sale.
    async fn create_sale(&self, request: &CreateSaleRequest) -> ClientResult<SaleReceipt>;

    /// Persists a held-order snapshot; the server issues the id.
    async fn save_held_order(&self, snapshot: &HeldOrderSnapshot) -> ClientResult<HeldOrder>;

    /// Fetches a held order by id.
    async fn fetch_held_order(&self, held_id: &str) -> ClientResult<HeldOrder>;

    /// Deletes a held order by id.
    async fn delete_held_order(&self, held_id: &str) -> ClientResult<()>;
}

// =============================================================================
// Checkout
// =============================================================================

/// A register session: one active order plus its remote collaborators.
///
/// Mutations are synchronous and purely in-memory; only
/// [`Checkout::hold`], [`Checkout::resume`], and [`Checkout::settle`] cross
/// the network, and each leaves the cart untouched on failure.
pub struct Checkout {
    gateway: Arc<dyn SettlementGateway>,
    order: Order,
    customer_id: Option<String>,
}

impl Checkout {
    /// Creates an empty register session over the given gateway.
    pub fn new(gateway: Arc<dyn SettlementGateway>) -> Self {
        Checkout {
            gateway,
            order: Order::new(),
            customer_id: None,
        }
    }

    // -------------------------------------------------------------------------
    // In-Memory Mutations (delegated to the order engine)
    // -------------------------------------------------------------------------

    /// Adds a catalog product as a quantity-1 line.
    pub fn add_product(&mut self, product: &Product) -> ClientResult<()> {
        Ok(self.order.add_product(product)?)
    }

    /// Increments a line quantity, bounded by its stock ceiling.
    pub fn increment(&mut self, product_id: &str) -> ClientResult<i64> {
        Ok(self.order.increment(product_id)?)
    }

    /// Decrements a line quantity, bounded below by 1.
    pub fn decrement(&mut self, product_id: &str) -> ClientResult<i64> {
        Ok(self.order.decrement(product_id)?)
    }

    /// Sets a line quantity directly.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> ClientResult<()> {
        Ok(self.order.set_quantity(product_id, quantity)?)
    }

    /// Removes a line.
    pub fn remove(&mut self, product_id: &str) -> ClientResult<()> {
        Ok(self.order.remove(product_id)?)
    }

    /// Attaches a customer to the order.
    pub fn set_customer(&mut self, customer_id: Option<String>) {
        self.customer_id = customer_id;
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Current order total.
    pub fn total(&self) -> Money {
        self.order.total()
    }

    /// Current order lines.
    pub fn lines(&self) -> &[OrderLine] {
        self.order.lines()
    }

    /// Whether the order has no lines.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Attached customer, if any.
    pub fn customer_id(&self) -> Option<&str> {
        self.customer_id.as_deref()
    }

    // -------------------------------------------------------------------------
    // Remote Operations
    // -------------------------------------------------------------------------

    /// Holds the current order: snapshot, persist remotely, then clear.
    ///
    /// Save-and-clear: on success the register is empty and ready for the
    /// next customer. On failure the cart is unchanged.
    pub async fn hold(&mut self) -> ClientResult<HeldOrder> {
        if self.order.is_empty() {
            return Err(OrderError::Empty.into());
        }

        let snapshot = self.order.snapshot(self.customer_id.clone());
        let held = self.gateway.save_held_order(&snapshot).await?;

        self.order.clear();
        self.customer_id = None;
        info!(held_id = %held.id, "Order held, register cleared");
        Ok(held)
    }

    /// Resumes a held order, replacing the entire current cart.
    ///
    /// Last-resume-wins: existing lines are dropped, never merged. The held
    /// order is consumed with a best-effort delete; a failed delete leaves
    /// a stale snapshot server-side but the cart is already correct.
    pub async fn resume(&mut self, held_id: &str) -> ClientResult<()> {
        let held = self.gateway.fetch_held_order(held_id).await?;

        self.order.restore(&held.lines);
        self.customer_id = held.customer_id.clone();
        info!(held_id = %held.id, lines = held.lines.len(), "Held order resumed");

        if let Err(e) = self.gateway.delete_held_order(held_id).await {
            warn!(held_id = %held_id, error = %e, "Could not delete resumed held order");
        }
        Ok(())
    }

    /// Settles the order with the given payment intent.
    ///
    /// Reconciliation happens locally first: an invalid cash tender fails
    /// before any network round-trip. On success the cart is cleared; on
    /// remote failure it is unchanged.
    pub async fn settle(&mut self, intent: &PaymentIntent) -> ClientResult<SaleReceipt> {
        if self.order.is_empty() {
            return Err(OrderError::Empty.into());
        }

        let total = self.order.total();
        let plan = intent.reconcile(total)?;
        debug!(total = %total, amount = %plan.amount, change = %plan.change, "Payment reconciled");

        let request = CreateSaleRequest {
            client_reference: Uuid::new_v4().to_string(),
            customer_id: self.customer_id.clone(),
            items: self.order.sale_lines(),
            payments: vec![SalePaymentInput::from(&plan)],
        };

        let receipt = self.gateway.create_sale(&request).await?;

        self.order.clear();
        self.customer_id = None;
        info!(sale_id = %receipt.id, "Sale settled, register cleared");
        Ok(receipt)
    }
}

impl std::fmt::Debug for Checkout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checkout")
            .field("lines", &self.order.line_count())
            .field("customer_id", &self.customer_id)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    use chrono::Utc;
    use tokio::sync::Mutex;

    use tillpoint_core::error::PaymentError;
    use tillpoint_core::PaymentMethod;

    use crate::error::{ApiErrorBody, ClientError};

    /// In-memory gateway double with switchable failure.
    #[derive(Default)]
    struct InMemoryGateway {
        held: Mutex<HashMap<String, HeldOrder>>,
        sales: Mutex<Vec<CreateSaleRequest>>,
        next_id: AtomicU64,
        fail_next: AtomicBool,
    }

    impl InMemoryGateway {
        fn fail_next(&self) {
            self.fail_next.store(true, Ordering::SeqCst);
        }

        fn check_failure(&self) -> ClientResult<()> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(ClientError::api(
                    500,
                    ApiErrorBody {
                        message: "induced failure".to_string(),
                        details: Default::default(),
                    },
                ));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl SettlementGateway for InMemoryGateway {
        async fn create_sale(&self, request: &CreateSaleRequest) -> ClientResult<SaleReceipt> {
            self.check_failure()?;
            self.sales.lock().await.push(request.clone());

            let total: Money = request
                .items
                .iter()
                .map(|i| i.unit_price.multiply_quantity(i.quantity))
                .sum();
            let paid: Money = request.payments.iter().map(|p| p.amount).sum();

            Ok(SaleReceipt {
                id: format!("sale-{}", self.next_id.fetch_add(1, Ordering::SeqCst)),
                receipt_number: "R-0001".to_string(),
                total,
                change: paid.saturating_sub_zero(total),
                created_at: Utc::now(),
            })
        }

        async fn save_held_order(&self, snapshot: &HeldOrderSnapshot) -> ClientResult<HeldOrder> {
            self.check_failure()?;
            let id = format!("held-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
            let held = HeldOrder {
                id: id.clone(),
                customer_id: snapshot.customer_id.clone(),
                lines: snapshot.lines.clone(),
                created_at: Utc::now(),
            };
            self.held.lock().await.insert(id, held.clone());
            Ok(held)
        }

        async fn fetch_held_order(&self, held_id: &str) -> ClientResult<HeldOrder> {
            self.check_failure()?;
            self.held.lock().await.get(held_id).cloned().ok_or_else(|| {
                ClientError::api(
                    404,
                    ApiErrorBody {
                        message: format!("held order {} not found", held_id),
                        details: Default::default(),
                    },
                )
            })
        }

        async fn delete_held_order(&self, held_id: &str) -> ClientResult<()> {
            self.check_failure()?;
            self.held.lock().await.remove(held_id);
            Ok(())
        }
    }

    fn product(id: &str, price: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            sku: format!("SKU-{}", id),
            barcode: None,
            brand: None,
            category: None,
            price: Money::from_minor_units(price),
            stock,
            is_active: true,
        }
    }

    fn checkout() -> (Checkout, Arc<InMemoryGateway>) {
        let gateway = Arc::new(InMemoryGateway::default());
        (Checkout::new(gateway.clone()), gateway)
    }

    #[tokio::test]
    async fn test_full_register_scenario() {
        let (mut checkout, gateway) = checkout();

        // A has stock 3, B has stock 1
        let a = product("a", 250, 3);
        let b = product("b", 1099, 1);

        checkout.add_product(&a).unwrap();
        checkout.add_product(&b).unwrap();
        checkout.increment("a").unwrap();

        // B sits at its ceiling of 1: the increment is rejected unchanged
        assert!(checkout.increment("b").is_err());
        assert_eq!(
            checkout.lines().iter().find(|l| l.product_id == "b").unwrap().quantity,
            1
        );

        // total = 2×priceA + 1×priceB
        assert_eq!(checkout.total(), Money::from_minor_units(2 * 250 + 1099));

        // Hold: register cleared, snapshot has both lines
        let held = checkout.hold().await.unwrap();
        assert!(checkout.is_empty());
        assert_eq!(held.lines.len(), 2);

        // Resume: exactly those lines with original quantities
        checkout.resume(&held.id).await.unwrap();
        assert_eq!(checkout.lines().len(), 2);
        assert_eq!(
            checkout.lines().iter().find(|l| l.product_id == "a").unwrap().quantity,
            2
        );
        assert_eq!(
            checkout.lines().iter().find(|l| l.product_id == "b").unwrap().quantity,
            1
        );
        assert_eq!(checkout.total(), Money::from_minor_units(1599));

        // The held order was consumed
        assert!(gateway.held.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_settle_cash_with_change() {
        let (mut checkout, gateway) = checkout();
        checkout.add_product(&product("a", 7500, 10)).unwrap();

        let receipt = checkout
            .settle(&PaymentIntent::cash(Money::from_minor_units(10000)))
            .await
            .unwrap();

        assert_eq!(receipt.change, Money::from_minor_units(2500));
        assert!(checkout.is_empty());

        // Cash transmits the tendered amount
        let sales = gateway.sales.lock().await;
        assert_eq!(sales[0].payments[0].amount, Money::from_minor_units(10000));
    }

    #[tokio::test]
    async fn test_settle_card_sends_exact_total() {
        let (mut checkout, gateway) = checkout();
        checkout.add_product(&product("a", 7500, 10)).unwrap();

        checkout
            .settle(&PaymentIntent::non_cash(
                PaymentMethod::Card,
                Some("AUTH-9".to_string()),
            ))
            .await
            .unwrap();

        let sales = gateway.sales.lock().await;
        assert_eq!(sales[0].payments[0].amount, Money::from_minor_units(7500));
        assert_eq!(sales[0].payments[0].reference.as_deref(), Some("AUTH-9"));
    }

    #[tokio::test]
    async fn test_settle_insufficient_cash_never_reaches_gateway() {
        let (mut checkout, gateway) = checkout();
        checkout.add_product(&product("a", 7500, 10)).unwrap();

        let err = checkout
            .settle(&PaymentIntent::cash(Money::from_minor_units(5000)))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ClientError::Payment(PaymentError::InsufficientTender { .. })
        ));
        // Nothing was transmitted and the cart is intact
        assert!(gateway.sales.lock().await.is_empty());
        assert_eq!(checkout.lines().len(), 1);
    }

    #[tokio::test]
    async fn test_settle_failure_leaves_cart_unchanged() {
        let (mut checkout, gateway) = checkout();
        checkout.add_product(&product("a", 7500, 10)).unwrap();
        checkout.increment("a").unwrap();

        gateway.fail_next();
        let err = checkout
            .settle(&PaymentIntent::cash(Money::from_minor_units(20000)))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Api { status: 500, .. }));
        assert_eq!(checkout.lines().len(), 1);
        assert_eq!(checkout.lines()[0].quantity, 2);
        assert_eq!(checkout.total(), Money::from_minor_units(15000));
    }

    #[tokio::test]
    async fn test_hold_failure_leaves_cart_unchanged() {
        let (mut checkout, gateway) = checkout();
        checkout.set_customer(Some("c1".to_string()));
        checkout.add_product(&product("a", 250, 3)).unwrap();

        gateway.fail_next();
        assert!(checkout.hold().await.is_err());

        assert_eq!(checkout.lines().len(), 1);
        assert_eq!(checkout.customer_id(), Some("c1"));
        assert!(gateway.held.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_hold_empty_order_is_rejected() {
        let (mut checkout, _gateway) = checkout();
        let err = checkout.hold().await.unwrap_err();
        assert!(matches!(err, ClientError::Order(OrderError::Empty)));
    }

    #[tokio::test]
    async fn test_resume_replaces_non_empty_cart() {
        let (mut checkout, _gateway) = checkout();

        // Hold a two-line order
        checkout.add_product(&product("a", 250, 3)).unwrap();
        checkout.add_product(&product("b", 1099, 1)).unwrap();
        let held = checkout.hold().await.unwrap();

        // Start a different order, then resume over it
        checkout.add_product(&product("z", 100, 9)).unwrap();
        checkout.resume(&held.id).await.unwrap();

        // Replace, not merge
        assert_eq!(checkout.lines().len(), 2);
        assert!(checkout.lines().iter().all(|l| l.product_id != "z"));
    }

    #[tokio::test]
    async fn test_resume_unknown_held_order_leaves_cart() {
        let (mut checkout, _gateway) = checkout();
        checkout.add_product(&product("a", 250, 3)).unwrap();

        let err = checkout.resume("held-missing").await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 404, .. }));
        assert_eq!(checkout.lines().len(), 1);
    }
}
