//! # Sales API Client
//!
//! Sale creation, statistics, and held-orders CRUD. Implements the
//! [`SettlementGateway`] seam the checkout service drives.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use tillpoint_core::types::{
    CreateSaleRequest, DateRange, HeldOrder, HeldOrderSnapshot, SaleReceipt, SalesStatistics,
};

use crate::checkout::SettlementGateway;
use crate::error::ClientResult;
use crate::http::Http;
use crate::session::SessionManager;

/// REST sales client.
#[derive(Debug, Clone)]
pub struct SalesApi {
    http: Http,
    session: Arc<SessionManager>,
}

impl SalesApi {
    pub fn new(http: Http, session: Arc<SessionManager>) -> Self {
        SalesApi { http, session }
    }

    /// Queries server-computed sales statistics for a date range.
    pub async fn statistics(&self, range: DateRange) -> ClientResult<SalesStatistics> {
        let token = self.session.access_token().await?;
        self.http
            .get(
                "sales/statistics",
                Some(&token),
                &[
                    ("from", range.from.to_rfc3339()),
                    ("to", range.to.to_rfc3339()),
                ],
            )
            .await
    }

    /// Lists held orders, newest first (server ordering).
    pub async fn held_orders(&self) -> ClientResult<Vec<HeldOrder>> {
        let token = self.session.access_token().await?;
        self.http.get("sales/held", Some(&token), &[]).await
    }
}

#[async_trait]
impl SettlementGateway for SalesApi {
    async fn create_sale(&self, request: &CreateSaleRequest) -> ClientResult<SaleReceipt> {
        let token = self.session.access_token().await?;
        debug!(
            items = request.items.len(),
            payments = request.payments.len(),
            "Creating sale"
        );

        let receipt: SaleReceipt = self.http.post("sales", Some(&token), request).await?;
        info!(sale_id = %receipt.id, total = %receipt.total, "Sale created");
        Ok(receipt)
    }

    async fn save_held_order(&self, snapshot: &HeldOrderSnapshot) -> ClientResult<HeldOrder> {
        let token = self.session.access_token().await?;
        let held: HeldOrder = self.http.post("sales/held", Some(&token), snapshot).await?;
        info!(held_id = %held.id, lines = held.lines.len(), "Order held");
        Ok(held)
    }

    async fn fetch_held_order(&self, held_id: &str) -> ClientResult<HeldOrder> {
        let token = self.session.access_token().await?;
        self.http
            .get(&format!("sales/held/{}", held_id), Some(&token), &[])
            .await
    }

    async fn delete_held_order(&self, held_id: &str) -> ClientResult<()> {
        let token = self.session.access_token().await?;
        self.http
            .delete(&format!("sales/held/{}", held_id), Some(&token))
            .await
    }
}
