//! # Catalog API Client
//!
//! Product search, lookup, maintenance, and stock history.
//!
//! Search supports two shapes: a plain awaited request, and a
//! supersede-guarded request for type-ahead use where only the latest query
//! may win (see [`crate::search`]).

use std::sync::Arc;

use tracing::debug;

use tillpoint_core::types::{DateRange, Product, ProductInput, StockMovement};
use tillpoint_core::validation::validate_product_input;

use crate::error::ClientResult;
use crate::http::Http;
use crate::search::SearchCoordinator;
use crate::session::SessionManager;

/// REST catalog client.
#[derive(Debug, Clone)]
pub struct CatalogApi {
    http: Http,
    session: Arc<SessionManager>,
}

impl CatalogApi {
    pub fn new(http: Http, session: Arc<SessionManager>) -> Self {
        CatalogApi { http, session }
    }

    /// Searches products by term (name, SKU, or barcode; server decides).
    ///
    /// An empty term lists the default product page.
    pub async fn search(&self, term: &str) -> ClientResult<Vec<Product>> {
        let token = self.session.access_token().await?;
        let term = term.trim().to_string();
        debug!(term = %term, "Searching products");

        self.http
            .get("products", Some(&token), &[("search", term)])
            .await
    }

    /// Supersede-guarded search: the response is applied only if no newer
    /// search was issued through the same coordinator in the meantime.
    pub async fn search_latest(
        &self,
        coordinator: &SearchCoordinator,
        term: &str,
    ) -> ClientResult<Vec<Product>> {
        let ticket = coordinator.issue();
        ticket.run(self.search(term)).await
    }

    /// Fetches a product by id.
    pub async fn get(&self, product_id: &str) -> ClientResult<Product> {
        let token = self.session.access_token().await?;
        self.http
            .get(&format!("products/{}", product_id), Some(&token), &[])
            .await
    }

    /// Lists known category names.
    pub async fn categories(&self) -> ClientResult<Vec<String>> {
        let token = self.session.access_token().await?;
        self.http.get("products/categories", Some(&token), &[]).await
    }

    /// Lists known brand names.
    pub async fn brands(&self) -> ClientResult<Vec<String>> {
        let token = self.session.access_token().await?;
        self.http.get("products/brands", Some(&token), &[]).await
    }

    /// Creates a product. Validates locally before anything is sent.
    pub async fn create(&self, input: &ProductInput) -> ClientResult<Product> {
        validate_product_input(input)?;
        let token = self.session.access_token().await?;
        debug!(sku = %input.sku, "Creating product");
        self.http.post("products", Some(&token), input).await
    }

    /// Updates a product. Validates locally before anything is sent.
    pub async fn update(&self, product_id: &str, input: &ProductInput) -> ClientResult<Product> {
        validate_product_input(input)?;
        let token = self.session.access_token().await?;
        debug!(product_id = %product_id, "Updating product");
        self.http
            .put(&format!("products/{}", product_id), Some(&token), input)
            .await
    }

    /// Fetches the server-recorded stock movement history for a product,
    /// optionally bounded to a date range.
    pub async fn stock_history(
        &self,
        product_id: &str,
        range: Option<DateRange>,
    ) -> ClientResult<Vec<StockMovement>> {
        let token = self.session.access_token().await?;

        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(range) = range {
            query.push(("from", range.from.to_rfc3339()));
            query.push(("to", range.to.to_rfc3339()));
        }

        self.http
            .get(
                &format!("products/{}/stock-history", product_id),
                Some(&token),
                &query,
            )
            .await
    }
}
