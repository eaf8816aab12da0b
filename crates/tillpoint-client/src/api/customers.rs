//! # Customer API Client
//!
//! Customer list/search and maintenance. Purchase aggregates on the
//! returned records are server-computed read models.

use std::sync::Arc;

use tracing::debug;

use tillpoint_core::types::{Customer, CustomerInput};
use tillpoint_core::validation::validate_customer_input;

use crate::error::ClientResult;
use crate::http::Http;
use crate::session::SessionManager;

/// REST customer client.
#[derive(Debug, Clone)]
pub struct CustomerApi {
    http: Http,
    session: Arc<SessionManager>,
}

impl CustomerApi {
    pub fn new(http: Http, session: Arc<SessionManager>) -> Self {
        CustomerApi { http, session }
    }

    /// Lists customers, optionally filtered by a search term.
    pub async fn list(&self, term: Option<&str>) -> ClientResult<Vec<Customer>> {
        let token = self.session.access_token().await?;

        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(term) = term {
            query.push(("search", term.trim().to_string()));
        }

        self.http.get("customers", Some(&token), &query).await
    }

    /// Fetches a customer by id.
    pub async fn get(&self, customer_id: &str) -> ClientResult<Customer> {
        let token = self.session.access_token().await?;
        self.http
            .get(&format!("customers/{}", customer_id), Some(&token), &[])
            .await
    }

    /// Creates a customer. Validates locally before anything is sent.
    pub async fn create(&self, input: &CustomerInput) -> ClientResult<Customer> {
        validate_customer_input(input)?;
        let token = self.session.access_token().await?;
        debug!(name = %input.name, "Creating customer");
        self.http.post("customers", Some(&token), input).await
    }

    /// Updates a customer. Validates locally before anything is sent.
    pub async fn update(&self, customer_id: &str, input: &CustomerInput) -> ClientResult<Customer> {
        validate_customer_input(input)?;
        let token = self.session.access_token().await?;
        debug!(customer_id = %customer_id, "Updating customer");
        self.http
            .put(&format!("customers/{}", customer_id), Some(&token), input)
            .await
    }
}
