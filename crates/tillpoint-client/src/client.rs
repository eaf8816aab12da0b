//! # Client Facade
//!
//! Wires the transport, session manager, and typed API clients together.
//!
//! ## Startup
//! ```rust,ignore
//! let config = ClientConfig::load()?;
//! let store = Arc::new(SqliteStore::open(StoreConfig::new(db_path)).await?);
//!
//! let client = TillpointClient::new(&config, store)?;
//! client.session().restore().await?;          // resume a persisted session
//!
//! let mut register = client.new_checkout();    // one per register session
//! ```

use std::sync::Arc;

use tillpoint_store::KeyValueStore;

use crate::api::{AuthApi, CatalogApi, CustomerApi, SalesApi};
use crate::checkout::Checkout;
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::http::Http;
use crate::session::SessionManager;

/// The assembled tillpoint client.
#[derive(Debug, Clone)]
pub struct TillpointClient {
    session: Arc<SessionManager>,
    catalog: CatalogApi,
    customers: CustomerApi,
    sales: Arc<SalesApi>,
}

impl TillpointClient {
    /// Builds the client over the given configuration and credential store.
    pub fn new(config: &ClientConfig, store: Arc<dyn KeyValueStore>) -> ClientResult<Self> {
        let http = Http::new(config)?;

        let auth = Arc::new(AuthApi::new(http.clone()));
        let session = SessionManager::new(auth, store, config);

        Ok(TillpointClient {
            catalog: CatalogApi::new(http.clone(), session.clone()),
            customers: CustomerApi::new(http.clone(), session.clone()),
            sales: Arc::new(SalesApi::new(http, session.clone())),
            session,
        })
    }

    /// The session manager (login, refresh, logout, credential reads).
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// The catalog client.
    pub fn catalog(&self) -> &CatalogApi {
        &self.catalog
    }

    /// The customer client.
    pub fn customers(&self) -> &CustomerApi {
        &self.customers
    }

    /// The sales client.
    pub fn sales(&self) -> &SalesApi {
        &self.sales
    }

    /// Starts a fresh register session against the sales API.
    pub fn new_checkout(&self) -> Checkout {
        Checkout::new(self.sales.clone())
    }
}
