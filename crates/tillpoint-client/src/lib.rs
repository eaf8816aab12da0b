//! # tillpoint-client: Remote API Clients, Session, Checkout
//!
//! Everything in tillpoint that crosses the network boundary lives here:
//! the REST clients for the remote POS API, the session manager with its
//! proactive token-refresh timer, supersede-guarded catalog search, and the
//! checkout service that drives the pure order engine from
//! `tillpoint-core` against the remote collaborators.
//!
//! ## Components
//!
//! - [`client`] - the assembled facade ([`TillpointClient`])
//! - [`config`] - endpoint and behavior configuration (file + env + defaults)
//! - [`http`] - thin reqwest wrapper shared by the API clients
//! - [`api`] - typed clients: auth, catalog, customers, sales/held-orders
//! - [`jwt`] - unverified `exp`-claim extraction from access tokens
//! - [`session`] - credential lifecycle and the refresh scheduler
//! - [`search`] - last-query-wins supersede coordination
//! - [`checkout`] - order building, hold/resume, settlement
//! - [`error`] - the client error taxonomy
//!
//! ## Failure contract
//!
//! No call in this crate retries on its own, and no remote failure leaves
//! partial local state behind: the cart mutates only after the remote side
//! has answered, and a failed refresh clears the session outright.

pub mod api;
pub mod checkout;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod jwt;
pub mod search;
pub mod session;

pub use checkout::{Checkout, SettlementGateway};
pub use client::TillpointClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use search::{SearchCoordinator, SearchTicket};
pub use session::{Credential, RefreshState, SessionManager};
