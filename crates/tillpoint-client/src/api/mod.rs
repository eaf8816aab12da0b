//! # Typed API Clients
//!
//! One client per remote surface, all sharing the [`crate::http::Http`]
//! transport:
//!
//! - [`auth`] - login / register / refresh / revoke
//! - [`catalog`] - product search, lookup, categories, brands, stock history
//! - [`customers`] - customer list / search / create / update
//! - [`sales`] - sale creation, statistics, held-orders CRUD
//!
//! Every payload shape is an opaque JSON contract owned by the server; the
//! clients deserialize into the `tillpoint-core` domain types and surface
//! structured rejections verbatim.

pub mod auth;
pub mod catalog;
pub mod customers;
pub mod sales;

pub use auth::{AuthApi, AuthBackend, RegisterRequest};
pub use catalog::CatalogApi;
pub use customers::CustomerApi;
pub use sales::SalesApi;
