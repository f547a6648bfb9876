//! Backend-for-frontend for the [Clover](https://www.clover.com/) POS API.
//!
//! The crate proxies a handful of Clover REST endpoints, reshapes their
//! catalog payloads for a frontend, and keeps a little local state:
//! merchants with their access tokens, users and item recommendations.
//!
//! - [`client`] issues authenticated requests to Clover.
//! - [`storage`] persists local state (in memory or SQLite).
//! - [`catalog`] turns raw items and categories into view models.
//! - [`bff`] ties them together, one method per route.
//! - `server` (feature `server`) exposes the routes over HTTP with axum.

pub mod bff;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
#[cfg(feature = "server")]
pub mod server;
pub mod storage;
