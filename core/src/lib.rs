//! Blocking client for a Trello-style board/list/card REST API.
//!
//! # Overview
//! `ResourceClient` signs every request with the API key and token, spaces
//! mutating calls through a shared `RateLimiter`, and classifies responses:
//! 2xx carries a decoded payload, 404 is a normal "not found" result, and
//! every other status is an `ApiError::Rejected` with status and body.
//!
//! # Design
//! - The limiter is created once per credential set and injected into every
//!   client as an `Arc`; clones of a client share it too.
//! - Query parameters are tri-state (`Field`): omitted, cleared, or set. This
//!   is what separates `update_card` (overwrite everything) from
//!   `patch_card` (touch only supplied fields).
//! - I/O goes through the `Transport` trait; `UreqTransport` is the default.
//! - Mandatory ids are checked locally before anything is sent.
//!
//! ```no_run
//! use std::sync::Arc;
//! use trello_core::{Config, NewCard, RateLimiter, ResourceClient};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let limiter = Arc::new(RateLimiter::new(config.min_interval));
//! let client = ResourceClient::from_config(&config, limiter)?;
//!
//! let board = client.create_board(Some("Roadmap"))?.data.ok_or("no board")?;
//! let list = client.create_list(Some("Todo"), &board.id)?.data.ok_or("no list")?;
//! client.create_card(&list.id, &NewCard::named("Ship it"))?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod rate_limit;
pub mod request;
pub mod transport;
pub mod types;

pub use client::ResourceClient;
pub use config::{Config, ConfigError, Credentials};
pub use error::ApiError;
pub use http::{ApiResponse, HttpMethod, HttpRequest, HttpResponse};
pub use rate_limit::RateLimiter;
pub use request::{ApiRequest, Field, Params};
pub use transport::{Transport, UreqTransport};
pub use types::{Badges, Board, Card, CardPatch, CardUpdate, List, NewCard};
