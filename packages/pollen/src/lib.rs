//! # hive-pollen
//!
//! Minimal HTTP client for Hive containers.
//!
//! [`Pollen`] owns a base URL and a set of default headers and exposes
//! verb helpers over a single [`Pollen::request`]. Every non-2xx response is
//! turned into an [`ApiException`] whose [`ApiErrorKind`] is picked by status
//! code, so callers branch with `match` instead of inspecting status numbers.
//!
//! ```ignore
//! use hive_pollen::{ApiErrorKind, Pollen};
//!
//! let pollen = Pollen::new("https://api.example.com/v1")?;
//!
//! match pollen.get::<User>("/users/1").await {
//!     Ok(user) => println!("{}", user.name),
//!     Err(e) if e.api_kind() == Some(ApiErrorKind::NotFound) => println!("no such user"),
//!     Err(e) => return Err(e.into()),
//! }
//! ```
//!
//! Requests go through a [`Transport`]; [`ReqwestTransport`] is the default
//! and the `test-utils` feature exposes `transport::mock::MockTransport`.

pub mod client;
pub mod error;
pub mod exception;
pub mod transport;
pub mod types;
pub mod utils;

pub use client::{Pollen, PollenConfig};
pub use error::Error;
pub use exception::{ApiErrorKind, ApiException};
pub use transport::{ReqwestTransport, Transport, TransportError, TransportRequest, TransportResponse};
pub use types::{Body, CacheMode, FormData, FormPart, Method, PollenRequest};
