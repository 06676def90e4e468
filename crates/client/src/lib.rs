//! HTTP client of the dashboard API.
//!
//! [`Client`] injects the base URL and bearer token and turns every failure
//! into an [`ApiError`]; [`RestResource`] exposes one collection as an
//! [`engine::ResourceService`].
pub use error::ApiError;
pub use http::{Client, ClientBuilder, DEFAULT_TIMEOUT};
pub use resources::RestResource;

pub mod paths;

mod actions;
mod error;
mod http;
mod resources;
