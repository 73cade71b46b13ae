//! Application provides REST API for interacting with the [`Service`].

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod api;
pub mod args;
pub mod config;
pub mod error;

use std::time;

use axum::{
    http::StatusCode,
    routing::{get, put},
    Extension, Router,
};
use tower_http::timeout::TimeoutLayer;
// Used in binary.
use axum_client_ip as _;
use futures as _;
use refinery as _;
use tokio as _;
use tracing_subscriber as _;
// Used in integration tests.
#[cfg(test)]
use serde_json as _;
#[cfg(test)]
use tower as _;

pub use self::{
    args::Args,
    config::Config,
    error::{AsError, Error},
};

/// [`Service`] with filled infrastructure dependencies.
///
/// [`Service`]: service::Service
pub type Service =
    service::Service<service::infra::Postgres, service::infra::PubSub>;

/// Builds a [`Router`] serving the REST API of the provided [`Service`].
///
/// Requests not completed within the `request_timeout` are aborted with
/// `408 Request Timeout` status.
pub fn router(service: Service, request_timeout: time::Duration) -> Router {
    Router::new()
        .route("/users", get(api::user::list).post(api::user::create))
        .route(
            "/users/:id",
            put(api::user::update).delete(api::user::delete),
        )
        .layer(Extension(service))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
}
