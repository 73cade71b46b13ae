//! [`Database`]-related implementations.

#[cfg(feature = "postgres")]
pub mod postgres;

use std::time::Duration;

use derive_more::{Display, Error as StdError, From};

#[cfg(doc)]
use common::operations::Perform;

#[cfg(feature = "postgres")]
pub use self::postgres::Postgres;

/// Database operation.
pub use common::Handler as Database;

/// Retention policy of idle [`Database`] connections, applied on
/// [`Perform`]ing it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Retention {
    /// Maximum number of idle connections to keep open.
    pub max_idle: usize,

    /// Maximum lifetime of a connection.
    pub max_lifetime: Duration,
}

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "postgres")]
    /// [`Postgres`] error.
    Postgres(postgres::Error),
}
