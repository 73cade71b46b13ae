//! [`Notifier`]-related implementations.

#[cfg(feature = "pubsub")]
pub mod pubsub;

use derive_more::{AsRef, Display, Error as StdError, From, Into};

#[cfg(feature = "pubsub")]
pub use self::pubsub::PubSub;

/// Notification of subscribers.
pub use common::Handler as Notifier;

/// Text message to notify subscribers with.
#[derive(AsRef, Clone, Debug, Display, Eq, From, Into, PartialEq)]
#[as_ref(str)]
#[from(String, &str)]
pub struct Message(String);

/// [`Notifier`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "pubsub")]
    /// [`PubSub`] error.
    PubSub(pubsub::Error),
}
