//! [`Command`] definition.

pub mod create_user;
pub mod delete_user;
pub mod update_user;

use common::operations::Publish;
use tracerr::Traced;
use tracing as log;

use crate::{
    infra::{
        notifier::{self, Message},
        Notifier,
    },
    Service,
};

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    create_user::CreateUser, delete_user::DeleteUser, update_user::UpdateUser,
};

impl<Db, N> Service<Db, N>
where
    N: Notifier<Publish<Message>, Ok = (), Err = Traced<notifier::Error>>,
{
    /// Notifies subscribers with the provided [`Message`], if the [`Notifier`]
    /// is configured.
    ///
    /// Failure is logged and never returned.
    async fn notify(&self, msg: impl Into<Message>) {
        let Some(notifier) = self.notifier() else {
            return;
        };
        let msg = msg.into();

        if let Err(e) = notifier.execute(Publish(msg.clone())).await {
            log::error!("failed to notify subscribers with `{msg}`: {e}");
        }
    }
}
