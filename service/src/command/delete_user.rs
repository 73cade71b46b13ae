//! [`Command`] for deleting a [`User`].

use common::operations::{By, Delete, Publish};
use derive_more::From;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{database, notifier, Database, Notifier},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`User`].
///
/// Deleting a non-existent [`User`] succeeds.
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteUser {
    /// ID of the [`User`] to delete.
    pub id: user::Id,
}

impl<Db, N> Command<DeleteUser> for Service<Db, N>
where
    Db: Database<
        Delete<By<User, user::Id>>,
        Ok = (),
        Err = Traced<database::Error>,
    >,
    N: Notifier<
        Publish<notifier::Message>,
        Ok = (),
        Err = Traced<notifier::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteUser) -> Result<Self::Ok, Self::Err> {
        let DeleteUser { id } = cmd;

        self.database()
            .execute(Delete(By::new(id)))
            .await
            .map_err(tracerr::wrap!())?;

        self.notify(format!("User has been deleted: {id}")).await;

        Ok(())
    }
}

/// Error of [`DeleteUser`] [`Command`] execution.
pub type ExecutionError = database::Error;
