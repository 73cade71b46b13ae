//! [`Command`] for updating an existing [`User`].

use common::operations::{Publish, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::user,
    infra::{database, notifier, Database, Notifier},
    Service,
};

use super::Command;

/// [`Command`] for updating an existing [`User`].
///
/// Replaces all the mutable fields of the [`User`] with a new
/// [`user::Revision`]. Does nothing if the [`User`] doesn't exist, or was
/// updated concurrently with a later timestamp.
#[derive(Clone, Debug)]
pub struct UpdateUser {
    /// ID of the [`User`] to update.
    pub id: user::Id,

    /// New first [`user::Name`] of the [`User`].
    pub first_name: user::Name,

    /// New last [`user::Name`] of the [`User`].
    pub last_name: user::Name,

    /// New [`user::Nickname`] of the [`User`].
    pub nickname: user::Nickname,

    /// New [`user::Password`] of the [`User`].
    pub password: user::Password,

    /// New email address of the [`User`], validated into a [`user::Email`].
    pub email: String,

    /// New [`user::Country`] of the [`User`].
    pub country: user::Country,
}

impl<Db, N> Command<UpdateUser> for Service<Db, N>
where
    Db: Database<
        Update<user::Revision>,
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

    async fn execute(&self, cmd: UpdateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateUser {
            id,
            first_name,
            last_name,
            nickname,
            password,
            email,
            country,
        } = cmd;

        let email = user::Email::new(email)
            .ok_or(E::InvalidEmail)
            .map_err(tracerr::wrap!())?;

        let revision = user::Revision {
            id,
            first_name,
            last_name,
            nickname,
            password,
            email,
            country,
            updated_at: user::UpdateDateTime::now(),
        };

        self.database()
            .execute(Update(revision.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        self.notify(format!("User has been updated: {revision}")).await;

        Ok(())
    }
}

/// Error of [`UpdateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Provided email address is not a valid [`user::Email`].
    #[display("Invalid email")]
    InvalidEmail,
}
