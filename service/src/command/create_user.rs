//! [`Command`] for creating a new [`User`].

use common::{
    operations::{Insert, Publish},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{database, notifier, Database, Notifier},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`].
#[derive(Clone, Debug)]
pub struct CreateUser {
    /// First [`user::Name`] of a new [`User`].
    pub first_name: user::Name,

    /// Last [`user::Name`] of a new [`User`].
    pub last_name: user::Name,

    /// [`user::Nickname`] of a new [`User`].
    pub nickname: user::Nickname,

    /// [`user::Password`] of a new [`User`].
    pub password: user::Password,

    /// Email address of a new [`User`], validated into a [`user::Email`].
    pub email: String,

    /// [`user::Country`] of a new [`User`].
    pub country: user::Country,
}

impl<Db, N> Command<CreateUser> for Service<Db, N>
where
    Db: Database<Insert<User>, Ok = (), Err = Traced<database::Error>>,
    N: Notifier<
        Publish<notifier::Message>,
        Ok = (),
        Err = Traced<notifier::Error>,
    >,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
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

        let now = DateTime::now();
        let user = User {
            id: user::Id::new(),
            first_name,
            last_name,
            nickname,
            password,
            email,
            country,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        self.database()
            .execute(Insert(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        self.notify(format!("User has been created: {user}")).await;

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
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
