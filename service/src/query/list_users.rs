//! [`Query`] for listing [`User`]s page by page.

use std::convert::identity;

use common::{
    operations::{By, Select},
    pagination,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::User,
    infra::{database, Database},
    read::user::list,
    Service,
};

use super::Query;

/// [`Query`] for listing [`User`]s page by page, newest first.
///
/// At most one of the [`list::Token`]s may be provided. Without any of them
/// the first page is listed.
#[derive(Clone, Debug, Default)]
pub struct ListUsers {
    /// [`list::Filter`] to apply.
    pub filter: list::Filter,

    /// [`list::Token`] of the page preceding the requested one.
    pub previous_page: Option<list::Token>,

    /// [`list::Token`] of the page following the requested one.
    pub next_page: Option<list::Token>,

    /// Maximum number of [`User`]s on the page.
    ///
    /// [`None`] or zero means [`list::Arguments::DEFAULT_LIMIT`].
    pub limit: Option<u32>,
}

/// Output of [`ListUsers`] [`Query`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`User`]s on the page, newest first.
    pub users: Vec<User>,

    /// [`list::Token`] of the previous page, if there is one.
    pub previous_page: Option<list::Token>,

    /// [`list::Token`] of the next page, if there is one.
    pub next_page: Option<list::Token>,

    /// Total number of [`User`]s passing the [`list::Filter`].
    pub total: i64,
}

impl<Db, N> Query<ListUsers> for Service<Db, N>
where
    Db: Database<
            Select<By<Vec<User>, list::Selector>>,
            Ok = Vec<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<list::TotalCount, list::Filter>>,
            Ok = list::TotalCount,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: ListUsers) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ListUsers {
            filter,
            previous_page,
            next_page,
            limit,
        } = query;
        let codec = &self.config().cursor_codec;

        let request = pagination::Request::new(previous_page, next_page)
            .map_err(tracerr::from_and_wrap!(=> E))?
            .try_map(|token| codec.decode(&token))
            .map_err(tracerr::from_and_wrap!(=> E))?;
        let arguments = list::Arguments::new(request, limit);

        let users = self
            .database()
            .execute(Select(By::<Vec<User>, _>::new(list::Selector {
                arguments,
                filter: filter.clone(),
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let total = self
            .database()
            .execute(Select(By::<list::TotalCount, _>::new(filter)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let (users, previous_page, next_page, total) =
            list::Page::new(&arguments, users, total.into(), list::key)
                .map(identity, |c| codec.encode(&c));

        Ok(Output {
            users,
            previous_page,
            next_page,
            total,
        })
    }
}

/// Error of [`ListUsers`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Both previous and next pages are requested.
    #[display("{_0}")]
    Ambiguous(pagination::AmbiguousError),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Provided [`list::Token`] is invalid.
    #[display("Invalid cursor: {_0}")]
    InvalidCursor(list::cursor::DecodeError),
}
