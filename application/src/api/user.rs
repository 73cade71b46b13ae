//! [`User`]-related REST API definitions.

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use service::{
    command, domain, query,
    read::user::list,
    Command as _,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{define_error, AsError, Error, Service};

/// A [`domain::User`] as returned by the API.
///
/// Includes the password verbatim.
#[derive(Clone, Debug, Serialize)]
pub struct User {
    /// ID of this [`User`].
    pub id: domain::user::Id,

    /// First name of this [`User`].
    pub first_name: domain::user::Name,

    /// Last name of this [`User`].
    pub last_name: domain::user::Name,

    /// Nickname of this [`User`].
    pub nickname: domain::user::Nickname,

    /// Password of this [`User`].
    pub password: domain::user::Password,

    /// Email of this [`User`].
    pub email: domain::user::Email,

    /// Country of this [`User`].
    pub country: domain::user::Country,

    /// Creation time of this [`User`].
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: domain::user::CreationDateTime,

    /// Time of the last update of this [`User`].
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub updated_at: domain::user::UpdateDateTime,
}

impl From<domain::User> for User {
    fn from(user: domain::User) -> Self {
        let domain::User {
            id,
            first_name,
            last_name,
            nickname,
            password,
            email,
            country,
            created_at,
            updated_at,
        } = user;
        Self {
            id,
            first_name,
            last_name,
            nickname,
            password,
            email,
            country,
            created_at,
            updated_at,
        }
    }
}

/// Request body of creating or updating a [`User`].
///
/// Every field is required and must not be empty.
#[derive(Clone, Debug, Deserialize)]
pub struct Body {
    /// First name of the [`User`].
    pub first_name: domain::user::Name,

    /// Last name of the [`User`].
    pub last_name: domain::user::Name,

    /// Nickname of the [`User`].
    pub nickname: domain::user::Nickname,

    /// Password of the [`User`].
    pub password: domain::user::Password,

    /// Email of the [`User`].
    ///
    /// Validated by the [`Service`].
    pub email: String,

    /// Country of the [`User`].
    pub country: domain::user::Country,
}

/// Query parameters of listing [`User`]s.
///
/// Empty values are treated as absent ones.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    /// Token of the page preceding the requested one.
    pub previous_page: Option<String>,

    /// Token of the page following the requested one.
    pub next_page: Option<String>,

    /// Nickname to filter by.
    pub nickname: Option<String>,

    /// Country to filter by.
    pub country: Option<String>,

    /// First name to filter by.
    pub first_name: Option<String>,

    /// Last name to filter by.
    pub last_name: Option<String>,

    /// Maximum number of [`User`]s on the page.
    pub limit: Option<u32>,
}

impl From<ListParams> for query::ListUsers {
    fn from(params: ListParams) -> Self {
        let ListParams {
            previous_page,
            next_page,
            nickname,
            country,
            first_name,
            last_name,
            limit,
        } = params;
        let token =
            |t: String| (!t.is_empty()).then_some(list::Token::from(t));

        Self {
            filter: list::Filter {
                country: country.and_then(domain::user::Country::new),
                first_name: first_name.and_then(domain::user::Name::new),
                last_name: last_name.and_then(domain::user::Name::new),
                nickname: nickname.and_then(domain::user::Nickname::new),
            },
            previous_page: previous_page.and_then(token),
            next_page: next_page.and_then(token),
            limit,
        }
    }
}

/// A page of [`User`]s, newest first.
#[derive(Clone, Debug, Serialize)]
pub struct Page {
    /// [`User`]s on this [`Page`].
    pub users: Vec<User>,

    /// Token of the previous [`Page`], if there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_page: Option<list::Token>,

    /// Token of the next [`Page`], if there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<list::Token>,

    /// Total number of [`User`]s passing the filter.
    pub total: i64,
}

impl From<query::list_users::Output> for Page {
    fn from(output: query::list_users::Output) -> Self {
        let query::list_users::Output {
            users,
            previous_page,
            next_page,
            total,
        } = output;
        Self {
            users: users.into_iter().map(Into::into).collect(),
            previous_page,
            next_page,
            total,
        }
    }
}

/// Creates a new [`User`].
///
/// # Errors
///
/// Possible error codes:
/// - `BAD_REQUEST` - body is malformed or has empty fields;
/// - `INVALID_EMAIL` - provided email is not valid.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "createUser",
        nickname = %body.nickname,
        country = %body.country,
    ),
)]
pub async fn create(
    Extension(service): Extension<Service>,
    WithRejection(Json(body), _): WithRejection<Json<Body>, Error>,
) -> Result<(StatusCode, Json<User>), Error> {
    let Body {
        first_name,
        last_name,
        nickname,
        password,
        email,
        country,
    } = body;

    let user = service
        .execute(command::CreateUser {
            first_name,
            last_name,
            nickname,
            password,
            email,
            country,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Lists [`User`]s page by page.
///
/// # Errors
///
/// Possible error codes:
/// - `BAD_REQUEST` - query parameters are malformed;
/// - `AMBIGUOUS_PAGINATION` - both previous and next pages are requested;
/// - `INVALID_CURSOR` - provided page token is invalid.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "listUsers",
        limit = ?params.limit,
    ),
)]
pub async fn list(
    Extension(service): Extension<Service>,
    WithRejection(Query(params), _): WithRejection<Query<ListParams>, Error>,
) -> Result<Json<Page>, Error> {
    service
        .execute(query::ListUsers::from(params))
        .await
        .map(|out| Json(out.into()))
        .map_err(AsError::into_error)
}

/// Replaces the [`User`] with the provided ID.
///
/// Succeeds even if the [`User`] doesn't exist.
///
/// # Errors
///
/// Possible error codes:
/// - `BAD_REQUEST` - ID or body is malformed;
/// - `INVALID_EMAIL` - provided email is not valid.
#[tracing::instrument(
    skip_all,
    fields(http.handler = "updateUser", id = %id, nickname = %body.nickname),
)]
pub async fn update(
    Extension(service): Extension<Service>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, Error>,
    WithRejection(Json(body), _): WithRejection<Json<Body>, Error>,
) -> Result<StatusCode, Error> {
    let Body {
        first_name,
        last_name,
        nickname,
        password,
        email,
        country,
    } = body;

    service
        .execute(command::UpdateUser {
            id: id.into(),
            first_name,
            last_name,
            nickname,
            password,
            email,
            country,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Deletes the [`User`] with the provided ID.
///
/// Succeeds even if the [`User`] doesn't exist.
///
/// # Errors
///
/// Possible error codes:
/// - `BAD_REQUEST` - ID is malformed.
#[tracing::instrument(
    skip_all,
    fields(http.handler = "deleteUser", id = %id),
)]
pub async fn delete(
    Extension(service): Extension<Service>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, Error>,
) -> Result<StatusCode, Error> {
    service
        .execute(command::DeleteUser { id: id.into() })
        .await
        .map_err(AsError::into_error)?;

    Ok(StatusCode::NO_CONTENT)
}

define_error! {
    enum InvalidEmail {
        #[code = "INVALID_EMAIL"]
        #[status = BAD_REQUEST]
        #[message = "Invalid email"]
        Error,
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidEmail => Some(InvalidEmail::Error.into()),
        }
    }
}

impl AsError for command::update_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidEmail => Some(InvalidEmail::Error.into()),
        }
    }
}

impl AsError for query::list_users::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "AMBIGUOUS_PAGINATION"]
                #[status = BAD_REQUEST]
                #[message = "Either next or previous page should be \
                             requested, not both"]
                Ambiguous,

                #[code = "INVALID_CURSOR"]
                #[status = BAD_REQUEST]
                #[message = "Invalid page token"]
                InvalidCursor,
            }
        }

        match self {
            Self::Ambiguous(_) => Some(Error::Ambiguous.into()),
            Self::Db(e) => e.try_as_error(),
            Self::InvalidCursor(_) => Some(Error::InvalidCursor.into()),
        }
    }
}
