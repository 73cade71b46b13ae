//! [`User`]s list definitions.

pub mod cursor;

use common::define_pagination;
use derive_more::{From, Into};

use crate::domain::{user, User};

pub use self::cursor::{Codec, Token};

define_pagination!(Key, User, Filter);

/// Sort key of a [`User`] in a list.
pub type Key = (user::CreationDateTime, user::Id);

/// Returns the sort [`Key`] of the provided [`User`].
#[must_use]
pub fn key(user: &User) -> Key {
    (user.created_at, user.id)
}

/// Equality filter of a [`User`]s list.
///
/// Unset fields don't filter anything.
#[derive(Clone, Debug, Default)]
pub struct Filter {
    /// [`user::Country`] to match.
    pub country: Option<user::Country>,

    /// First [`user::Name`] to match.
    pub first_name: Option<user::Name>,

    /// Last [`user::Name`] to match.
    pub last_name: Option<user::Name>,

    /// [`user::Nickname`] to match.
    pub nickname: Option<user::Nickname>,
}

impl Filter {
    /// Checks whether the provided [`User`] passes this [`Filter`].
    #[must_use]
    pub fn matches(&self, user: &User) -> bool {
        self.country.as_ref().map_or(true, |c| *c == user.country)
            && self.first_name.as_ref().map_or(true, |n| *n == user.first_name)
            && self.last_name.as_ref().map_or(true, |n| *n == user.last_name)
            && self.nickname.as_ref().map_or(true, |n| *n == user.nickname)
    }
}

/// Total count of [`User`]s.
#[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
pub struct TotalCount(i64);
