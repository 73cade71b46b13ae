//! [`User`] definitions.

use std::{fmt, sync::LazyLock};

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Debug, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registered user.
#[derive(Clone, Debug)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// First [`Name`] of this [`User`].
    pub first_name: Name,

    /// Last [`Name`] of this [`User`].
    pub last_name: Name,

    /// [`Nickname`] of this [`User`].
    pub nickname: Nickname,

    /// [`Password`] of this [`User`].
    pub password: Password,

    /// [`Email`] of this [`User`].
    pub email: Email,

    /// [`Country`] of this [`User`].
    pub country: Country,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`User`] was updated last time.
    pub updated_at: UpdateDateTime,
}

// `Password` is omitted.
impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "User(id: {}, first_name: {}, last_name: {}, nickname: {}, \
             email: {}, country: {}, created_at: {}, updated_at: {})",
            self.id,
            self.first_name,
            self.last_name,
            self.nickname,
            self.email,
            self.country,
            self.created_at.to_rfc3339(),
            self.updated_at.to_rfc3339(),
        )
    }
}

/// Revision of the mutable fields of an existing [`User`].
#[derive(Clone, Debug)]
pub struct Revision {
    /// ID of the revised [`User`].
    pub id: Id,

    /// New first [`Name`] of the [`User`].
    pub first_name: Name,

    /// New last [`Name`] of the [`User`].
    pub last_name: Name,

    /// New [`Nickname`] of the [`User`].
    pub nickname: Nickname,

    /// New [`Password`] of the [`User`].
    pub password: Password,

    /// New [`Email`] of the [`User`].
    pub email: Email,

    /// New [`Country`] of the [`User`].
    pub country: Country,

    /// [`DateTime`] of this [`Revision`].
    ///
    /// Only applies over a [`User`] updated earlier.
    pub updated_at: UpdateDateTime,
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "User(id: {}, first_name: {}, last_name: {}, nickname: {}, \
             email: {}, country: {}, updated_at: {})",
            self.id,
            self.first_name,
            self.last_name,
            self.nickname,
            self.email,
            self.country,
            self.updated_at.to_rfc3339(),
        )
    }
}

/// ID of a [`User`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Defines a non-empty textual [`User`] field.
macro_rules! define_text {
    ($(#[$meta:meta])* $name:ident) => {
        #[derive(
            AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq,
            Serialize,
        )]
        #[as_ref(str)]
        #[serde(try_from = "String")]
        #[cfg_attr(
            feature = "postgres",
            derive(FromSql, ToSql),
            postgres(transparent)
        )]
        $(#[$meta])*
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Creates a new [`", stringify!($name), "`] if \
                             the given `value` is not empty.")]
            #[must_use]
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let value = value.into();
                (!value.is_empty()).then_some(Self(value))
            }
        }

        impl FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
                    .ok_or(concat!("`", stringify!($name), "` cannot be empty"))
            }
        }

        impl TryFrom<String> for $name {
            type Error = &'static str;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
                    .ok_or(concat!("`", stringify!($name), "` cannot be empty"))
            }
        }
    };
}

define_text! {
    /// First or last name of a [`User`].
    Name
}

define_text! {
    /// Nickname of a [`User`].
    Nickname
}

define_text! {
    /// Country of a [`User`].
    Country
}

define_text! {
    /// Password of a [`User`].
    ///
    /// Stored and returned as given.
    #[debug("Password(***)")]
    Password
}

/// Email address of a [`User`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[as_ref(str)]
#[serde(try_from = "String")]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    ///
    /// Only lowercase addresses are accepted.
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,4}$")
                .expect("valid regex")
        });

        REGEX.is_match(address.as_ref())
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

impl TryFrom<String> for Email {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value).ok_or("invalid `Email`")
    }
}

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

/// [`DateTime`] when a [`User`] was updated.
pub type UpdateDateTime = DateTimeOf<(User, unit::Update)>;
