//! REST API definitions.

pub mod user;

pub use self::user::User;
