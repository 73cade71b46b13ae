//! [`Handler`] abstractions.

use std::future::Future;

/// Executable handler of `Args`.
///
/// Every capability of the system (storing, publishing, executing commands
/// and queries) is expressed as a [`Handler`] of some operation, so any type
/// implementing the required set of operations may stand in for another.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
