//! Background [`Task`]s definitions.

mod background;
pub mod retain_connections;

pub use common::Handler as Task;

pub use self::{
    background::Background, retain_connections::RetainConnections,
};
