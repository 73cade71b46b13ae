//! [`RetainConnections`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Perform, Start};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    infra::{database, database::Retention, Database},
    Service,
};

use super::Task;

/// Configuration for [`RetainConnections`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between [`Retention`] policy applications.
    pub interval: time::Duration,

    /// [`Retention`] policy to apply.
    pub retention: Retention,
}

/// [`Task`] closing idle [`Database`] connections, which exceed the
/// [`Retention`] policy.
#[derive(Clone, Copy, Debug)]
pub struct RetainConnections<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db, N> Task<Start<By<RetainConnections<Self>, Config>>>
    for Service<Db, N>
where
    RetainConnections<Service<Db, N>>:
        Task<Perform<()>, Ok = (), Err: Error> + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<RetainConnections<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = RetainConnections {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::RetainConnections` failed: {e}");
            });
        }
    }
}

impl<Db, N> Task<Perform<()>> for RetainConnections<Service<Db, N>>
where
    Db: Database<
        Perform<Retention>,
        Ok = usize,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let closed = self
            .service
            .database()
            .execute(Perform(self.config.retention))
            .await
            .map_err(tracerr::wrap!())?;
        if closed > 0 {
            log::info!("`task::RetainConnections` closed {closed} connections");
        }
        Ok(())
    }
}

/// Error of [`RetainConnections`] execution.
pub type ExecutionError = Traced<database::Error>;
