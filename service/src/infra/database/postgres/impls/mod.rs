//! [`Database`] implementations.

mod user;

use std::cell::Cell;

use async_trait::async_trait;
use common::operations::Perform;
use refinery_core::{
    traits::r#async::{AsyncQuery, AsyncTransaction},
    AsyncMigrate, Migration,
};
use tracerr::Traced;
use tracing as log;

use crate::infra::{
    database::{self, Retention},
    Database,
};

use super::Postgres;

impl Database<Perform<Retention>> for Postgres {
    type Ok = usize;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Perform(retention): Perform<Retention>,
    ) -> Result<Self::Ok, Self::Err> {
        let Retention {
            max_idle,
            max_lifetime,
        } = retention;

        let (kept, removed) = (Cell::new(0_usize), Cell::new(0_usize));
        _ = self.pool.retain(|_, metrics| {
            let keep = metrics.age() < max_lifetime && kept.get() < max_idle;
            if keep {
                kept.set(kept.get() + 1);
            } else {
                removed.set(removed.get() + 1);
            }
            keep
        });

        let status = self.pool.status();
        log::debug!(
            "retained {} idle of {} `Postgres` connections, closed {}",
            kept.get(),
            status.size,
            removed.get(),
        );

        Ok(removed.get())
    }
}

#[async_trait]
impl AsyncTransaction for Postgres {
    type Error = Traced<database::Error>;

    async fn execute(
        &mut self,
        queries: &[&str],
    ) -> Result<usize, Self::Error> {
        let mut conn = self.connection().await.map_err(tracerr::wrap!())?;
        AsyncTransaction::execute(&mut **conn, queries)
            .await
            .map_err(tracerr::from_and_wrap!(=> super::Error))
            .map_err(tracerr::map_from)
    }
}

#[async_trait]
impl AsyncQuery<Vec<Migration>> for Postgres {
    async fn query(
        &mut self,
        query: &str,
    ) -> Result<Vec<Migration>, <Self as AsyncTransaction>::Error> {
        let mut conn = self.connection().await.map_err(tracerr::wrap!())?;
        AsyncQuery::query(&mut **conn, query)
            .await
            .map_err(tracerr::from_and_wrap!(=> super::Error))
            .map_err(tracerr::map_from)
    }
}

impl AsyncMigrate for Postgres {}
