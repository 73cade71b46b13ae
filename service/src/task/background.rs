//! [`Background`] environment of long-running [`Task`]s.

use std::{
    error::Error,
    future::{Future, IntoFuture},
};

use futures::{
    future::{self, LocalBoxFuture},
    FutureExt as _, TryFutureExt as _,
};
use tokio::task;

#[cfg(doc)]
use crate::Task;

/// Type-erased error of a [`Task`] spawned in a [`Background`].
pub type BoxError = Box<dyn Error + 'static>;

/// Environment driving [`Task`]s on the current thread.
///
/// Being awaited, resolves once all the spawned [`Task`]s complete, or as
/// soon as any of them fails.
#[derive(Debug, Default)]
pub struct Background {
    /// [`task::LocalSet`] the [`Task`]s are spawned onto.
    set: task::LocalSet,

    /// Handles of the spawned [`Task`]s.
    tasks: Vec<task::JoinHandle<Result<(), BoxError>>>,
}

impl Background {
    /// Spawns the provided [`Task`] `future` in this [`Background`].
    pub fn spawn<F, E>(&mut self, future: F)
    where
        F: Future<Output = Result<(), E>> + 'static,
        E: Error + 'static,
    {
        self.tasks.push(
            self.set
                .spawn_local(future.map_err(|e| BoxError::from(Box::new(e)))),
        );
    }

    /// Returns number of [`Task`]s spawned in this [`Background`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Indicates whether no [`Task`]s are spawned in this [`Background`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl IntoFuture for Background {
    type Output = Result<(), BoxError>;
    type IntoFuture = LocalBoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let Self { set, tasks } = self;
        let all = future::try_join_all(tasks.into_iter().map(|t| {
            t.map(|res| res.map_err(|e| BoxError::from(Box::new(e)))?)
        }));
        async move { set.run_until(all).await.map(drop) }.boxed_local()
    }
}

#[cfg(test)]
mod spec {
    use std::{fmt, time::Duration};

    use derive_more::{Display, Error};
    use tokio::time;

    use super::Background;

    #[derive(Debug, Display, Error)]
    #[display("failed")]
    struct Failed;

    #[tokio::test]
    async fn completes_when_all_tasks_complete() {
        let mut bg = Background::default();
        bg.spawn(async { Ok::<_, fmt::Error>(()) });
        bg.spawn(async {
            time::sleep(Duration::from_millis(10)).await;
            Ok::<_, fmt::Error>(())
        });

        assert_eq!(bg.len(), 2);
        assert!(bg.await.is_ok());
    }

    #[tokio::test]
    async fn fails_when_any_task_fails() {
        let mut bg = Background::default();
        bg.spawn(async {
            time::sleep(Duration::from_secs(3600)).await;
            Ok::<_, fmt::Error>(())
        });
        bg.spawn(async { Err(Failed) });

        let err = bg.await.unwrap_err();

        assert_eq!(err.to_string(), "failed");
    }

    #[tokio::test]
    async fn completes_when_empty() {
        let bg = Background::default();

        assert!(bg.is_empty());
        assert!(bg.await.is_ok());
    }
}
