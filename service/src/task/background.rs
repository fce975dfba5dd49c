//! Background environment for running [`Task`]s.

use std::{error::Error, future::{Future, IntoFuture}};

use futures::{future::LocalBoxFuture, FutureExt as _, TryFutureExt as _};
use tokio::task;
use tracing as log;

#[cfg(doc)]
use crate::Task;

/// Background environment for running [`Task`]s.
///
/// Spawned [`Task`]s run on the current thread once the [`Background`] is
/// awaited. A failing or panicking [`Task`] is logged and does not take the
/// others down.
#[derive(Debug, Default)]
pub struct Background {
    /// Local set of tasks.
    set: task::LocalSet,

    /// Handles of spawned tasks.
    handles: Vec<task::JoinHandle<Result<(), Box<dyn Error + 'static>>>>,
}

impl Background {
    /// Spawns a new [`Task`] inside the [`Background`] environment.
    pub fn spawn<F, E>(&mut self, future: F)
    where
        F: Future<Output = Result<(), E>> + 'static,
        E: Error + 'static,
    {
        self.handles.push(self.set.spawn_local(
            future.map_err(|e| Box::<dyn Error + 'static>::from(Box::new(e))),
        ));
    }
}

impl IntoFuture for Background {
    type Output = ();
    type IntoFuture = LocalBoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let Self { set, handles } = self;
        async move {
            set.run_until(async move {
                for handle in handles {
                    match handle.await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => {
                            log::error!("background task failed: {e}");
                        }
                        Err(e) => {
                            log::error!("background task panicked: {e}");
                        }
                    }
                }
            })
            .await;
        }
        .boxed_local()
    }
}
