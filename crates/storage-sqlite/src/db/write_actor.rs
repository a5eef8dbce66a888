//! Single-writer actor for serialized SQLite writes.
//!
//! SQLite allows one writer at a time; funneling every write through one
//! dedicated connection avoids SQLITE_BUSY storms under concurrent sync
//! runs. Jobs run inside an immediate transaction and reply over a
//! oneshot channel.

use std::any::Any;

use diesel::SqliteConnection;
use tokio::sync::{mpsc, oneshot};

use adpulse_core::errors::Result;

use super::DbPool;
use crate::errors::StorageError;

type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

/// Handle for sending write jobs to the actor.
///
/// The return type of each job is erased to `Box<dyn Any>` on the
/// channel and downcast back in `exec`.
#[derive(Clone)]
pub struct WriteHandle {
    #[allow(clippy::type_complexity)]
    tx: mpsc::Sender<(
        Job<Box<dyn Any + Send + 'static>>,
        oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>,
    )>,
}

impl WriteHandle {
    /// Execute a database job on the writer's dedicated connection.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .expect("Writer actor channel closed; the actor stopped.");

        ret_rx
            .await
            .expect("Writer actor dropped the reply sender without a result.")
            .map(|boxed: Box<dyn Any + Send + 'static>| {
                *boxed
                    .downcast::<T>()
                    .unwrap_or_else(|_| panic!("Failed to downcast writer actor result."))
            })
    }
}

/// Spawn the background task that owns one connection and processes
/// write jobs serially.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<(
        Job<Box<dyn Any + Send + 'static>>,
        oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>,
    )>(1024);

    tokio::spawn(async move {
        let mut conn = pool
            .get()
            .expect("Failed to get a connection from the pool for the writer actor.");

        while let Some((job, reply_tx)) = rx.recv().await {
            // The transaction is typed over StorageError because Diesel
            // needs From<diesel::result::Error>; converted back at the
            // boundary.
            let result: Result<Box<dyn Any + Send + 'static>> = conn
                .immediate_transaction::<_, StorageError, _>(|c| {
                    job(c).map_err(StorageError::from)
                })
                .map_err(|e: StorageError| e.into());

            // Receiver may have been dropped by a cancelled caller.
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle { tx }
}
