use super::DbPool;
use crate::errors::StorageError;
use diesel::SqliteConnection;
use log::error;
use std::any::Any;
use tokio::sync::{mpsc, oneshot};

use savings_core::errors::{DatabaseError, Error, Result};

// A job takes the writer's connection and returns a core Result.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;
type ErasedJob = Job<Box<dyn Any + Send + 'static>>;
type Reply = oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>;

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(ErasedJob, Reply)>,
}

impl WriteHandle {
    /// Executes a database job on the writer actor's dedicated connection.
    ///
    /// The job runs inside an immediate transaction; an `Err` rolls it back.
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
            .map_err(|_| writer_stopped("the writer is no longer accepting jobs"))?;

        let boxed = ret_rx
            .await
            .map_err(|_| writer_stopped("the writer dropped the job without replying"))??;

        boxed.downcast::<T>().map(|value| *value).map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "Writer returned a result of an unexpected type".to_string(),
            ))
        })
    }
}

fn writer_stopped(reason: &str) -> Error {
    Error::Database(DatabaseError::Internal(format!(
        "Database writer unavailable: {}",
        reason
    )))
}

/// Spawns a background Tokio task that acts as the single writer to the database.
///
/// The actor owns one connection from the pool for its whole lifetime and runs
/// jobs serially. If no connection can be acquired the actor exits and every
/// subsequent `exec` fails.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<(ErasedJob, Reply)>(1024);

    tokio::spawn(async move {
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                error!("Database writer could not acquire a connection: {}", e);
                return;
            }
        };

        while let Some((job, reply_tx)) = rx.recv().await {
            let result: Result<Box<dyn Any + Send + 'static>> = conn
                .immediate_transaction::<_, StorageError, _>(|c| job(c).map_err(StorageError::from))
                .map_err(Error::from);

            // The requester may have gone away; nothing to report then.
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle { tx }
}
