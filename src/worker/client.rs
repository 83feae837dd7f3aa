//! NDJSON client for one worker process.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

use super::error::{WorkerError, WorkerResult};
use super::protocol::{
    methods, ErrorInfo, ExecuteParams, ExecuteResponse, RequestEnvelope, ResponseEnvelope,
    ShutdownParams,
};
use crate::config::WorkerSettings;

/// Seeding large tables can take minutes.
const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Time allowed between `worker.shutdown` and process exit before a kill.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

type PendingMap = Arc<Mutex<HashMap<String, oneshot::Sender<ResponseEnvelope>>>>;

/// Handle on a running worker and the database it owns.
///
/// Requests are written to the worker's stdin one JSON object per line and
/// matched to replies on stdout by a UUID. A background task reads replies
/// and completes the waiting request; when stdout closes, every request
/// still waiting is failed with `WORKER_EXITED`.
///
/// Tear down with [`WorkerClient::shutdown`]. Dropping the client kills the
/// process.
pub struct WorkerClient {
    stdin: Arc<Mutex<BufWriter<ChildStdin>>>,
    pending: PendingMap,
    child: Child,
    reader_task: JoinHandle<()>,
    timeout: Duration,
}

impl WorkerClient {
    pub async fn spawn<P: AsRef<Path>>(worker_path: P) -> WorkerResult<Self> {
        Self::spawn_with_args_and_timeout(
            worker_path,
            &[],
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
        .await
    }

    /// Spawn the worker described by the `[worker]` config section.
    pub async fn spawn_with_settings(settings: &WorkerSettings) -> WorkerResult<Self> {
        let worker_path = settings.resolve_path().ok_or_else(|| {
            WorkerError::SpawnFailed(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no plancharts-worker binary found; set worker.path in the config file",
            ))
        })?;
        let args = settings.resolved_args().map_err(|e| {
            WorkerError::SpawnFailed(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                e.to_string(),
            ))
        })?;

        Self::spawn_with_args_and_timeout(
            &worker_path,
            &args,
            Duration::from_secs(settings.timeout_secs),
        )
        .await
    }

    pub async fn spawn_with_args_and_timeout<P: AsRef<Path>>(
        worker_path: P,
        args: &[String],
        timeout: Duration,
    ) -> WorkerResult<Self> {
        tracing::debug!(path = %worker_path.as_ref().display(), ?args, "spawning worker");

        let mut child = Command::new(worker_path.as_ref())
            .args(args)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(WorkerError::SpawnFailed)?;

        let stdin = child.stdin.take().ok_or_else(|| {
            WorkerError::SpawnFailed(std::io::Error::other("worker stdin not captured"))
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            WorkerError::SpawnFailed(std::io::Error::other("worker stdout not captured"))
        })?;

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let reader_task = Self::read_replies(stdout, pending.clone());

        Ok(Self {
            stdin: Arc::new(Mutex::new(BufWriter::new(stdin))),
            pending,
            child,
            reader_task,
            timeout,
        })
    }

    fn read_replies(stdout: ChildStdout, pending: PendingMap) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => match serde_json::from_str::<ResponseEnvelope>(&line) {
                        Ok(reply) => {
                            tracing::trace!(id = %reply.id, success = reply.success, "worker reply");
                            if let Some(tx) = pending.lock().await.remove(&reply.id) {
                                let _ = tx.send(reply);
                            }
                        }
                        Err(e) => tracing::warn!(error = %e, %line, "unparseable worker reply"),
                    },
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!(error = %e, "worker stdout read failed");
                        break;
                    }
                }
            }

            for (id, tx) in pending.lock().await.drain() {
                let _ = tx.send(ResponseEnvelope {
                    id,
                    success: false,
                    result: None,
                    error: Some(ErrorInfo {
                        code: "WORKER_EXITED".to_string(),
                        message: "worker exited before replying".to_string(),
                    }),
                });
            }
        })
    }

    /// Send one request and wait for its reply.
    ///
    /// Failed replies are mapped through [`WorkerError::from_code`].
    pub async fn request<P, R>(&self, method: &str, params: P) -> WorkerResult<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let id = uuid::Uuid::new_v4().to_string();
        let request = RequestEnvelope {
            id: id.clone(),
            method: method.to_string(),
            params: serde_json::to_value(params).map_err(WorkerError::SerializeFailed)?,
        };
        let mut line = serde_json::to_string(&request).map_err(WorkerError::SerializeFailed)?;
        line.push('\n');

        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id.clone(), tx);

        tracing::trace!(%id, method, "worker request");
        let written = {
            let mut stdin = self.stdin.lock().await;
            match stdin.write_all(line.as_bytes()).await {
                Ok(()) => stdin.flush().await,
                Err(e) => Err(e),
            }
        };
        if let Err(e) = written {
            self.pending.lock().await.remove(&id);
            return Err(WorkerError::WriteFailed(e));
        }

        let reply = match tokio::time::timeout(self.timeout, rx).await {
            Ok(reply) => reply?,
            Err(_) => {
                self.pending.lock().await.remove(&id);
                return Err(WorkerError::Timeout {
                    method: method.to_string(),
                    secs: self.timeout.as_secs(),
                });
            }
        };

        if reply.success {
            let result = reply.result.unwrap_or(serde_json::Value::Null);
            serde_json::from_value(result).map_err(WorkerError::DeserializeFailed)
        } else {
            Err(match reply.error {
                Some(error) => WorkerError::from_code(&error.code, error.message),
                None => WorkerError::from_code("UNKNOWN", "failed reply without error details"),
            })
        }
    }

    /// Run one statement, binding `args` to its `$n` placeholders.
    pub async fn execute(
        &self,
        sql: &str,
        args: Vec<serde_json::Value>,
    ) -> WorkerResult<ExecuteResponse> {
        self.request(
            methods::EXECUTE,
            ExecuteParams {
                sql: sql.to_string(),
                args,
            },
        )
        .await
    }

    /// False once the worker's stdout has closed.
    pub fn is_alive(&self) -> bool {
        !self.reader_task.is_finished()
    }

    /// Ask the worker to drop its database and exit, killing it if it
    /// overstays the grace period. A worker that already died is fine.
    pub async fn shutdown(mut self) -> WorkerResult<()> {
        if self.is_alive() {
            match self
                .request::<_, serde_json::Value>(methods::SHUTDOWN, ShutdownParams::default())
                .await
            {
                Ok(_) => {}
                Err(e) if e.is_worker_exited() => {}
                Err(e) => tracing::warn!(error = %e, "worker rejected shutdown request"),
            }
        }

        match tokio::time::timeout(SHUTDOWN_GRACE, self.child.wait()).await {
            Ok(Ok(status)) => {
                tracing::debug!(%status, "worker exited");
                Ok(())
            }
            Ok(Err(e)) => Err(WorkerError::ReadFailed(e)),
            Err(_) => {
                tracing::warn!("worker did not exit in time, killing it");
                self.child.kill().await.map_err(WorkerError::WriteFailed)
            }
        }
    }
}
