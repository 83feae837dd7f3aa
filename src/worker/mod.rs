//! Database workers.
//!
//! A worker is an external process that provisions a throwaway PostgreSQL
//! instance on start, runs SQL on request, and destroys the instance on exit.
//! Each sweep sample gets its own worker, which is what keeps samples
//! isolated from one another.
//!
//! ```text
//!  WorkerClient ── {"id","method":"sql.execute","params":{...}} ──▶ stdin
//!       ▲                                                            │
//!       └──────── {"id","success","result"|"error"} ◀── stdout ◀── worker
//! ```
//!
//! ```ignore
//! use plancharts::worker::WorkerClient;
//!
//! let client = WorkerClient::spawn("./plancharts-worker").await?;
//! client.execute("CREATE TABLE t (id int)", vec![]).await?;
//! client.shutdown().await?;
//! ```

mod client;
mod error;
pub mod protocol;

pub use client::WorkerClient;
pub use error::{WorkerError, WorkerResult};
