//! Fan-out JSON-RPC client for a pool of coin daemons.
//!
//! A [`DaemonPool`] owns a fixed, ordered set of daemon [`Instance`]s and sends
//! every command to all of them at once over HTTP with basic auth. Each
//! instance completes independently; one daemon being down, misconfigured or
//! answering garbage never holds back the others.
//!
//! - [`DaemonPool::collect`] / [`DaemonPool::stream`] / [`DaemonPool::cmd`]:
//!   aggregate or as-completed delivery of [`InstanceResult`]s
//! - [`DaemonPool::probe`] / [`DaemonPool::is_online`] / [`DaemonPool::init`]:
//!   health probing, reported through [`PoolEvent`] subscribers
//! - [`DaemonPool::batch_cmd`]: one JSON-RPC batch against the first instance
//! - [`Transport`]: the HTTP seam; [`TcpTransport`] is the real one
//! - [`Logger`]: injected sink for operator-facing diagnostics
//!
//! ```no_run
//! use daemon_pool::{DaemonPool, InstanceConfig};
//!
//! # async fn example() -> Result<(), daemon_pool::PoolError> {
//! let pool = DaemonPool::new(
//!     vec![
//!         InstanceConfig::new(8332, "rpcuser", "rpcpass"),
//!         InstanceConfig::new(8332, "rpcuser", "rpcpass").with_host("10.0.0.2"),
//!     ],
//!     None,
//! )?;
//! for result in pool.collect("getblockcount", &[], false).await {
//!     println!("{} -> {:?} {:?}", result.instance, result.response, result.error);
//! }
//! # Ok(())
//! # }
//! ```

mod batch;
pub mod command;
pub mod config;
pub mod error;
pub mod events;
mod health;
pub mod http;
pub mod instance;
pub mod logger;
pub mod parser;
mod pool;
pub mod result;
pub mod transport;

#[cfg(test)]
mod testing;

pub use command::{RpcCall, RpcRequest};
pub use config::PoolConfig;
pub use error::{InstanceError, PoolError};
pub use events::PoolEvent;
pub use health::HealthReport;
pub use http::HttpReply;
pub use instance::{Instance, InstanceConfig};
pub use logger::{ConsoleLogger, LogFacade, Logger, Severity};
pub use pool::{DaemonPool, Delivery, DispatchOptions};
pub use result::InstanceResult;
pub use transport::{TcpTransport, Transport};
