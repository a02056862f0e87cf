use crate::command::{RpcCall, RpcRequest};
use crate::config::PoolConfig;
use crate::error::{InstanceError, PoolError};
use crate::events::{EventHub, PoolEvent};
use crate::instance::{Instance, InstanceConfig};
use crate::logger::{ConsoleLogger, Logger, Severity};
use crate::parser;
use crate::result::InstanceResult;
use crate::transport::{TcpTransport, Transport};
use futures::stream::{FuturesUnordered, Stream, StreamExt};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tokio::sync::broadcast;

/// How `cmd` hands results to its callback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Deliver each result as it completes instead of once at the end.
    pub stream: bool,
    /// Attach the raw reply body to each result.
    pub include_raw: bool,
}

impl DispatchOptions {
    pub fn aggregate() -> Self {
        Self::default()
    }

    pub fn streaming() -> Self {
        Self { stream: true, include_raw: false }
    }

    pub fn with_raw(mut self) -> Self {
        self.include_raw = true;
        self
    }
}

/// What a `cmd` callback receives.
#[derive(Clone, Debug, PartialEq)]
pub enum Delivery {
    /// Streaming mode: one instance finished.
    One(InstanceResult),
    /// Aggregate mode: every instance finished, in completion order.
    All(Vec<InstanceResult>),
}

#[derive(Clone, Debug)]
pub(crate) struct PoolOptions {
    pub(crate) probe_method: String,
    pub(crate) report_unauthorized: bool,
    pub(crate) report_decode_failures: bool,
}

/// Sends JSON-RPC commands to every configured daemon at once.
///
/// The instance set is fixed at construction. Dispatches share no mutable
/// state, so any number may run concurrently against the same pool.
pub struct DaemonPool {
    instances: Vec<Instance>,
    transport: Arc<dyn Transport>,
    logger: Arc<dyn Logger>,
    events: EventHub,
    pub(crate) options: PoolOptions,
}

impl DaemonPool {
    /// Builds a pool over `instances` with default policies and the TCP transport.
    /// Without a logger, diagnostics are printed to the console.
    pub fn new(
        instances: Vec<InstanceConfig>,
        logger: Option<Arc<dyn Logger>>,
    ) -> Result<Self, PoolError> {
        Self::from_config(PoolConfig::with_instances(instances), logger)
    }

    pub fn from_config(config: PoolConfig, logger: Option<Arc<dyn Logger>>) -> Result<Self, PoolError> {
        if config.instances.is_empty() {
            return Err(PoolError::NoInstances);
        }
        Ok(Self {
            instances: Instance::from_configs(config.instances),
            transport: Arc::new(TcpTransport::new()),
            logger: logger.unwrap_or_else(|| Arc::new(ConsoleLogger) as Arc<dyn Logger>),
            events: EventHub::new(),
            options: PoolOptions {
                probe_method: config.probe_method,
                report_unauthorized: config.report_unauthorized,
                report_decode_failures: config.report_decode_failures,
            },
        })
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PoolEvent> {
        self.events.subscribe()
    }

    pub(crate) fn emit(&self, event: PoolEvent) {
        self.events.emit(event);
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub(crate) fn log(&self, severity: Severity, message: &str) {
        self.logger.log(severity, message);
    }

    /// Dispatches `method` to every instance and yields results as they complete.
    ///
    /// Requests are issued on first poll and all run concurrently on the
    /// polling task. The stream ends after every instance has completed.
    pub fn stream(
        &self,
        method: &str,
        params: &[JsonValue],
        include_raw: bool,
    ) -> impl Stream<Item = InstanceResult> + Send + '_ {
        let call = RpcCall::new(method, params.to_vec());
        let pending: FuturesUnordered<_> = self
            .instances
            .iter()
            .enumerate()
            .map(|(ordinal, instance)| {
                let request = RpcRequest::from_call(&call, ordinal);
                self.dispatch_one(instance, request, include_raw)
            })
            .collect();
        pending.filter_map(futures::future::ready)
    }

    /// Dispatches `method` to every instance and waits for all of them.
    pub async fn collect(
        &self,
        method: &str,
        params: &[JsonValue],
        include_raw: bool,
    ) -> Vec<InstanceResult> {
        self.stream(method, params, include_raw).collect().await
    }

    /// Callback form of [`stream`](Self::stream) and [`collect`](Self::collect).
    ///
    /// Streaming mode calls `callback` once per instance with [`Delivery::One`];
    /// aggregate mode calls it exactly once with [`Delivery::All`].
    pub async fn cmd<F>(
        &self,
        method: &str,
        params: &[JsonValue],
        options: DispatchOptions,
        mut callback: F,
    ) where
        F: FnMut(Delivery),
    {
        if options.stream {
            let mut results = std::pin::pin!(self.stream(method, params, options.include_raw));
            while let Some(result) = results.next().await {
                callback(Delivery::One(result));
            }
        } else {
            callback(Delivery::All(self.collect(method, params, options.include_raw).await));
        }
    }

    /// Runs one request against one instance. `None` means the instance
    /// completed but policy says its failure is only logged.
    async fn dispatch_one(
        &self,
        instance: &Instance,
        request: RpcRequest,
        include_raw: bool,
    ) -> Option<InstanceResult> {
        let body = match request.to_body() {
            Ok(body) => body,
            Err(err) => {
                return Some(InstanceResult::failed(instance, InstanceError::request(err.to_string())))
            }
        };

        let reply = match self.transport.post(instance, &body).await {
            Ok(reply) => reply,
            Err(error) => {
                log::debug!("rpc({}): {} failed: {}", instance.index(), request.method, error);
                return Some(InstanceResult::failed(instance, error));
            }
        };
        let raw = include_raw.then(|| String::from_utf8_lossy(&reply.body).into_owned());

        if reply.is_unauthorized() {
            self.log_unauthorized(instance);
            if !self.options.report_unauthorized {
                return None;
            }
            let error = InstanceError::Unauthorized {
                message: format!("invalid RPC username or password for {}", instance.endpoint()),
            };
            return Some(InstanceResult::failed(instance, error).with_data(raw));
        }

        match parser::parse_body(&reply.body) {
            Ok(envelope) => Some(InstanceResult::from_envelope(instance, &envelope).with_data(raw)),
            Err(failure) => {
                self.log_decode_failure(instance, &body, &reply.body);
                if !self.options.report_decode_failures {
                    return None;
                }
                let error = InstanceError::Decode { message: failure.to_string() };
                Some(InstanceResult::failed(instance, error).with_data(raw))
            }
        }
    }

    pub(crate) fn log_unauthorized(&self, instance: &Instance) {
        self.log(
            Severity::Error,
            &format!(
                "Unauthorized RPC access to daemon instance {} - invalid RPC username or password",
                instance.index()
            ),
        );
    }

    pub(crate) fn log_decode_failure(&self, instance: &Instance, request: &[u8], response: &[u8]) {
        self.log(
            Severity::Error,
            &format!(
                "Could not parse rpc data from daemon instance {}\nRequest Data: {}\nResponse Data: {}",
                instance.index(),
                String::from_utf8_lossy(request),
                String::from_utf8_lossy(response)
            ),
        );
    }
}
