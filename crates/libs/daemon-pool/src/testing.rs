use crate::error::InstanceError;
use crate::http::HttpReply;
use crate::instance::{Instance, InstanceConfig};
use crate::transport::Transport;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Debug)]
pub(crate) enum Scripted {
    Reply(HttpReply),
    Fail(InstanceError),
    Delayed(Duration, HttpReply),
    Hang,
}

impl Scripted {
    pub(crate) fn ok(body: &str) -> Self {
        Scripted::Reply(HttpReply::new(200, body.as_bytes()))
    }
}

/// Per-instance canned replies, keyed by instance index.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: HashMap<String, Scripted>,
    pub(crate) sent: Mutex<Vec<(String, Vec<u8>)>>,
}

impl ScriptedTransport {
    pub(crate) fn new(script: impl IntoIterator<Item = (usize, Scripted)>) -> Arc<Self> {
        Arc::new(Self {
            script: script.into_iter().map(|(index, step)| (index.to_string(), step)).collect(),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn sent(&self) -> Vec<(String, Vec<u8>)> {
        self.sent.lock().expect("sent mutex poisoned").clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post(&self, instance: &Instance, body: &[u8]) -> Result<HttpReply, InstanceError> {
        self.sent
            .lock()
            .expect("sent mutex poisoned")
            .push((instance.index().to_string(), body.to_vec()));
        match self.script.get(instance.index()).cloned() {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::Fail(error)) => Err(error),
            Some(Scripted::Delayed(delay, reply)) => {
                tokio::time::sleep(delay).await;
                Ok(reply)
            }
            Some(Scripted::Hang) => std::future::pending().await,
            None => Err(InstanceError::offline("no script for instance")),
        }
    }
}

pub(crate) fn configs(count: usize) -> Vec<InstanceConfig> {
    (0..count).map(|ordinal| InstanceConfig::new(8332 + ordinal as u16, "user", "pass")).collect()
}
