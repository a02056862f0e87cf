use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv6Addr;

pub const DEFAULT_HOST: &str = "127.0.0.1";

/// One daemon endpoint as written in the pool configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstanceConfig {
    #[serde(default)]
    pub host: Option<String>,
    pub port: u16,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
}

impl InstanceConfig {
    pub fn new(port: u16, user: impl Into<String>, password: impl Into<String>) -> Self {
        Self { host: None, port, user: user.into(), password: password.into() }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }
}

/// A configured daemon with its ordinal `index`.
///
/// Indexes are assigned once by [`Instance::from_configs`] and only used to
/// attribute results and log lines.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Instance {
    index: String,
    host: String,
    port: u16,
    user: String,
    #[serde(skip_serializing)]
    password: String,
}

impl Instance {
    pub fn from_configs<I>(configs: I) -> Vec<Instance>
    where
        I: IntoIterator<Item = InstanceConfig>,
    {
        configs
            .into_iter()
            .enumerate()
            .map(|(ordinal, config)| Instance {
                index: ordinal.to_string(),
                host: config
                    .host
                    .map(|host| host.trim().to_string())
                    .filter(|host| !host.is_empty())
                    .unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: config.port,
                user: config.user,
                password: config.password,
            })
            .collect()
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port` as written in a `Host` header; IPv6 literals are bracketed.
    pub fn endpoint(&self) -> String {
        if self.host.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Value of the `Authorization` header for HTTP basic auth.
    pub fn basic_auth(&self) -> String {
        let credentials = format!("{}:{}", self.user, self.password);
        format!("Basic {}", BASE64.encode(credentials.as_bytes()))
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({})", self.index, self.endpoint())
    }
}
