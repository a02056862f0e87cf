use crate::error::PoolError;
use crate::instance::InstanceConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_PROBE_METHOD: &str = "getpeerinfo";

/// Pool description, usually loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PoolConfig {
    #[serde(default)]
    pub instances: Vec<InstanceConfig>,
    /// Method sent (without params) by the health probe.
    #[serde(default = "default_probe_method")]
    pub probe_method: String,
    /// Surface HTTP 401 as an `Unauthorized` result instead of only logging it.
    #[serde(default = "default_true")]
    pub report_unauthorized: bool,
    /// Surface undecodable bodies as a `Decode` result instead of only logging them.
    #[serde(default = "default_true")]
    pub report_decode_failures: bool,
}

fn default_probe_method() -> String {
    DEFAULT_PROBE_METHOD.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            instances: Vec::new(),
            probe_method: default_probe_method(),
            report_unauthorized: true,
            report_decode_failures: true,
        }
    }
}

impl PoolConfig {
    pub fn with_instances(instances: Vec<InstanceConfig>) -> Self {
        Self { instances, ..Self::default() }
    }

    pub fn from_toml_str(input: &str) -> Result<Self, PoolError> {
        Ok(toml::from_str(input)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PoolError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)
            .map_err(|source| PoolError::Io { path: path.display().to_string(), source })?;
        Self::from_toml_str(&input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_instances_and_defaults() {
        let config = PoolConfig::from_toml_str(
            r#"
[[instances]]
port = 8332
user = "alice"
password = "secret"

[[instances]]
host = "10.0.0.7"
port = 18332
user = "bob"
password = "hunter2"
"#,
        )
        .unwrap();
        assert_eq!(config.instances.len(), 2);
        assert_eq!(config.instances[0].host, None);
        assert_eq!(config.instances[1].host.as_deref(), Some("10.0.0.7"));
        assert_eq!(config.probe_method, "getpeerinfo");
        assert!(config.report_unauthorized);
        assert!(config.report_decode_failures);
    }

    #[test]
    fn policy_flags_override() {
        let config = PoolConfig::from_toml_str(
            r#"
probe_method = "getnetworkinfo"
report_unauthorized = false
report_decode_failures = false

[[instances]]
port = 1
"#,
        )
        .unwrap();
        assert_eq!(config.probe_method, "getnetworkinfo");
        assert!(!config.report_unauthorized);
        assert!(!config.report_decode_failures);
        assert_eq!(config.instances[0].user, "");
    }

    #[test]
    fn rejects_instances_without_port() {
        let err = PoolConfig::from_toml_str("[[instances]]\nuser = \"x\"\n").unwrap_err();
        assert!(matches!(err, PoolError::Config(_)));
    }

    #[test]
    fn load_reads_file_and_reports_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daemons.toml");
        std::fs::write(&path, "[[instances]]\nport = 9000\nuser = \"u\"\npassword = \"p\"\n")
            .unwrap();
        let config = PoolConfig::load(&path).unwrap();
        assert_eq!(config.instances[0].port, 9000);

        let err = PoolConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, PoolError::Io { .. }));
    }
}
