//! Backend configuration

use serde::{Deserialize, Serialize};

use crate::registry::{Backend, Capabilities, RegistryError};

/// Static backend definition from `[[backends]]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub id: String,
    /// MIME patterns such as `video/*` or `*/*`
    pub content_types: Vec<String>,
    #[serde(default)]
    pub cost_tier: u32,
    #[serde(default)]
    pub disabled: bool,
}

impl BackendConfig {
    pub fn new(id: impl Into<String>, content_types: &[&str], cost_tier: u32) -> Self {
        Self {
            id: id.into(),
            content_types: content_types.iter().map(|t| t.to_string()).collect(),
            cost_tier,
            disabled: false,
        }
    }

    /// Compile into a registry backend with the given latency window.
    pub fn build(&self, latency_window: usize) -> Result<Backend, RegistryError> {
        let capabilities = Capabilities::new(self.content_types.clone(), self.cost_tier)?;
        Ok(Backend::new(self.id.clone(), capabilities)
            .with_latency_window(latency_window)
            .with_disabled(self.disabled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_config_defaults() {
        let config: BackendConfig =
            toml::from_str("id = \"s3\"\ncontent_types = [\"*/*\"]").unwrap();
        assert_eq!(config.cost_tier, 0);
        assert!(!config.disabled);
    }

    #[test]
    fn test_build_backend() {
        let mut config = BackendConfig::new("edge", &["video/*"], 2);
        config.disabled = true;
        let backend = config.build(10).unwrap();
        assert_eq!(backend.id, "edge");
        assert_eq!(backend.capabilities.cost_tier, 2);
        assert!(backend.is_disabled());
    }

    #[test]
    fn test_build_rejects_bad_pattern() {
        let config = BackendConfig::new("bad", &["video/["], 0);
        assert!(matches!(
            config.build(10),
            Err(RegistryError::InvalidPattern { .. })
        ));
    }
}
