use serde::Deserialize;

use crate::error::EngineError;

pub const DEFAULT_ROWS_PER_PAGE: usize = 10;
pub const ROWS_PER_PAGE_OPTIONS: [usize; 3] = [10, 25, 100];

/// Connection descriptor for the hosted store and identity provider.
/// Opaque to the engine; carried so an adapter can be built from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    #[serde(default)]
    pub storage_bucket: String,
    #[serde(default)]
    pub messaging_sender_id: String,
    #[serde(default)]
    pub app_id: String,
}

impl ConnectionConfig {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json).map_err(|e| EngineError::Config(e.to_string()))
    }
}

/// How lock toggle responses are applied when several are in flight for
/// the same room.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockOrdering {
    /// Every failure restores the value seen before its own toggle, in
    /// whatever order responses arrive.
    #[default]
    LastResponseWins,
    /// Failures of superseded toggles are ignored; a failure of the newest
    /// toggle restores the last value the store accepted.
    LatestRequestWins,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub rows_per_page: usize,
    pub rows_per_page_options: Vec<usize>,
    pub lock_ordering: LockOrdering,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            rows_per_page_options: ROWS_PER_PAGE_OPTIONS.to_vec(),
            lock_ordering: LockOrdering::default(),
        }
    }
}

impl RegistryConfig {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.rows_per_page_options.iter().any(|&n| n == 0) {
            return Err(EngineError::Config("page sizes must be positive".into()));
        }
        if !self.rows_per_page_options.contains(&self.rows_per_page) {
            return Err(EngineError::Config(format!(
                "rows_per_page {} is not one of {:?}",
                self.rows_per_page, self.rows_per_page_options
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_empty_object() {
        let config = RegistryConfig::from_json("{}").unwrap();
        assert_eq!(config, RegistryConfig::default());
        assert_eq!(config.rows_per_page, 10);
        assert_eq!(config.lock_ordering, LockOrdering::LastResponseWins);
    }

    #[test]
    fn lock_ordering_by_name() {
        let config = RegistryConfig::from_json(r#"{"lock_ordering": "latest_request_wins"}"#).unwrap();
        assert_eq!(config.lock_ordering, LockOrdering::LatestRequestWins);
    }

    #[test]
    fn rejects_page_size_outside_options() {
        let err = RegistryConfig::from_json(r#"{"rows_per_page": 7}"#).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn connection_descriptor_uses_camel_case() {
        let config = ConnectionConfig::from_json(
            r#"{"apiKey": "k", "authDomain": "rooms.example.app", "projectId": "rooms"}"#,
        )
        .unwrap();
        assert_eq!(config.project_id, "rooms");
        assert_eq!(config.app_id, "");
    }
}
