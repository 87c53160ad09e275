//! EngineBuilder - エンジンの構築とワイヤリング
//!
//! # Fail-fast 設計
//! - store が未設定なら build() は BuildError を返す
//! - config は build() 時に検証する（lock_timeout = 0 は拒否）

use std::sync::Arc;

use crate::app::config::{ConfigError, EngineConfig};
use crate::app::engine::WorkflowEngine;
use crate::ports::RecordStore;

/// # 使用例
/// ```ignore
/// let engine = EngineBuilder::new()
///     .store(Arc::new(InMemoryRecordStore::new()))
///     .with_env()?
///     .build()?;
/// ```
pub struct EngineBuilder {
    store: Option<Arc<dyn RecordStore>>,
    config: EngineConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no record store configured; call .store() before .build()")]
    MissingStore,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            config: EngineConfig::default(),
        }
    }

    pub fn store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Apply `SIFT_*` environment overrides on top of the current config.
    pub fn with_env(mut self) -> Result<Self, ConfigError> {
        self.config = self.config.with_env_overrides()?;
        Ok(self)
    }

    pub fn build(self) -> Result<WorkflowEngine, BuildError> {
        let store = self.store.ok_or(BuildError::MissingStore)?;
        self.config.validate()?;
        tracing::debug!(
            lock_timeout_ms = self.config.lock_timeout.as_millis() as u64,
            "workflow engine built"
        );
        Ok(WorkflowEngine::new(store, self.config))
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryRecordStore;
    use std::time::Duration;

    #[test]
    fn test_build_success() {
        let engine = EngineBuilder::new()
            .store(Arc::new(InMemoryRecordStore::new()))
            .build()
            .unwrap();
        assert_eq!(engine.config(), &EngineConfig::default());
    }

    #[test]
    fn test_build_missing_store() {
        let result = EngineBuilder::new().build();
        assert!(matches!(result, Err(BuildError::MissingStore)));
    }

    #[test]
    fn test_build_rejects_zero_timeout() {
        let result = EngineBuilder::new()
            .store(Arc::new(InMemoryRecordStore::new()))
            .config(EngineConfig {
                lock_timeout: Duration::ZERO,
            })
            .build();
        assert!(matches!(
            result,
            Err(BuildError::Config(ConfigError::ZeroLockTimeout))
        ));
    }
}
