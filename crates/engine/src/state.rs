//! Engine state — shared state threaded through tool handlers.

use std::sync::Arc;

use crate::conf::EngineConfig;
use crate::session::SessionCache;

pub struct EngineState {
    pub config: EngineConfig,
    pub sessions: SessionCache,
}

impl EngineState {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            sessions: SessionCache::new(),
        }
    }
}

pub type SharedState = Arc<EngineState>;
