//! Environment configuration.

use std::env;

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub unbound_dispatcher: bool,
    pub debug_batches: bool,
    pub debug_events: bool,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            unbound_dispatcher: env_flag("TAPE_RENDER_UNBOUND_DISPATCHER"),
            debug_batches: env_flag("TAPE_RENDER_DEBUG_BATCHES"),
            debug_events: env_flag("TAPE_RENDER_DEBUG_EVENTS"),
        }
    }
}

/// How the renderer guards its entry points.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DispatcherMode {
    /// Bind to the thread that constructs the renderer.
    #[default]
    CurrentThread,
    /// Admit every caller. For hosts that are single-threaded by construction.
    Unbound,
}

#[derive(Clone, Debug, Default)]
pub struct RendererOptions {
    pub dispatcher: DispatcherMode,
}

impl RendererOptions {
    pub fn from_env() -> Self {
        Self::from_config(&EnvConfig::from_env())
    }

    pub fn from_config(config: &EnvConfig) -> Self {
        Self {
            dispatcher: if config.unbound_dispatcher {
                DispatcherMode::Unbound
            } else {
                DispatcherMode::CurrentThread
            },
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}
