// Copyright (c) 2024 Botho Foundation

//! Configuration for the notification protocol.

use crate::store::NoteStoreConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the notification protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GossipConfig {
    /// How many peers each `notify` round pushes to.
    pub fanout: usize,

    /// Maximum number of notes carried by a single notification message.
    pub max_notes_per_notification: usize,

    /// Deadline for a single gossip exchange, open-to-close (seconds).
    ///
    /// The host's stream may impose its own timeout; this bounds the
    /// exchange end-to-end so a hung peer cannot pin a stream slot.
    pub request_timeout_secs: u64,

    /// Note store configuration.
    pub store_config: NoteStoreConfig,
}

impl Default for GossipConfig {
    fn default() -> Self {
        Self {
            fanout: 2,
            max_notes_per_notification: 10,
            request_timeout_secs: 5,
            store_config: NoteStoreConfig::default(),
        }
    }
}

impl GossipConfig {
    /// Get the exchange deadline as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Builder for GossipConfig.
#[derive(Debug, Default)]
pub struct GossipConfigBuilder {
    config: GossipConfig,
}

impl GossipConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the notify fanout.
    pub fn fanout(mut self, fanout: usize) -> Self {
        self.config.fanout = fanout;
        self
    }

    /// Set the maximum number of notes per notification.
    pub fn max_notes_per_notification(mut self, max: usize) -> Self {
        self.config.max_notes_per_notification = max;
        self
    }

    /// Set the exchange deadline in seconds.
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    /// Set the store config.
    pub fn store_config(mut self, config: NoteStoreConfig) -> Self {
        self.config.store_config = config;
        self
    }

    /// Build the config.
    pub fn build(self) -> GossipConfig {
        self.config
    }
}
