//! Events consumed and produced by the messaging plugin, and a local
//! in-process bus that hosts can use to wire them.
//!
//! Plugin events use the `plugin:<plugin>:<event>` key scheme and travel as
//! JSON, so subscribers only need the payload shape, not our types.

use crate::error::EventError;
use crate::types::{Identity, PlayerProfile};
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, error};

/// Namespace of the events this plugin emits.
pub const PLUGIN_NAMESPACE: &str = "messaging";
/// Emitted by `/me` with `"<name> <message>"`.
pub const SHARED_MESSAGE: &str = "shared_message";
/// Emitted by `/say` once no listener vetoed it.
pub const SENDER_MESSAGE: &str = "sender_message";

/// A player's attempt to chat. Listeners may cancel it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerChatEvent {
    pub player: PlayerProfile,
    pub message: String,
    cancelled: bool,
}

impl PlayerChatEvent {
    pub fn new(player: PlayerProfile, message: impl Into<String>) -> Self {
        Self {
            player,
            message: message.into(),
            cancelled: false,
        }
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Chat-like message sent by any sender through `/say`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SenderMessageEvent {
    pub sender: Identity,
    pub message: String,
}

/// Text shared with other components, e.g. chat bridges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedMessageEvent {
    pub message: String,
}

/// Synchronous veto point for chat attempts.
pub trait ChatListener: Send + Sync {
    fn on_chat(&self, event: &mut PlayerChatEvent);
}

pub trait EventBus: Send + Sync {
    /// Runs every chat listener on the event, in registration order.
    fn call_chat(&self, event: &mut PlayerChatEvent);

    fn emit_plugin(
        &self,
        plugin: &str,
        event: &str,
        payload: &serde_json::Value,
    ) -> Result<(), EventError>;

    fn register_chat_listener(&self, listener: Arc<dyn ChatListener>);
}

impl dyn EventBus {
    /// Serializes `event` and emits it under this plugin's namespace.
    pub fn emit<T: Serialize>(&self, event_name: &str, event: &T) -> Result<(), EventError> {
        let payload = serde_json::to_value(event)?;
        self.emit_plugin(PLUGIN_NAMESPACE, event_name, &payload)
    }
}

type PluginHandler = Arc<dyn Fn(&serde_json::Value) -> Result<(), EventError> + Send + Sync>;

/// Counters exposed by [`LocalEventBus::get_stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventStats {
    pub total_handlers: usize,
    pub events_emitted: u64,
    pub chat_events: u64,
    pub handler_failures: u64,
}

/// In-process event bus.
#[derive(Default)]
pub struct LocalEventBus {
    handlers: DashMap<String, Vec<PluginHandler>>,
    chat_listeners: RwLock<Vec<Arc<dyn ChatListener>>>,
    events_emitted: AtomicU64,
    chat_events: AtomicU64,
    handler_failures: AtomicU64,
}

impl LocalEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a typed handler for `plugin:<plugin>:<event>`.
    pub fn on_plugin<T, F>(&self, plugin: &str, event: &str, handler: F)
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) -> Result<(), EventError> + Send + Sync + 'static,
    {
        let key = event_key(plugin, event);
        debug!("📝 Registering handler for {}", key);

        let wrapped: PluginHandler = Arc::new(move |payload: &serde_json::Value| {
            let typed: T = serde_json::from_value(payload.clone())?;
            handler(typed)
        });
        self.handlers.entry(key).or_default().push(wrapped);
    }

    pub fn get_stats(&self) -> EventStats {
        EventStats {
            total_handlers: self.handlers.iter().map(|entry| entry.value().len()).sum(),
            events_emitted: self.events_emitted.load(Ordering::Relaxed),
            chat_events: self.chat_events.load(Ordering::Relaxed),
            handler_failures: self.handler_failures.load(Ordering::Relaxed),
        }
    }
}

impl EventBus for LocalEventBus {
    fn call_chat(&self, event: &mut PlayerChatEvent) {
        self.chat_events.fetch_add(1, Ordering::Relaxed);

        // Snapshot so listeners may register others without deadlocking.
        let listeners: Vec<_> = self
            .chat_listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for listener in listeners {
            listener.on_chat(event);
        }
    }

    fn emit_plugin(
        &self,
        plugin: &str,
        event: &str,
        payload: &serde_json::Value,
    ) -> Result<(), EventError> {
        let key = event_key(plugin, event);
        self.events_emitted.fetch_add(1, Ordering::Relaxed);

        let handlers = match self.handlers.get(&key) {
            Some(entry) => entry.value().clone(),
            None => {
                debug!("No handlers for {}", key);
                return Ok(());
            }
        };

        for handler in handlers {
            if let Err(e) = handler(payload) {
                self.handler_failures.fetch_add(1, Ordering::Relaxed);
                error!("❌ Handler for {} failed: {}", key, e);
            }
        }

        Ok(())
    }

    fn register_chat_listener(&self, listener: Arc<dyn ChatListener>) {
        self.chat_listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }
}

fn event_key(plugin: &str, event: &str) -> String {
    format!("plugin:{plugin}:{event}")
}
