//! Capabilities the host server provides to the plugin.
//!
//! All of them are injected at construction; the plugin never reaches for
//! global server state.

use crate::types::Identity;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Delivery primitives of the host.
pub trait Broadcaster: Send + Sync {
    /// Sends a line to one identity.
    fn send(&self, to: &Identity, message: &str);

    /// Sends a line to every connected identity, console included.
    fn broadcast(&self, message: &str);
}

/// Permission lookup used by the command layer.
pub trait Permissions: Send + Sync {
    fn has_permission(&self, sender: &Identity, permission: &str) -> bool;
}

/// Grants everything. For hosts that enforce permissions before dispatch.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl Permissions for AllowAll {
    fn has_permission(&self, _sender: &Identity, _permission: &str) -> bool {
        true
    }
}

/// One delivered private message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateMessageRecord {
    pub sender: String,
    pub receiver: String,
    pub message: String,
}

impl PrivateMessageRecord {
    pub fn new(sender: &Identity, receiver: &Identity, message: &str) -> Self {
        Self {
            sender: sender.name().to_string(),
            receiver: receiver.name().to_string(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for PrivateMessageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(PM) {} -> {}: {}", self.sender, self.receiver, self.message)
    }
}

/// Best-effort side channel for private message auditing.
pub trait AuditSink: Send + Sync {
    fn private_message(&self, record: &PrivateMessageRecord);
}

/// Writes audit records to the `messaging::audit` tracing target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn private_message(&self, record: &PrivateMessageRecord) {
        info!(target: "messaging::audit", "{}", record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlayerProfile;

    #[test]
    fn test_record_display() {
        let alice = Identity::Player(PlayerProfile::new("alice"));
        let record = PrivateMessageRecord::new(&alice, &Identity::Console, "ping");
        assert_eq!(record.to_string(), "(PM) alice -> *Console*: ping");
    }

    #[test]
    fn test_allow_all() {
        assert!(AllowAll.has_permission(&Identity::Console, "commandbook.mute"));
    }
}
