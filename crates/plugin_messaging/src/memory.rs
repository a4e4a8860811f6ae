//! In-memory host: an online roster that records every delivered line.
//!
//! Backs the console server and the tests; a real game server implements
//! [`Broadcaster`], [`IdentityResolver`] and [`Permissions`] on top of its
//! own connection handling instead.

use crate::host::{Broadcaster, Permissions};
use crate::resolver::IdentityResolver;
use crate::types::{Identity, PlayerId, PlayerProfile, SenderId};
use dashmap::{DashMap, DashSet};
use std::sync::{PoisonError, RwLock};

/// A line delivered to one identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub to: SenderId,
    pub recipient: String,
    pub message: String,
}

/// Online roster and delivery log kept entirely in memory.
///
/// Every line sent or broadcast is recorded as a [`Delivery`]; hosts drain
/// them with [`MemoryServer::take_deliveries`] and tests inspect them with
/// [`MemoryServer::inbox`]. Permission nodes are granted unless explicitly
/// denied.
#[derive(Debug, Default)]
pub struct MemoryServer {
    players: DashMap<PlayerId, PlayerProfile>,
    /// Ids handed out so far, by lower-cased login name.
    known_ids: DashMap<String, PlayerId>,
    deliveries: RwLock<Vec<Delivery>>,
    broadcasts: RwLock<Vec<String>>,
    denied: DashSet<(SenderId, String)>,
}

impl MemoryServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects a player with the given name.
    ///
    /// A name seen before gets its previous id back, so reply pointers held
    /// by other players survive a reconnect.
    pub fn join(&self, name: &str) -> PlayerProfile {
        let id = *self
            .known_ids
            .entry(name.to_lowercase())
            .or_insert_with(PlayerId::new);
        let profile = PlayerProfile {
            id,
            ..PlayerProfile::new(name)
        };
        self.join_profile(profile.clone());
        profile
    }

    pub fn join_profile(&self, profile: PlayerProfile) {
        self.players.insert(profile.id, profile);
    }

    pub fn leave(&self, id: PlayerId) -> Option<PlayerProfile> {
        self.players.remove(&id).map(|(_, profile)| profile)
    }

    /// Exact, case-insensitive lookup of an online player.
    pub fn player_by_name(&self, name: &str) -> Option<PlayerProfile> {
        self.players
            .iter()
            .find(|entry| entry.value().name.eq_ignore_ascii_case(name))
            .map(|entry| entry.value().clone())
    }

    pub fn deny(&self, sender: SenderId, permission: &str) {
        self.denied.insert((sender, permission.to_string()));
    }

    pub fn allow(&self, sender: SenderId, permission: &str) {
        self.denied.remove(&(sender, permission.to_string()));
    }

    /// Lines delivered to one identity so far, oldest first.
    pub fn inbox(&self, id: SenderId) -> Vec<String> {
        self.deliveries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|d| d.to == id)
            .map(|d| d.message.clone())
            .collect()
    }

    /// Every broadcast line so far.
    pub fn broadcasts(&self) -> Vec<String> {
        self.broadcasts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Removes and returns everything delivered since the last call.
    pub fn take_deliveries(&self) -> Vec<Delivery> {
        std::mem::take(&mut *self.deliveries.write().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn clear(&self) {
        self.take_deliveries();
        self.broadcasts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn record(&self, to: &Identity, message: &str) {
        self.deliveries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Delivery {
                to: to.id(),
                recipient: to.name().to_string(),
                message: message.to_string(),
            });
    }
}

impl Broadcaster for MemoryServer {
    fn send(&self, to: &Identity, message: &str) {
        self.record(to, message);
    }

    fn broadcast(&self, message: &str) {
        self.broadcasts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());

        self.record(&Identity::Console, message);
        for player in self.online_players() {
            self.record(&Identity::Player(player), message);
        }
    }
}

impl IdentityResolver for MemoryServer {
    fn online_players(&self) -> Vec<PlayerProfile> {
        let mut players: Vec<_> = self
            .players
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        players.sort_by(|a, b| a.name.cmp(&b.name));
        players
    }
}

impl Permissions for MemoryServer {
    fn has_permission(&self, sender: &Identity, permission: &str) -> bool {
        !self.denied.contains(&(sender.id(), permission.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_reaches_console_and_players() {
        let server = MemoryServer::new();
        let alice = server.join("alice");
        let bob = server.join("bob");

        server.broadcast("hello all");

        assert_eq!(server.inbox(SenderId::Console), vec!["hello all"]);
        assert_eq!(server.inbox(SenderId::Player(alice.id)), vec!["hello all"]);
        assert_eq!(server.inbox(SenderId::Player(bob.id)), vec!["hello all"]);
        assert_eq!(server.broadcasts(), vec!["hello all"]);
    }

    #[test]
    fn test_leave_removes_from_roster() {
        let server = MemoryServer::new();
        let alice = server.join("alice");
        assert!(server.player_by_name("ALICE").is_some());

        server.leave(alice.id);
        assert!(server.player_by_name("alice").is_none());
        assert!(server.lookup(SenderId::Player(alice.id)).is_none());
    }

    #[test]
    fn test_rejoin_keeps_player_id() {
        let server = MemoryServer::new();
        let first = server.join("alice");
        server.leave(first.id);

        let again = server.join("Alice");
        assert_eq!(again.id, first.id);
        assert_eq!(again.name, "Alice");
        assert_ne!(server.join("bob").id, first.id);
    }

    #[test]
    fn test_take_deliveries_drains() {
        let server = MemoryServer::new();
        server.send(&Identity::Console, "one");
        assert_eq!(server.take_deliveries().len(), 1);
        assert!(server.take_deliveries().is_empty());
    }

    #[test]
    fn test_permissions() {
        let server = MemoryServer::new();
        let alice = Identity::Player(server.join("alice"));

        assert!(server.has_permission(&alice, "commandbook.mute"));
        server.deny(alice.id(), "commandbook.mute");
        assert!(!server.has_permission(&alice, "commandbook.mute"));
        server.allow(alice.id(), "commandbook.mute");
        assert!(server.has_permission(&alice, "commandbook.mute"));
    }
}
