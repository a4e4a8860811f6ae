//! Line-driven host around the messaging plugin.
//!
//! Stands in for a game server: the console operator connects players,
//! makes them chat or run commands, and sees every line delivered.
//!
//! ```text
//! join <name>              connect a player
//! leave <name>             disconnect a player
//! as <name> <command...>   run a command as that player
//! chat <name> <text...>    raw chat attempt by that player
//! players                  list connected players
//! reload                   re-read the configuration file
//! <command...>             run a command as the console
//! ```

use crate::config::AppConfig;
use plugin_messaging::{
    format, strip_colors, Broadcaster, ConfigResult, EventBus, EventStats, HostServices, Identity,
    IdentityResolver, LocalEventBus, MemoryServer, MemorySessionStore, MessagingPlugin,
    PlayerChatEvent, SenderId, TracingAuditSink,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

pub struct ConsoleHost {
    server: Arc<MemoryServer>,
    sessions: Arc<MemorySessionStore>,
    events: Arc<LocalEventBus>,
    plugin: MessagingPlugin,
    config_path: PathBuf,
}

impl ConsoleHost {
    pub fn new(config: &AppConfig, config_path: PathBuf) -> ConfigResult<Self> {
        let server = Arc::new(MemoryServer::new());
        let sessions = Arc::new(MemorySessionStore::new());
        let events = Arc::new(LocalEventBus::new());

        let plugin = MessagingPlugin::new(
            config.messaging.clone(),
            HostServices {
                sessions: sessions.clone(),
                resolver: server.clone(),
                broadcaster: server.clone(),
                events: events.clone(),
                audit: Arc::new(TracingAuditSink),
                permissions: server.clone(),
            },
        )?;
        plugin.initialize();

        Ok(Self {
            server,
            sessions,
            events,
            plugin,
            config_path,
        })
    }

    pub fn event_stats(&self) -> EventStats {
        self.events.get_stats()
    }

    /// Handles one input line and returns the lines to print.
    pub async fn handle_line(&mut self, line: &str) -> Vec<String> {
        let line = line.trim();
        let (head, rest) = split_word(line);

        let mut output = match head {
            "" => Vec::new(),
            "join" => self.join(rest),
            "leave" => self.leave(rest),
            "as" => self.run_as(rest),
            "chat" => self.chat(rest),
            "players" => vec![self.player_list()],
            "reload" => vec![self.reload().await],
            _ => {
                // Errors are already delivered to the console inbox.
                let _ = self.plugin.dispatch(&Identity::Console, line);
                Vec::new()
            }
        };

        output.extend(
            self.server
                .take_deliveries()
                .into_iter()
                .map(|d| format!("[{}] {}", d.recipient, strip_colors(&d.message))),
        );
        output
    }

    fn join(&self, name: &str) -> Vec<String> {
        if name.is_empty() || name.contains(char::is_whitespace) {
            return vec!["Usage: join <name>".to_string()];
        }
        if self.server.player_by_name(name).is_some() {
            return vec![format!("{name} is already online")];
        }

        let profile = self.server.join(name);
        self.sessions.open(SenderId::Player(profile.id));
        info!("👋 {} joined ({})", profile.name, profile.id);
        vec![format!("{name} joined the game")]
    }

    fn leave(&self, name: &str) -> Vec<String> {
        let Some(profile) = self.server.player_by_name(name) else {
            return vec![format!("{name} is not online")];
        };

        self.server.leave(profile.id);
        self.sessions.close(SenderId::Player(profile.id));
        info!("👋 {} left", profile.name);
        vec![format!("{} left the game", profile.name)]
    }

    fn run_as(&self, rest: &str) -> Vec<String> {
        let (name, command) = split_word(rest);
        match self.server.player_by_name(name) {
            Some(profile) => {
                let _ = self.plugin.dispatch(&Identity::Player(profile), command);
                Vec::new()
            }
            None => vec![format!("{name} is not online")],
        }
    }

    /// Raw chat goes through the chat listeners; if nobody cancels it, the
    /// host shows it like the game's default chat would.
    fn chat(&self, rest: &str) -> Vec<String> {
        let (name, text) = split_word(rest);
        let Some(profile) = self.server.player_by_name(name) else {
            return vec![format!("{name} is not online")];
        };

        let mut event = PlayerChatEvent::new(profile.clone(), text);
        self.events.call_chat(&mut event);
        if !event.is_cancelled() {
            let sender = Identity::Player(profile);
            self.server.broadcast(&format::player_say(&sender, &event.message));
        }
        Vec::new()
    }

    fn player_list(&self) -> String {
        let names: Vec<String> = self
            .server
            .online_players()
            .into_iter()
            .map(|p| p.name)
            .collect();
        format!("Online ({}): {}", names.len(), names.join(", "))
    }

    async fn reload(&mut self) -> String {
        let config = match AppConfig::load_from_file(&self.config_path).await {
            Ok(config) => config,
            Err(e) => {
                warn!("⚠️ Reload failed: {}", e);
                return format!("Reload failed: {e}");
            }
        };

        match self.plugin.reload(config.messaging) {
            Ok(()) => "Configuration reloaded".to_string(),
            Err(e) => {
                warn!("⚠️ Reload rejected: {}", e);
                format!("Reload rejected: {e}")
            }
        }
    }
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim_start()),
        None => (input, ""),
    }
}
