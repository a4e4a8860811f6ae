//! # Messaging Plugin
//!
//! In-game messaging for Horizon-style game servers:
//!
//! - `/say`, `/me` and `/broadcast` announcements
//! - `/msg` private messages and `/reply`
//! - `/mute`, `/unmute` and `/afk` session status
//! - suppression of raw chat from muted players
//!
//! The plugin owns no server state. Sessions, the online roster, delivery,
//! the event bus, auditing and permissions are host capabilities handed in
//! through [`HostServices`].
//!
//! ```rust
//! use plugin_messaging::*;
//! use std::sync::Arc;
//!
//! let server = Arc::new(MemoryServer::new());
//! let sessions = Arc::new(MemorySessionStore::new());
//! let plugin = MessagingPlugin::new(
//!     MessagingConfig::default(),
//!     HostServices {
//!         sessions: sessions.clone(),
//!         resolver: server.clone(),
//!         broadcaster: server.clone(),
//!         events: Arc::new(LocalEventBus::new()),
//!         audit: Arc::new(TracingAuditSink),
//!         permissions: server.clone(),
//!     },
//! )
//! .unwrap();
//! plugin.initialize();
//!
//! let alice = server.join("alice");
//! sessions.open(SenderId::Player(alice.id));
//! plugin.dispatch(&Identity::Player(alice), "/me waves").unwrap();
//! assert_eq!(server.broadcasts(), vec!["* alice waves"]);
//! ```

pub mod color;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod format;
pub mod gate;
pub mod host;
pub mod memory;
pub mod resolver;
pub mod router;
pub mod session;
pub mod status;
pub mod types;

pub use crate::color::{replace_color_macros, strip_colors, ChatColor};
pub use crate::commands::{find_command, CommandInput, CommandKind, CommandSpec, COMMANDS};
pub use crate::config::MessagingConfig;
pub use crate::error::{ConfigError, ConfigResult, EventError, MessagingError, MessagingResult};
pub use crate::events::{
    ChatListener, EventBus, EventStats, LocalEventBus, PlayerChatEvent, SenderMessageEvent,
    SharedMessageEvent,
};
pub use crate::format::BroadcastFormatter;
pub use crate::gate::{ChatDecision, ChatGate};
pub use crate::host::{
    AllowAll, AuditSink, Broadcaster, Permissions, PrivateMessageRecord, TracingAuditSink,
};
pub use crate::memory::{Delivery, MemoryServer};
pub use crate::resolver::{IdentityResolver, Resolution};
pub use crate::router::MessageRouter;
pub use crate::session::{MemorySessionStore, SessionStore};
pub use crate::status::StatusCommands;
pub use crate::types::{Identity, PlayerId, PlayerProfile, SenderId, Session};

use std::sync::Arc;
use tracing::{debug, info};

/// Capabilities the host hands to the plugin.
#[derive(Clone)]
pub struct HostServices {
    pub sessions: Arc<dyn SessionStore>,
    pub resolver: Arc<dyn IdentityResolver>,
    pub broadcaster: Arc<dyn Broadcaster>,
    pub events: Arc<dyn EventBus>,
    pub audit: Arc<dyn AuditSink>,
    pub permissions: Arc<dyn Permissions>,
}

/// The messaging plugin: command dispatch plus the chat gate.
pub struct MessagingPlugin {
    name: String,
    version: String,
    config: MessagingConfig,
    router: MessageRouter,
    status: StatusCommands,
    gate: Arc<ChatGate>,
    services: HostServices,
}

impl MessagingPlugin {
    pub fn new(config: MessagingConfig, services: HostServices) -> ConfigResult<Self> {
        config.validate()?;

        let router = MessageRouter::new(
            &config,
            services.sessions.clone(),
            services.resolver.clone(),
            services.broadcaster.clone(),
            services.events.clone(),
            services.audit.clone(),
        );
        let status = StatusCommands::new(
            services.sessions.clone(),
            services.resolver.clone(),
            services.broadcaster.clone(),
        );
        let gate = Arc::new(ChatGate::new(
            services.sessions.clone(),
            services.broadcaster.clone(),
        ));

        Ok(Self {
            name: "messaging".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            config,
            router,
            status,
            gate,
            services,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn config(&self) -> &MessagingConfig {
        &self.config
    }

    /// Registers the chat gate on the host event bus.
    pub fn initialize(&self) {
        self.services
            .events
            .register_chat_listener(self.gate.clone());
        info!(
            "💬 {} v{}: {} commands ready",
            self.name,
            self.version,
            COMMANDS.len()
        );
    }

    /// Replaces the templates. An invalid config is rejected and the
    /// current one stays in effect.
    pub fn reload(&mut self, config: MessagingConfig) -> ConfigResult<()> {
        config.validate()?;
        self.router.apply_config(&config);
        self.config = config;
        info!("🔄 {}: configuration reloaded", self.name);
        Ok(())
    }

    /// Runs a raw chat attempt through the gate, for hosts that do not
    /// route chat through [`EventBus::call_chat`].
    pub fn handle_chat(&self, event: &mut PlayerChatEvent) -> ChatDecision {
        self.gate.check(event)
    }

    pub fn router(&self) -> &MessageRouter {
        &self.router
    }

    /// Parses and runs one command line on behalf of `sender`.
    ///
    /// Any failure is reported once to the sender in red and returned.
    pub fn dispatch(&self, sender: &Identity, line: &str) -> MessagingResult<()> {
        let result = self.execute(sender, line);
        if let Err(e) = &result {
            debug!("Command '{}' from {} failed: {:?}", line, sender.name(), e);
            self.services
                .broadcaster
                .send(sender, &format::error_notice(&e.to_string()));
        }
        result
    }

    fn execute(&self, sender: &Identity, line: &str) -> MessagingResult<()> {
        let input = CommandInput::parse(line)
            .ok_or_else(|| MessagingError::UnknownCommand(line.trim().to_string()))?;
        let spec = find_command(&input.name)
            .ok_or_else(|| MessagingError::UnknownCommand(input.name.clone()))?;

        spec.check_arity(&input)?;
        if !self.services.permissions.has_permission(sender, spec.permission) {
            return Err(MessagingError::PermissionDenied {
                permission: spec.permission.to_string(),
            });
        }

        match spec.kind {
            CommandKind::Me => self.router.me(sender, &input.joined(0)),
            CommandKind::Say => self.router.say(sender, &input.joined(0)),
            CommandKind::Msg => {
                let target = input.arg(0).unwrap_or_default();
                self.router.send_private(sender, target, &input.joined(1))
            }
            CommandKind::Reply => self.router.reply(sender, &input.joined(0)),
            CommandKind::Afk => {
                let status = input.joined(0);
                let status = (!status.is_empty()).then_some(status.as_str());
                self.status.afk(sender, status)
            }
            CommandKind::Mute => self.status.mute(sender, input.arg(0).unwrap_or_default()),
            CommandKind::Unmute => self.status.unmute(sender, input.arg(0).unwrap_or_default()),
            CommandKind::Broadcast => {
                self.router.broadcast(&input.joined(0));
                Ok(())
            }
        }
    }
}
