//! # Advanced PVP
//!
//! Lets players fight each other and tunes how they see each other while
//! doing so. Every toggle is persisted in the `advanced_pvp` settings
//! document.
//!
//! | command | effect |
//! |---|---|
//! | `/pvp [on\|off\|toggle]` | query or switch pvp |
//! | `/notifyonkill [on\|off\|toggle]` | broadcast kills |
//! | `/gainxp [on\|off\|toggle]` | xp for player kills |
//! | `/pvpdisplaymode [friendlyplayer\|friendly\|hostile]` | display of other players |
//!
//! `enable<x>`, `disable<x>` and `toggle<x>` work as aliases for the three
//! switches. Changing anything requires admin rights.

pub mod settings;

use script_api::{
    parse_switch, CommandContext, EntityId, EventOutcome, HostEvent, ScriptError, ScriptHost,
    ServerScript, PERMISSION_DENIED,
};
use settings::{PvpDisplay, PvpSettings, SettingsError};
use tracing::{debug, error, info};

pub const SCRIPT_NAME: &str = "advanced_pvp";

/// One of the on/off settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Switch {
    Pvp,
    NotifyOnKill,
    GainXp,
}

/// Replies for one switch: `[query, already, changed]` per state.
struct Replies {
    on: [&'static str; 3],
    off: [&'static str; 3],
}

impl Switch {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "pvp" => Some(Self::Pvp),
            "notifyonkill" => Some(Self::NotifyOnKill),
            "gainxp" => Some(Self::GainXp),
            _ => None,
        }
    }

    fn replies(self) -> Replies {
        match self {
            Self::Pvp => Replies {
                on: ["PVP mode is active.", "PVP is already enabled.", "PVP has been enabled."],
                off: ["PVP mode is not active.", "PVP is already disabled.", "PVP has been disabled."],
            },
            Self::NotifyOnKill => Replies {
                on: ["Kills are notified.", "Kills are already notified.", "Kills are now notified."],
                off: [
                    "Kills are not notified.",
                    "Kills are already not notified.",
                    "Kills are no longer notified.",
                ],
            },
            Self::GainXp => Replies {
                on: [
                    "Players gain xp on player kills.",
                    "Players already gain xp on player kills.",
                    "Players will now gain xp on player kills.",
                ],
                off: [
                    "Players don't gain xp on player kills.",
                    "Players already don't gain xp on player kills.",
                    "Players will no longer gain xp on player kills.",
                ],
            },
        }
    }

    fn get(self, settings: &PvpSettings) -> bool {
        match self {
            Self::Pvp => settings.pvp_enabled,
            Self::NotifyOnKill => settings.notify_on_kill,
            Self::GainXp => settings.gain_xp,
        }
    }

    fn set(self, settings: &mut PvpSettings, value: bool) {
        match self {
            Self::Pvp => settings.pvp_enabled = value,
            Self::NotifyOnKill => settings.notify_on_kill = value,
            Self::GainXp => settings.gain_xp = value,
        }
    }
}

/// What a command asks of a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Query,
    Set(bool),
    Toggle,
}

/// Splits `enablepvp`, `togglegainxp`, `pvp on`, ... into switch and action.
fn parse_switch_command(command: &str, args: &[&str]) -> Option<Result<(Switch, Action), String>> {
    for (prefix, action) in [
        ("enable", Action::Set(true)),
        ("disable", Action::Set(false)),
        ("toggle", Action::Toggle),
    ] {
        if let Some(switch) = command.strip_prefix(prefix).and_then(Switch::from_name) {
            return Some(Ok((switch, action)));
        }
    }
    let switch = Switch::from_name(command)?;
    let action = match args.first() {
        None => Action::Query,
        Some(arg) if arg.eq_ignore_ascii_case("toggle") => Action::Toggle,
        Some(arg) => match parse_switch(arg) {
            Some(value) => Action::Set(value),
            None => return Some(Err(format!("Unknown parameter: {}", arg))),
        },
    };
    Some(Ok((switch, action)))
}

fn display_description(display: PvpDisplay) -> &'static str {
    match display {
        PvpDisplay::FriendlyPlayer => {
            "In pvp mode, players are displayed as friendly entities and are shown on the map (setting: friendlyplayer)."
        }
        PvpDisplay::Friendly => {
            "In pvp mode, players are displayed as friendly entities (setting: friendly)."
        }
        PvpDisplay::Hostile => {
            "In pvp mode, players are displayed as hostile entities (setting: hostile)."
        }
    }
}

fn display_changed(display: PvpDisplay) -> &'static str {
    match display {
        PvpDisplay::FriendlyPlayer => {
            "In pvp mode, players are now displayed as friendly entities and are shown on the map."
        }
        PvpDisplay::Friendly => "In pvp mode, players are now displayed as friendly entities.",
        PvpDisplay::Hostile => "In pvp mode, players are now displayed as hostile entities.",
    }
}

#[derive(Debug, Default)]
pub struct AdvancedPvpScript {
    settings: Option<PvpSettings>,
}

impl AdvancedPvpScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(&self) -> Option<&PvpSettings> {
        self.settings.as_ref()
    }

    /// Pushes the current relation to every player and future joiners.
    fn apply_relations(&self, host: &mut dyn ScriptHost) {
        if let Some(settings) = &self.settings {
            host.set_relation_all(settings.relation());
        }
    }

    fn on_kill(&self, host: &mut dyn ScriptHost, killer: EntityId, target: EntityId) {
        let Some(settings) = &self.settings else {
            return;
        };
        let (Some(k), Some(t)) = (host.player(killer), host.player(target)) else {
            return;
        };
        if settings.gain_xp {
            let xp = PvpSettings::kill_xp(k.level, t.level);
            debug!("{} gains {} xp for killing {}", k.name, xp, t.name);
            host.grant_xp(killer, Some(target), xp);
        }
        if settings.notify_on_kill {
            host.send_chat(&format!("{} killed {}!", k.name, t.name));
        }
    }

    fn run_switch(
        &mut self,
        host: &mut dyn ScriptHost,
        ctx: &CommandContext,
        switch: Switch,
        action: Action,
    ) -> String {
        let Some(settings) = self.settings.as_mut() else {
            return "Advanced PVP is not loaded.".to_string();
        };
        let current = switch.get(settings);
        let replies = switch.replies();
        let wanted = match action {
            Action::Query => {
                let reply = if current { replies.on[0] } else { replies.off[0] };
                return reply.to_string();
            }
            Action::Set(value) => value,
            Action::Toggle => !current,
        };
        if !ctx.is_admin {
            return PERMISSION_DENIED.to_string();
        }
        let messages = if wanted { replies.on } else { replies.off };
        if wanted == current {
            return messages[1].to_string();
        }

        let mut updated = settings.clone();
        switch.set(&mut updated, wanted);
        if let Err(e) = updated.save(host.data_store()) {
            error!("Could not save pvp settings: {}", e);
            return format!("Could not save settings: {}", e);
        }
        *settings = updated;
        info!("{:?} set to {}", switch, wanted);
        if switch == Switch::Pvp {
            self.apply_relations(host);
        }
        messages[2].to_string()
    }

    fn run_display(
        &mut self,
        host: &mut dyn ScriptHost,
        ctx: &CommandContext,
        args: &[&str],
    ) -> String {
        let Some(settings) = self.settings.as_mut() else {
            return "Advanced PVP is not loaded.".to_string();
        };
        let Some(arg) = args.first() else {
            return display_description(settings.pvp_display).to_string();
        };
        if !ctx.is_admin {
            return PERMISSION_DENIED.to_string();
        }
        let Some(display) = PvpDisplay::parse(arg) else {
            return format!("Unknown mode: {}", arg);
        };

        let updated = PvpSettings { pvp_display: display, ..settings.clone() };
        if let Err(e) = updated.save(host.data_store()) {
            error!("Could not save pvp settings: {}", e);
            return format!("Could not save settings: {}", e);
        }
        *settings = updated;
        let mode = display;
        info!("PVP display set to {}", mode);
        self.apply_relations(host);
        display_changed(display).to_string()
    }
}

impl ServerScript for AdvancedPvpScript {
    fn name(&self) -> &str {
        SCRIPT_NAME
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn on_load(&mut self, host: &mut dyn ScriptHost) -> Result<(), ScriptError> {
        let settings = PvpSettings::load(host.data_store()).map_err(|e| match e {
            SettingsError::Data(e) => ScriptError::Data(e),
            other => ScriptError::Settings(other.to_string()),
        })?;
        info!(
            "Advanced PVP loaded (pvp: {}, display: {})",
            settings.pvp_enabled, settings.pvp_display
        );
        self.settings = Some(settings);
        self.apply_relations(host);
        Ok(())
    }

    fn on_event(
        &mut self,
        host: &mut dyn ScriptHost,
        event: &HostEvent,
    ) -> Result<EventOutcome, ScriptError> {
        match *event {
            HostEvent::Join { .. } => self.apply_relations(host),
            HostEvent::Kill { killer, target } => self.on_kill(host, killer, target),
            _ => {}
        }
        Ok(EventOutcome::Continue)
    }

    fn on_command(
        &mut self,
        host: &mut dyn ScriptHost,
        ctx: &CommandContext,
        command: &str,
        args: &[&str],
    ) -> Option<String> {
        if command == "pvpdisplaymode" || command == "setpvpdisplaymode" {
            return Some(self.run_display(host, ctx, args));
        }
        let reply = match parse_switch_command(command, args)? {
            Ok((switch, action)) => self.run_switch(host, ctx, switch, action),
            Err(message) => message,
        };
        Some(reply)
    }

    fn game_mode(&self) -> Option<String> {
        let enabled = self.settings.as_ref().map_or(false, |s| s.pvp_enabled);
        Some(if enabled { "pvp" } else { "default" }.to_string())
    }
}
