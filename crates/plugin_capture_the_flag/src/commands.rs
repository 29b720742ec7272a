//! Chat commands of the capture the flag script.

use crate::flag::Team;
use crate::settings::CtfSettings;
use crate::CaptureTheFlagScript;
use script_api::{CommandContext, ScriptHost, Vec3, PERMISSION_DENIED};
use tracing::{error, info};

/// Height offset between a player placing a pole and the pole itself.
const POLE_HEIGHT_OFFSET: f64 = 50000.0;

/// Requested change of an on/off setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Switch {
    Query,
    On,
    Off,
}

impl Switch {
    fn parse(args: &[&str]) -> Result<Self, String> {
        match args.first().map(|a| a.to_ascii_lowercase()) {
            None => Ok(Self::Query),
            Some(arg) if arg == "on" => Ok(Self::On),
            Some(arg) if arg == "off" => Ok(Self::Off),
            Some(_) => Err(format!("Unknown parameter: {}", args[0])),
        }
    }
}

/// A boolean setting exposed as a command.
#[derive(Debug, Clone, Copy)]
enum Toggle {
    Loot,
    XpOnKill,
    XpOnWin,
    SpeedCap,
}

impl Toggle {
    fn from_command(command: &str) -> Option<Self> {
        match command {
            "loot" => Some(Self::Loot),
            "xponkill" => Some(Self::XpOnKill),
            "xponwin" => Some(Self::XpOnWin),
            "speedcap" => Some(Self::SpeedCap),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Loot => "Loot",
            Self::XpOnKill => "XP on kill",
            Self::XpOnWin => "XP on win",
            Self::SpeedCap => "Speed cap",
        }
    }

    fn get(self, settings: &CtfSettings) -> bool {
        match self {
            Self::Loot => settings.loot,
            Self::XpOnKill => settings.xp_on_kill,
            Self::XpOnWin => settings.xp_on_win,
            Self::SpeedCap => settings.speed_cap,
        }
    }

    fn set(self, settings: &mut CtfSettings, value: bool) {
        match self {
            Self::Loot => settings.loot = value,
            Self::XpOnKill => settings.xp_on_kill = value,
            Self::XpOnWin => settings.xp_on_win = value,
            Self::SpeedCap => settings.speed_cap = value,
        }
    }
}

fn enabled(value: bool) -> &'static str {
    if value {
        "enabled"
    } else {
        "disabled"
    }
}

/// Dispatches a command. Returns `None` for commands this script does not
/// own.
pub fn handle(
    script: &mut CaptureTheFlagScript,
    host: &mut dyn ScriptHost,
    ctx: &CommandContext,
    command: &str,
    args: &[&str],
) -> Option<String> {
    let admin_only = matches!(
        command,
        "abortgame"
            | "reloadconfig"
            | "setflagpoler"
            | "setflagpoleb"
            | "loot"
            | "xponkill"
            | "xponwin"
            | "speedcap"
    );
    let known = admin_only || matches!(command, "startgame" | "join");
    if !known {
        return None;
    }
    if script.session.is_none() {
        return Some("Capture the flag is not loaded.".to_string());
    }
    if admin_only && !ctx.is_admin {
        return Some(PERMISSION_DENIED.to_string());
    }

    let reply = match command {
        "startgame" => startgame(script, host, args),
        "join" => join(script, host, ctx, args),
        "abortgame" => abortgame(script, host),
        "reloadconfig" => reloadconfig(script, host),
        "setflagpoler" => set_flag_pole(script, host, ctx, Team::Red),
        "setflagpoleb" => set_flag_pole(script, host, ctx, Team::Blue),
        other => match Toggle::from_command(other) {
            Some(toggle) => toggle_setting(script, host, toggle, args),
            None => return None,
        },
    };
    Some(reply)
}

fn startgame(script: &mut CaptureTheFlagScript, host: &mut dyn ScriptHost, args: &[&str]) -> String {
    let mode = args.first().copied();
    let points = args.get(1).copied();
    script
        .with_match(host, |game, ctx| game.startgame(ctx, mode, points))
        .unwrap_or_default()
}

fn join(
    script: &mut CaptureTheFlagScript,
    host: &mut dyn ScriptHost,
    ctx: &CommandContext,
    args: &[&str],
) -> String {
    let Some(player) = ctx.issuer else {
        return "This command can't be issued from the server console.".to_string();
    };
    let Some(team) = args.first().copied() else {
        return "Please choose a team: blue or red".to_string();
    };
    script
        .with_match(host, |game, ctx| game.join(ctx, player, team))
        .unwrap_or_default()
}

fn abortgame(script: &mut CaptureTheFlagScript, host: &mut dyn ScriptHost) -> String {
    script.with_match(host, |game, ctx| game.abort(ctx));
    host.send_chat("Game aborted by administrator.");
    info!("Game aborted by administrator");
    "Game successfully aborted.".to_string()
}

fn reloadconfig(script: &mut CaptureTheFlagScript, host: &mut dyn ScriptHost) -> String {
    let settings = match CtfSettings::load(host.data_store()) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Could not reload capture the flag settings: {}", e);
            return format!("Could not reload configuration: {}", e);
        }
    };

    host.set_speed_cap(settings.speed_cap);
    if let Some(session) = script.session.as_mut() {
        session.loot.loot_enabled = settings.loot;
        session.settings = settings;
    }
    script.with_match(host, |game, ctx| game.refresh_lobby(ctx));
    info!("Capture the flag settings reloaded");
    "Configuration reloaded.".to_string()
}

fn set_flag_pole(
    script: &mut CaptureTheFlagScript,
    host: &mut dyn ScriptHost,
    ctx: &CommandContext,
    team: Team,
) -> String {
    let command = match team {
        Team::Red => "setflagpoler",
        Team::Blue => "setflagpoleb",
    };
    let Some(player) = ctx.issuer.and_then(|id| host.player(id)) else {
        return format!("The command '{}' has to be run by a player.", command);
    };
    let Some(session) = script.session.as_mut() else {
        return String::new();
    };
    if !session.game.is_pre_game() {
        return "Flag poles can only be set when no match is running.".to_string();
    }

    let p = player.position;
    let pos = Vec3::new(p.x, p.y, p.z - POLE_HEIGHT_OFFSET);
    let mut updated = session.settings.clone();
    match team {
        Team::Red => updated.red_pole = pos,
        Team::Blue => updated.blue_pole = pos,
    }
    if let Err(e) = updated.save(host.data_store()) {
        error!("Could not save capture the flag settings: {}", e);
        return format!("Could not save settings: {}", e);
    }
    session.settings = updated;
    session.arena.set_pole(host, team, pos);
    info!("{} flag pole moved to {:?}", team, pos);
    format!("Successfully set {} flag pole position.", team)
}

fn toggle_setting(
    script: &mut CaptureTheFlagScript,
    host: &mut dyn ScriptHost,
    toggle: Toggle,
    args: &[&str],
) -> String {
    let Some(session) = script.session.as_mut() else {
        return String::new();
    };
    let label = toggle.label();
    let current = toggle.get(&session.settings);

    if args.is_empty() {
        return format!("{} is {}.", label, enabled(current));
    }
    if !session.game.is_pre_game() {
        return format!("{} can only be changed if no game is running.", label);
    }
    let wanted = match Switch::parse(args) {
        Ok(Switch::On) => true,
        Ok(Switch::Off) => false,
        Ok(Switch::Query) => return format!("{} is {}.", label, enabled(current)),
        Err(message) => return message,
    };
    if wanted == current {
        return format!("{} is already {}.", label, enabled(current));
    }

    // Only a saved document becomes the live setting.
    let mut updated = session.settings.clone();
    toggle.set(&mut updated, wanted);
    if let Err(e) = updated.save(host.data_store()) {
        error!("Could not save capture the flag settings: {}", e);
        return format!("Could not save settings: {}", e);
    }
    session.settings = updated;
    match toggle {
        Toggle::Loot => session.loot.loot_enabled = wanted,
        Toggle::SpeedCap => host.set_speed_cap(wanted),
        Toggle::XpOnKill | Toggle::XpOnWin => {}
    }
    info!("{} {}", label, enabled(wanted));
    format!("{} has been {}.", label, enabled(wanted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_parsing() {
        assert_eq!(Switch::parse(&[]), Ok(Switch::Query));
        assert_eq!(Switch::parse(&["ON"]), Ok(Switch::On));
        assert_eq!(Switch::parse(&["off"]), Ok(Switch::Off));
        assert_eq!(Switch::parse(&["maybe"]), Err("Unknown parameter: maybe".to_string()));
    }
}
