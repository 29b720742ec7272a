//! Script manager: loads scripts, fans host events out to them and routes
//! chat commands.

use crate::host::ScriptHost;
use crate::script::{CommandContext, EventOutcome, HostEvent, ScriptError, ServerScript};
use tracing::{debug, error, info, warn};

/// Reply for commands no loaded script recognises.
pub const UNKNOWN_COMMAND: &str = "Unknown command.";

/// Owns the loaded scripts in load order.
#[derive(Default)]
pub struct ScriptManager {
    scripts: Vec<Box<dyn ServerScript>>,
}

impl ScriptManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a script. A script whose name is already loaded is rejected.
    pub fn load(
        &mut self,
        host: &mut dyn ScriptHost,
        mut script: Box<dyn ServerScript>,
    ) -> Result<(), ScriptError> {
        if self.scripts.iter().any(|s| s.name() == script.name()) {
            return Err(ScriptError::Runtime(format!(
                "script {} is already loaded",
                script.name()
            )));
        }
        script.on_load(host)?;
        info!("Loaded script {} v{}", script.name(), script.version());
        self.scripts.push(script);
        Ok(())
    }

    /// Unloads a script by name. Returns whether it was loaded.
    pub fn unload(&mut self, host: &mut dyn ScriptHost, name: &str) -> bool {
        let Some(index) = self.scripts.iter().position(|s| s.name() == name) else {
            return false;
        };
        let mut script = self.scripts.remove(index);
        if let Err(e) = script.on_unload(host) {
            warn!("Script {} failed to unload cleanly: {}", name, e);
        }
        info!("Unloaded script {}", name);
        true
    }

    /// Unloads every script in reverse load order.
    pub fn unload_all(&mut self, host: &mut dyn ScriptHost) {
        while let Some(mut script) = self.scripts.pop() {
            if let Err(e) = script.on_unload(host) {
                warn!("Script {} failed to unload cleanly: {}", script.name(), e);
            }
            info!("Unloaded script {}", script.name());
        }
    }

    pub fn loaded(&self) -> Vec<String> {
        self.scripts.iter().map(|s| s.name().to_string()).collect()
    }

    /// Delivers an event to every script. A failing script is logged and
    /// skipped; the remaining scripts still see the event. The outcome is
    /// `Cancel` if any script cancelled.
    pub fn dispatch(&mut self, host: &mut dyn ScriptHost, event: &HostEvent) -> EventOutcome {
        let mut outcome = EventOutcome::Continue;
        for script in self.scripts.iter_mut() {
            match script.on_event(host, event) {
                Ok(EventOutcome::Cancel) => outcome = EventOutcome::Cancel,
                Ok(EventOutcome::Continue) => {}
                Err(e) => error!("Script {} failed handling {:?}: {}", script.name(), event, e),
            }
        }
        outcome
    }

    /// Routes a chat line such as `/startgame choose 3`. The first script
    /// that recognises the command answers it.
    pub fn command(&mut self, host: &mut dyn ScriptHost, ctx: &CommandContext, line: &str) -> String {
        let line = line.trim().trim_start_matches('/');
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            return UNKNOWN_COMMAND.to_string();
        };
        let command = command.to_ascii_lowercase();
        let args: Vec<&str> = parts.collect();
        debug!("Command /{} {:?} from {:?}", command, args, ctx.issuer);

        for script in self.scripts.iter_mut() {
            if let Some(reply) = script.on_command(host, ctx, &command, &args) {
                return reply;
            }
        }
        UNKNOWN_COMMAND.to_string()
    }

    /// Game mode of the first script that reports one.
    pub fn game_mode(&self) -> Option<String> {
        self.scripts.iter().find_map(|s| s.game_mode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalWorld;
    use crate::types::ClassType;

    struct Echo {
        name: &'static str,
        loads: u32,
        events: u32,
        cancel_hits: bool,
    }

    impl Echo {
        fn new(name: &'static str) -> Self {
            Self { name, loads: 0, events: 0, cancel_hits: false }
        }
    }

    impl ServerScript for Echo {
        fn name(&self) -> &str {
            self.name
        }

        fn version(&self) -> &str {
            "1.0.0"
        }

        fn on_load(&mut self, _host: &mut dyn ScriptHost) -> Result<(), ScriptError> {
            self.loads += 1;
            Ok(())
        }

        fn on_event(
            &mut self,
            _host: &mut dyn ScriptHost,
            event: &HostEvent,
        ) -> Result<EventOutcome, ScriptError> {
            self.events += 1;
            match event {
                HostEvent::Hit { .. } if self.cancel_hits => Ok(EventOutcome::Cancel),
                HostEvent::ChunkLoad { .. } => Err(ScriptError::Runtime("boom".to_string())),
                _ => Ok(EventOutcome::Continue),
            }
        }

        fn on_command(
            &mut self,
            _host: &mut dyn ScriptHost,
            _ctx: &CommandContext,
            command: &str,
            args: &[&str],
        ) -> Option<String> {
            (command == self.name).then(|| format!("{} {}", self.name, args.join(",")))
        }

        fn game_mode(&self) -> Option<String> {
            (self.name == "second").then(|| "echo".to_string())
        }
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut world = LocalWorld::new(dir.path());
        let mut manager = ScriptManager::new();
        manager.load(&mut world, Box::new(Echo::new("first"))).unwrap();
        assert!(manager.load(&mut world, Box::new(Echo::new("first"))).is_err());
        assert_eq!(manager.loaded(), vec!["first".to_string()]);
    }

    #[test]
    fn test_command_routing() {
        let dir = tempfile::tempdir().unwrap();
        let mut world = LocalWorld::new(dir.path());
        let mut manager = ScriptManager::new();
        manager.load(&mut world, Box::new(Echo::new("first"))).unwrap();
        manager.load(&mut world, Box::new(Echo::new("second"))).unwrap();

        let ctx = CommandContext::console();
        assert_eq!(manager.command(&mut world, &ctx, "/second a b"), "second a,b");
        assert_eq!(manager.command(&mut world, &ctx, "FIRST"), "first ");
        assert_eq!(manager.command(&mut world, &ctx, "/nothing"), UNKNOWN_COMMAND);
        assert_eq!(manager.command(&mut world, &ctx, "   "), UNKNOWN_COMMAND);
        assert_eq!(manager.game_mode(), Some("echo".to_string()));
    }

    #[test]
    fn test_dispatch_isolates_errors_and_merges_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let mut world = LocalWorld::new(dir.path());
        let a = world.add_player("a", 1, ClassType::Warrior);
        let b = world.add_player("b", 1, ClassType::Mage);
        let mut manager = ScriptManager::new();
        let mut canceller = Echo::new("first");
        canceller.cancel_hits = true;
        manager.load(&mut world, Box::new(canceller)).unwrap();
        manager.load(&mut world, Box::new(Echo::new("second"))).unwrap();

        let hit = HostEvent::Hit { attacker: a, target: b, damage: 10.0 };
        assert_eq!(manager.dispatch(&mut world, &hit), EventOutcome::Cancel);
        let chunk = HostEvent::ChunkLoad { x: 0, y: 0 };
        assert_eq!(manager.dispatch(&mut world, &chunk), EventOutcome::Continue);

        assert!(manager.unload(&mut world, "first"));
        assert!(!manager.unload(&mut world, "first"));
        manager.unload_all(&mut world);
        assert!(manager.loaded().is_empty());
    }
}
