//! The host application: a simulated world, the loaded scripts and the
//! loop that drives them.

use crate::cli::CliArgs;
use crate::config::AppConfig;
use crate::console::ConsoleInput;
use crate::logging::setup_logging;
use crate::signals::setup_signal_handlers;
use plugin_advanced_pvp::AdvancedPvpScript;
use plugin_capture_the_flag::CaptureTheFlagScript;
use plugin_random_events::RandomEventsScript;
use plugin_ruins::RuinsScript;
use script_api::{
    CommandContext, HostEvent, LocalWorld, ScriptHost, ScriptManager, ServerScript,
};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Creates a script by its configuration name.
pub fn create_script(name: &str) -> Option<Box<dyn ServerScript>> {
    let script: Box<dyn ServerScript> = match name {
        "capture_the_flag" => Box::new(CaptureTheFlagScript::new()),
        "advanced_pvp" => Box::new(AdvancedPvpScript::new()),
        "ruins" => Box::new(RuinsScript::new()),
        "random_events" => Box::new(RandomEventsScript::new()),
        _ => return None,
    };
    Some(script)
}

pub struct Application {
    config: AppConfig,
    world: LocalWorld,
    scripts: ScriptManager,
}

impl Application {
    /// Loads the configuration, applies CLI overrides, sets up logging and
    /// loads the enabled scripts.
    pub async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        if let Some(data_dir) = args.data_dir {
            config.server.data_dir = data_dir;
        }
        if let Some(seed) = args.seed {
            config.server.world_seed = seed;
        }
        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }
        if args.json_logs {
            config.logging.json_format = true;
        }

        if let Err(e) = config.validate() {
            return Err(format!("Configuration validation failed: {}", e).into());
        }

        setup_logging(&config.logging)?;
        info!("Config: {}", args.config_path.display());
        Self::from_config(config)
    }

    /// Builds the world and loads every enabled script.
    pub fn from_config(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        std::fs::create_dir_all(&config.server.data_dir)?;
        let mut world = LocalWorld::new(&config.server.data_dir).with_seed(config.server.world_seed);
        let mut scripts = ScriptManager::new();

        for name in &config.scripts.enabled {
            let Some(script) = create_script(name) else {
                return Err(format!("Unknown script: {}", name).into());
            };
            scripts.load(&mut world, script)?;
        }

        info!(
            "Data directory: {} | world seed: {} | game mode: {}",
            config.server.data_dir.display(),
            config.server.world_seed,
            scripts.game_mode().unwrap_or_else(|| "default".to_string())
        );
        Ok(Self { config, world, scripts })
    }

    pub fn world(&self) -> &LocalWorld {
        &self.world
    }

    pub fn scripts(&self) -> &ScriptManager {
        &self.scripts
    }

    /// Advances every script by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        self.scripts.dispatch(&mut self.world, &HostEvent::Update { dt });
        self.flush_chat();
    }

    /// Writes chat produced by the scripts to the log.
    fn flush_chat(&mut self) {
        for line in self.world.drain_chat() {
            match line.to.and_then(|id| self.world.player(id)) {
                Some(player) => info!(target: "chat", "[to {}] {}", player.name, line.message),
                None => info!(target: "chat", "{}", line.message),
            }
        }
    }

    /// Runs one console input and returns the lines to show the operator.
    pub fn handle_input(&mut self, input: ConsoleInput) -> Vec<String> {
        let replies = match input {
            ConsoleInput::Empty | ConsoleInput::Quit => vec![],
            ConsoleInput::Command(line) => {
                vec![self.scripts.command(&mut self.world, &CommandContext::console(), &line)]
            }
            ConsoleInput::Join { name, level, class } => {
                if self.world.find_player(&name).is_some() {
                    vec![format!("{} is already connected.", name)]
                } else {
                    let id = self.world.add_player(&name, level, class);
                    self.scripts.dispatch(&mut self.world, &HostEvent::Join { player: id });
                    vec![format!("{} joined as {}.", name, id)]
                }
            }
            ConsoleInput::Leave { name } => match self.world.find_player(&name) {
                Some(id) => {
                    self.scripts.dispatch(&mut self.world, &HostEvent::Leave { player: id });
                    self.world.remove_player(id);
                    vec![format!("{} left.", name)]
                }
                None => vec![format!("No player named {}.", name)],
            },
            ConsoleInput::As { name, command } => match self.world.find_player(&name) {
                Some(id) => {
                    let ctx = CommandContext::player(id, self.config.is_admin(&name));
                    vec![self.scripts.command(&mut self.world, &ctx, &command)]
                }
                None => vec![format!("No player named {}.", name)],
            },
            ConsoleInput::Move { name, position } => match self.world.find_player(&name) {
                Some(id) => {
                    self.world.set_position(id, position);
                    self.scripts.dispatch(
                        &mut self.world,
                        &HostEvent::PositionUpdate { player: id, position },
                    );
                    vec![]
                }
                None => vec![format!("No player named {}.", name)],
            },
            ConsoleInput::Respawn { name } => match self.world.find_player(&name) {
                Some(id) => {
                    if let Some(player) = self.world.player(id) {
                        self.world.set_hp(id, player.max_hp);
                    }
                    self.scripts.dispatch(&mut self.world, &HostEvent::Respawn { player: id });
                    vec![format!("{} respawned.", name)]
                }
                None => vec![format!("No player named {}.", name)],
            },
            ConsoleInput::Chunk { x, y } => {
                self.scripts.dispatch(&mut self.world, &HostEvent::ChunkLoad { x, y });
                vec![]
            }
            ConsoleInput::Players => self
                .world
                .players()
                .into_iter()
                .filter_map(|id| self.world.player(id))
                .map(|p| format!("{} {} level {} {:?} hp {}", p.id, p.name, p.level, p.class, p.hp))
                .collect(),
            ConsoleInput::Scripts => self.scripts.loaded(),
        };
        self.flush_chat();
        replies
    }

    /// Ticks the scripts and serves the console until a shutdown signal or
    /// `quit` arrives, then unloads every script.
    pub async fn run(mut self) -> Result<(), Box<dyn std::error::Error>> {
        let (tx, mut rx) = mpsc::channel::<String>(64);
        let reader = tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if tx.send(line).await.is_err() {
                    break;
                }
            }
        });

        let shutdown = setup_signal_handlers();
        tokio::pin!(shutdown);

        let mut interval =
            tokio::time::interval(Duration::from_millis(self.config.server.tick_interval_ms));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_tick = Instant::now();
        let mut console_open = true;

        info!(
            "Script host running with {} scripts, ticking every {} ms",
            self.scripts.loaded().len(),
            self.config.server.tick_interval_ms
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let now = Instant::now();
                    self.tick((now - last_tick).as_secs_f32());
                    last_tick = now;
                }
                line = rx.recv(), if console_open => match line {
                    Some(line) => match ConsoleInput::parse(&line) {
                        Ok(ConsoleInput::Quit) => {
                            info!("Quit requested from console");
                            break;
                        }
                        Ok(input) => {
                            for reply in self.handle_input(input) {
                                println!("{}", reply);
                            }
                        }
                        Err(message) => println!("{}", message),
                    },
                    None => {
                        warn!("Console input closed");
                        console_open = false;
                    }
                },
                result = &mut shutdown => {
                    if let Err(e) = result {
                        error!("Signal handling failed: {}", e);
                    }
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        reader.abort();
        self.shutdown();
        Ok(())
    }

    /// Unloads every script, newest first.
    pub fn shutdown(&mut self) {
        self.scripts.unload_all(&mut self.world);
        self.flush_chat();
        info!("All scripts unloaded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(data_dir: &std::path::Path, scripts: &[&str]) -> AppConfig {
        let mut config = AppConfig::default();
        config.server.data_dir = data_dir.to_path_buf();
        config.server.admins = vec!["boss".to_string()];
        config.scripts.enabled = scripts.iter().map(|s| s.to_string()).collect();
        config
    }

    fn input(app: &mut Application, line: &str) -> Vec<String> {
        app.handle_input(ConsoleInput::parse(line).unwrap())
    }

    #[test]
    fn test_create_script_names() {
        for name in crate::config::KNOWN_SCRIPTS {
            assert_eq!(create_script(name).unwrap().name(), name);
        }
        assert!(create_script("teleporter").is_none());
    }

    #[test]
    fn test_scripts_load_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let app = Application::from_config(config(
            dir.path(),
            &["advanced_pvp", "capture_the_flag", "random_events"],
        ))
        .unwrap();
        assert_eq!(
            app.scripts().loaded(),
            vec!["advanced_pvp", "capture_the_flag", "random_events"]
        );
        assert_eq!(app.scripts().game_mode(), Some("pvp".to_string()));
        assert!(dir.path().join("advanced_pvp.toml").exists());
        assert!(dir.path().join("capture_the_flag.toml").exists());
    }

    #[test]
    fn test_console_drives_a_match() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = Application::from_config(config(dir.path(), &["capture_the_flag"])).unwrap();

        assert_eq!(input(&mut app, "join boss 10 mage"), vec!["boss joined as #1."]);
        assert_eq!(input(&mut app, "join guest 5"), vec!["guest joined as #2."]);
        assert_eq!(input(&mut app, "join guest"), vec!["guest is already connected."]);
        assert_eq!(input(&mut app, "as guest /abortgame"), vec![script_api::PERMISSION_DENIED]);
        assert_eq!(input(&mut app, "as boss /startgame"), vec!["Game starting..."]);
        assert_eq!(input(&mut app, "/loot off"), vec!["Loot can only be changed if no game is running."]);

        app.tick(0.05);
        assert_eq!(input(&mut app, "leave boss"), vec!["boss left."]);
        assert_eq!(app.world().players().len(), 1);
        assert_eq!(input(&mut app, "/abortgame"), vec!["Game successfully aborted."]);
        assert_eq!(input(&mut app, "/dance"), vec![script_api::UNKNOWN_COMMAND]);
    }

    #[test]
    fn test_players_and_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = Application::from_config(config(dir.path(), &["ruins"])).unwrap();
        input(&mut app, "join alice 3 ranger");
        let listed = input(&mut app, "players");
        assert_eq!(listed.len(), 1);
        assert!(listed[0].contains("alice"));
        assert!(input(&mut app, "chunk 0 0").is_empty());
        assert_eq!(input(&mut app, "move nobody 1 2 3"), vec!["No player named nobody."]);
        assert_eq!(input(&mut app, "scripts"), vec!["ruins"]);
    }

    #[test]
    fn test_shutdown_unloads_scripts() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = Application::from_config(config(dir.path(), &["capture_the_flag"])).unwrap();
        assert!(app.world().particles().count() > 0);
        app.shutdown();
        assert!(app.scripts().loaded().is_empty());
        assert_eq!(app.world().particles().count(), 0);
    }

    #[test]
    fn test_respawn_returns_player_to_pole() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("capture_the_flag.toml"),
            "version = 1\n[red_pole]\nx = 0.0\ny = 0.0\nz = 0.0\n\
             [blue_pole]\nx = 1000000.0\ny = 0.0\nz = 0.0\n",
        )
        .unwrap();
        let mut app = Application::from_config(config(dir.path(), &["capture_the_flag"])).unwrap();
        input(&mut app, "join boss 10");
        input(&mut app, "join guest 5");
        input(&mut app, "/startgame autobalance 1");
        for _ in 0..12 {
            app.tick(1.0);
        }

        // Autobalance puts the lower level player on blue.
        let guest = app.world().find_player("guest").unwrap();
        let pole = app.world().player(guest).unwrap().position;
        assert_eq!(pole, script_api::Vec3::new(1_000_000.0, 0.0, 0.0));
        input(&mut app, "move guest 100 100 0");
        app.world.set_hp(guest, 0.0);
        assert_eq!(input(&mut app, "respawn guest"), vec!["guest respawned."]);
        let player = app.world().player(guest).unwrap();
        assert!(player.is_alive());
        assert_eq!(player.position, pole);
        assert_eq!(input(&mut app, "respawn nobody"), vec!["No player named nobody."]);
    }
}
