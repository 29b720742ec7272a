use plugin_capture_the_flag::CaptureTheFlagScript;
use script_api::{
    ClassType, CommandContext, HostEvent, LocalWorld, ScriptHost, ServerScript, Vec3,
    PERMISSION_DENIED,
};

fn loaded(dir: &std::path::Path) -> (LocalWorld, CaptureTheFlagScript) {
    let mut world = LocalWorld::new(dir);
    let mut script = CaptureTheFlagScript::with_seed(5);
    script.on_load(&mut world).unwrap();
    (world, script)
}

fn run(
    script: &mut CaptureTheFlagScript,
    world: &mut LocalWorld,
    ctx: CommandContext,
    command: &str,
    args: &[&str],
) -> String {
    script.on_command(world, &ctx, command, args).unwrap()
}

#[test]
fn test_default_settings_file_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let (world, script) = loaded(dir.path());
    let path = dir.path().join("capture_the_flag.toml");
    assert!(path.exists());
    assert!(std::fs::read_to_string(path).unwrap().contains("relation_between_matches = 10"));
    assert!(script.settings().unwrap().loot);
    assert!(world.speed_cap());
}

#[test]
fn test_unrelated_commands_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let (mut world, mut script) = loaded(dir.path());
    assert!(script
        .on_command(&mut world, &CommandContext::console(), "pvp", &[])
        .is_none());
}

#[test]
fn test_admin_commands_need_rights() {
    let dir = tempfile::tempdir().unwrap();
    let (mut world, mut script) = loaded(dir.path());
    let player = world.add_player("p", 1, ClassType::Ranger);
    let ctx = CommandContext::player(player, false);
    for command in ["abortgame", "reloadconfig", "setflagpoler", "loot", "speedcap"] {
        assert_eq!(run(&mut script, &mut world, ctx, command, &[]), PERMISSION_DENIED);
    }
}

#[test]
fn test_toggle_commands() {
    let dir = tempfile::tempdir().unwrap();
    let (mut world, mut script) = loaded(dir.path());
    let admin = CommandContext::console();

    assert_eq!(run(&mut script, &mut world, admin, "loot", &[]), "Loot is enabled.");
    assert_eq!(run(&mut script, &mut world, admin, "loot", &["on"]), "Loot is already enabled.");
    assert_eq!(run(&mut script, &mut world, admin, "loot", &["off"]), "Loot has been disabled.");
    assert!(!script.loot().unwrap().loot_enabled);
    assert_eq!(
        run(&mut script, &mut world, admin, "loot", &["sideways"]),
        "Unknown parameter: sideways"
    );

    assert_eq!(run(&mut script, &mut world, admin, "speedcap", &["off"]), "Speed cap has been disabled.");
    assert!(!world.speed_cap());
    assert_eq!(run(&mut script, &mut world, admin, "xponwin", &[]), "XP on win is enabled.");

    let on_disk = std::fs::read_to_string(dir.path().join("capture_the_flag.toml")).unwrap();
    assert!(on_disk.contains("loot = false"));
    assert!(on_disk.contains("speed_cap = false"));
}

#[test]
fn test_toggles_locked_during_match() {
    let dir = tempfile::tempdir().unwrap();
    let (mut world, mut script) = loaded(dir.path());
    for name in ["a", "b"] {
        let id = world.add_player(name, 1, ClassType::Mage);
        script.on_event(&mut world, &HostEvent::Join { player: id }).unwrap();
    }
    let admin = CommandContext::console();
    assert_eq!(run(&mut script, &mut world, admin, "startgame", &[]), "Game starting...");
    assert_eq!(
        run(&mut script, &mut world, admin, "xponkill", &["on"]),
        "XP on kill can only be changed if no game is running."
    );
    assert_eq!(run(&mut script, &mut world, admin, "xponkill", &[]), "XP on kill is disabled.");

    assert_eq!(run(&mut script, &mut world, admin, "abortgame", &[]), "Game successfully aborted.");
    assert!(world.broadcasts().contains(&"Game aborted by administrator."));
    assert!(script.game().unwrap().is_pre_game());
}

#[test]
fn test_set_flag_pole() {
    let dir = tempfile::tempdir().unwrap();
    let (mut world, mut script) = loaded(dir.path());
    assert_eq!(
        run(&mut script, &mut world, CommandContext::console(), "setflagpoleb", &[]),
        "The command 'setflagpoleb' has to be run by a player."
    );

    let admin = world.add_player("admin", 50, ClassType::Warrior);
    world.set_position(admin, Vec3::new(1000.0, 2000.0, 300000.0));
    assert_eq!(
        run(&mut script, &mut world, CommandContext::player(admin, true), "setflagpoleb", &[]),
        "Successfully set blue flag pole position."
    );
    let expected = Vec3::new(1000.0, 2000.0, 250000.0);
    assert_eq!(script.settings().unwrap().blue_pole, expected);
    let arena = script.arena().unwrap();
    assert_eq!(arena.pole_pos(plugin_capture_the_flag::flag::Team::Blue), expected);
    assert_eq!(arena.flag(plugin_capture_the_flag::flag::Team::Blue).pos(), expected);

    let (_, reloaded) = loaded(dir.path());
    assert_eq!(reloaded.settings().unwrap().blue_pole, expected);
}

#[test]
fn test_reloadconfig_reports_invalid_key() {
    let dir = tempfile::tempdir().unwrap();
    let (mut world, mut script) = loaded(dir.path());
    let path = dir.path().join("capture_the_flag.toml");

    std::fs::write(&path, "version = 1\nrelation_between_matches = 99\n").unwrap();
    let reply = run(&mut script, &mut world, CommandContext::console(), "reloadconfig", &[]);
    assert!(reply.starts_with("Could not reload configuration"));
    assert!(reply.contains("relation_between_matches"));

    std::fs::write(&path, "version = 1\nrelation_between_matches = 14\nloot = false\n").unwrap();
    assert_eq!(
        run(&mut script, &mut world, CommandContext::console(), "reloadconfig", &[]),
        "Configuration reloaded."
    );
    assert!(!script.loot().unwrap().loot_enabled);
    assert_eq!(world.default_relation(), script_api::Relation::Hostile);
}

#[test]
fn test_join_needs_player_and_team() {
    let dir = tempfile::tempdir().unwrap();
    let (mut world, mut script) = loaded(dir.path());
    assert_eq!(
        run(&mut script, &mut world, CommandContext::console(), "join", &["red"]),
        "This command can't be issued from the server console."
    );
    let p = world.add_player("p", 1, ClassType::Rogue);
    let ctx = CommandContext::player(p, false);
    assert_eq!(run(&mut script, &mut world, ctx, "join", &[]), "Please choose a team: blue or red");
    assert_eq!(
        run(&mut script, &mut world, ctx, "join", &["red"]),
        "This command cannot be issued in the current state of the game."
    );
    assert!(world.player(p).is_some());
}
