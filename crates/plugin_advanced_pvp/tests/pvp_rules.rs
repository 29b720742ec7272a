use plugin_advanced_pvp::settings::PvpDisplay;
use plugin_advanced_pvp::AdvancedPvpScript;
use script_api::{
    ClassType, CommandContext, HostEvent, LocalWorld, Relation, ServerScript, XpGrant,
    PERMISSION_DENIED,
};

fn loaded(dir: &std::path::Path) -> (LocalWorld, AdvancedPvpScript) {
    let mut world = LocalWorld::new(dir);
    let mut script = AdvancedPvpScript::new();
    script.on_load(&mut world).unwrap();
    (world, script)
}

fn console(script: &mut AdvancedPvpScript, world: &mut LocalWorld, line: &str) -> String {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap();
    let args: Vec<&str> = parts.collect();
    script
        .on_command(world, &CommandContext::console(), command, &args)
        .unwrap()
}

#[test]
fn test_load_applies_relation() {
    let dir = tempfile::tempdir().unwrap();
    let (world, script) = loaded(dir.path());
    assert_eq!(world.default_relation(), Relation::Hostile);
    assert_eq!(script.game_mode(), Some("pvp".to_string()));
    assert!(dir.path().join("advanced_pvp.toml").exists());
}

#[test]
fn test_pvp_toggle() {
    let dir = tempfile::tempdir().unwrap();
    let (mut world, mut script) = loaded(dir.path());
    let a = world.add_player("a", 10, ClassType::Warrior);
    let b = world.add_player("b", 10, ClassType::Mage);

    assert_eq!(console(&mut script, &mut world, "pvp"), "PVP mode is active.");
    assert_eq!(console(&mut script, &mut world, "enablepvp"), "PVP is already enabled.");
    assert_eq!(console(&mut script, &mut world, "togglepvp"), "PVP has been disabled.");
    assert_eq!(world.relation(a, b), Relation::FriendlyPlayer);
    assert_eq!(script.game_mode(), Some("default".to_string()));
    assert_eq!(console(&mut script, &mut world, "pvp off"), "PVP is already disabled.");
    assert_eq!(console(&mut script, &mut world, "pvp on"), "PVP has been enabled.");
    assert_eq!(world.relation(a, b), Relation::Hostile);

    let (_, reloaded) = loaded(dir.path());
    assert!(reloaded.settings().unwrap().pvp_enabled);
}

#[test]
fn test_changes_need_admin() {
    let dir = tempfile::tempdir().unwrap();
    let (mut world, mut script) = loaded(dir.path());
    let p = world.add_player("p", 1, ClassType::Rogue);
    let ctx = CommandContext::player(p, false);
    assert_eq!(
        script.on_command(&mut world, &ctx, "gainxp", &[]),
        Some("Players gain xp on player kills.".to_string())
    );
    assert_eq!(
        script.on_command(&mut world, &ctx, "disablegainxp", &[]),
        Some(PERMISSION_DENIED.to_string())
    );
    assert_eq!(
        script.on_command(&mut world, &ctx, "pvpdisplaymode", &["friendly"]),
        Some(PERMISSION_DENIED.to_string())
    );
    assert!(script.settings().unwrap().gain_xp);
}

#[test]
fn test_display_mode() {
    let dir = tempfile::tempdir().unwrap();
    let (mut world, mut script) = loaded(dir.path());
    assert_eq!(
        console(&mut script, &mut world, "pvpdisplaymode"),
        "In pvp mode, players are displayed as hostile entities (setting: hostile)."
    );
    assert_eq!(
        console(&mut script, &mut world, "pvpdisplaymode friendlyplayer"),
        "In pvp mode, players are now displayed as friendly entities and are shown on the map."
    );
    assert_eq!(world.default_relation(), Relation::Rival);
    assert_eq!(script.settings().unwrap().pvp_display, PvpDisplay::FriendlyPlayer);
    assert_eq!(
        console(&mut script, &mut world, "setpvpdisplaymode purple"),
        "Unknown mode: purple"
    );
}

#[test]
fn test_join_reapplies_relation() {
    let dir = tempfile::tempdir().unwrap();
    let (mut world, mut script) = loaded(dir.path());
    console(&mut script, &mut world, "pvpdisplaymode friendly");
    let a = world.add_player("a", 1, ClassType::Ranger);
    script.on_event(&mut world, &HostEvent::Join { player: a }).unwrap();
    let b = world.add_player("b", 1, ClassType::Ranger);
    assert_eq!(world.relation(a, b), Relation::FriendlyRival);
}

#[test]
fn test_kill_rewards_and_notification() {
    let dir = tempfile::tempdir().unwrap();
    let (mut world, mut script) = loaded(dir.path());
    let killer = world.add_player("killer", 10, ClassType::Warrior);
    let victim = world.add_player("victim", 25, ClassType::Mage);

    script
        .on_event(&mut world, &HostEvent::Kill { killer, target: victim })
        .unwrap();
    assert_eq!(
        world.xp_grants(),
        &[XpGrant { player: killer, target: Some(victim), xp: 25 }]
    );
    assert!(world.broadcasts().is_empty());

    assert_eq!(
        console(&mut script, &mut world, "notifyonkill toggle"),
        "Kills are now notified."
    );
    assert_eq!(
        console(&mut script, &mut world, "gainxp off"),
        "Players will no longer gain xp on player kills."
    );
    script
        .on_event(&mut world, &HostEvent::Kill { killer, target: victim })
        .unwrap();
    assert_eq!(world.xp_grants().len(), 1);
    assert_eq!(world.broadcasts(), vec!["killer killed victim!"]);
}

#[test]
fn test_foreign_commands_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let (mut world, mut script) = loaded(dir.path());
    assert!(script
        .on_command(&mut world, &CommandContext::console(), "startgame", &[])
        .is_none());
}

#[test]
fn test_failed_save_keeps_previous_settings() {
    let dir = tempfile::tempdir().unwrap();
    let (mut world, mut script) = loaded(dir.path());
    let a = world.add_player("a", 10, ClassType::Warrior);
    let b = world.add_player("b", 10, ClassType::Mage);
    let path = dir.path().join("advanced_pvp.toml");
    std::fs::remove_file(&path).unwrap();
    std::fs::create_dir(&path).unwrap();

    assert!(console(&mut script, &mut world, "pvp off").starts_with("Could not save settings"));
    assert!(script.settings().unwrap().pvp_enabled);
    assert_eq!(world.relation(a, b), Relation::Hostile);
    assert_eq!(console(&mut script, &mut world, "pvp"), "PVP mode is active.");

    let reply = console(&mut script, &mut world, "pvpdisplaymode friendly");
    assert!(reply.starts_with("Could not save settings"));
    assert_eq!(script.settings().unwrap().pvp_display, PvpDisplay::Hostile);
}
