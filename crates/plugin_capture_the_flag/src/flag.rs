//! Flags, flag poles and the arena that holds one of each per team.
//!
//! Both are thin wrappers around host particle effects. A [`Flagpole`] is a
//! ring of stationary markers; a [`Flag`] is a single particle fountain
//! that follows its position. Carrier bookkeeping is left to the match
//! state machine.

use crate::geometry::ArenaBounds;
use script_api::{Color, EntityId, ParticleEffect, ParticleHandle, ParticleKind, ScriptHost, Vec3};
use std::f64::consts::TAU;
use std::fmt;

/// Radius of the marker ring around a flag pole.
pub const FLAGPOLE_RADIUS: f64 = 100000.0;

/// Number of markers in the ring.
pub const FLAGPOLE_MARKERS: usize = 8;

/// One of the two playing teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
    Red,
    Blue,
}

impl Team {
    pub fn other(self) -> Team {
        match self {
            Team::Red => Team::Blue,
            Team::Blue => Team::Red,
        }
    }

    pub fn color(self) -> Color {
        match self {
            Team::Red => Color::RED,
            Team::Blue => Color::BLUE,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Red => write!(f, "red"),
            Team::Blue => write!(f, "blue"),
        }
    }
}

/// A team's home base marker.
#[derive(Debug)]
pub struct Flagpole {
    pos: Vec3,
    color: Color,
    markers: Vec<ParticleHandle>,
}

impl Flagpole {
    /// Creates the marker ring and fires every marker once.
    pub fn spawn(host: &mut dyn ScriptHost, pos: Vec3, color: Color) -> Self {
        let markers = (0..FLAGPOLE_MARKERS)
            .map(|i| host.create_particle_effect(Self::marker(pos, color, i)))
            .collect();
        Self { pos, color, markers }
    }

    fn marker(pos: Vec3, color: Color, index: usize) -> ParticleEffect {
        let rotation = index as f64 / FLAGPOLE_MARKERS as f64 * TAU;
        ParticleEffect {
            position: Vec3::new(
                rotation.sin() * FLAGPOLE_RADIUS + pos.x,
                rotation.cos() * FLAGPOLE_RADIUS + pos.y,
                pos.z,
            ),
            acceleration: Vec3::ZERO,
            color,
            scale: 0.5,
            count: 1,
            kind: ParticleKind::NoAcceleration,
            spreading: 0.0,
            interval: 3.0,
        }
    }

    pub fn pos(&self) -> Vec3 {
        self.pos
    }

    /// Moves the pole; every marker is re-fired at its new place.
    pub fn set_pos(&mut self, host: &mut dyn ScriptHost, pos: Vec3) {
        self.pos = pos;
        for (i, handle) in self.markers.iter().enumerate() {
            host.update_particle_effect(*handle, Self::marker(pos, self.color, i));
        }
    }

    /// Removes every marker from the world.
    pub fn dispose(&mut self, host: &mut dyn ScriptHost) {
        for handle in self.markers.drain(..) {
            host.remove_particle_effect(handle);
        }
    }
}

/// A capturable flag.
#[derive(Debug)]
pub struct Flag {
    pub name: String,
    /// Player currently holding the flag.
    pub carrier: Option<EntityId>,
    pos: Vec3,
    color: Color,
    particle: Option<ParticleHandle>,
}

impl Flag {
    pub fn spawn(host: &mut dyn ScriptHost, pos: Vec3, color: Color, name: &str) -> Self {
        let particle = host.create_particle_effect(Self::effect(pos, color));
        Self {
            name: name.to_string(),
            carrier: None,
            pos,
            color,
            particle: Some(particle),
        }
    }

    fn effect(pos: Vec3, color: Color) -> ParticleEffect {
        ParticleEffect {
            position: pos,
            acceleration: Vec3::new(0.0, 0.0, 2.0),
            color,
            scale: 0.5,
            count: 5,
            kind: ParticleKind::NoGravity,
            spreading: 0.25,
            interval: 0.1,
        }
    }

    pub fn pos(&self) -> Vec3 {
        self.pos
    }

    pub fn set_pos(&mut self, host: &mut dyn ScriptHost, pos: Vec3) {
        self.pos = pos;
        if let Some(handle) = self.particle {
            host.update_particle_effect(handle, Self::effect(pos, self.color));
        }
    }

    pub fn dispose(&mut self, host: &mut dyn ScriptHost) {
        if let Some(handle) = self.particle.take() {
            host.remove_particle_effect(handle);
        }
    }
}

/// Both teams' flags and poles.
#[derive(Debug)]
pub struct Arena {
    red_flag: Flag,
    blue_flag: Flag,
    red_pole: Flagpole,
    blue_pole: Flagpole,
}

impl Arena {
    pub fn spawn(host: &mut dyn ScriptHost, red_pole: Vec3, blue_pole: Vec3) -> Self {
        Self {
            red_flag: Flag::spawn(host, red_pole, Color::RED, "red"),
            red_pole: Flagpole::spawn(host, red_pole, Color::RED),
            blue_flag: Flag::spawn(host, blue_pole, Color::BLUE, "blue"),
            blue_pole: Flagpole::spawn(host, blue_pole, Color::BLUE),
        }
    }

    pub fn flag(&self, team: Team) -> &Flag {
        match team {
            Team::Red => &self.red_flag,
            Team::Blue => &self.blue_flag,
        }
    }

    pub fn flag_mut(&mut self, team: Team) -> &mut Flag {
        match team {
            Team::Red => &mut self.red_flag,
            Team::Blue => &mut self.blue_flag,
        }
    }

    pub fn pole_pos(&self, team: Team) -> Vec3 {
        match team {
            Team::Red => self.red_pole.pos(),
            Team::Blue => self.blue_pole.pos(),
        }
    }

    /// Moves a team's pole and puts its flag back on it.
    pub fn set_pole(&mut self, host: &mut dyn ScriptHost, team: Team, pos: Vec3) {
        match team {
            Team::Red => self.red_pole.set_pos(host, pos),
            Team::Blue => self.blue_pole.set_pos(host, pos),
        }
        let flag = self.flag_mut(team);
        flag.carrier = None;
        flag.set_pos(host, pos);
    }

    /// Drops both carriers and returns both flags to their poles.
    pub fn reset_flags(&mut self, host: &mut dyn ScriptHost) {
        for team in [Team::Red, Team::Blue] {
            let home = self.pole_pos(team);
            let flag = self.flag_mut(team);
            flag.carrier = None;
            flag.set_pos(host, home);
        }
    }

    pub fn bounds(&self) -> ArenaBounds {
        ArenaBounds::from_poles(self.red_pole.pos(), self.blue_pole.pos())
    }

    pub fn dispose(&mut self, host: &mut dyn ScriptHost) {
        self.red_flag.dispose(host);
        self.blue_flag.dispose(host);
        self.red_pole.dispose(host);
        self.blue_pole.dispose(host);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use script_api::LocalWorld;

    #[test]
    fn test_flagpole_ring() {
        let dir = tempfile::tempdir().unwrap();
        let mut world = LocalWorld::new(dir.path());
        let pos = Vec3::new(1000.0, 2000.0, 30.0);
        let mut pole = Flagpole::spawn(&mut world, pos, Color::RED);
        assert_eq!(world.particles().count(), FLAGPOLE_MARKERS);
        assert_eq!(world.particle_fires(), FLAGPOLE_MARKERS);

        for (_, effect) in world.particles() {
            let offset = effect.position - pos;
            assert!((offset.length() - FLAGPOLE_RADIUS).abs() < 1e-6);
            assert_eq!(effect.kind, ParticleKind::NoAcceleration);
            assert_eq!(effect.interval, 3.0);
        }

        pole.set_pos(&mut world, Vec3::ZERO);
        assert_eq!(world.particle_fires(), FLAGPOLE_MARKERS * 2);
        assert_eq!(pole.pos(), Vec3::ZERO);

        pole.dispose(&mut world);
        assert_eq!(world.particles().count(), 0);
    }

    #[test]
    fn test_flag_follows_position() {
        let dir = tempfile::tempdir().unwrap();
        let mut world = LocalWorld::new(dir.path());
        let mut flag = Flag::spawn(&mut world, Vec3::ZERO, Color::BLUE, "blue");
        let target = Vec3::new(5.0, 6.0, 7.0);
        flag.set_pos(&mut world, target);
        assert_eq!(flag.pos(), target);
        let (_, effect) = world.particles().next().unwrap();
        assert_eq!(effect.position, target);
        assert_eq!(effect.count, 5);
        assert_eq!(effect.kind, ParticleKind::NoGravity);
    }

    #[test]
    fn test_arena_reset() {
        let dir = tempfile::tempdir().unwrap();
        let mut world = LocalWorld::new(dir.path());
        let red = Vec3::new(-10.0, 0.0, 0.0);
        let blue = Vec3::new(10.0, 0.0, 0.0);
        let mut arena = Arena::spawn(&mut world, red, blue);
        assert_eq!(arena.flag(Team::Red).name, "red");
        assert_eq!(arena.flag(Team::Blue).name, "blue");
        arena.flag_mut(Team::Red).carrier = Some(EntityId(4));
        arena.flag_mut(Team::Red).set_pos(&mut world, Vec3::new(3.0, 3.0, 3.0));

        arena.reset_flags(&mut world);
        assert_eq!(arena.flag(Team::Red).carrier, None);
        assert_eq!(arena.flag(Team::Red).pos(), red);
        assert_eq!(arena.bounds().radius, 40.0);

        arena.dispose(&mut world);
        assert_eq!(world.particles().count(), 0);
    }
}
