//! # Random events
//!
//! Every [`EVENT_INTERVAL`] seconds one connected player, picked at random,
//! is damaged, healed, killed or stunned. The result is announced in chat.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use script_api::{
    EntityId, EventOutcome, HostEvent, LogLevel, ScriptError, ScriptHost, ServerScript,
};
use tracing::debug;

pub const SCRIPT_NAME: &str = "random_events";

/// Seconds between two events.
pub const EVENT_INTERVAL: f32 = 30.0;

/// Something that happens to a player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RandomEvent {
    Damage { amount: f32, stun_ms: u32 },
    Heal { amount: f32 },
    Kill,
    Stun { duration_ms: u32 },
}

impl RandomEvent {
    pub fn roll(rng: &mut StdRng) -> Self {
        match rng.gen_range(0..=3) {
            0 => Self::Damage {
                amount: rng.gen_range(500..=1000) as f32,
                stun_ms: rng.gen_range(0..=5000),
            },
            1 => Self::Heal { amount: rng.gen_range(500..=1000) as f32 },
            2 => Self::Kill,
            _ => Self::Stun { duration_ms: rng.gen_range(1000..=10000) },
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Self::Damage { .. } => "Damaged",
            Self::Heal { .. } => "Healed",
            Self::Kill => "Killed",
            Self::Stun { .. } => "Stunned",
        }
    }

    pub fn apply(self, host: &mut dyn ScriptHost, player: EntityId) {
        match self {
            Self::Damage { amount, stun_ms } => host.damage(player, amount, stun_ms),
            Self::Heal { amount } => host.heal(player, amount),
            Self::Kill => host.kill(player),
            Self::Stun { duration_ms } => host.stun(player, duration_ms),
        }
    }
}

pub struct RandomEventsScript {
    rng: StdRng,
    elapsed: f32,
}

impl Default for RandomEventsScript {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomEventsScript {
    pub fn new() -> Self {
        Self { rng: StdRng::from_entropy(), elapsed: 0.0 }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed), elapsed: 0.0 }
    }

    /// Seconds since the last event.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Picks a player and an event and applies it. Returns what happened.
    pub fn trigger(&mut self, host: &mut dyn ScriptHost) -> Option<(EntityId, RandomEvent)> {
        let players = host.players();
        if players.is_empty() {
            return None;
        }
        let player = players[self.rng.gen_range(0..players.len())];
        let name = host.player(player)?.name;
        let event = RandomEvent::roll(&mut self.rng);
        event.apply(host, player);

        let message = format!("{} {}!", event.verb(), name);
        host.send_chat(&message);
        host.log(LogLevel::Info, &message);
        Some((player, event))
    }
}

impl ServerScript for RandomEventsScript {
    fn name(&self) -> &str {
        SCRIPT_NAME
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn on_load(&mut self, _host: &mut dyn ScriptHost) -> Result<(), ScriptError> {
        debug!("Random events every {} seconds", EVENT_INTERVAL);
        self.elapsed = 0.0;
        Ok(())
    }

    fn on_event(
        &mut self,
        host: &mut dyn ScriptHost,
        event: &HostEvent,
    ) -> Result<EventOutcome, ScriptError> {
        if let HostEvent::Update { dt } = *event {
            self.elapsed += dt;
            if self.elapsed > EVENT_INTERVAL {
                self.elapsed = 0.0;
                self.trigger(host);
            }
        }
        Ok(EventOutcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolled_values_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = [false; 4];
        for _ in 0..500 {
            match RandomEvent::roll(&mut rng) {
                RandomEvent::Damage { amount, stun_ms } => {
                    assert!((500.0..=1000.0).contains(&amount));
                    assert!(stun_ms <= 5000);
                    seen[0] = true;
                }
                RandomEvent::Heal { amount } => {
                    assert!((500.0..=1000.0).contains(&amount));
                    seen[1] = true;
                }
                RandomEvent::Kill => seen[2] = true,
                RandomEvent::Stun { duration_ms } => {
                    assert!((1000..=10000).contains(&duration_ms));
                    seen[3] = true;
                }
            }
        }
        assert_eq!(seen, [true; 4]);
    }
}
