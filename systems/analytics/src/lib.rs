#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic analytics system that folds match events into per-player statistics.

mod metrics;

pub use metrics::{accuracy_bps, damage_per_shot, survival_bps};

use std::collections::BTreeMap;

use tank_battle_core::{DamageCause, Event, ImpactTarget, PlayerId};

/// Running totals collected for a single player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PlayerStats {
    /// Projectiles launched.
    pub shots_fired: u32,
    /// Projectiles that struck an opponent's tank directly.
    pub hits_landed: u32,
    /// Explosion damage dealt to opponents.
    pub damage_dealt: u32,
    /// Explosion damage dealt to the player's own tank by the player.
    pub self_damage: u32,
    /// Armour lost to any cause.
    pub damage_taken: u32,
    /// Armour lost while falling.
    pub fall_damage: u32,
    /// Opponent tanks destroyed by the player's explosions.
    pub kills: u32,
    /// Rounds in which the player's tank was destroyed.
    pub deaths: u32,
    /// Rounds the player survived alone.
    pub rounds_won: u32,
}

/// Pure analytics system that observes world events.
#[derive(Debug, Default)]
pub struct Analytics {
    players: BTreeMap<PlayerId, PlayerStats>,
    rounds_completed: u32,
    drawn_rounds: u32,
}

impl Analytics {
    /// Creates a new analytics system without any recorded statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds a batch of world events into the running totals.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TurnCommenced { player, .. } => {
                    let _ = self.entry(*player);
                }
                Event::ProjectileFired { owner, .. } => self.entry(*owner).shots_fired += 1,
                Event::ProjectileImpacted {
                    owner,
                    target: ImpactTarget::Tank(struck),
                    ..
                } if struck != owner => self.entry(*owner).hits_landed += 1,
                Event::TankDamaged {
                    player,
                    amount,
                    armour,
                    cause,
                } => self.record_damage(*player, *amount, *armour, *cause),
                Event::TankDestroyed { player } => self.entry(*player).deaths += 1,
                Event::RoundWon { winner, .. } => {
                    self.rounds_completed += 1;
                    match winner {
                        Some(player) => self.entry(*player).rounds_won += 1,
                        None => self.drawn_rounds += 1,
                    }
                }
                _ => {}
            }
        }
    }

    fn record_damage(&mut self, player: PlayerId, amount: u32, armour: u32, cause: DamageCause) {
        self.entry(player).damage_taken += amount;
        match cause {
            DamageCause::Fall => self.entry(player).fall_damage += amount,
            DamageCause::Explosion { owner } if owner == player => {
                self.entry(owner).self_damage += amount;
            }
            DamageCause::Explosion { owner } => {
                let attacker = self.entry(owner);
                attacker.damage_dealt += amount;
                if armour == 0 {
                    attacker.kills += 1;
                }
            }
        }
    }

    fn entry(&mut self, player: PlayerId) -> &mut PlayerStats {
        self.players.entry(player).or_default()
    }

    /// Statistics recorded for the player, if it was ever observed.
    #[must_use]
    pub fn stats(&self, player: PlayerId) -> Option<&PlayerStats> {
        self.players.get(&player)
    }

    /// Iterator over every observed player's statistics in roster order.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &PlayerStats)> {
        self.players.iter().map(|(player, stats)| (*player, stats))
    }

    /// Number of rounds that ended.
    #[must_use]
    pub const fn rounds_completed(&self) -> u32 {
        self.rounds_completed
    }

    /// Number of rounds that ended with every tank destroyed.
    #[must_use]
    pub const fn drawn_rounds(&self) -> u32 {
        self.drawn_rounds
    }
}
