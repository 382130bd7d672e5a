#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn handoff system connecting players to their tanks.
//!
//! When the world hands a player the turn, [`TurnControl`] briefs the
//! player's [`Opponent`] and translates the returned [`FireSolution`] into
//! aim, power, weapon and fire commands. The world still clamps and validates
//! every command it receives.

use std::{collections::BTreeMap, fmt::Debug};

use log::debug;
use tank_battle_core::{BattlefieldPoint, Command, Event, PlayerId, TankView, DEFAULT_POWER};

/// Controls chosen by an opponent for its next shot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FireSolution {
    /// Turret angle in degrees; zero is straight up, positive leans right.
    pub angle: f32,
    /// Firing power.
    pub power: u32,
    /// Index into the chassis weapon list.
    pub weapon: usize,
}

impl FireSolution {
    /// Creates a fire solution using the first weapon.
    #[must_use]
    pub const fn new(angle: f32, power: u32) -> Self {
        Self {
            angle,
            power,
            weapon: 0,
        }
    }

    /// Replaces the selected weapon.
    #[must_use]
    pub const fn with_weapon(mut self, weapon: usize) -> Self {
        self.weapon = weapon;
        self
    }
}

impl Default for FireSolution {
    fn default() -> Self {
        Self::new(0.0, DEFAULT_POWER)
    }
}

/// Situation handed to an opponent when its turn commences.
#[derive(Clone, Copy, Debug)]
pub struct TurnBriefing<'a> {
    /// Player whose turn begins.
    pub player: PlayerId,
    /// Round the turn belongs to.
    pub round: u32,
    /// Wind applied to projectiles this round.
    pub wind: i32,
    /// Every tank on the battlefield.
    pub tanks: &'a TankView,
}

/// Decision maker controlling a single tank.
pub trait Opponent: Debug {
    /// Called whenever a new round begins.
    fn start_round(&mut self) {}

    /// Chooses the controls for the shot that ends this turn.
    fn commence_turn(&mut self, briefing: &TurnBriefing<'_>) -> FireSolution;

    /// Reports where a projectile fired by this opponent struck.
    fn report_hit(&mut self, _at: BattlefieldPoint) {}
}

/// Pure system that forwards turn handoffs to registered opponents.
#[derive(Debug, Default)]
pub struct TurnControl {
    opponents: BTreeMap<PlayerId, Box<dyn Opponent>>,
    wind: i32,
}

impl TurnControl {
    /// Creates a turn controller without registered opponents.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands control of the player's tank to the opponent, returning the
    /// opponent it replaces.
    pub fn register(
        &mut self,
        player: PlayerId,
        opponent: Box<dyn Opponent>,
    ) -> Option<Box<dyn Opponent>> {
        self.opponents.insert(player, opponent)
    }

    /// Reports whether the player's tank is controlled by an opponent.
    #[must_use]
    pub fn controls(&self, player: PlayerId) -> bool {
        self.opponents.contains_key(&player)
    }

    /// Consumes world events and emits the commands for any commenced turn.
    ///
    /// `tanks` must reflect the world after the events were produced. A
    /// solution naming a weapon the tank does not carry produces no commands,
    /// leaving the turn with its player.
    pub fn handle(&mut self, events: &[Event], tanks: &TankView, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::RoundStarted { wind, .. } => {
                    self.wind = *wind;
                    for opponent in self.opponents.values_mut() {
                        opponent.start_round();
                    }
                }
                Event::ProjectileImpacted { owner, at, .. } => {
                    if let Some(opponent) = self.opponents.get_mut(owner) {
                        opponent.report_hit(*at);
                    }
                }
                Event::TurnCommenced { player, round } => {
                    let Some(opponent) = self.opponents.get_mut(player) else {
                        continue;
                    };
                    let briefing = TurnBriefing {
                        player: *player,
                        round: *round,
                        wind: self.wind,
                        tanks,
                    };
                    let solution = opponent.commence_turn(&briefing);
                    let available = tanks
                        .get(*player)
                        .map_or(0, |tank| tank.chassis.weapons().len());
                    if solution.weapon >= available {
                        debug!(
                            "{player:?} chose weapon {} of {available}; holding fire",
                            solution.weapon
                        );
                        continue;
                    }
                    debug!("{player:?} fires with {solution:?}");
                    let player = *player;
                    out.push(Command::Aim {
                        player,
                        angle: solution.angle,
                    });
                    out.push(Command::SetPower {
                        player,
                        power: solution.power,
                    });
                    out.push(Command::SelectWeapon {
                        player,
                        weapon: solution.weapon,
                    });
                    out.push(Command::Fire { player });
                }
                _ => {}
            }
        }
    }
}

/// Opponent that repeats a fixed list of shots.
#[derive(Clone, Debug, Default)]
pub struct ScriptedOpponent {
    shots: Vec<FireSolution>,
    next: usize,
    rounds_started: u32,
    hits: Vec<BattlefieldPoint>,
}

impl ScriptedOpponent {
    /// Creates an opponent cycling through the provided shots. An empty script
    /// fires straight up at default power.
    #[must_use]
    pub fn new(shots: Vec<FireSolution>) -> Self {
        Self {
            shots,
            ..Self::default()
        }
    }

    /// Impact points reported for this opponent's projectiles.
    #[must_use]
    pub fn hits(&self) -> &[BattlefieldPoint] {
        &self.hits
    }

    /// Number of rounds this opponent has been told about.
    #[must_use]
    pub const fn rounds_started(&self) -> u32 {
        self.rounds_started
    }
}

impl Opponent for ScriptedOpponent {
    fn start_round(&mut self) {
        self.rounds_started += 1;
    }

    fn commence_turn(&mut self, _briefing: &TurnBriefing<'_>) -> FireSolution {
        if self.shots.is_empty() {
            return FireSolution::default();
        }
        let shot = self.shots[self.next % self.shots.len()];
        self.next = self.next.wrapping_add(1);
        shot
    }

    fn report_hit(&mut self, at: BattlefieldPoint) {
        self.hits.push(at);
    }
}
