#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Tank Battle.
//!
//! The world owns the battlefield terrain, every tank, and the projectiles and
//! explosions resolving the current shot. It is mutated exclusively through
//! [`apply`] and observed through the read-only accessors in [`query`].

mod explosion;
mod generation;
mod projectile;
mod tanks;
mod terrain;

pub use explosion::falloff;
pub use generation::{generate_terrain, player_positions};
pub use terrain::{rasterize_line, TerrainGrid};

use log::{debug, info, warn};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tank_battle_core::{
    CellCoord, Chassis, Command, ControlError, DamageCause, Event, MatchError, MatchPhase,
    PlayerId, SetupError, BATTLEFIELD_HEIGHT, BATTLEFIELD_WIDTH, MAX_PLAYERS, MAX_WIND,
    MIN_PLAYERS,
};

use explosion::{DamageReport, Explosion};
use projectile::{Projectile, ProjectileStatus};
use tanks::Tank;

/// Describes a single participant of a match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerSetup {
    /// Display name.
    pub name: String,
    /// Loadout the player's tank is built from.
    pub chassis: Chassis,
}

impl PlayerSetup {
    /// Creates a new participant description.
    #[must_use]
    pub fn new(name: impl Into<String>, chassis: Chassis) -> Self {
        Self {
            name: name.into(),
            chassis,
        }
    }
}

/// Parameters fixed for the lifetime of a match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchConfig {
    /// Roster in turn order; the position of a player is its [`PlayerId`].
    pub players: Vec<PlayerSetup>,
    /// Number of rounds played before the match ends.
    pub rounds: u32,
    /// Seed for terrain generation, tank placement and wind.
    pub seed: u64,
    /// Largest wind magnitude a round may roll.
    pub max_wind: i32,
}

impl MatchConfig {
    /// Creates a configuration using the default wind bound.
    #[must_use]
    pub fn new(players: Vec<PlayerSetup>, rounds: u32, seed: u64) -> Self {
        Self {
            players,
            rounds,
            seed,
            max_wind: MAX_WIND,
        }
    }

    /// Replaces the wind bound; `0` produces calm rounds.
    #[must_use]
    pub fn with_max_wind(mut self, max_wind: i32) -> Self {
        self.max_wind = max_wind;
        self
    }

    fn validate(&self, width: u32) -> Result<(), SetupError> {
        let actual = self.players.len();
        if actual < MIN_PLAYERS {
            return Err(SetupError::TooFewPlayers {
                minimum: MIN_PLAYERS,
                actual,
            });
        }
        if actual > MAX_PLAYERS {
            return Err(SetupError::TooManyPlayers {
                maximum: MAX_PLAYERS,
                actual,
            });
        }
        if self.rounds == 0 {
            return Err(SetupError::NoRounds);
        }
        let widest = self
            .players
            .iter()
            .map(|player| u64::from(player.chassis.footprint().width()))
            .max()
            .unwrap_or(0);
        if widest * actual as u64 > u64::from(width) {
            return Err(SetupError::BattlefieldTooNarrow {
                width,
                players: actual,
            });
        }
        Ok(())
    }
}

/// Represents the authoritative Tank Battle world state.
#[derive(Clone, Debug)]
pub struct World {
    config: MatchConfig,
    rng: ChaCha8Rng,
    pristine: TerrainGrid,
    terrain: TerrainGrid,
    tanks: Vec<Tank>,
    projectiles: Vec<Projectile>,
    explosions: Vec<Explosion>,
    scores: Vec<u32>,
    phase: MatchPhase,
    round: u32,
    rounds_remaining: u32,
    wind: i32,
    current: usize,
    tick_index: u64,
}

impl World {
    /// Creates a world on a freshly generated battlefield.
    pub fn new(config: MatchConfig) -> Result<Self, SetupError> {
        config.validate(BATTLEFIELD_WIDTH)?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let terrain = generate_terrain(BATTLEFIELD_WIDTH, BATTLEFIELD_HEIGHT, &mut rng);
        Ok(Self::assemble(config, rng, terrain))
    }

    /// Creates a world on the provided battlefield instead of a generated one.
    pub fn with_terrain(config: MatchConfig, terrain: TerrainGrid) -> Result<Self, SetupError> {
        config.validate(terrain.width())?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Ok(Self::assemble(config, rng, terrain))
    }

    fn assemble(config: MatchConfig, rng: ChaCha8Rng, terrain: TerrainGrid) -> Self {
        let scores = vec![0; config.players.len()];
        let rounds_remaining = config.rounds;
        Self {
            config,
            rng,
            pristine: terrain.clone(),
            terrain,
            tanks: Vec::new(),
            projectiles: Vec::new(),
            explosions: Vec::new(),
            scores,
            phase: MatchPhase::AwaitingMatch,
            round: 0,
            rounds_remaining,
            wind: 0,
            current: 0,
            tick_index: 0,
        }
    }

    /// Restores the initial battlefield, re-places every tank at full armour and
    /// rolls new wind. Nothing changes when a tank cannot be placed.
    fn begin_round(&mut self, out_events: &mut Vec<Event>) {
        let round = self.round.saturating_add(1);
        let mut rng = self.rng.clone();
        let tanks = match self.place_tanks(&mut rng) {
            Ok(tanks) => tanks,
            Err(reason) => {
                warn!("round {round} could not start: {reason}");
                out_events.push(Event::RoundSetupFailed { round, reason });
                return;
            }
        };
        let max_wind = self.config.max_wind.saturating_abs();
        let wind = rng.gen_range(-max_wind..=max_wind);

        self.rng = rng;
        self.terrain = self.pristine.clone();
        self.tanks = tanks;
        self.projectiles.clear();
        self.explosions.clear();
        self.round = round;
        self.rounds_remaining = self.rounds_remaining.saturating_sub(1);
        self.wind = wind;
        self.current = (round as usize - 1) % self.tanks.len();
        self.phase = MatchPhase::AwaitingTurn;

        info!(
            "round {round} of {} started with wind {wind}",
            self.config.rounds
        );
        out_events.push(Event::RoundStarted {
            round,
            total_rounds: self.config.rounds,
            wind,
        });
        out_events.push(Event::TurnCommenced {
            player: self.current_player(),
            round,
        });
    }

    fn place_tanks(&self, rng: &mut ChaCha8Rng) -> Result<Vec<Tank>, SetupError> {
        let players = self.config.players.len();
        let width = self.pristine.width();
        let mut slots: Vec<usize> = (0..players).collect();
        slots.shuffle(rng);

        self.config
            .players
            .iter()
            .zip(slots)
            .enumerate()
            .map(|(index, (setup, slot))| {
                let footprint = setup.chassis.footprint();
                let column = player_positions(width, players, footprint.width())
                    .get(slot)
                    .copied()
                    .unwrap_or(0);
                let row = self.pristine.tank_y_position(column, footprint)?;
                Ok(Tank::new(
                    PlayerId::new(index as u32),
                    setup.chassis,
                    CellCoord::new(column, row),
                ))
            })
            .collect()
    }

    fn current_player(&self) -> PlayerId {
        PlayerId::new(self.current as u32)
    }

    fn controllable(&mut self, player: PlayerId) -> Result<&mut Tank, ControlError> {
        match self.phase {
            MatchPhase::AwaitingTurn => {}
            MatchPhase::TurnInProgress => return Err(ControlError::TurnInProgress),
            MatchPhase::AwaitingMatch | MatchPhase::RoundOver | MatchPhase::MatchOver => {
                return Err(ControlError::NoActiveTurn)
            }
        }
        if player.index() != self.current {
            return Err(ControlError::NotYourTurn);
        }
        let tank = self
            .tanks
            .get_mut(player.index())
            .ok_or(ControlError::NotYourTurn)?;
        if !tank.alive() {
            return Err(ControlError::TankDestroyed);
        }
        Ok(tank)
    }

    fn fire(&mut self, player: PlayerId, out_events: &mut Vec<Event>) -> Result<(), ControlError> {
        let wind = self.wind;
        let tank = self.controllable(player)?;
        let weapon = tank.weapon_index();
        let launched = tank.fire(wind);
        for projectile in &launched {
            out_events.push(Event::ProjectileFired {
                owner: player,
                weapon,
                origin: projectile.position(),
            });
        }
        self.projectiles.extend(launched);
        self.phase = MatchPhase::TurnInProgress;
        Ok(())
    }

    fn tick(&mut self, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced {
            tick: self.tick_index,
        });

        let _ = self.terrain.gravity();
        for tank in &mut self.tanks {
            if let Some(amount) = tank.gravity(&self.terrain) {
                record_damage(
                    DamageReport {
                        player: tank.player(),
                        amount,
                        armour: tank.armour(),
                        destroyed: !tank.alive(),
                    },
                    DamageCause::Fall,
                    out_events,
                );
            }
        }

        self.step_projectiles(out_events);
        self.step_explosions(out_events);

        if self.phase == MatchPhase::TurnInProgress && self.turn_over() {
            self.end_turn(out_events);
        }
    }

    fn step_projectiles(&mut self, out_events: &mut Vec<Event>) {
        let mut index = 0;
        while index < self.projectiles.len() {
            let status = self.projectiles[index].step(&self.terrain, &self.tanks);
            match status {
                ProjectileStatus::InFlight => index += 1,
                ProjectileStatus::Impact { at, target } => {
                    let projectile = self.projectiles.remove(index);
                    debug!("projectile from {:?} struck {target:?}", projectile.owner());
                    out_events.push(Event::ProjectileImpacted {
                        owner: projectile.owner(),
                        at,
                        target,
                    });
                    self.explosions.push(Explosion::new(
                        projectile.owner(),
                        projectile.payload(),
                        at,
                    ));
                }
                ProjectileStatus::OutOfBounds => {
                    let projectile = self.projectiles.remove(index);
                    out_events.push(Event::ProjectileLeftBattlefield {
                        owner: projectile.owner(),
                    });
                }
            }
        }
    }

    fn step_explosions(&mut self, out_events: &mut Vec<Event>) {
        let mut index = 0;
        while index < self.explosions.len() {
            if !self.explosions[index].step() {
                index += 1;
                continue;
            }
            let explosion = self.explosions.remove(index);
            let owner = explosion.owner();
            let payload = explosion.payload();
            out_events.push(Event::ExplosionDetonated {
                owner,
                centre: explosion.centre(),
                damage_radius: payload.damage_radius,
                crater_radius: payload.crater_radius,
            });
            for report in explosion.explode(&mut self.terrain, &mut self.tanks) {
                record_damage(report, DamageCause::Explosion { owner }, out_events);
            }
        }
    }

    /// Reports whether the battlefield is quiescent: nothing in flight, nothing
    /// exploding, and nothing left to settle.
    fn turn_over(&self) -> bool {
        self.projectiles.is_empty()
            && self.explosions.is_empty()
            && self.terrain.is_settled()
            && !self.tanks.iter().any(|tank| tank.unsupported(&self.terrain))
    }

    fn end_turn(&mut self, out_events: &mut Vec<Event>) {
        out_events.push(Event::TurnEnded {
            player: self.current_player(),
        });

        let mut survivors = self.tanks.iter().filter(|tank| tank.alive());
        let first = survivors.next().map(Tank::player);
        if survivors.next().is_none() {
            if let Some(score) = first.and_then(|winner| self.scores.get_mut(winner.index())) {
                *score += 1;
            }
            self.phase = MatchPhase::RoundOver;
            info!("round {} won by {first:?}", self.round);
            out_events.push(Event::RoundWon {
                round: self.round,
                winner: first,
            });
            return;
        }

        let players = self.tanks.len();
        let next = (1..=players)
            .map(|offset| (self.current + offset) % players)
            .find(|&index| self.tanks[index].alive())
            .unwrap_or(self.current);
        self.current = next;
        self.phase = MatchPhase::AwaitingTurn;
        out_events.push(Event::TurnCommenced {
            player: self.current_player(),
            round: self.round,
        });
    }

    fn next_round(&mut self, out_events: &mut Vec<Event>) -> Result<(), MatchError> {
        match self.phase {
            MatchPhase::RoundOver => {}
            MatchPhase::AwaitingMatch => return Err(MatchError::NotStarted),
            MatchPhase::MatchOver => return Err(MatchError::MatchOver),
            MatchPhase::AwaitingTurn | MatchPhase::TurnInProgress => {
                return Err(MatchError::RoundInProgress)
            }
        }
        if self.rounds_remaining == 0 {
            self.phase = MatchPhase::MatchOver;
            let standings = query::standings(self);
            info!("match finished: {standings:?}");
            out_events.push(Event::MatchFinished { standings });
        } else {
            self.begin_round(out_events);
        }
        Ok(())
    }
}

fn record_damage(report: DamageReport, cause: DamageCause, out_events: &mut Vec<Event>) {
    out_events.push(Event::TankDamaged {
        player: report.player,
        amount: report.amount,
        armour: report.armour,
        cause,
    });
    if report.destroyed {
        info!("tank of {:?} destroyed by {cause:?}", report.player);
        out_events.push(Event::TankDestroyed {
            player: report.player,
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartMatch => {
            let rejection = match world.phase {
                MatchPhase::AwaitingMatch => None,
                MatchPhase::MatchOver => Some(MatchError::MatchOver),
                _ => Some(MatchError::AlreadyStarted),
            };
            match rejection {
                Some(reason) => out_events.push(Event::MatchCommandRejected { reason }),
                None => world.begin_round(out_events),
            }
        }
        Command::Aim { player, angle } => match world.controllable(player) {
            Ok(tank) => {
                let angle = tank.set_aim(angle);
                out_events.push(Event::TankAimed { player, angle });
            }
            Err(reason) => reject_control(player, reason, out_events),
        },
        Command::SetPower { player, power } => match world.controllable(player) {
            Ok(tank) => {
                let power = tank.set_power(power);
                out_events.push(Event::PowerSet { player, power });
            }
            Err(reason) => reject_control(player, reason, out_events),
        },
        Command::SelectWeapon { player, weapon } => {
            match world
                .controllable(player)
                .and_then(|tank| tank.set_weapon_index(weapon))
            {
                Ok(()) => out_events.push(Event::WeaponSelected { player, weapon }),
                Err(reason) => reject_control(player, reason, out_events),
            }
        }
        Command::Fire { player } => {
            if let Err(reason) = world.fire(player, out_events) {
                reject_control(player, reason, out_events);
            }
        }
        Command::Tick => world.tick(out_events),
        Command::NextRound => {
            if let Err(reason) = world.next_round(out_events) {
                out_events.push(Event::MatchCommandRejected { reason });
            }
        }
    }
}

fn reject_control(player: PlayerId, reason: ControlError, out_events: &mut Vec<Event>) {
    debug!("rejected control request from {player:?}: {reason}");
    out_events.push(Event::ControlRejected { player, reason });
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{TerrainGrid, World};
    use tank_battle_core::{
        EffectSnapshot, MatchPhase, PlayerId, Standing, TankSnapshot, TankView,
    };

    /// Current lifecycle phase of the match.
    #[must_use]
    pub fn phase(world: &World) -> MatchPhase {
        world.phase
    }

    /// Provides read-only access to the battlefield terrain.
    #[must_use]
    pub fn terrain(world: &World) -> &TerrainGrid {
        &world.terrain
    }

    /// Captures a read-only view of every tank on the battlefield.
    #[must_use]
    pub fn tank_view(world: &World) -> TankView {
        TankView::from_snapshots(world.tanks.iter().map(|tank| tank.snapshot()).collect())
    }

    /// Captures the state of a single player's tank, if placed.
    #[must_use]
    pub fn tank(world: &World, player: PlayerId) -> Option<TankSnapshot> {
        world.tanks.get(player.index()).map(|tank| tank.snapshot())
    }

    /// Captures drawable state of projectiles in flight followed by explosions.
    #[must_use]
    pub fn effect_view(world: &World) -> Vec<EffectSnapshot> {
        world
            .projectiles
            .iter()
            .map(|projectile| projectile.snapshot())
            .chain(world.explosions.iter().map(|explosion| explosion.snapshot()))
            .collect()
    }

    /// Wind applied to projectiles during the current round.
    #[must_use]
    pub fn wind(world: &World) -> i32 {
        world.wind
    }

    /// One-based index of the current round, or zero before the match starts.
    #[must_use]
    pub fn round(world: &World) -> u32 {
        world.round
    }

    /// Number of rounds the match consists of.
    #[must_use]
    pub fn total_rounds(world: &World) -> u32 {
        world.config.rounds
    }

    /// Rounds that have not started yet.
    #[must_use]
    pub fn rounds_remaining(world: &World) -> u32 {
        world.rounds_remaining
    }

    /// Player holding the turn, if a turn is being played.
    #[must_use]
    pub fn current_player(world: &World) -> Option<PlayerId> {
        match world.phase {
            MatchPhase::AwaitingTurn | MatchPhase::TurnInProgress => Some(world.current_player()),
            MatchPhase::AwaitingMatch | MatchPhase::RoundOver | MatchPhase::MatchOver => None,
        }
    }

    /// Cumulative scores in roster order.
    #[must_use]
    pub fn standings(world: &World) -> Vec<Standing> {
        world
            .scores
            .iter()
            .enumerate()
            .map(|(index, score)| Standing {
                player: PlayerId::new(index as u32),
                score: *score,
            })
            .collect()
    }

    /// Display name registered for the player.
    #[must_use]
    pub fn player_name(world: &World, player: PlayerId) -> Option<&str> {
        world
            .config
            .players
            .get(player.index())
            .map(|setup| setup.name.as_str())
    }

    /// Reports whether the battlefield is quiescent.
    #[must_use]
    pub fn turn_over(world: &World) -> bool {
        world.turn_over()
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}
