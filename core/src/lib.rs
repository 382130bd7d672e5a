#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tank Battle engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and input collaborators
//! submit [`Command`] values describing desired mutations, the world executes
//! those commands via its `apply` entry point, and then broadcasts [`Event`]
//! values for systems to react to deterministically. Systems consume event
//! streams, query immutable snapshots, and respond exclusively with new
//! command batches.

mod loadout;

pub use loadout::{Chassis, Payload, Spread, Weapon};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of cell columns in the default battlefield.
pub const BATTLEFIELD_WIDTH: u32 = 160;

/// Number of cell rows in the default battlefield.
pub const BATTLEFIELD_HEIGHT: u32 = 120;

/// Leftmost turret angle in degrees.
pub const AIM_MIN: f32 = -90.0;

/// Rightmost turret angle in degrees.
pub const AIM_MAX: f32 = 90.0;

/// Weakest permitted firing power.
pub const POWER_MIN: u32 = 5;

/// Strongest permitted firing power.
pub const POWER_MAX: u32 = 100;

/// Power assigned to a freshly placed tank.
pub const DEFAULT_POWER: u32 = 25;

/// Armour lost by a tank for every settling tick spent falling.
pub const FALL_DAMAGE: u32 = 1;

/// Default bound on the per-round wind magnitude.
pub const MAX_WIND: i32 = 100;

/// Number of ticks an explosion animates before its payload resolves.
pub const EXPLOSION_LIFETIME_TICKS: u32 = 20;

/// Number of ballistic integration steps performed per simulation tick.
pub const PROJECTILE_SUBSTEPS: u32 = 10;

/// Horizontal drift, in cells per sub-step, contributed by one unit of wind.
pub const WIND_DRIFT_PER_UNIT: f32 = 0.001;

/// Smallest roster a match accepts.
pub const MIN_PLAYERS: usize = 2;

/// Largest roster a match accepts.
pub const MAX_PLAYERS: usize = 8;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Places every tank and begins the first round of the match.
    StartMatch,
    /// Rotates the turret of the player's tank.
    Aim {
        /// Player issuing the request.
        player: PlayerId,
        /// Requested angle in degrees; clamped to [`AIM_MIN`]..=[`AIM_MAX`].
        angle: f32,
    },
    /// Adjusts the firing power of the player's tank.
    SetPower {
        /// Player issuing the request.
        player: PlayerId,
        /// Requested power; clamped to [`POWER_MIN`]..=[`POWER_MAX`].
        power: u32,
    },
    /// Selects one of the weapons carried by the player's chassis.
    SelectWeapon {
        /// Player issuing the request.
        player: PlayerId,
        /// Index into the chassis weapon list.
        weapon: usize,
    },
    /// Launches the selected weapon and consumes the player's turn.
    Fire {
        /// Player issuing the request.
        player: PlayerId,
    },
    /// Advances the simulation by a single tick.
    Tick,
    /// Resets the battlefield for the next round once the current one ended.
    NextRound,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a round was set up successfully.
    RoundStarted {
        /// One-based index of the round.
        round: u32,
        /// Number of rounds the match consists of.
        total_rounds: u32,
        /// Wind applied to every projectile during the round.
        wind: i32,
    },
    /// Hands control of the battlefield to the provided player.
    TurnCommenced {
        /// Player whose turn begins.
        player: PlayerId,
        /// Round the turn belongs to.
        round: u32,
    },
    /// Confirms the turret angle applied to a tank.
    TankAimed {
        /// Owner of the tank.
        player: PlayerId,
        /// Angle stored after clamping.
        angle: f32,
    },
    /// Confirms the firing power applied to a tank.
    PowerSet {
        /// Owner of the tank.
        player: PlayerId,
        /// Power stored after clamping.
        power: u32,
    },
    /// Confirms the weapon selected on a tank.
    WeaponSelected {
        /// Owner of the tank.
        player: PlayerId,
        /// Index of the selected weapon.
        weapon: usize,
    },
    /// Reports that a control request was refused without changing state.
    ControlRejected {
        /// Player that issued the request.
        player: PlayerId,
        /// Specific reason the request failed.
        reason: ControlError,
    },
    /// Confirms that a projectile left a tank's barrel.
    ProjectileFired {
        /// Player that fired the projectile.
        owner: PlayerId,
        /// Index of the weapon that produced the projectile.
        weapon: usize,
        /// Launch position.
        origin: BattlefieldPoint,
    },
    /// Reports that a projectile struck terrain or a tank.
    ProjectileImpacted {
        /// Player that fired the projectile.
        owner: PlayerId,
        /// Position of the impact.
        at: BattlefieldPoint,
        /// What the projectile struck.
        target: ImpactTarget,
    },
    /// Reports that a projectile flew off the battlefield without effect.
    ProjectileLeftBattlefield {
        /// Player that fired the projectile.
        owner: PlayerId,
    },
    /// Reports that an explosion finished animating and resolved its payload.
    ExplosionDetonated {
        /// Player whose projectile caused the explosion.
        owner: PlayerId,
        /// Centre of the blast.
        centre: BattlefieldPoint,
        /// Radius within which tanks take damage.
        damage_radius: f32,
        /// Radius of the crater carved into the terrain.
        crater_radius: f32,
    },
    /// Reports armour lost by a tank.
    TankDamaged {
        /// Owner of the damaged tank.
        player: PlayerId,
        /// Armour removed by the hit.
        amount: u32,
        /// Armour remaining after the hit.
        armour: u32,
        /// Source of the damage.
        cause: DamageCause,
    },
    /// Reports that a tank's armour reached zero.
    TankDestroyed {
        /// Owner of the destroyed tank.
        player: PlayerId,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Number of ticks processed since the world was created.
        tick: u64,
    },
    /// Indicates that the battlefield became quiescent after a shot.
    TurnEnded {
        /// Player whose turn finished.
        player: PlayerId,
    },
    /// Announces the outcome of a round.
    RoundWon {
        /// One-based index of the finished round.
        round: u32,
        /// Surviving player, or `None` when every tank was destroyed.
        winner: Option<PlayerId>,
    },
    /// Reports that a round could not be set up; the battlefield is untouched.
    RoundSetupFailed {
        /// Round that failed to start.
        round: u32,
        /// Specific reason setup failed.
        reason: SetupError,
    },
    /// Reports that a match-level command arrived in the wrong phase.
    MatchCommandRejected {
        /// Specific reason the command failed.
        reason: MatchError,
    },
    /// Announces that the final round concluded.
    MatchFinished {
        /// Cumulative scores ordered by player.
        standings: Vec<Standing>,
    },
}

/// Lifecycle phase of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchPhase {
    /// The world was created but no round has started.
    AwaitingMatch,
    /// The current player may aim and fire.
    AwaitingTurn,
    /// A shot is resolving; projectiles, explosions or falling tanks remain.
    TurnInProgress,
    /// At most one tank survives; the world waits for [`Command::NextRound`].
    RoundOver,
    /// Every round was played.
    MatchOver,
}

/// What a projectile struck.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImpactTarget {
    /// The projectile buried itself in solid terrain.
    Terrain,
    /// The projectile entered the footprint of the provided player's tank.
    Tank(PlayerId),
}

/// Source of armour loss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageCause {
    /// Blast damage from an explosion caused by the provided player.
    Explosion {
        /// Player whose projectile caused the explosion.
        owner: PlayerId,
    },
    /// Damage taken while falling through empty space.
    Fall,
}

/// Reasons a tank control request may be rejected by the world.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlError {
    /// No round is running, so no tank accepts controls.
    #[error("no turn is active")]
    NoActiveTurn,
    /// Another player currently holds the turn.
    #[error("it is not this player's turn")]
    NotYourTurn,
    /// The previous shot has not finished resolving.
    #[error("a shot is still resolving")]
    TurnInProgress,
    /// The player's tank has no armour left.
    #[error("the tank has been destroyed")]
    TankDestroyed,
    /// The requested weapon index is outside the chassis weapon list.
    #[error("weapon {index} is not available; the chassis carries {available}")]
    InvalidWeapon {
        /// Index that was requested.
        index: usize,
        /// Number of weapons carried by the chassis.
        available: usize,
    },
}

/// Reasons a match or round cannot be set up.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetupError {
    /// The terrain offers no resting height for a tank anchored at the column.
    #[error("no valid landing spot for a tank anchored at column {column}")]
    InvalidPlacement {
        /// Anchor column that was probed.
        column: u32,
    },
    /// The roster is smaller than [`MIN_PLAYERS`].
    #[error("a match needs at least {minimum} players but {actual} were registered")]
    TooFewPlayers {
        /// Smallest accepted roster.
        minimum: usize,
        /// Registered roster size.
        actual: usize,
    },
    /// The roster is larger than [`MAX_PLAYERS`].
    #[error("a match accepts at most {maximum} players but {actual} were registered")]
    TooManyPlayers {
        /// Largest accepted roster.
        maximum: usize,
        /// Registered roster size.
        actual: usize,
    },
    /// The match was configured without rounds.
    #[error("a match needs at least one round")]
    NoRounds,
    /// The battlefield is too narrow to seat every tank side by side.
    #[error("a battlefield {width} cells wide cannot seat {players} tanks")]
    BattlefieldTooNarrow {
        /// Width of the battlefield in cells.
        width: u32,
        /// Registered roster size.
        players: usize,
    },
}

/// Reasons a match-level command may be rejected by the world.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchError {
    /// The match has not started yet.
    #[error("the match has not started")]
    NotStarted,
    /// The match already started.
    #[error("the match already started")]
    AlreadyStarted,
    /// The current round has not finished.
    #[error("the current round is still being played")]
    RoundInProgress,
    /// Every round was already played.
    #[error("the match is over")]
    MatchOver,
}

/// Unique identifier assigned to a player; equal to the player's roster index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Position of the player within the roster.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Cumulative score of a single player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Standing {
    /// Player the score belongs to.
    pub player: PlayerId,
    /// Rounds won so far.
    pub score: u32,
}

/// Location of a single terrain cell expressed as column and row coordinates.
///
/// Rows grow downwards: row zero is the top of the battlefield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Returns the cell directly beneath this one.
    #[must_use]
    pub const fn below(self) -> Self {
        Self::new(self.column, self.row.saturating_add(1))
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Upper-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Reports whether the rectangle covers the provided cell.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        let column = u64::from(cell.column());
        let row = u64::from(cell.row());
        let left = u64::from(self.origin.column());
        let top = u64::from(self.origin.row());
        column >= left
            && column < left + u64::from(self.size.width())
            && row >= top
            && row < top + u64::from(self.size.height())
    }

    /// Distance from `point` to the nearest covered cell.
    ///
    /// Cells are addressed by their centres, so a point inside the rectangle
    /// measures zero.
    #[must_use]
    pub fn distance_to(&self, point: BattlefieldPoint) -> f32 {
        let left = self.origin.column() as f32;
        let top = self.origin.row() as f32;
        let right = left + self.size.width().saturating_sub(1) as f32;
        let bottom = top + self.size.height().saturating_sub(1) as f32;
        let nearest = BattlefieldPoint::new(point.x.clamp(left, right), point.y.clamp(top, bottom));
        nearest.distance_to(point)
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Continuous position on the battlefield measured in cells.
///
/// Cell `(c, r)` is centred on the point `(c, r)`, so rounding a point yields
/// the cell that contains it.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct BattlefieldPoint {
    /// Horizontal coordinate; grows to the right.
    pub x: f32,
    /// Vertical coordinate; grows downwards.
    pub y: f32,
}

impl BattlefieldPoint {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance_to(self, other: BattlefieldPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Cell containing the point, or `None` when the point lies left of or
    /// above the battlefield.
    #[must_use]
    pub fn nearest_cell(self) -> Option<CellCoord> {
        let column = self.x.round();
        let row = self.y.round();
        if column < 0.0 || row < 0.0 || !column.is_finite() || !row.is_finite() {
            return None;
        }
        Some(CellCoord::new(column as u32, row as u32))
    }
}

/// Immutable representation of a single tank's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TankSnapshot {
    /// Owner of the tank.
    pub player: PlayerId,
    /// Loadout the tank was built from.
    pub chassis: Chassis,
    /// Region of cells occupied by the tank.
    pub footprint: CellRect,
    /// Armour remaining.
    pub armour: u32,
    /// Armour the chassis starts each round with.
    pub max_armour: u32,
    /// Turret angle in degrees.
    pub aim: f32,
    /// Firing power.
    pub power: u32,
    /// Index of the selected weapon.
    pub weapon: usize,
}

impl TankSnapshot {
    /// Reports whether the tank still has armour.
    #[must_use]
    pub const fn alive(&self) -> bool {
        self.armour > 0
    }

    /// Centre of the footprint in battlefield coordinates.
    #[must_use]
    pub fn centre(&self) -> BattlefieldPoint {
        let origin = self.footprint.origin();
        let size = self.footprint.size();
        BattlefieldPoint::new(
            origin.column() as f32 + (size.width() as f32 - 1.0) / 2.0,
            origin.row() as f32 + (size.height() as f32 - 1.0) / 2.0,
        )
    }
}

/// Read-only snapshot describing every tank on the battlefield.
#[derive(Clone, Debug, Default)]
pub struct TankView {
    snapshots: Vec<TankSnapshot>,
}

impl TankView {
    /// Creates a new tank view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TankSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.player);
        Self { snapshots }
    }

    /// Iterator over the captured tank snapshots in roster order.
    pub fn iter(&self) -> impl Iterator<Item = &TankSnapshot> {
        self.snapshots.iter()
    }

    /// Returns the snapshot of the provided player's tank, if any.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> Option<&TankSnapshot> {
        self.snapshots
            .binary_search_by_key(&player, |snapshot| snapshot.player)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }
}

/// Drawable state of an active effect.
#[derive(Clone, Debug, PartialEq)]
pub enum EffectSnapshot {
    /// A projectile in flight.
    Projectile {
        /// Player that fired the projectile.
        owner: PlayerId,
        /// Current position.
        position: BattlefieldPoint,
        /// Recent positions, oldest first.
        trail: Vec<BattlefieldPoint>,
    },
    /// An explosion that is still animating.
    Explosion {
        /// Player whose projectile caused the explosion.
        owner: PlayerId,
        /// Centre of the blast.
        centre: BattlefieldPoint,
        /// Radius drawn for the current frame.
        radius: f32,
        /// Frames elapsed since the explosion started.
        frame: u32,
        /// Frames the explosion lasts.
        lifetime: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::{
        BattlefieldPoint, CellCoord, CellRect, CellRectSize, Chassis, ControlError, PlayerId,
        SetupError,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn player_id_round_trips_through_bincode() {
        assert_round_trip(&PlayerId::new(3));
    }

    #[test]
    fn chassis_round_trips_through_bincode() {
        assert_round_trip(&Chassis::Bulwark);
    }

    #[test]
    fn errors_round_trip_through_bincode() {
        assert_round_trip(&SetupError::InvalidPlacement { column: 12 });
        assert_round_trip(&ControlError::InvalidWeapon {
            index: 4,
            available: 3,
        });
    }

    #[test]
    fn rect_contains_only_covered_cells() {
        let rect = CellRect::from_origin_and_size(CellCoord::new(2, 5), CellRectSize::new(4, 3));
        assert!(rect.contains(CellCoord::new(2, 5)));
        assert!(rect.contains(CellCoord::new(5, 7)));
        assert!(!rect.contains(CellCoord::new(6, 7)));
        assert!(!rect.contains(CellCoord::new(5, 8)));
        assert!(!rect.contains(CellCoord::new(1, 5)));
    }

    #[test]
    fn rect_distance_measures_to_nearest_cell() {
        let rect = CellRect::from_origin_and_size(CellCoord::new(20, 10), CellRectSize::new(4, 3));
        assert_eq!(rect.distance_to(BattlefieldPoint::new(21.5, 11.0)), 0.0);
        assert_eq!(rect.distance_to(BattlefieldPoint::new(25.0, 11.0)), 2.0);
        assert_eq!(rect.distance_to(BattlefieldPoint::new(20.0, 15.0)), 3.0);
        assert_eq!(rect.distance_to(BattlefieldPoint::new(26.0, 16.0)), 5.0);
    }

    #[test]
    fn nearest_cell_rounds_and_rejects_negative_points() {
        assert_eq!(
            BattlefieldPoint::new(3.4, 7.6).nearest_cell(),
            Some(CellCoord::new(3, 8))
        );
        assert_eq!(
            BattlefieldPoint::new(-0.4, 2.0).nearest_cell(),
            Some(CellCoord::new(0, 2))
        );
        assert_eq!(BattlefieldPoint::new(-0.6, 2.0).nearest_cell(), None);
        assert_eq!(BattlefieldPoint::new(2.0, -3.0).nearest_cell(), None);
    }

    #[test]
    fn setup_errors_render_readable_messages() {
        let message = SetupError::InvalidPlacement { column: 7 }.to_string();
        assert!(message.contains("column 7"), "unexpected message: {message}");
    }
}
