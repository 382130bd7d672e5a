//! Player-controlled tanks.

use tank_battle_core::{
    BattlefieldPoint, CellCoord, CellRect, Chassis, ControlError, PlayerId, TankSnapshot, AIM_MAX,
    AIM_MIN, DEFAULT_POWER, FALL_DAMAGE, POWER_MAX, POWER_MIN,
};

use crate::{projectile::Projectile, terrain::TerrainGrid};

/// A tank placed on the battlefield.
#[derive(Clone, Debug)]
pub(crate) struct Tank {
    player: PlayerId,
    chassis: Chassis,
    origin: CellCoord,
    armour: u32,
    aim: f32,
    power: u32,
    weapon: usize,
}

impl Tank {
    /// Places a fresh tank with full armour and default controls.
    pub(crate) fn new(player: PlayerId, chassis: Chassis, origin: CellCoord) -> Self {
        Self {
            player,
            chassis,
            origin,
            armour: chassis.max_armour(),
            aim: 0.0,
            power: DEFAULT_POWER,
            weapon: 0,
        }
    }

    pub(crate) const fn player(&self) -> PlayerId {
        self.player
    }

    pub(crate) const fn armour(&self) -> u32 {
        self.armour
    }

    pub(crate) const fn alive(&self) -> bool {
        self.armour > 0
    }

    pub(crate) fn footprint(&self) -> CellRect {
        CellRect::from_origin_and_size(self.origin, self.chassis.footprint())
    }

    /// Centre of the footprint in battlefield coordinates.
    pub(crate) fn centre(&self) -> BattlefieldPoint {
        let size = self.chassis.footprint();
        BattlefieldPoint::new(
            self.origin.column() as f32 + (size.width() as f32 - 1.0) / 2.0,
            self.origin.row() as f32 + (size.height() as f32 - 1.0) / 2.0,
        )
    }

    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        self.footprint().contains(cell)
    }

    /// Stores the clamped angle and returns it. `NaN` leaves the aim unchanged.
    pub(crate) fn set_aim(&mut self, angle: f32) -> f32 {
        if !angle.is_nan() {
            self.aim = angle.clamp(AIM_MIN, AIM_MAX);
        }
        self.aim
    }

    /// Stores the clamped power and returns it.
    pub(crate) fn set_power(&mut self, power: u32) -> u32 {
        self.power = power.clamp(POWER_MIN, POWER_MAX);
        self.power
    }

    pub(crate) fn set_weapon_index(&mut self, index: usize) -> Result<(), ControlError> {
        let available = self.chassis.weapons().len();
        if index >= available {
            return Err(ControlError::InvalidWeapon { index, available });
        }
        self.weapon = index;
        Ok(())
    }

    pub(crate) const fn weapon_index(&self) -> usize {
        self.weapon
    }

    /// Launches the selected weapon from the turret.
    ///
    /// Every projectile treats the firer's current footprint as a safe zone
    /// until it first leaves it.
    pub(crate) fn fire(&self, wind: i32) -> Vec<Projectile> {
        let Some(weapon) = self.chassis.weapon(self.weapon) else {
            return Vec::new();
        };
        let origin = self.centre();
        weapon
            .spread
            .offsets()
            .map(|offset| {
                Projectile::launch(
                    self.player,
                    origin,
                    self.aim + offset,
                    self.power,
                    wind,
                    weapon,
                    self.footprint(),
                )
            })
            .collect()
    }

    /// Removes armour, saturating at zero. Returns the armour actually lost.
    pub(crate) fn inflict_damage(&mut self, amount: u32) -> u32 {
        let lost = amount.min(self.armour);
        self.armour -= lost;
        lost
    }

    /// Reports whether the tank would fall on the next settling step.
    pub(crate) fn unsupported(&self, terrain: &TerrainGrid) -> bool {
        self.alive()
            && !terrain.check_tank_collision(self.origin.below(), self.chassis.footprint())
    }

    /// One settling step: an unsupported tank drops a row and takes fall
    /// damage. Returns the armour lost, or `None` when the tank did not move.
    pub(crate) fn gravity(&mut self, terrain: &TerrainGrid) -> Option<u32> {
        if !self.unsupported(terrain) {
            return None;
        }
        self.origin = self.origin.below();
        Some(self.inflict_damage(FALL_DAMAGE))
    }

    pub(crate) fn snapshot(&self) -> TankSnapshot {
        TankSnapshot {
            player: self.player,
            chassis: self.chassis,
            footprint: self.footprint(),
            armour: self.armour,
            max_armour: self.chassis.max_armour(),
            aim: self.aim,
            power: self.power,
            weapon: self.weapon,
        }
    }
}
