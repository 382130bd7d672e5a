//! Ballistic projectiles in flight.

use std::collections::VecDeque;

use glam::Vec2;
use tank_battle_core::{
    BattlefieldPoint, CellRect, EffectSnapshot, ImpactTarget, Payload, PlayerId, Weapon,
    PROJECTILE_SUBSTEPS, WIND_DRIFT_PER_UNIT,
};

use crate::{tanks::Tank, terrain::TerrainGrid};

/// Power that launches a projectile at one cell per sub-step.
const POWER_PER_SPEED: f32 = 50.0;

/// Number of past positions kept for drawing the trail.
const TRAIL_LENGTH: usize = 8;

/// Outcome of advancing a projectile by one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum ProjectileStatus {
    InFlight,
    Impact {
        at: BattlefieldPoint,
        target: ImpactTarget,
    },
    OutOfBounds,
}

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    owner: PlayerId,
    position: Vec2,
    velocity: Vec2,
    gravity: f32,
    drift: f32,
    payload: Payload,
    safe_zone: CellRect,
    armed: bool,
    trail: VecDeque<Vec2>,
}

impl Projectile {
    /// Launches a projectile from `origin`.
    ///
    /// An angle of zero points straight up and positive angles lean right.
    pub(crate) fn launch(
        owner: PlayerId,
        origin: BattlefieldPoint,
        angle: f32,
        power: u32,
        wind: i32,
        weapon: &Weapon,
        safe_zone: CellRect,
    ) -> Self {
        let elevation = (90.0 - angle).to_radians();
        let speed = power as f32 / POWER_PER_SPEED;
        Self {
            owner,
            position: Vec2::new(origin.x, origin.y),
            velocity: Vec2::new(elevation.cos(), -elevation.sin()) * speed,
            gravity: weapon.gravity,
            drift: wind as f32 * WIND_DRIFT_PER_UNIT,
            payload: weapon.payload,
            safe_zone,
            armed: false,
            trail: VecDeque::with_capacity(TRAIL_LENGTH),
        }
    }

    pub(crate) const fn owner(&self) -> PlayerId {
        self.owner
    }

    pub(crate) const fn payload(&self) -> Payload {
        self.payload
    }

    pub(crate) fn position(&self) -> BattlefieldPoint {
        BattlefieldPoint::new(self.position.x, self.position.y)
    }

    /// Advances the projectile through one tick of sub-steps, stopping at the
    /// first terminal state.
    pub(crate) fn step(&mut self, terrain: &TerrainGrid, tanks: &[Tank]) -> ProjectileStatus {
        if self.trail.len() == TRAIL_LENGTH {
            let _ = self.trail.pop_front();
        }
        self.trail.push_back(self.position);

        for _ in 0..PROJECTILE_SUBSTEPS {
            self.position += self.velocity;
            self.position.x += self.drift;

            let column = self.position.x.round();
            let row = self.position.y.round();
            if !column.is_finite()
                || column < 0.0
                || column >= terrain.width() as f32
                || row >= terrain.height() as f32
            {
                return ProjectileStatus::OutOfBounds;
            }

            // Above the top edge the projectile keeps flying.
            if let Some(cell) = self.position().nearest_cell() {
                if terrain.get(cell).unwrap_or(false) {
                    return self.impact(ImpactTarget::Terrain);
                }
                if !self.armed && !self.safe_zone.contains(cell) {
                    self.armed = true;
                }
                let struck = tanks.iter().find(|tank| {
                    tank.alive()
                        && tank.contains(cell)
                        && (self.armed || tank.player() != self.owner)
                });
                if let Some(tank) = struck {
                    return self.impact(ImpactTarget::Tank(tank.player()));
                }
            } else if !self.armed {
                self.armed = true;
            }

            self.velocity.y += self.gravity;
        }
        ProjectileStatus::InFlight
    }

    fn impact(&self, target: ImpactTarget) -> ProjectileStatus {
        ProjectileStatus::Impact {
            at: self.position(),
            target,
        }
    }

    pub(crate) fn snapshot(&self) -> EffectSnapshot {
        EffectSnapshot::Projectile {
            owner: self.owner,
            position: self.position(),
            trail: self
                .trail
                .iter()
                .map(|point| BattlefieldPoint::new(point.x, point.y))
                .collect(),
        }
    }
}
