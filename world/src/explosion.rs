//! Explosions triggered by projectile impacts.

use tank_battle_core::{
    BattlefieldPoint, EffectSnapshot, Payload, PlayerId, EXPLOSION_LIFETIME_TICKS,
};

use crate::{tanks::Tank, terrain::TerrainGrid};

/// Fraction of an explosion's magnitude delivered at `distance` from its centre.
///
/// Full strength within half the radius, then a linear ramp down to zero at the
/// radius. Never increases with distance.
#[must_use]
pub fn falloff(distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 || distance.is_nan() || distance > radius {
        return 0.0;
    }
    let half = radius / 2.0;
    if distance <= half {
        1.0
    } else {
        (radius - distance) / half
    }
}

/// Armour removed from a single tank by a detonation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DamageReport {
    pub(crate) player: PlayerId,
    pub(crate) amount: u32,
    pub(crate) armour: u32,
    pub(crate) destroyed: bool,
}

/// An animating explosion whose payload resolves when the animation ends.
#[derive(Clone, Debug)]
pub(crate) struct Explosion {
    owner: PlayerId,
    payload: Payload,
    centre: BattlefieldPoint,
    frame: u32,
}

impl Explosion {
    pub(crate) fn new(owner: PlayerId, payload: Payload, centre: BattlefieldPoint) -> Self {
        Self {
            owner,
            payload,
            centre,
            frame: 0,
        }
    }

    pub(crate) const fn owner(&self) -> PlayerId {
        self.owner
    }

    pub(crate) const fn centre(&self) -> BattlefieldPoint {
        self.centre
    }

    pub(crate) const fn payload(&self) -> Payload {
        self.payload
    }

    /// Advances the animation. Returns `true` once the lifetime has elapsed.
    pub(crate) fn step(&mut self) -> bool {
        self.frame = self.frame.saturating_add(1);
        self.frame >= EXPLOSION_LIFETIME_TICKS
    }

    /// Carves the crater and damages every living tank whose footprint reaches
    /// into the damage radius, scaled by the distance to its nearest cell.
    pub(crate) fn explode(&self, terrain: &mut TerrainGrid, tanks: &mut [Tank]) -> Vec<DamageReport> {
        let _ = terrain.destroy_terrain(self.centre.x, self.centre.y, self.payload.crater_radius);

        tanks
            .iter_mut()
            .filter(|tank| tank.alive())
            .filter_map(|tank| {
                let distance = tank.footprint().distance_to(self.centre);
                let share = falloff(distance, self.payload.damage_radius);
                let amount = (self.payload.damage as f32 * share).round() as u32;
                if amount == 0 {
                    return None;
                }
                let amount = tank.inflict_damage(amount);
                Some(DamageReport {
                    player: tank.player(),
                    amount,
                    armour: tank.armour(),
                    destroyed: !tank.alive(),
                })
            })
            .collect()
    }

    pub(crate) fn snapshot(&self) -> EffectSnapshot {
        let progress = self.frame as f32 / EXPLOSION_LIFETIME_TICKS as f32;
        EffectSnapshot::Explosion {
            owner: self.owner,
            centre: self.centre,
            radius: self.payload.crater_radius * progress.min(1.0),
            frame: self.frame,
            lifetime: EXPLOSION_LIFETIME_TICKS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tank_battle_core::{CellCoord, Chassis};

    fn shell() -> Payload {
        Chassis::Standard.weapon(0).expect("standard shell").payload
    }

    #[test]
    fn falloff_is_monotonic_and_zero_beyond_radius() {
        let radius = 4.0;
        let mut previous = falloff(0.0, radius);
        assert_eq!(previous, 1.0);
        for step in 1..=60 {
            let distance = step as f32 * 0.1;
            let current = falloff(distance, radius);
            assert!(current <= previous, "falloff rose at {distance}");
            if distance > radius {
                assert_eq!(current, 0.0);
            }
            previous = current;
        }
        assert_eq!(falloff(f32::NAN, radius), 0.0);
        assert_eq!(falloff(0.0, 0.0), 0.0);
    }

    #[test]
    fn explosion_completes_after_lifetime() {
        let mut explosion = Explosion::new(PlayerId::new(0), shell(), BattlefieldPoint::new(5.0, 5.0));
        for _ in 1..EXPLOSION_LIFETIME_TICKS {
            assert!(!explosion.step());
        }
        assert!(explosion.step());
    }

    #[test]
    fn direct_hit_deals_full_magnitude() {
        let mut terrain = TerrainGrid::empty(30, 30);
        let mut tanks = vec![
            Tank::new(PlayerId::new(0), Chassis::Standard, CellCoord::new(2, 10)),
            Tank::new(PlayerId::new(1), Chassis::Bulwark, CellCoord::new(20, 10)),
        ];
        let centre = tanks[1].centre();
        let explosion = Explosion::new(PlayerId::new(0), shell(), centre);
        let reports = explosion.explode(&mut terrain, &mut tanks);
        assert_eq!(
            reports,
            vec![DamageReport {
                player: PlayerId::new(1),
                amount: 100,
                armour: 50,
                destroyed: false,
            }]
        );
        assert_eq!(tanks[0].armour(), 100);
    }

    #[test]
    fn footprint_edge_inside_radius_takes_scaled_damage() {
        let scatter = Chassis::Standard.weapon(1).expect("scatter shot").payload;
        let mut terrain = TerrainGrid::empty(40, 30);
        let mut tanks = vec![
            Tank::new(PlayerId::new(0), Chassis::Standard, CellCoord::new(20, 10)),
            Tank::new(PlayerId::new(1), Chassis::Standard, CellCoord::new(30, 10)),
        ];
        // Nearest footprint cell (23, 11) is 2.0 away; the centre is 3.5 away.
        let explosion = Explosion::new(PlayerId::new(1), scatter, BattlefieldPoint::new(25.0, 11.0));
        let reports = explosion.explode(&mut terrain, &mut tanks);
        assert_eq!(
            reports,
            vec![DamageReport {
                player: PlayerId::new(0),
                amount: 20,
                armour: 80,
                destroyed: false,
            }]
        );
        assert_eq!(tanks[1].armour(), 100, "footprint 5 cells away is outside the radius");
    }

    #[test]
    fn explosion_carves_crater_and_skips_dead_tanks() {
        let rows = vec!["#".repeat(20); 20];
        let mut terrain = TerrainGrid::from_rows(&rows).expect("rows");
        let mut tanks = vec![Tank::new(PlayerId::new(0), Chassis::Standard, CellCoord::new(8, 8))];
        let _ = tanks[0].inflict_damage(100);
        let explosion = Explosion::new(PlayerId::new(1), shell(), BattlefieldPoint::new(10.0, 10.0));
        assert!(explosion.explode(&mut terrain, &mut tanks).is_empty());
        assert!(!terrain.terrain_at(10, 10));
        assert!(!terrain.terrain_at(14, 10));
        assert!(terrain.terrain_at(15, 10));
    }
}
