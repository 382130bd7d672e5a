use serde::{Deserialize, Serialize};

use crate::CellRectSize;

/// Projectile gravity shared by every shipped weapon, in cells per sub-step squared.
const SHELL_GRAVITY: f32 = 0.01;

static STANDARD_WEAPONS: [Weapon; 3] = [
    Weapon {
        name: "Standard Shell",
        spread: Spread::SINGLE,
        gravity: SHELL_GRAVITY,
        payload: Payload {
            damage: 100,
            damage_radius: 4.0,
            crater_radius: 4.0,
        },
    },
    Weapon {
        name: "Scatter Shot",
        spread: Spread {
            projectiles: 3,
            degrees: 6.0,
        },
        gravity: SHELL_GRAVITY,
        payload: Payload {
            damage: 30,
            damage_radius: 3.0,
            crater_radius: 3.0,
        },
    },
    Weapon {
        name: "Digger",
        spread: Spread::SINGLE,
        gravity: SHELL_GRAVITY,
        payload: Payload {
            damage: 10,
            damage_radius: 2.0,
            crater_radius: 10.0,
        },
    },
];

static BULWARK_WEAPONS: [Weapon; 2] = [
    Weapon {
        name: "Heavy Shell",
        spread: Spread::SINGLE,
        gravity: SHELL_GRAVITY,
        payload: Payload {
            damage: 150,
            damage_radius: 6.0,
            crater_radius: 7.0,
        },
    },
    Weapon {
        name: "Standard Shell",
        spread: Spread::SINGLE,
        gravity: SHELL_GRAVITY,
        payload: Payload {
            damage: 100,
            damage_radius: 4.0,
            crater_radius: 4.0,
        },
    },
];

/// Tank archetype determining footprint, armour and the weapons carried.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chassis {
    /// Nimble tank carrying a varied arsenal.
    #[default]
    Standard,
    /// Wide, heavily armoured tank with a slow but devastating main gun.
    Bulwark,
}

impl Chassis {
    /// Cells occupied by the tank.
    #[must_use]
    pub const fn footprint(self) -> CellRectSize {
        match self {
            Self::Standard => CellRectSize::new(4, 3),
            Self::Bulwark => CellRectSize::new(5, 3),
        }
    }

    /// Armour the tank starts every round with.
    #[must_use]
    pub const fn max_armour(self) -> u32 {
        match self {
            Self::Standard => 100,
            Self::Bulwark => 150,
        }
    }

    /// Weapons carried by the chassis, in selection order. Never empty.
    #[must_use]
    pub fn weapons(self) -> &'static [Weapon] {
        match self {
            Self::Standard => &STANDARD_WEAPONS,
            Self::Bulwark => &BULWARK_WEAPONS,
        }
    }

    /// Weapon at the provided selection index, if carried.
    #[must_use]
    pub fn weapon(self, index: usize) -> Option<&'static Weapon> {
        self.weapons().get(index)
    }
}

/// Immutable description of a weapon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Weapon {
    /// Display name.
    pub name: &'static str,
    /// How many projectiles a shot launches and how far apart they fan out.
    pub spread: Spread,
    /// Downward acceleration applied to each projectile per sub-step.
    pub gravity: f32,
    /// Explosion produced where each projectile lands.
    pub payload: Payload,
}

/// Fan of projectiles launched by a single shot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Spread {
    /// Number of projectiles launched; at least one.
    pub projectiles: u32,
    /// Angle in degrees between neighbouring projectiles.
    pub degrees: f32,
}

impl Spread {
    /// A single projectile fired along the turret.
    pub const SINGLE: Self = Self {
        projectiles: 1,
        degrees: 0.0,
    };

    /// Angular offsets of each projectile relative to the turret, centred on zero.
    pub fn offsets(self) -> impl Iterator<Item = f32> {
        let count = self.projectiles.max(1);
        let centre = (count - 1) as f32 / 2.0;
        (0..count).map(move |index| (index as f32 - centre) * self.degrees)
    }
}

/// Damage and terrain destruction produced by an explosion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    /// Damage dealt to a tank at the centre of the blast.
    pub damage: u32,
    /// Radius within which tanks take damage.
    pub damage_radius: f32,
    /// Radius of the crater carved into the terrain.
    pub crater_radius: f32,
}

#[cfg(test)]
mod tests {
    use super::{Chassis, Spread};

    #[test]
    fn every_chassis_carries_at_least_one_weapon() {
        for chassis in [Chassis::Standard, Chassis::Bulwark] {
            assert!(!chassis.weapons().is_empty());
            assert!(chassis.weapon(chassis.weapons().len()).is_none());
        }
    }

    #[test]
    fn standard_chassis_matches_classic_tank() {
        let chassis = Chassis::default();
        assert_eq!(chassis.footprint().width(), 4);
        assert_eq!(chassis.footprint().height(), 3);
        assert_eq!(chassis.max_armour(), 100);
        let shell = chassis.weapon(0).expect("standard shell");
        assert_eq!(shell.payload.damage, 100);
        assert_eq!(shell.payload.damage_radius, 4.0);
        assert_eq!(shell.payload.crater_radius, 4.0);
    }

    #[test]
    fn spread_offsets_are_centred() {
        let offsets: Vec<f32> = Spread {
            projectiles: 3,
            degrees: 6.0,
        }
        .offsets()
        .collect();
        assert_eq!(offsets, vec![-6.0, 0.0, 6.0]);
        assert_eq!(Spread::SINGLE.offsets().collect::<Vec<_>>(), vec![0.0]);
    }
}
