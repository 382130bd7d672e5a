use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tank_battle_core::{Chassis, MAX_WIND};
use tank_battle_system_turn_control::{FireSolution, Opponent, ScriptedOpponent};
use tank_battle_world::{MatchConfig, PlayerSetup};

const SUPPORTED_MATCH_FILE_VERSION: u32 = 1;

/// Match played when no match file is given.
pub(crate) const DEFAULT_MATCH: &str = r#"
version = 1
rounds = 3
seed = 1

[[players]]
name = "Red"
chassis = "standard"
shots = [
    { angle = 45.0, power = 45 },
    { angle = 50.0, power = 60, weapon = 1 },
    { angle = 40.0, power = 75, weapon = 2 },
]

[[players]]
name = "Blue"
chassis = "bulwark"
shots = [
    { angle = -45.0, power = 50 },
    { angle = -55.0, power = 65, weapon = 1 },
]
"#;

/// Match description read from TOML.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct MatchFile {
    version: u32,
    pub(crate) rounds: u32,
    #[serde(default)]
    pub(crate) seed: u64,
    #[serde(default = "default_max_wind")]
    pub(crate) max_wind: i32,
    pub(crate) players: Vec<PlayerEntry>,
}

/// A single roster entry; players without shots fire the default shot.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct PlayerEntry {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) chassis: Chassis,
    #[serde(default)]
    pub(crate) shots: Vec<ShotEntry>,
}

/// Controls of one scripted shot.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct ShotEntry {
    angle: f32,
    power: u32,
    #[serde(default)]
    weapon: usize,
}

const fn default_max_wind() -> i32 {
    MAX_WIND
}

impl MatchFile {
    /// Reads and validates a match file from disk.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read match file at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid match file {}", path.display()))
    }

    /// Parses a match file from TOML text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let file: Self = toml::from_str(contents).context("failed to parse match file toml")?;
        if file.version != SUPPORTED_MATCH_FILE_VERSION {
            bail!(
                "unsupported match file version {}; expected {}",
                file.version,
                SUPPORTED_MATCH_FILE_VERSION
            );
        }
        if file.max_wind < 0 {
            bail!("max_wind must not be negative, got {}", file.max_wind);
        }
        for player in &file.players {
            let available = player.chassis.weapons().len();
            if let Some(shot) = player.shots.iter().find(|shot| shot.weapon >= available) {
                bail!(
                    "{} scripts weapon {} but a {:?} chassis carries {available}",
                    player.name,
                    shot.weapon,
                    player.chassis
                );
            }
        }
        Ok(file)
    }

    /// Builds the world configuration described by the file.
    pub(crate) fn config(&self) -> MatchConfig {
        let players = self
            .players
            .iter()
            .map(|player| PlayerSetup::new(player.name.clone(), player.chassis))
            .collect();
        MatchConfig::new(players, self.rounds, self.seed).with_max_wind(self.max_wind)
    }
}

impl PlayerEntry {
    /// Creates the opponent that steers this player's tank.
    pub(crate) fn opponent(&self) -> Box<dyn Opponent> {
        let shots = self
            .shots
            .iter()
            .map(|shot| FireSolution::new(shot.angle, shot.power).with_weapon(shot.weapon))
            .collect();
        Box::new(ScriptedOpponent::new(shots))
    }
}
