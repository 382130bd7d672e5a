use crate::PlayerStats;

/// Share of shots that struck an opponent directly, in basis points.
///
/// Players that never fired report zero.
#[must_use]
pub fn accuracy_bps(stats: &PlayerStats) -> u32 {
    ratio_bps(stats.hits_landed, stats.shots_fired)
}

/// Average explosion damage dealt to opponents per shot fired.
#[must_use]
pub fn damage_per_shot(stats: &PlayerStats) -> f32 {
    if stats.shots_fired == 0 {
        return 0.0;
    }
    stats.damage_dealt as f32 / stats.shots_fired as f32
}

/// Share of `rounds` in which the player's tank survived, in basis points.
#[must_use]
pub fn survival_bps(stats: &PlayerStats, rounds: u32) -> u32 {
    ratio_bps(rounds.saturating_sub(stats.deaths), rounds)
}

fn ratio_bps(numerator: u32, denominator: u32) -> u32 {
    if denominator == 0 {
        return 0;
    }
    let scaled = u64::from(numerator.min(denominator)) * 10_000 / u64::from(denominator);
    scaled as u32
}
