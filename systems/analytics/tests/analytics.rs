use tank_battle_core::{BattlefieldPoint, DamageCause, Event, ImpactTarget, PlayerId};
use tank_battle_system_analytics::{accuracy_bps, Analytics, PlayerStats};

const ADA: PlayerId = PlayerId::new(0);
const GRACE: PlayerId = PlayerId::new(1);

fn fired(owner: PlayerId) -> Event {
    Event::ProjectileFired {
        owner,
        weapon: 0,
        origin: BattlefieldPoint::new(10.0, 10.0),
    }
}

fn impacted(owner: PlayerId, target: ImpactTarget) -> Event {
    Event::ProjectileImpacted {
        owner,
        at: BattlefieldPoint::new(30.0, 20.0),
        target,
    }
}

#[test]
fn hits_count_only_direct_strikes_on_opponents() {
    let mut analytics = Analytics::new();
    analytics.handle(&[
        fired(ADA),
        impacted(ADA, ImpactTarget::Terrain),
        fired(ADA),
        impacted(ADA, ImpactTarget::Tank(ADA)),
        fired(ADA),
        impacted(ADA, ImpactTarget::Tank(GRACE)),
        fired(ADA),
        Event::ProjectileLeftBattlefield { owner: ADA },
    ]);

    let stats = analytics.stats(ADA).copied().unwrap_or_default();
    assert_eq!(stats.shots_fired, 4);
    assert_eq!(stats.hits_landed, 1);
    assert_eq!(accuracy_bps(&stats), 2_500);
    assert!(analytics.stats(GRACE).is_none(), "victims of a miss stay unobserved");
}

#[test]
fn damage_is_split_between_attacker_and_victim() {
    let mut analytics = Analytics::new();
    analytics.handle(&[
        Event::TankDamaged {
            player: GRACE,
            amount: 60,
            armour: 40,
            cause: DamageCause::Explosion { owner: ADA },
        },
        Event::TankDamaged {
            player: GRACE,
            amount: 1,
            armour: 39,
            cause: DamageCause::Fall,
        },
        Event::TankDamaged {
            player: GRACE,
            amount: 39,
            armour: 0,
            cause: DamageCause::Explosion { owner: ADA },
        },
        Event::TankDestroyed { player: GRACE },
        Event::RoundWon {
            round: 1,
            winner: Some(ADA),
        },
    ]);

    assert_eq!(
        analytics.stats(ADA),
        Some(&PlayerStats {
            damage_dealt: 99,
            kills: 1,
            rounds_won: 1,
            ..PlayerStats::default()
        })
    );
    assert_eq!(
        analytics.stats(GRACE),
        Some(&PlayerStats {
            damage_taken: 100,
            fall_damage: 1,
            deaths: 1,
            ..PlayerStats::default()
        })
    );
    assert_eq!(analytics.rounds_completed(), 1);
    assert_eq!(analytics.drawn_rounds(), 0);
}

#[test]
fn rounds_without_survivors_are_draws() {
    let mut analytics = Analytics::new();
    analytics.handle(&[
        Event::RoundWon {
            round: 1,
            winner: None,
        },
        Event::RoundWon {
            round: 2,
            winner: Some(GRACE),
        },
    ]);
    assert_eq!(analytics.rounds_completed(), 2);
    assert_eq!(analytics.drawn_rounds(), 1);
    let observed: Vec<PlayerId> = analytics.iter().map(|(player, _)| player).collect();
    assert_eq!(observed, vec![GRACE]);
}
