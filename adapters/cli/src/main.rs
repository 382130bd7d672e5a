#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Tank Battle match without a display.

mod logging;
mod match_file;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use tank_battle_core::{Command, Event, MatchPhase, PlayerId};
use tank_battle_system_analytics::{accuracy_bps, damage_per_shot, survival_bps, Analytics};
use tank_battle_system_turn_control::TurnControl;
use tank_battle_world::{self as world, query, World};

use match_file::{MatchFile, DEFAULT_MATCH};

/// Plays a headless artillery match and prints the final standings.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML file describing the roster, rounds and scripted shots
    #[arg(long)]
    match_file: Option<PathBuf>,
    /// Overrides the seed from the match file
    #[arg(long)]
    seed: Option<u64>,
    /// Overrides the number of rounds from the match file
    #[arg(long)]
    rounds: Option<u32>,
    /// Aborts the match after this many simulation ticks
    #[arg(long, default_value_t = 200_000)]
    max_ticks: u64,
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let mut file = match &args.match_file {
        Some(path) => MatchFile::load(path)?,
        None => MatchFile::parse(DEFAULT_MATCH).context("built-in match is invalid")?,
    };
    if let Some(seed) = args.seed {
        file.seed = seed;
    }
    if let Some(rounds) = args.rounds {
        file.rounds = rounds;
    }

    let (world, analytics) = play(&file, args.max_ticks)?;
    print!("{}", report(&world, &analytics));
    Ok(())
}

/// Runs the described match to completion.
fn play(file: &MatchFile, max_ticks: u64) -> Result<(World, Analytics)> {
    let mut world = World::new(file.config()).context("failed to set up the match")?;
    let mut control = TurnControl::new();
    for (index, player) in file.players.iter().enumerate() {
        let _ = control.register(PlayerId::new(index as u32), player.opponent());
    }
    let mut analytics = Analytics::new();

    let mut events = Vec::new();
    world::apply(&mut world, Command::StartMatch, &mut events);
    loop {
        let mut commands = Vec::new();
        control.handle(&events, &query::tank_view(&world), &mut commands);
        analytics.handle(&events);
        if let Some(reason) = setup_failure(&events) {
            bail!("round could not be set up: {reason}");
        }
        events.clear();

        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
        if !events.is_empty() {
            continue;
        }

        match query::phase(&world) {
            MatchPhase::MatchOver => break,
            MatchPhase::RoundOver => world::apply(&mut world, Command::NextRound, &mut events),
            MatchPhase::TurnInProgress => {
                if query::tick_index(&world) >= max_ticks {
                    bail!("match did not finish within {max_ticks} ticks");
                }
                world::apply(&mut world, Command::Tick, &mut events);
            }
            MatchPhase::AwaitingTurn | MatchPhase::AwaitingMatch => {
                bail!("no opponent answered the turn handoff")
            }
        }
    }

    info!(
        "match finished after {} rounds and {} ticks",
        query::total_rounds(&world),
        query::tick_index(&world)
    );
    Ok((world, analytics))
}

fn setup_failure(events: &[Event]) -> Option<String> {
    events.iter().find_map(|event| match event {
        Event::RoundSetupFailed { round, reason } => Some(format!("round {round}: {reason}")),
        _ => None,
    })
}

/// Formats the final standings with per-player statistics, best score first.
fn report(world: &World, analytics: &Analytics) -> String {
    let mut standings = query::standings(world);
    standings.sort_by(|left, right| {
        right
            .score
            .cmp(&left.score)
            .then(left.player.cmp(&right.player))
    });

    let mut out = String::from("Final standings\n");
    for (place, standing) in standings.iter().enumerate() {
        let name = query::player_name(world, standing.player).unwrap_or("?");
        let stats = analytics.stats(standing.player).copied().unwrap_or_default();
        let accuracy = accuracy_bps(&stats);
        let survival = survival_bps(&stats, analytics.rounds_completed());
        out.push_str(&format!(
            "{:>2}. {name:<12} score {:>2}  shots {:>3}  hits {:>3} ({}.{:02}%)  \
             damage {:>4} ({:.1}/shot)  kills {:>2}  survived {}.{:02}%\n",
            place + 1,
            standing.score,
            stats.shots_fired,
            stats.hits_landed,
            accuracy / 100,
            accuracy % 100,
            stats.damage_dealt,
            damage_per_shot(&stats),
            stats.kills,
            survival / 100,
            survival % 100,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELF_DESTRUCT: &str = r#"
        version = 1
        rounds = 2
        seed = 4
        max_wind = 0

        [[players]]
        name = "Ada"
        shots = [{ angle = 0.0, power = 5 }]

        [[players]]
        name = "Grace"
        shots = [{ angle = 0.0, power = 5 }]
    "#;

    #[test]
    fn scripted_match_plays_to_completion() {
        let file = MatchFile::parse(SELF_DESTRUCT).expect("valid match file");
        let (world, analytics) = play(&file, 200_000).expect("match finishes");
        assert_eq!(query::phase(&world), MatchPhase::MatchOver);
        assert_eq!(analytics.rounds_completed(), 2);
        let text = report(&world, &analytics);
        assert!(text.starts_with("Final standings\n"));
        assert!(text.contains("Ada"));
        assert!(text.contains("Grace"));
        assert!(text.contains("/shot"));
        assert!(text.contains("survived"));
    }

    #[test]
    fn tick_budget_aborts_long_matches() {
        let file = MatchFile::parse(SELF_DESTRUCT).expect("valid match file");
        let error = play(&file, 1).expect_err("one tick is never enough");
        assert!(error.to_string().contains("within 1 ticks"));
    }

    #[test]
    fn invalid_roster_is_reported() {
        let file = MatchFile::parse("version = 1\nrounds = 1\nplayers = []\n")
            .expect("parses before validation");
        let error = play(&file, 10).expect_err("no players");
        assert!(format!("{error:#}").contains("at least"));
    }

    #[test]
    fn arguments_override_nothing_by_default() {
        let args = Args::parse_from(["tank-battle", "--seed", "7"]);
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.rounds, None);
        assert_eq!(args.max_ticks, 200_000);
        assert!(!args.verbose);
    }
}
