use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::models::{
    AggregationOptions, GameWinDetail, PlayerLeaderboardEntry, TieBreak, UNKNOWN_PLAYER,
    UNTITLED_GAME,
};
use crate::records::{Game, Score, User, WinCondition};

#[derive(Default)]
struct PlayerTally<'a> {
    total_wins: u32,
    highest_score_wins: u32,
    lowest_score_wins: u32,
    wins: Vec<GameWinDetail>,
    games_played: HashSet<&'a str>,
}

/// Folds games, scores and users into a ranked leaderboard
///
/// Only completed games with a win condition award a win, but every score
/// row counts toward the player's games played. Entries are ranked by wins,
/// then win rate; equal entries keep the order in which their player first
/// appears in `scores`.
pub fn calculate_leaderboard(
    games: &[Game],
    scores: &[Score],
    users: &[User],
    options: &AggregationOptions,
) -> Vec<PlayerLeaderboardEntry> {
    let mut order: Vec<&str> = Vec::new();
    let mut tallies: HashMap<&str, PlayerTally> = HashMap::new();
    let mut scores_by_game: HashMap<&str, Vec<&Score>> = HashMap::new();

    for score in scores {
        tally_for(&mut tallies, &mut order, &score.player_id)
            .games_played
            .insert(&score.game_id);
        scores_by_game
            .entry(score.game_id.as_str())
            .or_default()
            .push(score);
    }

    for game in games.iter().filter(|g| g.is_decided()) {
        let Some(win_condition) = game.win_condition else {
            continue;
        };
        let Some(game_scores) = scores_by_game.get(game.id.as_str()) else {
            debug!(game_id = %game.id, "Completed game has no scores, skipping");
            continue;
        };
        let Some(winner) = pick_winner(game_scores, win_condition, options.tie_break) else {
            continue;
        };

        let tally = tally_for(&mut tallies, &mut order, &winner.player_id);
        tally.total_wins += 1;
        match win_condition {
            WinCondition::HighestScore => tally.highest_score_wins += 1,
            WinCondition::LowestScore => tally.lowest_score_wins += 1,
        }
        tally.wins.push(GameWinDetail {
            game_id: game.id.clone(),
            game_name: game
                .game_name
                .clone()
                .unwrap_or_else(|| UNTITLED_GAME.to_string()),
            win_condition,
            final_score: winner.score,
            date: game.created_at,
            total_players: game.player_ids.len(),
        });
    }

    let mut users_by_id: HashMap<&str, &User> = HashMap::new();
    for user in users {
        users_by_id.entry(user.id.as_str()).or_insert(user);
    }

    let mut entries: Vec<PlayerLeaderboardEntry> = order
        .into_iter()
        .filter_map(|player_id| {
            let tally = tallies.remove(player_id)?;
            let total_games = tally.games_played.len() as u32;
            let win_rate = if total_games > 0 {
                f64::from(tally.total_wins) / f64::from(total_games)
            } else {
                0.0
            };

            Some(PlayerLeaderboardEntry {
                nickname: resolve_nickname(player_id, &users_by_id),
                player_id: player_id.to_string(),
                total_wins: tally.total_wins,
                total_games,
                win_rate,
                highest_score_wins: tally.highest_score_wins,
                lowest_score_wins: tally.lowest_score_wins,
                wins: tally.wins,
            })
        })
        .collect();

    // sort_by is stable
    entries.sort_by(|a, b| {
        b.total_wins
            .cmp(&a.total_wins)
            .then_with(|| b.win_rate.total_cmp(&a.win_rate))
    });
    entries.truncate(options.limit);
    entries
}

/// Display name for a player id
///
/// Known users show their username. Unknown ids longer than ten
/// characters are cut to their first eight.
pub fn resolve_nickname(player_id: &str, users_by_id: &HashMap<&str, &User>) -> String {
    match users_by_id.get(player_id) {
        Some(user) if user.username.is_empty() => UNKNOWN_PLAYER.to_string(),
        Some(user) => user.username.clone(),
        None if player_id.chars().count() > 10 => player_id.chars().take(8).collect(),
        None => player_id.to_string(),
    }
}

fn tally_for<'a, 'm>(
    tallies: &'m mut HashMap<&'a str, PlayerTally<'a>>,
    order: &mut Vec<&'a str>,
    player_id: &'a str,
) -> &'m mut PlayerTally<'a> {
    tallies.entry(player_id).or_insert_with(|| {
        order.push(player_id);
        PlayerTally::default()
    })
}

fn pick_winner<'a>(
    scores: &[&'a Score],
    win_condition: WinCondition,
    tie_break: TieBreak,
) -> Option<&'a Score> {
    let mut best: Option<&'a Score> = None;

    for &candidate in scores {
        let Some(current) = best else {
            best = Some(candidate);
            continue;
        };

        let ordering = match win_condition {
            WinCondition::HighestScore => candidate.score.cmp(&current.score),
            WinCondition::LowestScore => current.score.cmp(&candidate.score),
        };
        let replace = match ordering {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => {
                tie_break == TieBreak::EarliestRecorded && candidate.created_at < current.created_at
            }
        };

        if replace {
            best = Some(candidate);
        }
    }

    best
}
