// End-to-end leaderboard workflows: backend mutations flow through the event
// bus into recomputed standings

mod utils;

use std::time::Duration;

use scoreboard::{
    api::{NewGame, Seed},
    records::{GameStatus, WinCondition},
    DataEvent, ResourceKey,
};
use utils::*;

const GUEST: &str = "guest-7f3a9c2e11";

/// Alice and Bob each win one decided game; g3 is still in progress
fn league_seed() -> Seed {
    SeedBuilder::new()
        .user("u1", "Alice")
        .user("u2", "Bob")
        .completed_game("g1", WinCondition::HighestScore, &["u1", "u2"])
        .score("g1", "u1", 1, 10)
        .score("g1", "u2", 1, 7)
        .completed_game("g2", WinCondition::LowestScore, &["u1", "u2"])
        .score("g2", "u1", 1, 12)
        .score("g2", "u2", 1, 3)
        .game("g3", GameStatus::Active, Some(WinCondition::HighestScore), &["u1", "u2"])
        .score("g3", "u1", 1, 50)
        .build()
}

fn wins_of(view: &scoreboard::LeaderboardView, player_id: &str) -> Option<u32> {
    view.entry_for(player_id).map(|e| e.total_wins)
}

#[tokio::test]
async fn test_initial_load_ranks_by_wins_then_win_rate() {
    let setup = TestSetup::new(league_seed());

    let view = setup.leaderboard_service.load().await;

    assert!(view.is_computed());
    assert!(view.last_error.is_none());
    let ids: Vec<&str> = view.entries.iter().map(|e| e.player_id.as_str()).collect();
    assert_eq!(ids, vec!["u2", "u1"]);

    let bob = &view.entries[0];
    assert_eq!(bob.nickname, "Bob");
    assert_eq!((bob.total_wins, bob.total_games), (1, 2));
    assert_eq!(bob.lowest_score_wins, 1);
    assert!((bob.win_rate - 0.5).abs() < f64::EPSILON);

    let alice = &view.entries[1];
    assert_eq!((alice.total_wins, alice.total_games), (1, 3));
    assert_eq!(alice.highest_score_wins, 1);
    assert_eq!(alice.wins[0].game_name, "Game g1");
    assert_eq!(alice.wins[0].final_score, 10);
    assert_eq!(alice.wins[0].total_players, 2);
}

#[tokio::test]
async fn test_completing_game_recomputes_leaderboard() {
    let setup = TestSetup::new(league_seed()).subscribed();
    setup.leaderboard_service.load().await;

    setup
        .backend()
        .set_game_status("g3", GameStatus::Completed)
        .await
        .unwrap();

    let view = setup
        .wait_for_leaderboard(|view| wins_of(view, "u1") == Some(2))
        .await;
    assert_eq!(view.entries[0].player_id, "u1");
    assert_eq!(view.entries[0].highest_score_wins, 2);
}

#[tokio::test]
async fn test_recompute_event_published_after_change() {
    let setup = TestSetup::new(league_seed()).subscribed();
    setup.leaderboard_service.load().await;
    let mut receiver = setup.event_bus.subscribe();

    setup
        .backend()
        .record_score("g3", "u2", 1, 80)
        .await
        .unwrap();

    let player_count = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if let Ok(DataEvent::LeaderboardRecomputed { player_count }) = receiver.recv().await {
                break player_count;
            }
        }
    })
    .await
    .expect("no recompute event published");

    assert_eq!(player_count, 2);
}

#[tokio::test]
async fn test_new_game_played_to_completion() {
    let setup = TestSetup::new(league_seed()).subscribed();
    setup.leaderboard_service.load().await;
    let backend = setup.backend();

    let game = backend
        .create_game(NewGame {
            game_name: None,
            host_user_id: "u2".to_string(),
            win_condition: Some(WinCondition::HighestScore),
        })
        .await;
    backend.join_game(&game.id, "u1").await.unwrap();
    backend.record_score(&game.id, "u1", 1, 5).await.unwrap();
    backend.record_score(&game.id, "u2", 1, 9).await.unwrap();
    backend.record_score(&game.id, "u2", 2, 4).await.unwrap();
    backend
        .set_game_status(&game.id, GameStatus::Completed)
        .await
        .unwrap();

    let view = setup
        .wait_for_leaderboard(|view| wins_of(view, "u2") == Some(2))
        .await;
    let bob = view.entry_for("u2").unwrap();
    assert_eq!(bob.total_games, 3);

    let win = bob.wins.iter().find(|w| w.game_id == game.id).unwrap();
    assert_eq!(win.game_name, "Untitled Game");
    assert_eq!(win.final_score, 9);
}

#[tokio::test]
async fn test_guest_migration_merges_history() {
    let seed = SeedBuilder::new()
        .user("u1", "Alice")
        .user("u2", "Bob")
        .completed_game("g1", WinCondition::HighestScore, &["u1", "u2"])
        .score("g1", "u1", 1, 10)
        .score("g1", "u2", 1, 7)
        .completed_game("g4", WinCondition::HighestScore, &["guest-7f3a9c2e11:Sam", "u2"])
        .score("g4", GUEST, 1, 99)
        .score("g4", "u2", 1, 10)
        .build();
    let setup = TestSetup::new(seed).subscribed();

    let before = setup.leaderboard_service.load().await;
    let guest = before.entry_for(GUEST).unwrap();
    assert_eq!(guest.nickname, "guest-7f");
    assert_eq!(guest.total_wins, 1);

    let summary = setup.backend().migrate_player(GUEST, "u1").await.unwrap();
    assert_eq!(summary.games_updated, 1);
    assert_eq!(summary.scores_moved, 1);
    assert_eq!(summary.scores_dropped, 0);

    let view = setup
        .wait_for_leaderboard(|view| {
            view.entry_for(GUEST).is_none() && wins_of(view, "u1") == Some(2)
        })
        .await;
    let alice = view.entry_for("u1").unwrap();
    assert_eq!(alice.total_games, 2);
    assert_eq!(alice.nickname, "Alice");
    assert_eq!(view.entries[0].player_id, "u1");
}

#[tokio::test(start_paused = true)]
async fn test_collections_refetched_only_after_ttl() {
    let setup = TestSetup::with_ttl(league_seed(), Duration::from_secs(60));

    setup.leaderboard_service.load().await;
    setup.leaderboard_service.load().await;
    for resource in [ResourceKey::Games, ResourceKey::Scores, ResourceKey::Users] {
        assert_eq!(setup.api.calls(resource), 1, "{resource} fetched within TTL");
    }

    tokio::time::advance(Duration::from_secs(61)).await;
    setup.leaderboard_service.load().await;
    for resource in [ResourceKey::Games, ResourceKey::Scores, ResourceKey::Users] {
        assert_eq!(setup.api.calls(resource), 2, "{resource} not refetched after TTL");
    }
}

#[tokio::test]
async fn test_concurrent_loads_fetch_once() {
    let setup = TestSetup::new(league_seed());
    let service = &setup.leaderboard_service;

    let (a, b, c) = tokio::join!(service.load(), service.load(), service.load());

    assert_eq!(a.entries, b.entries);
    assert_eq!(b.entries, c.entries);
    assert_eq!(setup.api.calls(ResourceKey::Games), 1);
    assert_eq!(setup.api.calls(ResourceKey::Scores), 1);
    assert_eq!(setup.api.calls(ResourceKey::Users), 1);
}

#[tokio::test]
async fn test_backend_failure_keeps_previous_leaderboard() {
    let setup = TestSetup::new(league_seed());
    let first = setup.leaderboard_service.load().await;

    setup.api.set_failing(ResourceKey::Scores, true);
    let err = setup.leaderboard_service.force_refresh().await.unwrap_err();
    assert_eq!(err.resource(), ResourceKey::Scores);

    let stale = setup.leaderboard_service.load().await;
    assert_eq!(stale.entries, first.entries);
    assert_eq!(stale.computed_at, first.computed_at);
    assert!(stale.last_error.as_deref().unwrap().contains("scores"));

    setup.api.set_failing(ResourceKey::Scores, false);
    let recovered = setup.leaderboard_service.refresh().await.unwrap();
    assert!(recovered.last_error.is_none());
    assert_eq!(recovered.entries, first.entries);
}

#[tokio::test]
async fn test_first_load_failure_serves_empty_leaderboard() {
    let setup = TestSetup::new(league_seed());
    setup.api.set_failing(ResourceKey::Users, true);

    let view = setup.leaderboard_service.load().await;

    assert!(!view.is_computed());
    assert!(view.entries.is_empty());
    assert!(view.last_error.is_some());
}
