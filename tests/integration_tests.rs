//! Integration tests for fightrank
//!
//! These tests drive the whole pipeline: raw records through validation,
//! replay, storage and the query layer.

mod fixtures;

use fightrank::config::{AppConfig, RatingConfig};
use fightrank::metrics::MetricsCollector;
use fightrank::query::RatingQueries;
use fightrank::rating::{
    update_ratings, InMemoryRatingStore, RatingStore, ReplayEngine, WeightingPolicy,
};
use fightrank::service::RatingService;
use fightrank::source::{JsonFileMatchSource, MatchSource, StaticMatchSource};
use fightrank::types::{MatchOutcome, MatchRecord};
use fightrank::RatingError;
use skillratings::Outcomes;
use std::sync::Arc;

use fixtures::{assert_rating, raw_record, MatchBuilder, RecordingStore};

fn engine() -> ReplayEngine {
    ReplayEngine::new(RatingConfig::default()).unwrap()
}

fn service_over(records: Vec<MatchRecord>, store: Arc<dyn RatingStore>) -> RatingService {
    RatingService::new(
        Arc::new(StaticMatchSource::new(records)),
        store,
        engine(),
        Arc::new(MetricsCollector::new().unwrap()),
    )
}

#[test]
fn test_decision_between_newcomers_updates_both_tracks() {
    let store = Arc::new(InMemoryRatingStore::new());
    let service = service_over(
        vec![MatchBuilder::new(1, "2019-03-02", "A", "B").build()],
        store.clone(),
    );
    service.run_replay().unwrap();

    let snapshot = store.current().unwrap().unwrap();
    for track in ["unified", "Lightweight"] {
        let a = snapshot.standing("A", track).unwrap();
        let b = snapshot.standing("B", track).unwrap();
        assert_rating(a.rating, 1516.0);
        assert_rating(b.rating, 1484.0);
        assert_eq!(a.match_count, 1);
        assert_eq!(b.match_count, 1);
    }
}

#[test]
fn test_first_round_title_finish() {
    let fight = MatchBuilder::new(1, "2019-03-02", "A", "B")
        .title()
        .finish("KO/TKO", Some(1))
        .build();
    assert!((engine().policy().for_match(&fight) - 78.0).abs() < 1e-9);

    let output = engine().replay(&[fight]).unwrap();
    let unified = |name: &str| {
        output
            .standings
            .iter()
            .find(|s| s.competitor == name && s.track == "unified")
            .unwrap()
            .rating
    };
    assert_rating(unified("A"), 1539.0);
    assert_rating(unified("B"), 1461.0);
}

#[test]
fn test_draw_between_unequal_ratings() {
    let k = WeightingPolicy::default().weighting_factor("U-DEC", false, None);
    let (a, b) = update_ratings(1600.0, 1400.0, Outcomes::DRAW, k);
    assert_rating(a, 1591.69);
    assert_rating(b, 1408.31);
}

#[test]
fn test_no_contest_is_skipped_entirely() {
    let records = vec![
        MatchBuilder::new(1, "2019-01-01", "A", "B").build(),
        MatchBuilder::new(2, "2019-02-01", "A", "B")
            .outcome(MatchOutcome::NoContest)
            .build(),
    ];
    let with_nc = engine().replay(&records).unwrap();
    let without_nc = engine().replay(&records[..1]).unwrap();

    assert_eq!(with_nc.summary.matches_processed, 1);
    assert_eq!(with_nc.summary.matches_skipped, 1);
    assert!(with_nc.history.iter().all(|h| h.match_id != 2));
    assert_eq!(with_nc.standings, without_nc.standings);
}

#[test]
fn test_replay_is_deterministic() {
    let records = vec![
        MatchBuilder::new(1, "2018-07-07", "Daniel Cormier", "Stipe Miocic")
            .category("Heavyweight")
            .title()
            .finish("KO/TKO", Some(1))
            .build(),
        MatchBuilder::new(2, "2018-07-07", "Stipe Miocic", "Francis Ngannou")
            .category("Heavyweight")
            .build(),
        MatchBuilder::new(3, "2019-08-17", "Stipe Miocic", "Daniel Cormier")
            .category("Heavyweight")
            .title()
            .finish("KO/TKO", Some(4))
            .build(),
        MatchBuilder::new(4, "2019-09-01", "Daniel Cormier", "Jon Jones")
            .category("Light Heavyweight")
            .outcome(MatchOutcome::BWins)
            .build(),
    ];

    let first = engine().replay(&records).unwrap();
    let second = engine().replay(&records).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first.history).unwrap(),
        serde_json::to_string(&second.history).unwrap()
    );
}

#[test]
fn test_input_order_is_tiebreak_within_a_date() {
    let records = vec![
        MatchBuilder::new(2, "2020-05-09", "B", "C").build(),
        MatchBuilder::new(1, "2020-05-09", "A", "B").build(),
    ];
    let output = engine().replay(&records).unwrap();
    // Ids carry the original insertion order, so match 1 is rated first
    assert_eq!(output.history[0].match_id, 1);
    let b_in_second = output
        .history
        .iter()
        .find(|h| h.match_id == 2 && h.competitor == "B" && h.track == "unified")
        .unwrap();
    assert_rating(b_in_second.rating_before, 1484.0);
}

#[test]
fn test_skip_accounting_and_zero_sum() {
    let outcomes = [
        MatchOutcome::AWins,
        MatchOutcome::Draw,
        MatchOutcome::NoContest,
        MatchOutcome::BWins,
        MatchOutcome::Unknown,
        MatchOutcome::AWins,
    ];
    let names = ["A", "B", "C", "D"];
    let records: Vec<MatchRecord> = outcomes
        .iter()
        .enumerate()
        .map(|(i, outcome)| {
            MatchBuilder::new(
                i as u64 + 1,
                &format!("2021-01-{:02}", i + 1),
                names[i % 4],
                names[(i + 1) % 4],
            )
            .outcome(*outcome)
            .finish(if i % 2 == 0 { "SUB" } else { "S-DEC" }, Some(2))
            .build()
        })
        .collect();

    let output = engine().replay(&records).unwrap();
    assert_eq!(output.summary.total_matches(), records.len() as u64);
    assert_eq!(output.summary.matches_skipped, 2);
    assert_eq!(output.history.len() as u64, output.summary.matches_processed * 4);

    for pair in output.history.chunks(2) {
        assert_eq!(pair[0].match_id, pair[1].match_id);
        assert_eq!(pair[0].track, pair[1].track);
        assert!((pair[0].delta() + pair[1].delta()).abs() < 1e-9);
    }
}

#[test]
fn test_failed_run_keeps_previous_snapshot() {
    let store = Arc::new(RecordingStore::new());
    let good = service_over(
        vec![MatchBuilder::new(1, "2019-01-01", "A", "B").build()],
        store.clone(),
    );
    good.run_replay().unwrap();
    assert_eq!(store.replace_count(), 1);

    let bad = service_over(
        vec![
            MatchBuilder::new(1, "2019-01-01", "A", "B").build(),
            MatchBuilder::new(2, "2019-01-02", "B", "B").build(),
        ],
        store.clone(),
    );
    let err = bad.run_replay().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RatingError>(),
        Some(RatingError::InvalidMatchRecord { index: 1, .. })
    ));
    assert_eq!(store.replace_count(), 1);
}

#[test]
fn test_json_files_end_to_end() {
    let dir = tempfile::TempDir::new().unwrap();
    let matches_path = dir.path().join("matches.json");
    let raw = vec![
        raw_record("2023-01-21", "Jiri Prochazka", "Glover Teixeira", "win_a", "Light Heavyweight"),
        raw_record("2023-07-29", "Alex Pereira", "Jiri Prochazka", "win_a", "Light Heavyweight"),
        raw_record("2023-11-11", "Alex Pereira", "Jamahal Hill", "nc", "Light Heavyweight"),
    ];
    std::fs::write(&matches_path, serde_json::to_string(&raw).unwrap()).unwrap();

    let mut config = AppConfig::default();
    config.storage.matches_path = matches_path.clone();
    config.storage.snapshot_path = dir.path().join("ratings.json");

    let service = RatingService::from_config(&config).unwrap();
    let summary = service.run_replay().unwrap();
    assert_eq!(summary.matches_processed, 2);
    assert_eq!(summary.matches_skipped, 1);
    assert_eq!(summary.competitors_rated, 3);
    assert_eq!(summary.tracks_produced, 2);

    // A fresh service reading the same file sees the stored result
    let reader = RatingService::from_config(&config).unwrap();
    let snapshot = reader.snapshot().unwrap();
    let queries = RatingQueries::new(&snapshot, reader.universal_track());

    let board = queries.leaderboard("Light Heavyweight", 1, 10);
    assert_eq!(board[0].competitor, "Alex Pereira");
    assert!(queries.profile("Jamahal Hill").is_none());

    let prediction = queries
        .predict("Alex Pereira", "Jiri Prochazka", "unified")
        .unwrap();
    assert!(prediction.competitor_a.win_probability > 0.5);

    let records = JsonFileMatchSource::new(&matches_path).load().unwrap();
    assert_eq!(records.len(), 3);
}

#[test]
fn test_malformed_json_record_aborts_load() {
    let dir = tempfile::TempDir::new().unwrap();
    let matches_path = dir.path().join("matches.json");
    let raw = vec![
        raw_record("2023-01-21", "A", "B", "win_a", "Flyweight"),
        raw_record("not-a-date", "C", "D", "win_a", "Flyweight"),
    ];
    std::fs::write(&matches_path, serde_json::to_string(&raw).unwrap()).unwrap();

    let err = JsonFileMatchSource::new(&matches_path).load().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RatingError>(),
        Some(RatingError::InvalidMatchRecord { index: 1, .. })
    ));
}
