//! 照合の統合テスト
//!
//! ローカルJSON → 照合 の流れで、しきい値・順序・決定性を検証

use async_trait::async_trait;
use notion_room_match::source;
use room_match_common::{
    DuplicatePolicy, EmbeddingProvider, LabeledItem, LexicalScorer, MatchError, MatchOptions,
    MatchStatus, Reconciler, SemanticScorer,
};
use std::path::Path;
use tempfile::tempdir;

fn items(pairs: &[(&str, &str)]) -> Vec<LabeledItem> {
    pairs.iter().map(|(n, id)| LabeledItem::new(*n, *id)).collect()
}

fn pool() -> Vec<LabeledItem> {
    items(&[
        ("会議室", "ref-1"),
        ("倉庫", "ref-2"),
        ("Room 101", "ref-3"),
        ("応接室", "ref-4"),
    ])
}

fn queries() -> Vec<LabeledItem> {
    items(&[
        ("倉庫", "q-1"),
        ("ROOM 101", "q-2"),
        ("XYZ", "q-3"),
        ("会議室", "q-4"),
        ("第一会議室", "q-5"),
    ])
}

fn options(threshold: u8) -> MatchOptions {
    MatchOptions {
        threshold,
        ..Default::default()
    }
}

fn write_json(dir: &Path, name: &str, items: &[LabeledItem]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string(items).unwrap()).unwrap();
    path
}

#[test]
fn test_exact_matches_are_accepted_with_reference_ids() {
    let scorer = LexicalScorer::new();
    let reconciler = Reconciler::new(&scorer, options(70)).unwrap();
    let report = reconciler.reconcile(&queries(), &pool()).unwrap();

    let warehouse = report
        .accepted
        .iter()
        .find(|r| r.query_name == "倉庫")
        .expect("倉庫がマッチしていない");
    assert_eq!(warehouse.matched_name, "倉庫");
    assert_eq!(warehouse.matched_id, "ref-2");
    assert_eq!(warehouse.query_id, "q-1");
    assert_eq!(warehouse.score, 100);

    // 大文字小文字は区別しない
    let room = report.accepted.iter().find(|r| r.query_name == "ROOM 101").unwrap();
    assert_eq!(room.matched_name, "Room 101");
    assert_eq!(room.score, 100);
}

#[test]
fn test_unrelated_name_is_pending() {
    let scorer = LexicalScorer::new();
    let reconciler = Reconciler::new(&scorer, options(70)).unwrap();
    let report = reconciler.reconcile(&queries(), &pool()).unwrap();

    let unrelated = report.pending.iter().find(|r| r.query_name == "XYZ").unwrap();
    assert_eq!(unrelated.status, MatchStatus::Pending);
    assert!(unrelated.score < 70);
    // 保留でも最良候補は記録される
    assert!(!unrelated.matched_name.is_empty());
}

#[test]
fn test_partition_is_complete_and_ordered() {
    let scorer = LexicalScorer::new();
    let reconciler = Reconciler::new(&scorer, options(70)).unwrap();
    let queries = queries();
    let report = reconciler.reconcile(&queries, &pool()).unwrap();

    assert_eq!(report.len(), queries.len());

    let position = |name: &str| queries.iter().position(|q| q.name == name).unwrap();
    for list in [&report.accepted, &report.pending] {
        let positions: Vec<usize> = list.iter().map(|r| position(&r.query_name)).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "入力順が保たれていない");
    }

    assert!(report.accepted.iter().all(|r| r.score >= 70));
    assert!(report.pending.iter().all(|r| r.score < 70));
}

#[test]
fn test_raising_threshold_never_accepts_more() {
    let scorer = LexicalScorer::new();
    let mut previous: Option<Vec<String>> = None;

    for threshold in [0u8, 30, 50, 70, 90, 100] {
        let reconciler = Reconciler::new(&scorer, options(threshold)).unwrap();
        let report = reconciler.reconcile(&queries(), &pool()).unwrap();
        let accepted: Vec<String> = report.accepted.iter().map(|r| r.query_id.clone()).collect();

        if let Some(prev) = &previous {
            assert!(
                accepted.iter().all(|id| prev.contains(id)),
                "しきい値 {} で新たにマッチした室名がある",
                threshold
            );
        }
        previous = Some(accepted);
    }
}

#[test]
fn test_threshold_bounds() {
    let scorer = LexicalScorer::new();

    let all = Reconciler::new(&scorer, options(0))
        .unwrap()
        .reconcile(&queries(), &pool())
        .unwrap();
    assert!(all.pending.is_empty());

    let exact = Reconciler::new(&scorer, options(100))
        .unwrap()
        .reconcile(&queries(), &pool())
        .unwrap();
    assert!(exact.accepted.iter().all(|r| r.score == 100));
}

#[test]
fn test_rerun_and_parallel_are_deterministic() {
    let scorer = LexicalScorer::new();
    let parallel = Reconciler::new(&scorer, options(70)).unwrap();
    let sequential = Reconciler::new(
        &scorer,
        MatchOptions {
            threshold: 70,
            parallel: false,
            ..Default::default()
        },
    )
    .unwrap();

    let first = parallel.reconcile(&queries(), &pool()).unwrap();
    let second = parallel.reconcile(&queries(), &pool()).unwrap();
    let third = sequential.reconcile(&queries(), &pool()).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, third);
}

#[test]
fn test_tie_goes_to_first_candidate() {
    let scorer = LexicalScorer::new();
    let reconciler = Reconciler::new(&scorer, options(0)).unwrap();
    let pool = items(&[("会議室B", "b"), ("会議室C", "c")]);

    let report = reconciler
        .reconcile(&items(&[("会議室A", "q")]), &pool)
        .unwrap();
    assert_eq!(report.accepted[0].matched_name, "会議室B");
    assert_eq!(report.accepted[0].matched_id, "b");
}

#[test]
fn test_duplicate_pool_names_follow_policy() {
    let scorer = LexicalScorer::new();
    let pool = items(&[("倉庫", "old"), ("倉庫", "new")]);
    let queries = items(&[("倉庫", "q")]);

    let last = Reconciler::new(&scorer, options(70))
        .unwrap()
        .reconcile(&queries, &pool)
        .unwrap();
    assert_eq!(last.accepted[0].matched_id, "new");

    let first = Reconciler::new(
        &scorer,
        MatchOptions {
            duplicate_policy: DuplicatePolicy::First,
            ..Default::default()
        },
    )
    .unwrap()
    .reconcile(&queries, &pool)
    .unwrap();
    assert_eq!(first.accepted[0].matched_id, "old");

    let rejected = Reconciler::new(
        &scorer,
        MatchOptions {
            duplicate_policy: DuplicatePolicy::Reject,
            ..Default::default()
        },
    )
    .unwrap()
    .reconcile(&queries, &pool);
    assert_eq!(rejected, Err(MatchError::DuplicateLabel("倉庫".into())));
}

#[test]
fn test_empty_inputs() {
    let scorer = LexicalScorer::new();
    let reconciler = Reconciler::new(&scorer, options(70)).unwrap();

    let report = reconciler.reconcile(&[], &[]).unwrap();
    assert!(report.is_empty());
    assert!(report.summary().all_accepted());

    let result = reconciler.reconcile(&queries(), &[]);
    assert_eq!(result, Err(MatchError::EmptyPool));
}

#[test]
fn test_reconcile_from_local_json() {
    let dir = tempdir().expect("Failed to create temp dir");
    let queries_path = write_json(dir.path(), "queries.json", &queries());
    let pool_path = write_json(dir.path(), "pool.json", &pool());

    let queries = source::load_labeled_items(&queries_path).unwrap();
    let pool = source::load_labeled_items(&pool_path).unwrap();

    let scorer = LexicalScorer::new();
    let report = Reconciler::new(&scorer, options(70))
        .unwrap()
        .reconcile(&queries, &pool)
        .unwrap();

    let summary = report.summary();
    assert_eq!(summary.total, 5);
    assert_eq!(summary.accepted + summary.pending, 5);
    assert!(!summary.all_accepted());
}

/// 文字の出現数をベクトルにする埋め込み
struct CharCountProvider;

#[async_trait]
impl EmbeddingProvider for CharCountProvider {
    async fn embed(&self, texts: &[String]) -> room_match_common::Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let mut v = vec![0.0_f32; 64];
                for c in t.chars() {
                    v[(c as usize) % 64] += 1.0;
                }
                v
            })
            .collect())
    }
}

#[tokio::test]
async fn test_semantic_scorer_through_reconciler() {
    let pool = items(&[("Room 101", "ref-1"), ("Room 102", "ref-2")]);
    let queries = items(&[("Room 101", "q-1"), ("Zzyzx-9", "q-2")]);

    let pool_names: Vec<String> = pool.iter().map(|i| i.name.clone()).collect();
    let query_names: Vec<String> = queries.iter().map(|i| i.name.clone()).collect();
    let scorer = SemanticScorer::prepare(&CharCountProvider, &pool_names, &query_names)
        .await
        .unwrap();

    let report = Reconciler::new(&scorer, options(70))
        .unwrap()
        .reconcile(&queries, &pool)
        .unwrap();

    assert_eq!(report.accepted.len(), 1);
    let exact = &report.accepted[0];
    assert_eq!(exact.query_id, "q-1");
    assert_eq!(exact.matched_name, "Room 101");
    assert_eq!(exact.matched_id, "ref-1");
    assert!(exact.score >= 99);

    assert_eq!(report.pending.len(), 1);
    let unrelated = &report.pending[0];
    assert_eq!(unrelated.query_id, "q-2");
    assert_eq!(unrelated.status, MatchStatus::Pending);
    assert!(unrelated.score < 70);
    assert!(pool_names.contains(&unrelated.matched_name));
}
