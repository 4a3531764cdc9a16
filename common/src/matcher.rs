//! 室名1件の照合

use crate::error::{MatchError, Result};
use crate::scorer::Scorer;
use crate::types::{LabeledItem, MatchResult, MatchStatus};
use std::collections::HashMap;

/// 室名1件をプールと照合し、マッチ/保留を判定する
///
/// # Arguments
/// * `scorer` - スコア方式
/// * `query` - 照合する室名
/// * `pool_names` - 参照DBの室名（DB順）
/// * `pool_ids` - 室名→ページIDの索引
/// * `threshold` - この値以上ならマッチ
pub fn classify(
    scorer: &dyn Scorer,
    query: &LabeledItem,
    pool_names: &[String],
    pool_ids: &HashMap<String, String>,
    threshold: u8,
) -> Result<MatchResult> {
    let best = scorer.best_of(&query.name, pool_names)?;

    let matched_id = pool_ids
        .get(&best.candidate)
        .cloned()
        .ok_or_else(|| MatchError::UnknownCandidate(best.candidate.clone()))?;

    let status = MatchStatus::from_score(best.score, threshold);

    tracing::debug!(
        query = %query.name,
        matched = %best.candidate,
        score = best.score,
        status = %status,
        "Classified"
    );

    Ok(MatchResult {
        query_name: query.name.clone(),
        matched_name: best.candidate,
        score: best.score,
        query_id: query.id.clone(),
        matched_id,
        status,
    })
}
