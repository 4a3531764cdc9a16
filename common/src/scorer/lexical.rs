//! 字句スコア（編集距離ベース）
//!
//! 一般的なあいまい一致の重み付きレシオ（WRatio）を実装する。
//! - 大文字小文字・記号・空白の違いは無視
//! - トークンの並び順の違いは無視
//! - 長さが大きく違う場合は部分一致を減点して採用

use super::{Scored, Scorer};
use crate::error::Result;
use crate::normalizer::{process_for_comparison, tokens};
use std::collections::BTreeSet;

/// トークン系レシオの減点係数
const UNBASE_SCALE: f64 = 0.95;
/// 部分一致の減点係数
const PARTIAL_SCALE: f64 = 0.90;
/// 長さ比が極端な場合の部分一致の減点係数
const LONG_PARTIAL_SCALE: f64 = 0.60;

/// 編集距離ベースのスコアラー
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalScorer;

impl LexicalScorer {
    pub fn new() -> Self {
        Self
    }
}

impl Scorer for LexicalScorer {
    fn name(&self) -> &'static str {
        "lexical"
    }

    fn score_all(&self, query: &str, pool: &[String]) -> Result<Vec<Scored>> {
        let processed_query = process_for_comparison(query);

        Ok(pool
            .iter()
            .map(|candidate| {
                let processed = process_for_comparison(candidate);
                Scored::new(candidate.clone(), weighted_ratio_processed(&processed_query, &processed))
            })
            .collect())
    }
}

/// 重み付きレシオ（比較用整形込み）
pub fn weighted_ratio(a: &str, b: &str) -> u8 {
    weighted_ratio_processed(&process_for_comparison(a), &process_for_comparison(b))
}

fn weighted_ratio_processed(p1: &str, p2: &str) -> u8 {
    if p1.is_empty() || p2.is_empty() {
        return 0;
    }

    let base = ratio(p1, p2) as f64;

    let len1 = p1.chars().count();
    let len2 = p2.chars().count();
    let len_ratio = len1.max(len2) as f64 / len1.min(len2) as f64;

    if len_ratio < 1.5 {
        let tsor = token_sort_ratio(p1, p2) as f64 * UNBASE_SCALE;
        let tser = token_set_ratio(p1, p2) as f64 * UNBASE_SCALE;
        return round_score(base.max(tsor).max(tser));
    }

    let partial_scale = if len_ratio > 8.0 {
        LONG_PARTIAL_SCALE
    } else {
        PARTIAL_SCALE
    };

    let partial = partial_ratio(p1, p2) as f64 * partial_scale;
    let ptsor = partial_token_sort_ratio(p1, p2) as f64 * UNBASE_SCALE * partial_scale;
    let ptser = partial_token_set_ratio(p1, p2) as f64 * UNBASE_SCALE * partial_scale;

    round_score(base.max(partial).max(ptsor).max(ptser))
}

/// 単純レシオ: 2·LCS / (|a|+|b|) を0-100に
pub fn ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    round_score(100.0 * similarity(&a, &b))
}

/// 部分レシオ: 短い方を長い方の同じ長さの窓に当てた最大値
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (shorter, longer) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };

    let mut best = 0.0_f64;
    for window in longer.windows(shorter.len()) {
        let r = similarity(shorter, window);
        if r > 0.995 {
            return 100;
        }
        if r > best {
            best = r;
        }
    }

    round_score(100.0 * best)
}

/// トークンを並べ替えてから比較
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

pub fn partial_token_sort_ratio(a: &str, b: &str) -> u8 {
    partial_ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// 共通トークンと差分トークンに分けて比較
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    token_set_with(a, b, ratio)
}

pub fn partial_token_set_ratio(a: &str, b: &str) -> u8 {
    token_set_with(a, b, partial_ratio)
}

fn token_set_with(a: &str, b: &str, ratio_fn: fn(&str, &str) -> u8) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let tokens1: BTreeSet<&str> = tokens(a).into_iter().collect();
    let tokens2: BTreeSet<&str> = tokens(b).into_iter().collect();

    let intersection: Vec<&str> = tokens1.intersection(&tokens2).copied().collect();
    let diff1to2: Vec<&str> = tokens1.difference(&tokens2).copied().collect();
    let diff2to1: Vec<&str> = tokens2.difference(&tokens1).copied().collect();

    let sorted_sect = intersection.join(" ");
    let combined_1to2 = format!("{} {}", sorted_sect, diff1to2.join(" ")).trim().to_string();
    let combined_2to1 = format!("{} {}", sorted_sect, diff2to1.join(" ")).trim().to_string();

    [
        ratio_fn(&sorted_sect, &combined_1to2),
        ratio_fn(&sorted_sect, &combined_2to1),
        ratio_fn(&combined_1to2, &combined_2to1),
    ]
    .into_iter()
    .max()
    .unwrap_or(0)
}

fn sorted_tokens(s: &str) -> String {
    let mut t = tokens(s);
    t.sort_unstable();
    t.join(" ")
}

/// 0.0-1.0 の類似度（挿入・削除のみの編集距離に相当）
fn similarity(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 0.0;
    }
    2.0 * lcs_length(a, b) as f64 / total as f64
}

/// 最長共通部分列の長さ
fn lcs_length(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// 偶数丸めで0-100に収める
fn round_score(value: f64) -> u8 {
    value.round_ties_even().clamp(0.0, 100.0) as u8
}
