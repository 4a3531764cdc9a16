//! ページ・URLからの値の取り出し

use super::types::Page;
use crate::error::{RoomMatchError, Result};
use regex::Regex;
use room_match_common::normalizer::normalize_label;
use room_match_common::LabeledItem;

/// タイトルプロパティから室名を取り出す
///
/// タイトルが複数の断片に分かれている場合は連結する。
/// プロパティが無い・空の場合は `None`。
pub fn extract_labeled_item(page: &Page, property_key: &str) -> Option<LabeledItem> {
    let fragments = page.properties.get(property_key)?.title.as_ref()?;

    let name: String = fragments.iter().map(|f| f.as_str()).collect();
    if name.trim().is_empty() {
        return None;
    }

    Some(LabeledItem::new(normalize_label(&name), page.id.clone()))
}

/// URLまたはIDからデータベースIDを抽出する
///
/// - `https://www.notion.so/ws/02c8dffa...?v=...`
/// - `https://www.notion.so/Rooms-02c8dffa...`
/// - `02c8dffa-2f6e-45c1-898c-36b04503bd23`
///
/// いずれも小文字・ハイフンなしの32桁に揃える。
pub fn extract_database_id(input: &str) -> Result<String> {
    lazy_static::lazy_static! {
        // 末尾の32桁の16進
        static ref COMPACT_ID_RE: Regex = Regex::new(r"(?i)([0-9a-f]{32})$").unwrap();
        // ハイフン付きUUID
        static ref DASHED_ID_RE: Regex = Regex::new(
            r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$"
        ).unwrap();
    }

    let without_query = input
        .trim()
        .split(['?', '#'])
        .next()
        .unwrap_or("")
        .trim_end_matches('/');
    let segment = without_query.rsplit('/').next().unwrap_or("");

    if DASHED_ID_RE.is_match(segment) {
        return Ok(segment.replace('-', "").to_lowercase());
    }

    COMPACT_ID_RE
        .captures(segment)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_lowercase())
        .ok_or_else(|| RoomMatchError::InvalidDatabaseUrl(input.to_string()))
}
