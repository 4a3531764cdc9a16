//! ローカルJSONの室名一覧
//!
//! `compare` 用。形式は `[{"name": "会議室", "id": "..."}]`。

use crate::error::{Result, RoomMatchError};
use room_match_common::LabeledItem;
use std::path::Path;

/// JSONファイルから室名一覧を読み込む（空の室名は除外）
pub fn load_labeled_items(path: &Path) -> Result<Vec<LabeledItem>> {
    if !path.exists() {
        return Err(RoomMatchError::FileNotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    let items: Vec<LabeledItem> = serde_json::from_str(&content)?;
    let total = items.len();

    let items: Vec<LabeledItem> = items
        .into_iter()
        .filter(|item| !item.name.trim().is_empty())
        .collect();

    if items.len() < total {
        tracing::warn!(
            path = %path.display(),
            skipped = total - items.len(),
            "Entries with an empty name were skipped"
        );
    }

    Ok(items)
}
