//! CSV出力
//!
//! Excelで文字化けしないようUTF-8(BOM付き)で書き出す。

use crate::error::Result;
use room_match_common::MatchResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 列順: 室名, マッチした部屋名, 類似度, 参照ページID, 対象ページID, ステータス
pub const HEADERS: [&str; 6] = [
    "室名",
    "マッチした部屋名",
    "類似度",
    "参照ページID",
    "対象ページID",
    "ステータス",
];

pub fn write_csv<'a>(
    results: impl IntoIterator<Item = &'a MatchResult>,
    output_path: &Path,
) -> Result<usize> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(output_path)?;
    file.write_all(UTF8_BOM)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(file);

    writer.write_record(HEADERS)?;

    let mut rows = 0;
    for result in results {
        let score = result.score.to_string();
        writer.write_record([
            result.query_name.as_str(),
            result.matched_name.as_str(),
            score.as_str(),
            result.matched_id.as_str(),
            result.query_id.as_str(),
            result.status.label(),
        ])?;
        rows += 1;
    }

    writer.flush()?;
    Ok(rows)
}
