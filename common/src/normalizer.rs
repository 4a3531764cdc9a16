//! 室名の正規化
//!
//! 保存・出力する室名は取得したまま使う（`normalize_label`）。
//! 字句スコアの比較時にだけ `process_for_comparison` で整形する。

/// 室名を正規化する
///
/// 現状は無変換。表記揺れ対策を入れる場合はここに追加する。
pub fn normalize_label(name: &str) -> String {
    name.to_string()
}

/// 比較用に文字列を整形する
///
/// - 英数字・`_` 以外の文字を半角スペースに置換（記号、全角スペース等）
/// - 小文字化
/// - 前後の空白を除去
///
/// 日本語の文字は英数字扱いなのでそのまま残る。
pub fn process_for_comparison(s: &str) -> String {
    let replaced: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect();

    replaced.to_lowercase().trim().to_string()
}

/// 空白区切りのトークンに分割
pub fn tokens(s: &str) -> Vec<&str> {
    s.split_whitespace().collect()
}
