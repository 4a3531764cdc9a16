//! エラー型定義

use thiserror::Error;

/// マッチング処理のエラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("照合先の候補がありません（参照DBの室名が0件）")]
    EmptyPool,

    #[error("候補「{0}」のページIDが見つかりません（候補リストとID索引が不整合）")]
    UnknownCandidate(String),

    #[error("参照DBに同じ室名が複数あります: {0}")]
    DuplicateLabel(String),

    #[error("しきい値は0〜100で指定してください: {0}")]
    InvalidThreshold(u16),

    #[error("埋め込みエラー: {0}")]
    Embedding(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, MatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unknown_candidate() {
        let error = MatchError::UnknownCandidate("会議室A".to_string());
        let display = format!("{}", error);
        assert!(display.contains("会議室A"));
    }

    #[test]
    fn test_error_display_threshold() {
        let error = MatchError::InvalidThreshold(150);
        assert_eq!(format!("{}", error), "しきい値は0〜100で指定してください: 150");
    }

    #[test]
    fn test_error_debug() {
        let error = MatchError::Embedding("テスト".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("Embedding"));
        assert!(debug.contains("テスト"));
    }
}
