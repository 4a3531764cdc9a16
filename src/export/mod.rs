pub mod csv_file;

use crate::cli::ExportLayout;
use crate::error::Result;
use room_match_common::MatchReport;
use std::path::{Path, PathBuf};

/// 分割出力時のファイル名（`<stem>_matched.csv`, `<stem>_pending.csv`）
pub fn output_paths_for_split(output: &Path) -> (PathBuf, PathBuf) {
    let parent = output.parent().unwrap_or_else(|| Path::new("."));
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("matching_results");
    let matched_path = parent.join(format!("{}_matched.csv", stem));
    let pending_path = parent.join(format!("{}_pending.csv", stem));
    (matched_path, pending_path)
}

/// 照合結果をCSVに書き出し、出力したファイルの一覧を返す
pub fn export_report(
    report: &MatchReport,
    layout: ExportLayout,
    output: &Path,
) -> Result<Vec<PathBuf>> {
    match layout {
        ExportLayout::Combined => {
            let rows = csv_file::write_csv(report.results(), output)?;
            tracing::debug!(path = %output.display(), rows, "CSV written");
            Ok(vec![output.to_path_buf()])
        }
        ExportLayout::Split => {
            let (matched_path, pending_path) = output_paths_for_split(output);
            csv_file::write_csv(&report.accepted, &matched_path)?;
            csv_file::write_csv(&report.pending, &pending_path)?;
            Ok(vec![matched_path, pending_path])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_paths_for_split() {
        let (matched, pending) = output_paths_for_split(Path::new("out/results.csv"));
        assert_eq!(matched, PathBuf::from("out/results_matched.csv"));
        assert_eq!(pending, PathBuf::from("out/results_pending.csv"));
    }
}
