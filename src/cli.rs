use crate::config::Config;
use clap::{Args, Parser, Subcommand};
use room_match_common::{DuplicatePolicy, MatchOptions, Strategy};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "notion-room-match")]
#[command(about = "Notion室名自動マッチングツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 対象DBの室名を参照元DBと照合し、リレーションを設定
    Run {
        /// 対象データベースのURLまたはID
        #[arg(required = true)]
        database: String,

        #[command(flatten)]
        matching: MatchArgs,

        /// 出力CSVファイル
        #[arg(short, long, default_value = "matching_results.csv")]
        output: PathBuf,

        /// CSVの出力形式 (combined/split)
        #[arg(short, long, default_value = "combined")]
        layout: ExportLayout,

        /// ドライラン（CSVのみ出力し、リレーションは書き込まない）
        #[arg(long)]
        dry_run: bool,

        /// 書き込み前の確認を省略
        #[arg(short, long)]
        yes: bool,

        /// 参照元データベースのURLまたはID（省略時は設定値）
        #[arg(long)]
        reference_db: Option<String>,
    },

    /// ローカルのJSONファイル同士で照合（Notionへは書き込まない）
    Compare {
        /// 照合する室名のJSON（[{"name": ..., "id": ...}]）
        #[arg(required = true)]
        queries: PathBuf,

        /// 候補となる室名のJSON
        #[arg(required = true)]
        pool: PathBuf,

        #[command(flatten)]
        matching: MatchArgs,

        /// 出力CSVファイル
        #[arg(short, long, default_value = "matching_results.csv")]
        output: PathBuf,

        /// CSVの出力形式 (combined/split)
        #[arg(short, long, default_value = "combined")]
        layout: ExportLayout,
    },

    /// 設定を表示/編集
    Config {
        /// Notionトークンを設定
        #[arg(long)]
        set_token: Option<String>,

        /// 参照元データベースを設定（URLまたはID）
        #[arg(long)]
        set_reference_db: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// 照合の共通オプション（省略時は設定値）
#[derive(Args, Clone, Debug, Default)]
pub struct MatchArgs {
    /// 自動マッチのしきい値 (0-100)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub threshold: Option<u8>,

    /// スコア方式 (lexical/semantic)
    #[arg(short, long)]
    pub strategy: Option<Strategy>,

    /// 参照元の室名が重複した場合の扱い (last/first/reject)
    #[arg(long)]
    pub duplicate_policy: Option<DuplicatePolicy>,

    /// 並列化せず1件ずつ照合
    #[arg(long)]
    pub sequential: bool,
}

impl MatchArgs {
    pub fn strategy(&self, config: &Config) -> Strategy {
        self.strategy.unwrap_or(config.strategy)
    }

    pub fn options(&self, config: &Config) -> MatchOptions {
        MatchOptions {
            threshold: self.threshold.unwrap_or(config.threshold),
            duplicate_policy: self.duplicate_policy.unwrap_or(config.duplicate_policy),
            parallel: !self.sequential,
        }
    }
}

/// CSVの出力形式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportLayout {
    /// 1ファイル（マッチ→保留の順、ステータス列付き）
    #[default]
    Combined,
    /// マッチ/保留を別ファイルに分割
    Split,
}

impl std::str::FromStr for ExportLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "combined" | "single" => Ok(ExportLayout::Combined),
            "split" => Ok(ExportLayout::Split),
            _ => Err(format!("Unknown layout: {}. Use combined or split", s)),
        }
    }
}

impl std::fmt::Display for ExportLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportLayout::Combined => write!(f, "combined"),
            ExportLayout::Split => write!(f, "split"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_export_layout_from_str() {
        assert_eq!("combined".parse::<ExportLayout>(), Ok(ExportLayout::Combined));
        assert_eq!("SPLIT".parse::<ExportLayout>(), Ok(ExportLayout::Split));
        assert!("xlsx".parse::<ExportLayout>().is_err());
    }

    #[test]
    fn test_parse_run_with_flags() {
        let cli = Cli::try_parse_from([
            "notion-room-match",
            "run",
            "https://www.notion.so/ws/Rooms-0123456789abcdef0123456789abcdef",
            "--threshold",
            "85",
            "--strategy",
            "semantic",
            "--layout",
            "split",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Commands::Run { matching, layout, dry_run, yes, output, .. } => {
                assert_eq!(matching.threshold, Some(85));
                assert_eq!(matching.strategy, Some(Strategy::Semantic));
                assert_eq!(layout, ExportLayout::Split);
                assert!(dry_run);
                assert!(!yes);
                assert_eq!(output, PathBuf::from("matching_results.csv"));
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_threshold_out_of_range_is_rejected() {
        let result = Cli::try_parse_from(["notion-room-match", "run", "db", "--threshold", "101"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_match_args_fall_back_to_config() {
        let config = Config {
            threshold: 60,
            duplicate_policy: DuplicatePolicy::First,
            ..Default::default()
        };
        let args = MatchArgs {
            sequential: true,
            ..Default::default()
        };

        let options = args.options(&config);
        assert_eq!(options.threshold, 60);
        assert_eq!(options.duplicate_policy, DuplicatePolicy::First);
        assert!(!options.parallel);
        assert_eq!(args.strategy(&config), Strategy::Lexical);
    }
}
