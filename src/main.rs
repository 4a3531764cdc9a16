use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use notion_room_match::{cli, config, export, notion, relation, scoring, source};
use cli::{Cli, Commands, ExportLayout, MatchArgs};
use config::Config;
use notion::{extract_database_id, fetch_labeled_items, NotionClient};
use room_match_common::{LabeledItem, MatchReport, Reconciler};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load()?;

    match cli.command {
        Commands::Run {
            database,
            matching,
            output,
            layout,
            dry_run,
            yes,
            reference_db,
        } => {
            println!("🏠 notion-room-match - 室名マッチング\n");

            // 1. DB取得
            println!("[1/5] データベースを取得中...");
            let database_id = extract_database_id(&database)?;
            println!("✅ DB ID 取得: {}", database_id);

            let reference_id = match reference_db {
                Some(reference) => extract_database_id(&reference)?,
                None => config.reference_database_id.clone(),
            };

            let client = NotionClient::new(config.get_token()?, &config)?;

            let spinner = spinner("対象DBを取得中...")?;
            let queries =
                fetch_labeled_items(&client, &database_id, &config.source_property_key).await?;
            spinner.set_message("参照元DBを取得中...");
            let pool =
                fetch_labeled_items(&client, &reference_id, &config.pool_property_key).await?;
            spinner.finish_and_clear();
            println!("✔ 対象 {}件 / 参照元 {}件\n", queries.len(), pool.len());

            // 2-3. スコアラー準備と照合
            let report = run_matching(&matching, &config, &queries, &pool, 2, 5).await?;

            // 4. CSV出力
            println!("[4/5] CSVを出力中...");
            write_report(&report, layout, &output)?;

            // 5. リレーション設定
            println!("[5/5] リレーションを設定中...");
            if dry_run {
                println!("- ドライランのため書き込みをスキップ\n");
            } else if report.accepted.is_empty() {
                println!("- マッチした室名がないため書き込みなし\n");
            } else if yes || confirm_write(report.accepted.len())? {
                let progress = ProgressBar::new(report.accepted.len() as u64);
                progress.set_style(ProgressStyle::with_template(
                    "{bar:40.cyan/blue} {pos}/{len} {msg}",
                )?);

                let summary = relation::write_relations(&client, &report, &progress).await;
                progress.finish_and_clear();

                println!("✔ {}/{}件のリレーションを設定", summary.written, summary.attempted());
                for failure in &summary.failures {
                    println!("  ❌ {}（{}）: {}", failure.query_name, failure.page_id, failure.message);
                }
                println!();
            } else {
                println!("- 書き込みを中止しました\n");
            }

            print_conclusion(&report, layout, &output);
        }

        Commands::Compare {
            queries,
            pool,
            matching,
            output,
            layout,
        } => {
            println!("📋 notion-room-match - ローカル照合\n");

            println!("[1/4] JSONを読み込み中...");
            let query_items = source::load_labeled_items(&queries)?;
            let pool_items = source::load_labeled_items(&pool)?;
            println!("✔ 対象 {}件 / 参照元 {}件\n", query_items.len(), pool_items.len());

            let report = run_matching(&matching, &config, &query_items, &pool_items, 2, 4).await?;

            println!("[4/4] CSVを出力中...");
            write_report(&report, layout, &output)?;

            print_conclusion(&report, layout, &output);
        }

        Commands::Config {
            set_token,
            set_reference_db,
            show,
        } => {
            let mut config = config;

            if let Some(token) = set_token {
                config.set_token(token)?;
                println!("✔ Notionトークンを設定しました");
            }

            if let Some(reference) = set_reference_db {
                let database_id = extract_database_id(&reference)?;
                config.set_reference_database(database_id)?;
                println!("✔ 参照元DBを設定しました");
            }

            if show {
                println!("設定:");
                println!("  参照元DB: {}", config.reference_database_id);
                println!("  対象DBの室名プロパティ: {}", config.source_property_key);
                println!("  参照元DBの室名プロパティ: {}", config.pool_property_key);
                println!("  リレーションプロパティ: {}", config.relation_property);
                println!("  しきい値: {}", config.threshold);
                println!("  スコア方式: {}", config.strategy);
                println!("  重複時の扱い: {}", config.duplicate_policy);
                println!("  埋め込みモデル: {} ({})", config.embedding.model, config.embedding.endpoint);
                println!(
                    "  Notionトークン: {}",
                    if config.get_token().is_ok() { "設定済み" } else { "未設定" }
                );
                println!("  設定ファイル: {}", Config::config_path()?.display());
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "warn,notion_room_match=debug,room_match_common=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn spinner(message: &str) -> anyhow::Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

/// スコアラーを準備して照合し、結果を1行ずつ表示する
async fn run_matching(
    matching: &MatchArgs,
    config: &Config,
    queries: &[LabeledItem],
    pool: &[LabeledItem],
    step: usize,
    total_steps: usize,
) -> anyhow::Result<MatchReport> {
    let strategy = matching.strategy(config);
    println!("[{}/{}] スコアラーを準備中... ({})", step, total_steps, strategy);
    let scorer = scoring::build_scorer(strategy, config, pool, queries).await?;
    println!("✔ 準備完了\n");

    let options = matching.options(config);
    println!(
        "[{}/{}] 照合中... (しきい値: {})",
        step + 1,
        total_steps,
        options.threshold
    );
    let reconciler = Reconciler::new(scorer.as_ref(), options)?;
    let report = reconciler.reconcile(queries, pool)?;

    for result in report.in_query_order(queries) {
        let mark = if result.is_accepted() { "✔️" } else { "❌" };
        println!(
            "{} {} → {}（スコア: {}）",
            mark, result.query_name, result.matched_name, result.score
        );
    }

    let summary = report.summary();
    println!(
        "✔ 照合完了: {}件（マッチ {} / 保留 {}）\n",
        summary.total, summary.accepted, summary.pending
    );

    Ok(report)
}

fn write_report(report: &MatchReport, layout: ExportLayout, output: &Path) -> anyhow::Result<()> {
    let paths = export::export_report(report, layout, output)?;
    for path in &paths {
        println!("✔ CSV保存: {}", path.display());
    }
    println!();
    Ok(())
}

fn confirm_write(count: usize) -> anyhow::Result<bool> {
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(format!("{}件のリレーションを書き込みますか？", count))
        .default(false)
        .interact()?;
    Ok(confirmed)
}

fn print_conclusion(report: &MatchReport, layout: ExportLayout, output: &Path) {
    if report.summary().all_accepted() {
        println!("🎉 すべての室名が自動マッチされました！");
        return;
    }

    let review_path: PathBuf = match layout {
        ExportLayout::Combined => output.to_path_buf(),
        ExportLayout::Split => export::output_paths_for_split(output).1,
    };
    println!(
        "⚠️ 類似度が低く保留された室名あり（{} を確認）",
        review_path.display()
    );
}
