//! RPVM 实验运行器
//!
//! 入口：初始化日志、加载配置与数据集，按顺序运行 RPVM，保存中间数据并输出评估结果。

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rpvm::{
    config::load_config,
    dataset::{self, QaItem},
    eval::EvalSummary,
    observability,
    pipeline::{PipelineEvent, ResultCollector, RpvmPipeline},
};
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(name = "rpvm", version, about = "Reflective Plan-Verify Memory for multi-hop QA")]
struct Cli {
    /// 额外的配置文件（覆盖 config/default.toml）
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSONL 数据集，每行含 question / golden_answers
    #[arg(long, conflicts_with = "question")]
    dataset: Option<PathBuf>,
    /// 直接给出的问题，可重复
    #[arg(long)]
    question: Vec<String>,
    /// 只处理前 N 条样本
    #[arg(long)]
    num_samples: Option<usize>,
    /// 输出目录（覆盖配置中的 app.save_dir）
    #[arg(long)]
    save_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();
    let cli = Cli::parse();

    let cfg = load_config(cli.config.clone()).context("Failed to load config")?;

    let mut items: Vec<QaItem> = match &cli.dataset {
        Some(path) => dataset::load_jsonl(path, cli.num_samples)?,
        None => cli.question.iter().map(|q| QaItem::new(q.as_str())).collect(),
    };
    if let Some(n) = cli.num_samples {
        items.truncate(n);
    }
    if items.is_empty() {
        anyhow::bail!("no questions given: pass --dataset <file.jsonl> or --question <text>");
    }
    tracing::info!("Dataset size: {}", items.len());

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<PipelineEvent>();
    let progress = tokio::spawn(async move {
        while let Some(ev) = event_rx.recv().await {
            if let Ok(json) = serde_json::to_string(&ev) {
                tracing::debug!(target: "rpvm::events", "{}", json);
            }
        }
    });

    let pipeline = RpvmPipeline::from_config(&cfg)
        .context("Failed to build RPVM pipeline")?
        .with_event_tx(event_tx);

    let questions: Vec<&str> = items.iter().map(|i| i.question.as_str()).collect();
    let mut collector = ResultCollector::new();
    let outcome = pipeline.run_batch_into(&questions, &mut collector).await;
    let (prompt_tokens, completion_tokens, total_tokens) = pipeline.token_usage();
    drop(pipeline);
    if let Err(e) = progress.await {
        tracing::warn!("event consumer task failed: {}", e);
    }

    let run_dir = cli.save_dir.clone().unwrap_or_else(|| {
        let note = cfg.app.save_note.as_deref().unwrap_or("rpvm");
        let stamp = chrono::Local::now().format("%Y_%m_%d_%H_%M");
        cfg.app.save_dir.join(format!("{}_{}", note, stamp))
    });

    // 出错前已完成的问题也要落盘
    if cfg.app.save_intermediate_data && !collector.is_empty() {
        collector
            .save_jsonl(&run_dir)
            .context("Failed to save intermediate data")?;
    }
    outcome.context("RPVM run aborted")?;

    for (item, result) in items.iter_mut().zip(collector.results()) {
        item.pred = Some(result.final_answer.clone());
    }
    dataset::save_jsonl(run_dir.join("predictions.jsonl"), &items)?;

    let summary = EvalSummary::compute(
        items
            .iter()
            .map(|i| (i.pred.as_deref().unwrap_or(""), i.golden_answers.as_slice())),
    );
    if summary.count > 0 {
        println!(
            "em: {:.4}  f1: {:.4}  acc: {:.4}  (n={})",
            summary.em, summary.f1, summary.acc, summary.count
        );
    } else {
        for result in collector.results() {
            println!("Q: {}\nA: {}\n", result.question, result.final_answer);
        }
    }
    println!(
        "Total retrievals: {}  Tokens: {} (prompt {} / completion {})  Results saved to: {}",
        collector.total_retrievals(),
        total_tokens,
        prompt_tokens,
        completion_tokens,
        run_dir.display()
    );

    Ok(())
}
