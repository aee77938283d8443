//! # termslens command line
//!
//! Drives the analyzer from a terminal:
//!
//! - `analyze`: find and summarize a site's Terms of Service
//! - `ask`: analyze a site, then answer a question about its terms
//! - `questions`: analyze a site, then suggest questions about its terms
//!
//! Set `OPENAI_API_KEY` for real summaries; without it everything runs in demo mode.
//! Logs go to stderr and follow `RUST_LOG`.

use clap::{Args, Parser, Subcommand};
use termslens::prelude::*;
use termslens::telemetry::init_tracing_subscriber;
use tracing::instrument;

#[derive(Parser)]
#[command(author, version, about = "Find and summarize the Terms of Service of a website", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find and summarize the Terms of Service of a website
    Analyze(AnalyzeArgs),

    /// Answer a question about the Terms of Service of a website
    Ask(AskArgs),

    /// Suggest questions about the Terms of Service of a website
    Questions(SiteArgs),
}

#[derive(Args, Debug)]
struct SiteArgs {
    /// Website address, with or without scheme
    #[arg(required = true)]
    url: String,

    /// OpenAI model used for summaries and answers
    #[arg(short, long, default_value = termslens::config::DEFAULT_MODEL)]
    model: String,

    /// Deadline for each page fetch in milliseconds
    #[arg(short, long, default_value = "15000")]
    timeout_ms: u64,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    #[command(flatten)]
    site: SiteArgs,

    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

#[derive(Args, Debug)]
struct AskArgs {
    #[command(flatten)]
    site: SiteArgs,

    /// Question about the terms
    #[arg(short, long, required = true)]
    question: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_subscriber();

    match cli.command {
        Some(Commands::Analyze(args)) => analyze_command(args).await?,
        Some(Commands::Ask(args)) => ask_command(args).await?,
        Some(Commands::Questions(args)) => questions_command(args).await?,
        None => {
            let _ = Cli::parse_from(["analyze", "--help"]);
        }
    }

    Ok(())
}

fn build_analyzer(site: &SiteArgs) -> anyhow::Result<Analyzer<termslens::model::OpenAiModel>> {
    let config = AnalyzerConfig::builder()
        .model(site.model.clone())
        .page_timeout_ms(site.timeout_ms)
        .build();
    let analyzer = Analyzer::from_env(config)?;
    if analyzer.is_demo() {
        eprintln!("OPENAI_API_KEY is not set, running in demo mode");
    }
    Ok(analyzer)
}

#[instrument]
async fn analyze_command(args: AnalyzeArgs) -> anyhow::Result<()> {
    let analyzer = build_analyzer(&args.site)?;
    let result = analyzer.analyze(&args.site.url).await;

    if args.format == "json" {
        let result = AnalysisResult::from(result);
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let analysis = result?;
    println!("Source: {}\n", analysis.url);
    println!("{}", analysis.summary);
    Ok(())
}

#[instrument]
async fn ask_command(args: AskArgs) -> anyhow::Result<()> {
    let analyzer = build_analyzer(&args.site)?;
    let analysis = analyzer.analyze(&args.site.url).await?;

    println!("Source: {}\n", analysis.url);
    let reply = analyzer.ask(&args.question, &analysis).await;
    println!("{}", reply.message);
    Ok(())
}

#[instrument]
async fn questions_command(args: SiteArgs) -> anyhow::Result<()> {
    let analyzer = build_analyzer(&args)?;
    let analysis = analyzer.analyze(&args.url).await?;

    println!("Source: {}\n", analysis.url);
    for (index, question) in analyzer
        .suggest_questions(&analysis.content)
        .await
        .iter()
        .enumerate()
    {
        println!("{}. {}", index + 1, question);
    }
    Ok(())
}
