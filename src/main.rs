//! memo-board CLI: inspect the investment memo, record hypothesis validation
//! results and ask the configured advisor for a recommendation.
//!
//! Usage:
//!   memo-board list
//!   memo-board update H2 --outcome validated --owner dana
//!   memo-board verdict --json
//!   memo-board recommend
//!   memo-board ask "What drives the 2027 burn?"

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use memo_board::chat::ChatSession;
use memo_board::clients::create_advisor;
use memo_board::config::Config;
use memo_board::hypothesis::parse_due_date;
use memo_board::storage::{FileStorage, MemoryStorage, StateStorage};
use memo_board::{Dashboard, HypothesisPatch, Outcome, Status};

#[derive(Parser)]
#[command(name = "memo-board")]
#[command(
    about = "Investment memo dashboard with hypothesis validation tracking",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every hypothesis with its status and outcome
    List,
    /// Show one hypothesis in full
    Show { id: String },
    /// Update fields of one hypothesis
    Update {
        id: String,
        #[arg(long)]
        status: Option<Status>,
        #[arg(long)]
        outcome: Option<Outcome>,
        #[arg(long)]
        owner: Option<String>,
        /// YYYY-MM-DD, or "none" to clear
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Restore all hypotheses to the template and drop the recommendation
    Reset {
        #[arg(long)]
        yes: bool,
    },
    /// Print the Go/No-Go verdict
    Verdict {
        #[arg(long)]
        json: bool,
    },
    /// Print validation progress
    Summary {
        #[arg(long)]
        json: bool,
    },
    /// Print the investment memo
    Memo,
    /// Ask the advisor for a recommendation and store it
    Recommend,
    /// Ask the advisor a free-text question about the memo
    Ask { question: Vec<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.runtime.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let storage: Box<dyn StateStorage> = match FileStorage::open(config.data_dir()) {
        Ok(storage) => {
            tracing::debug!("state directory {}", storage.dir().display());
            Box::new(storage)
        }
        Err(e) => {
            tracing::warn!("state directory unavailable, changes will not persist: {}", e);
            Box::new(MemoryStorage::new())
        }
    };
    let mut dashboard = Dashboard::open(storage, config.storage.state_version.clone())?;

    match cli.command {
        Commands::List => list(&dashboard),
        Commands::Show { id } => show(&dashboard, &id),
        Commands::Update {
            id,
            status,
            outcome,
            owner,
            due,
            notes,
        } => {
            let mut patch = HypothesisPatch {
                status,
                outcome,
                owner,
                notes,
                ..Default::default()
            };
            if let Some(due) = due {
                patch.due_date = Some(parse_due_date(&due)?);
            }
            if patch.is_empty() {
                anyhow::bail!("nothing to update; pass at least one field flag");
            }
            if dashboard.update(&id, &patch)? {
                show(&dashboard, &id)?;
                println!();
                print_verdict(&dashboard, false)
            } else {
                eprintln!("No hypothesis with id '{}'", id);
                Ok(())
            }
        }
        Commands::Reset { yes } => {
            if !yes {
                anyhow::bail!("reset discards all validation results; re-run with --yes");
            }
            dashboard.reset()?;
            println!("All hypotheses reset to the template.");
            Ok(())
        }
        Commands::Verdict { json } => print_verdict(&dashboard, json),
        Commands::Summary { json } => summary(&dashboard, json),
        Commands::Memo => {
            print!("{}", dashboard.memo().to_context_text());
            Ok(())
        }
        Commands::Recommend => recommend(&config, &mut dashboard).await,
        Commands::Ask { question } => ask(&config, &dashboard, &question.join(" ")).await,
    }
}

fn list(dashboard: &Dashboard) -> Result<()> {
    for h in dashboard.hypotheses() {
        println!(
            "{:<4} {:<14} {:<12} {:<12} {:<13} {}",
            h.id,
            h.kind.as_str(),
            h.category.as_str(),
            h.status.as_str(),
            h.outcome.as_str(),
            h.title
        );
    }
    Ok(())
}

fn show(dashboard: &Dashboard, id: &str) -> Result<()> {
    let h = dashboard
        .hypothesis(id)
        .with_context(|| format!("no hypothesis with id '{}'", id))?;
    println!("{}: {}", h.id, h.title);
    println!("  type:     {} / {}", h.kind.as_str(), h.category.as_str());
    println!("  status:   {}", h.status);
    println!("  outcome:  {}", h.outcome);
    println!("  criteria: {}", h.success_criteria);
    println!("  about:    {}", h.description);
    if !h.owner.is_empty() {
        println!("  owner:    {}", h.owner);
    }
    if let Some(due) = h.due_date {
        println!("  due:      {}", due);
    }
    if !h.notes.is_empty() {
        println!("  notes:    {}", h.notes);
    }
    if let Some(ts) = h.last_modified {
        println!("  modified: {}", ts.to_rfc3339());
    }
    Ok(())
}

fn print_verdict(dashboard: &Dashboard, json: bool) -> Result<()> {
    let report = dashboard.verdict();
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("Verdict: {} ({})", report.verdict, report.reason);
    if !report.failed_kill_criteria.is_empty() {
        println!("  failed kill criteria: {}", report.failed_kill_criteria.join(", "));
    }
    if !report.failed_weighted.is_empty() {
        println!("  failed weighted:      {}", report.failed_weighted.join(", "));
    }
    if !report.open_kill_criteria.is_empty() {
        println!("  open kill criteria:   {}", report.open_kill_criteria.join(", "));
    }
    Ok(())
}

fn summary(dashboard: &Dashboard, json: bool) -> Result<()> {
    let s = dashboard.summary();
    if json {
        println!("{}", serde_json::to_string_pretty(&s)?);
        return Ok(());
    }
    println!(
        "{} hypotheses: {}% decided, {}% validated",
        s.total, s.decided_pct, s.validated_pct
    );
    println!(
        "  kill criteria: {}/{} decided ({}%)",
        s.kill_criteria.decided,
        s.kill_criteria.total,
        s.kill_criteria.decided_pct()
    );
    println!(
        "  weighted:      {}/{} decided ({}%)",
        s.weighted.decided,
        s.weighted.total,
        s.weighted.decided_pct()
    );
    for (outcome, count) in &s.by_outcome {
        println!("  {:<13} {}", outcome, count);
    }
    if let Some(rec) = dashboard.recommendation() {
        let stale = dashboard.recommendation_is_stale().unwrap_or(false);
        println!(
            "\nLast recommendation: {}{}",
            rec.created_at.to_rfc3339(),
            if stale { " (stale: hypotheses changed since)" } else { "" }
        );
    }
    Ok(())
}

async fn recommend(config: &Config, dashboard: &mut Dashboard) -> Result<()> {
    let advisor = match create_advisor(config) {
        Ok(advisor) => advisor,
        Err(e) => {
            eprintln!("Recommendation unavailable: {}", e);
            return print_verdict(dashboard, false);
        }
    };
    let request = dashboard.prepare_recommendation();
    match request.send(advisor.as_ref()).await {
        Ok(rec) => {
            println!("{}\n", rec.text);
            println!("(verdict at request time: {})", rec.verdict);
            if let Err(e) = dashboard.store_recommendation(rec) {
                tracing::warn!("recommendation not persisted: {}", e);
            }
            Ok(())
        }
        Err(e) if e.is_advisor_failure() => {
            eprintln!("Recommendation unavailable: {}", e);
            print_verdict(dashboard, false)
        }
        Err(e) => Err(e.into()),
    }
}

async fn ask(config: &Config, dashboard: &Dashboard, question: &str) -> Result<()> {
    let advisor = match create_advisor(config) {
        Ok(advisor) => advisor,
        Err(e) => {
            eprintln!("Advisor unavailable: {}", e);
            return print_verdict(dashboard, false);
        }
    };
    let mut chat = ChatSession::new(config.chat.max_history_turns);
    let answer = chat
        .ask(
            advisor.as_ref(),
            question,
            dashboard.memo(),
            dashboard.hypotheses(),
        )
        .await;
    match answer {
        Ok(answer) => {
            println!("{}", answer);
            Ok(())
        }
        Err(e) if e.is_advisor_failure() => {
            eprintln!("Advisor unavailable: {}", e);
            print_verdict(dashboard, false)
        }
        Err(e) => Err(e.into()),
    }
}
