//! 🚀 shiftx-cli - the front door, the bouncer, the maitre d' of shiftx.
//!
//! 🎬 *[narrator voice]* "It all started with a simple main() function..."
//! 📦 This binary crate is the thin CLI wrapper that parses args, loads config,
//! sets up logging, and then lets the library do the heavy lifting.
//! Like a manager. 🦆

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL};
use shiftx::{AppConfig, RunSummary};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

/// 🗓️ Pull shifts from a paginated rostering API into SQLite and compute KPIs.
#[derive(Debug, Parser)]
#[command(name = "shiftx", version, about)]
struct Cli {
    /// 🔧 TOML config file. Without it, config comes from SHIFTX_* env vars alone.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 🚀 Ingest every page, then compute and file the six KPIs.
    Run {
        /// 📦 Page size for this run, overriding the configured one.
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// 🧹 Delete all shifts (with their breaks, allowances, awards) and all KPI rows.
    Reset,
}

/// 🚀 main() - where it all begins. The genesis. The big bang.
/// The "I pressed F5 and held my breath" moment.
#[tokio::main]
async fn main() {
    // 📡 Set up tracing - because println! debugging is a lifestyle choice
    // we're trying to move past, like flip phones and cargo shorts
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(err) = dispatch(cli).await {
        report(&err);
        // 🗑️ Exit with prejudice. Process exitus maximus.
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    // 🔒 Validate the config file exists before we get too emotionally attached
    if let Some(path) = cli.config.as_deref() {
        let exists = path.try_exists().with_context(|| {
            format!("💀 couldn't check whether the config file exists at '{}'", path.display())
        })?;
        if !exists {
            bail!(
                "💀 config file '{}' does not exist. If it's a relative path, it's relative to \
                 wherever you ran this from. Try an absolute path, to be absolutely certain.",
                path.display()
            );
        }
    }

    let mut app_config = shiftx::load_config(cli.config.as_deref())
        .context("💀 couldn't load the configuration. Check the file and the SHIFTX_* env vars.")?;

    match cli.command {
        Command::Run { page_size } => {
            if page_size.is_some() {
                app_config.source_config.page_size = page_size;
            }
            let summary = run_until_interrupted(app_config).await?;
            println!("{}", summary_table(&summary));
        }
        Command::Reset => {
            shiftx::reset(&app_config)
                .await
                .context("💀 reset failed, the store is unchanged")?;
            println!("🧹 all shifts and KPIs deleted");
        }
    }
    Ok(())
}

// -- Ctrl-C drops the run future. A page write already on the blocking pool may still commit before
// -- exit. Every page commits alone, so at most that one page is in doubt.
async fn run_until_interrupted(app_config: AppConfig) -> Result<RunSummary> {
    tokio::select! {
        outcome = shiftx::run(app_config) => outcome.context("💀 the run did not finish"),
        signal = tokio::signal::ctrl_c() => {
            signal.context("💀 couldn't listen for Ctrl-C")?;
            warn!("🛑 interrupted, pages already committed stay, the page in flight may or may not have landed");
            bail!("🛑 run interrupted by Ctrl-C")
        }
    }
}

fn summary_table(summary: &RunSummary) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["what", "value"]);

    let counts = [
        ("pages", summary.pages),
        ("shifts", summary.shifts),
        ("breaks", summary.breaks),
        ("allowances", summary.allowances),
        ("award_interpretations", summary.award_interpretations),
    ];
    for (label, count) in counts {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(count).set_alignment(CellAlignment::Right),
        ]);
    }
    for (name, value) in summary.kpis.entries() {
        table.add_row(vec![
            Cell::new(format!("{name} ({})", summary.kpis.kpi_date)),
            Cell::new(format!("{value:.2}")).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// 💀 Error handling: the part where we find out what went wrong
/// and print it in a way that's helpful at 3am
fn report(err: &anyhow::Error) {
    error!("💀 error: {err}");
    let mut the_vibes_are_giving_connection_issues = false;
    // -- 🧅 peel the onion of sadness, one tear-jerking layer at a time
    for (depth, cause) in err.chain().enumerate() {
        if depth > 0 {
            error!("⚠️  cause: {cause}");
        }
        // -- 🕵️ sniff the cause like a truffle pig hunting for connection problems
        let cause_str = cause.to_string();
        if cause_str.contains("error sending request")
            || cause_str.contains("connection refused")
            || cause_str.contains("Connection refused")
            || cause_str.contains("tcp connect error")
            || cause_str.contains("dns error")
            || cause_str.contains("operation timed out")
        {
            the_vibes_are_giving_connection_issues = true;
        }
    }

    // -- 📡 if it smells like a connection problem, it's probably a connection problem
    if the_vibes_are_giving_connection_issues {
        error!(
            "🔧 hint: looks like the rostering API isn't reachable. \
             Double-check `source_config.url`, that the API is actually running, \
             and that nothing between here and there is eating the packets. ☕"
        );
    }
}
