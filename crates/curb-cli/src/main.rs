//! `curb` CLI — compile parking regulations and check requested stays.
//!
//! ## Usage
//!
//! ```sh
//! # Compile raw sign rows (stdin → stdout)
//! curb compile < rows.json
//!
//! # Is a one-hour stay allowed under these compiled rules?
//! curb check -i rules.json --checkin 2015-04-07T09:30 --duration 1
//!
//! # Same, straight from raw rows, holding permit 3
//! curb check --raw -i rows.json --checkin 2015-04-07T09:30 --permit 3
//!
//! # Paid status of a slot right now (in CURB_TIMEZONE)
//! curb classify -i rules.json
//!
//! # Available slots for a free-only search
//! curb slots -i slots.json --duration 2 --free-only
//! ```
//!
//! Logs go to stderr and are controlled by `RUST_LOG` (default `warn`).

use std::io::{self, Read};

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use curb_engine::{
    available_slots, classify, compile_rules, on_restriction, parse_checkin, CompiledRule,
    EvaluationQuery, Permit, RawRuleRow, Slot,
};
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "curb",
    version,
    about = "Curbside parking regulation compiler and checker"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile raw sign rows into weekly rules
    Compile {
        #[command(flatten)]
        io: IoArgs,
    },
    /// Report whether a requested stay is blocked by a slot's rules
    Check {
        #[command(flatten)]
        io: IoArgs,
        #[command(flatten)]
        query: QueryArgs,
        /// Input holds raw sign rows rather than compiled rules
        #[arg(long)]
        raw: bool,
    },
    /// Report a slot's paid status at checkin
    Classify {
        #[command(flatten)]
        io: IoArgs,
        #[command(flatten)]
        query: QueryArgs,
        /// Input holds raw sign rows rather than compiled rules
        #[arg(long)]
        raw: bool,
    },
    /// Keep the slots available for a requested stay, annotated with paid status
    Slots {
        #[command(flatten)]
        io: IoArgs,
        #[command(flatten)]
        query: QueryArgs,
    },
}

#[derive(Args)]
struct IoArgs {
    /// Input file (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,
    /// Output file (writes to stdout if omitted)
    #[arg(short, long)]
    output: Option<String>,
}

#[derive(Args)]
struct QueryArgs {
    /// Checkin as a local ISO-8601 timestamp (default: now)
    #[arg(long)]
    checkin: Option<String>,
    /// Requested stay in hours
    #[arg(long, default_value_t = curb_engine::evaluator::DEFAULT_DURATION_HOURS)]
    duration: f64,
    /// Permit number, "all", or "false"
    #[arg(long, default_value = "false")]
    permit: String,
    /// Exclude paid slots
    #[arg(long)]
    free_only: bool,
    /// IANA timezone used to resolve "now"
    #[arg(long, env = "CURB_TIMEZONE", default_value = "America/Montreal")]
    timezone: String,
}

impl QueryArgs {
    fn checkin(&self) -> Result<NaiveDateTime> {
        match self.checkin.as_deref() {
            Some(raw) => parse_checkin(raw).with_context(|| format!("Invalid --checkin: {}", raw)),
            None => {
                let tz: Tz = self
                    .timezone
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Unknown timezone: '{}'", self.timezone))?;
                Ok(Utc::now().with_timezone(&tz).naive_local())
            }
        }
    }

    fn to_query(&self) -> Result<EvaluationQuery> {
        let permit: Permit = self.permit.parse().unwrap_or_default();
        let query = EvaluationQuery::new(self.checkin()?)
            .with_duration(self.duration)
            .with_want_paid(!self.free_only)
            .with_permit(permit);
        debug!(?query, "resolved query");
        Ok(query)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Commands::Compile { io } => {
            let rows: Vec<RawRuleRow> = read_json(io.input.as_deref())?;
            let rules = compile_rules(&rows).context("Failed to compile rules")?;
            info!(rows = rows.len(), rules = rules.len(), "compiled");
            write_json(io.output.as_deref(), &rules)?;
        }
        Commands::Check { io, query, raw } => {
            let rules = load_rules(io.input.as_deref(), raw)?;
            let query = query.to_query()?;
            let blocked = on_restriction(&rules, &query).context("Failed to evaluate rules")?;
            write_json(io.output.as_deref(), &json!({ "blocked": blocked }))?;
        }
        Commands::Classify { io, query, raw } => {
            let rules = load_rules(io.input.as_deref(), raw)?;
            let checkin = query.checkin()?;
            let restrict_typ = classify(&rules, checkin).context("Failed to classify slot")?;
            write_json(io.output.as_deref(), &json!({ "restrict_typ": restrict_typ }))?;
        }
        Commands::Slots { io, query } => {
            let slots: Vec<Slot> = read_json(io.input.as_deref())?;
            let total = slots.len();
            let available =
                available_slots(slots, &query.to_query()?).context("Failed to list slots")?;
            info!(total, available = available.len(), "filtered slots");
            write_json(io.output.as_deref(), &available)?;
        }
    }

    Ok(())
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);
    if log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

/// Compiled rules from the input, compiling raw rows first when `raw` is set.
fn load_rules(path: Option<&str>, raw: bool) -> Result<Vec<CompiledRule>> {
    if raw {
        let rows: Vec<RawRuleRow> = read_json(path)?;
        compile_rules(&rows).context("Failed to compile rules")
    } else {
        read_json(path)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: Option<&str>) -> Result<T> {
    let text = read_input(path)?;
    serde_json::from_str(&text).context("Failed to parse input JSON")
}

fn write_json<T: serde::Serialize>(path: Option<&str>, value: &T) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    write_output(path, &text)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
