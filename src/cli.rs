use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "chat-keyword-batch", about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Classify every distinct utterance in [start, end] (Q1) and write
    /// keyword rows for them (RangeOrchestrator).
    Batch {
        #[arg(long, value_parser = parse_date)]
        start: NaiveDate,
        #[arg(long, value_parser = parse_date)]
        end: NaiveDate,
    },
    /// Count utterances in [start, end] with no matching keyword row (Q2),
    /// without processing them.
    MissingCheck {
        #[arg(long, value_parser = parse_date)]
        start: NaiveDate,
        #[arg(long, value_parser = parse_date)]
        end: NaiveDate,
    },
    /// Process every utterance in [start, end] reported missing by Q2.
    MissingProcess {
        #[arg(long, value_parser = parse_date)]
        start: NaiveDate,
        #[arg(long, value_parser = parse_date)]
        end: NaiveDate,
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Check, then process, then check again, reporting before/after counts.
    MissingAuto {
        #[arg(long, value_parser = parse_date)]
        start: NaiveDate,
        #[arg(long, value_parser = parse_date)]
        end: NaiveDate,
        #[arg(long)]
        limit: Option<u64>,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("invalid date '{s}': {e}"))
}
