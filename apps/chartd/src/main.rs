use anyhow::{Context, Result};
use aphrodite::chart::{BirthAccuracy, BirthInput};
use aphrodite::transit::DEFAULT_CYCLE_WINDOW_MONTHS;
use aphrodite::ChartEngine;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Cast natal charts, transits and cycles as JSON")]
struct Cli {
    /// Config file (otherwise APHRODITE_CONFIG or configs/aphrodite.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Full natal chart.
    Natal {
        #[command(flatten)]
        birth: BirthArgs,
    },
    /// Transits to the natal chart for one day.
    Transits {
        #[command(flatten)]
        birth: BirthArgs,
        /// Target day (YYYY-MM-DD) or RFC 3339 instant; defaults to now.
        #[arg(long)]
        at: Option<String>,
    },
    /// Slow-body returns, oppositions and squares over the coming months.
    Cycles {
        #[command(flatten)]
        birth: BirthArgs,
        #[arg(long, default_value_t = DEFAULT_CYCLE_WINDOW_MONTHS)]
        months: u32,
    },
    /// Compact chart and transit summaries.
    Summary {
        #[command(flatten)]
        birth: BirthArgs,
        #[arg(long)]
        at: Option<String>,
    },
}

#[derive(Args, Debug)]
struct BirthArgs {
    /// Birth date, YYYY-MM-DD.
    #[arg(long)]
    date: NaiveDate,
    /// Local birth time, HH:MM (noon when omitted).
    #[arg(long)]
    time: Option<String>,
    /// IANA zone or offset such as +08:00.
    #[arg(long)]
    tz: Option<String>,
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    lat: Option<f64>,
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    lon: Option<f64>,
    /// Birth time is only roughly known.
    #[arg(long)]
    approximate: bool,
}

impl BirthArgs {
    fn to_input(&self) -> BirthInput {
        let mut input = BirthInput::new(self.date);
        input.time = self.time.clone();
        input.timezone = self.tz.clone();
        input.latitude = self.lat;
        input.longitude = self.lon;
        if self.approximate {
            input.accuracy = BirthAccuracy::Approximate;
        }
        input
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryOutput {
    chart: aphrodite::CompactChartSummary,
    transits: aphrodite::CompactTransitSummary,
}

fn parse_target(at: Option<&str>) -> Result<DateTime<Utc>> {
    let Some(raw) = at else {
        return Ok(Utc::now());
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("--at must be YYYY-MM-DD or RFC 3339, got {:?}", raw))?;
    Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::default())))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", text);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => aphrodite_config::load_engine_config_from(path)?,
        None => aphrodite_config::load_engine_config()?,
    };
    let engine = ChartEngine::bootstrap(config);
    log::info!("chartd ready, ephemeris mode: {}", engine.mode());

    match cli.command {
        Command::Natal { birth } => {
            let chart = engine.compute_natal_chart(&birth.to_input()).await?;
            print_json(&*chart)
        }
        Command::Transits { birth, at } => {
            let target = parse_target(at.as_deref())?;
            let transits = engine.compute_transits(&birth.to_input(), target).await?;
            print_json(&*transits)
        }
        Command::Cycles { birth, months } => {
            let cycles = engine.compute_cycles(&birth.to_input(), months).await?;
            print_json(&cycles)
        }
        Command::Summary { birth, at } => {
            let input = birth.to_input();
            let target = parse_target(at.as_deref())?;
            let output = SummaryOutput {
                chart: engine.chart_summary(&input).await?,
                transits: engine.transit_summary(&input, target).await?,
            };
            print_json(&output)
        }
    }
}
