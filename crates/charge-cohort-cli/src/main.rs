//! Charge Cohort - prints every charge created in a date window
//!
//! ```sh
//! # February 2014, paid and not refunded
//! charge-cohort --start 2014-02-01 --end 2014-03-01 --paid true --refunded false
//!
//! # Everything since a date, four offset pages at a time
//! charge-cohort --start 2014-02-01 --mode offset --concurrency 4
//! ```
//!
//! The API key is read from `.secrets/stripe.json` or `STRIPE_API_KEY`.

use std::io::Write;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use charge_cohort_client::{ChargeCohort, CohortConfig, CohortOptions, PaginationMode};
use charge_cohort_core::{parse_date, ChargeCollection, ConfigError, FetchWindow};

/// Pagination mode flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Offset,
    Cursor,
}

impl From<ModeArg> for PaginationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Offset => Self::Offset,
            ModeArg::Cursor => Self::Cursor,
        }
    }
}

/// Fetch a charge cohort and print a net-of-fees report.
#[derive(Parser, Debug)]
#[command(name = "charge-cohort", version, about)]
struct Cli {
    /// Earliest creation date (YYYY-MM-DD, M/D/YYYY or RFC 3339).
    #[arg(long)]
    start: String,

    /// Latest creation date, inclusive. Unbounded when omitted.
    #[arg(long)]
    end: Option<String>,

    /// Records per page.
    #[arg(long)]
    page_size: Option<u32>,

    /// Maximum offset pages in flight.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Pagination mode. Defaults to the API's preferred mode.
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Give up after this many seconds.
    #[arg(long)]
    deadline_seconds: Option<u64>,

    /// Keep only paid (`true`) or unpaid (`false`) charges.
    #[arg(long)]
    paid: Option<bool>,

    /// Keep only refunded (`true`) or unrefunded (`false`) charges.
    #[arg(long)]
    refunded: Option<bool>,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded options.
    fn options(&self, mut options: CohortOptions) -> CohortOptions {
        if let Some(page_size) = self.page_size {
            options.page_size = page_size;
        }
        if let Some(concurrency) = self.concurrency {
            options.concurrency = concurrency;
        }
        if let Some(mode) = self.mode {
            options.mode = Some(mode.into());
        }
        if let Some(seconds) = self.deadline_seconds {
            options.deadline = Some(Duration::from_secs(seconds));
        }
        options
    }

    fn window(&self) -> Result<FetchWindow, ConfigError> {
        match &self.end {
            Some(end) => FetchWindow::parse(&self.start, end),
            None => parse_date(&self.start)
                .map(FetchWindow::since)
                .ok_or_else(|| ConfigError::InvalidDate {
                    field: "start",
                    input: self.start.clone(),
                }),
        }
    }

    fn select(&self, charges: &ChargeCollection) -> ChargeCollection {
        let mut selected = charges.clone();
        if let Some(paid) = self.paid {
            selected = selected.paid(paid);
        }
        if let Some(refunded) = self.refunded {
            selected = selected.refunded(refunded);
        }
        selected
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so the report can be piped
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,charge_cohort=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = CohortConfig::from_env();
    let options = cli.options(config.options);
    let window = cli.window()?;
    let api_key = config.api_key.ok_or(ConfigError::MissingCredential)?;

    tracing::info!(
        window = %window,
        page_size = options.page_size,
        concurrency = options.concurrency,
        mode = ?options.mode,
        "Cohort configuration loaded"
    );

    let cohort = ChargeCohort::new(api_key, options)?;
    let charges = cohort.cohort_window(&window).await?;
    let selected = cli.select(&charges);

    let mut out = std::io::stdout().lock();
    selected.print(&mut out)?;
    writeln!(out, "Charges: {} of {}", selected.len(), charges.len())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use charge_cohort_core::{ChargeId, ChargeRecord};
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("charge-cohort").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn start_is_required() {
        assert!(Cli::try_parse_from(["charge-cohort"]).is_err());
    }

    #[test]
    fn flags_override_loaded_options() {
        let cli = parse(&[
            "--start",
            "2014-02-01",
            "--page-size",
            "50",
            "--concurrency",
            "4",
            "--mode",
            "offset",
            "--deadline-seconds",
            "30",
        ]);
        let options = cli.options(CohortOptions::new().with_page_size(25));

        assert_eq!(options.page_size, 50);
        assert_eq!(options.concurrency, 4);
        assert_eq!(options.mode, Some(PaginationMode::Offset));
        assert_eq!(options.deadline, Some(Duration::from_secs(30)));
    }

    #[test]
    fn absent_flags_keep_loaded_options() {
        let cli = parse(&["--start", "2014-02-01"]);
        let loaded = CohortOptions::new().with_page_size(25).with_concurrency(3);
        assert_eq!(cli.options(loaded.clone()), loaded);
    }

    #[test]
    fn window_without_end_is_unbounded() {
        let window = parse(&["--start", "2/1/2014"]).window().unwrap();
        assert_eq!(window.bounds(), (1_391_212_800, None));
    }

    #[test]
    fn window_with_end_is_bounded() {
        let window = parse(&["--start", "2014-02-01", "--end", "2014-03-01"])
            .window()
            .unwrap();
        assert_eq!(window.bounds(), (1_391_212_800, Some(1_393_632_000)));
    }

    #[test]
    fn bad_start_is_rejected() {
        let err = parse(&["--start", "soon"]).window().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDate { field: "start", .. }));
    }

    #[test]
    fn select_applies_status_filters() {
        let created = parse_date("2014-02-02").unwrap();
        let charges: ChargeCollection = vec![
            ChargeRecord::new(ChargeId::new("ch_1").unwrap(), 100, created),
            ChargeRecord::new(ChargeId::new("ch_2").unwrap(), 100, created).with_refunded(true),
            ChargeRecord::new(ChargeId::new("ch_3").unwrap(), 100, created).with_paid(false),
        ]
        .into();

        let cli = parse(&["--start", "2014-02-01", "--paid", "true", "--refunded", "false"]);
        let selected = cli.select(&charges);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected.ids()[0].as_str(), "ch_1");

        assert_eq!(parse(&["--start", "2014-02-01"]).select(&charges).len(), 3);
    }
}
