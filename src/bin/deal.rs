//! `deal`: play Deal or No Deal in the terminal.
//!
//! Set `RUST_LOG=deal_engine=debug` to trace every engine transition on
//! stderr.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use deal_engine::core::{GameConfig, DEFAULT_CASES, DEFAULT_SEED};
use deal_engine::policy::{FixedLadder, OfferPolicy, PrizeLadder, RoundPolicy};
use deal_engine::rules::Engine;
use deal_engine::session::{Outcome, Session};
use deal_engine::transcript::{self, Recorder, TranscriptHeader};

/// `--cases`: a number, or `custom` to be asked at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CaseCount {
    Fixed(usize),
    Custom,
}

impl FromStr for CaseCount {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("custom") {
            return Ok(CaseCount::Custom);
        }
        s.parse()
            .map(CaseCount::Fixed)
            .map_err(|_| format!("expected a case count or 'custom', got '{}'", s))
    }
}

impl fmt::Display for CaseCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseCount::Fixed(n) => write!(f, "{}", n),
            CaseCount::Custom => f.write_str("custom"),
        }
    }
}

/// Deal or No Deal, deterministic and seedable
#[derive(Parser, Debug)]
#[command(name = "deal")]
#[command(about = "Play Deal or No Deal in the terminal", long_about = None)]
#[command(version)]
struct Cli {
    /// Number of cases (2..=25), or `custom` to choose at startup
    #[arg(long, default_value_t = CaseCount::Fixed(DEFAULT_CASES))]
    cases: CaseCount,

    /// RNG seed for a deterministic shuffle
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Show the EV advisor line under each offer
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    show_ev: bool,

    /// Write a transcript (.csv for CSV, anything else for JSON)
    #[arg(long)]
    transcript: Option<PathBuf>,

    /// Custom prize amounts, comma-separated (the lowest `cases` are used)
    #[arg(long, value_delimiter = ',')]
    ladder: Option<Vec<i64>>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = Session::new(stdin.lock(), stdout.lock()).with_show_ev(cli.show_ev);

    let cases = match cli.cases {
        CaseCount::Fixed(n) => n,
        CaseCount::Custom => match session.ask_case_count()? {
            Some(n) => n,
            None => return Ok(no_input()),
        },
    };
    let config = GameConfig::new(cases).with_seed(cli.seed);

    match &cli.ladder {
        Some(amounts) => {
            let ladder = FixedLadder::new(amounts.clone()).context("invalid --ladder")?;
            let mut engine =
                Engine::with_ladder(config, ladder).context("invalid game configuration")?;
            play(&mut engine, session, cli)
        }
        None => {
            let mut engine = Engine::from_config(config).context("invalid game configuration")?;
            play(&mut engine, session, cli)
        }
    }
}

fn play<L, R, O, In, Out>(
    engine: &mut Engine<L, R, O>,
    session: Session<In, Out>,
    cli: &Cli,
) -> Result<ExitCode>
where
    L: PrizeLadder,
    R: RoundPolicy,
    O: OfferPolicy,
    In: BufRead,
    Out: Write,
{
    let recorder = match &cli.transcript {
        Some(path) => {
            let writer = transcript::create(path)
                .with_context(|| format!("cannot create transcript {}", path.display()))?;
            let header = TranscriptHeader::now(engine.config().case_count, engine.config().seed);
            info!(path = %path.display(), "recording transcript");
            Some(Recorder::start(writer, &header)?)
        }
        None => None,
    };

    let mut session = session.with_recorder(recorder);
    let outcome = session.run(engine)?;
    session.finish().context("cannot finish transcript")?;

    match outcome {
        Outcome::Finished { winnings } => {
            info!(winnings, "game over");
            Ok(ExitCode::SUCCESS)
        }
        Outcome::NoInput => Ok(no_input()),
    }
}

fn no_input() -> ExitCode {
    eprintln!();
    eprintln!("No interactive input detected. Exiting.");
    ExitCode::from(2)
}
