use anyhow::{bail, Context};
use prizedraw_core::{DrawConfig, DrawEngine, DrawEvent, RngState};
use prizedraw_data::{load_draw_config, JsonRosterStore, RecordStore};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage:
  prizedraw-cli status [--roster PATH]
  prizedraw-cli simulate [--participants N] [--seed S] [--assets DIR]
  prizedraw-cli draw --remaining N [--seed S] [--assets DIR]";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Status { roster: PathBuf },
    Simulate { participants: Option<usize> },
    Draw { remaining: i64 },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    command: Command,
    assets: PathBuf,
    seed: Option<u64>,
}

fn parse_cli_options(args: &[String]) -> anyhow::Result<CliOptions> {
    let mut assets =
        PathBuf::from(std::env::var("PRIZEDRAW_ASSETS").unwrap_or_else(|_| "assets".into()));
    let mut roster: Option<PathBuf> = std::env::var("PRIZEDRAW_ROSTER").ok().map(PathBuf::from);
    let mut seed = None;
    let mut participants = None;
    let mut remaining = None;
    let mut idx = 1usize;
    while idx < args.len() {
        let flag = args[idx].as_str();
        let value = args
            .get(idx + 1)
            .with_context(|| format!("missing value for {flag}"))?;
        match flag {
            "--assets" => assets = PathBuf::from(value),
            "--roster" => roster = Some(PathBuf::from(value)),
            "--seed" => {
                seed = Some(
                    value
                        .parse::<u64>()
                        .with_context(|| format!("bad seed {value:?}"))?,
                )
            }
            "--participants" | "-n" => {
                participants = Some(
                    value
                        .parse::<usize>()
                        .with_context(|| format!("bad participant count {value:?}"))?,
                )
            }
            "--remaining" => {
                remaining = Some(
                    value
                        .parse::<i64>()
                        .with_context(|| format!("bad remaining count {value:?}"))?,
                )
            }
            _ => bail!("unknown option {flag}"),
        }
        idx += 2;
    }
    let command = match args.first().map(String::as_str) {
        Some("status") => Command::Status {
            roster: roster.unwrap_or_else(|| assets.join("roster.json")),
        },
        Some("simulate") => Command::Simulate { participants },
        Some("draw") => Command::Draw {
            remaining: remaining.context("draw needs --remaining N")?,
        },
        None | Some("help") | Some("--help") | Some("-h") => Command::Help,
        Some(other) => bail!("unknown command {other}"),
    };
    Ok(CliOptions {
        command,
        assets,
        seed,
    })
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(err) = run(&args) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> anyhow::Result<()> {
    let options = parse_cli_options(args)?;
    match options.command {
        Command::Status { roster } => print_status(&roster),
        Command::Simulate { participants } => {
            let config = load_draw_config(&options.assets)?;
            simulate(&config, participants, rng_for(options.seed))
        }
        Command::Draw { remaining } => {
            let config = load_draw_config(&options.assets)?;
            let engine = DrawEngine::new(&config, rng_for(options.seed))?;
            let report = engine.draw_report(remaining)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Help => {
            println!("{USAGE}");
            Ok(())
        }
    }
}

fn rng_for(seed: Option<u64>) -> RngState {
    seed.map(RngState::from_seed)
        .unwrap_or_else(RngState::from_entropy)
}

fn print_status(roster_path: &Path) -> anyhow::Result<()> {
    let roster = JsonRosterStore::new(roster_path)
        .load()
        .with_context(|| format!("load {}", roster_path.display()))?;
    println!("participants: {}", roster.len());
    println!("drawn:        {}", roster.drawn());
    println!("remaining:    {}", roster.remaining_eligible());
    let mut awarded: BTreeMap<u32, usize> = BTreeMap::new();
    for prize in roster.awarded() {
        *awarded.entry(prize).or_insert(0) += 1;
    }
    for (prize, count) in awarded.iter().rev() {
        println!("  {prize:>5} x {count}");
    }
    Ok(())
}

#[derive(Debug, Default)]
struct SimulationSummary {
    wins: BTreeMap<u32, usize>,
    losses: usize,
    guaranteed: usize,
}

fn run_simulation(
    config: &DrawConfig,
    participants: usize,
    rng: RngState,
) -> anyhow::Result<SimulationSummary> {
    let engine = DrawEngine::new(config, rng)?;
    let mut summary = SimulationSummary::default();
    for remaining in (1..=participants).rev() {
        let report = engine.draw_report(i64::try_from(remaining)?)?;
        match report.event {
            DrawEvent::Guaranteed { prize, .. } => {
                summary.guaranteed += 1;
                *summary.wins.entry(prize).or_insert(0) += 1;
            }
            DrawEvent::Won { prize, .. } => *summary.wins.entry(prize).or_insert(0) += 1,
            DrawEvent::Lost { .. } | DrawEvent::PoolExhausted => summary.losses += 1,
        }
    }
    let awarded: usize = summary.wins.values().sum();
    let expected = config.total_prizes().min(participants);
    if awarded != expected || engine.remaining() != config.total_prizes() - awarded {
        bail!(
            "conservation broken: awarded {awarded}, expected {expected}, pool left {}",
            engine.remaining()
        );
    }
    Ok(summary)
}

fn simulate(
    config: &DrawConfig,
    participants: Option<usize>,
    rng: RngState,
) -> anyhow::Result<()> {
    let participants = participants.unwrap_or_else(|| config.total_prizes() * 2);
    let seed = rng.seed();
    let summary = run_simulation(config, participants, rng)?;
    println!("seed:         {seed}");
    println!("participants: {participants}");
    println!("losses:       {}", summary.losses);
    println!("guaranteed:   {}", summary.guaranteed);
    for (prize, count) in summary.wins.iter().rev() {
        let configured = config.count_for(*prize).unwrap_or(0);
        println!("  {prize:>5} x {count} of {configured}");
    }
    Ok(())
}
