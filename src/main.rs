//! Stand Game Kiosk
//!
//! Runs the kiosk, tests the button/relay wiring, or sanity-checks a
//! configuration before an event.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use stand_game::{
    core::clock::SystemClock,
    game::{
        agility::{agility_score, format_elapsed},
        name::{KeySource, NameKey},
        quiz::quiz_score,
    },
    hardware::{Hardware, SimulatedHardware},
    network::UiServer,
    session::{channel, BroadcastSurface, EventSender, KioskEvent, Orchestrator},
    KioskConfig, Preset, ScoreStore, VERSION,
};

#[derive(Parser, Debug)]
#[command(name = "stand-game", version)]
#[command(about = "Arcade kiosk: agility buttons, quiz and daily leaderboard")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Game mechanics preset (standard, quick, challenge, kids, tournament)
    #[arg(short, long, global = true)]
    preset: Option<Preset>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the kiosk (default)
    Run {
        /// Simulated buttons and LEDs driven from stdin
        #[arg(long)]
        simulate: bool,
    },
    /// Cycle every LED, then echo button presses until Ctrl-C
    HwTest {
        /// Simulated buttons and LEDs driven from stdin
        #[arg(long)]
        simulate: bool,
    },
    /// Print score tables and check the question bank
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = KioskConfig::load(cli.config.as_deref(), cli.preset)
        .context("loading configuration")?;

    match cli.command.unwrap_or(Command::Run { simulate: false }) {
        Command::Run { simulate } => run(config, simulate).await,
        Command::HwTest { simulate } => hw_test(config, simulate).await,
        Command::CheckConfig => check_config(&config),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

// =============================================================================
// RUN
// =============================================================================

async fn run(config: KioskConfig, simulate: bool) -> anyhow::Result<()> {
    info!("Stand Game v{}", VERSION);

    let (hardware, simulated) = open_hardware(&config, simulate)?;
    let surface = Arc::new(BroadcastSurface::new(config.ui.broadcast_capacity));
    let store = ScoreStore::from_config(&config.paths);

    let bank = store.load_questions();
    if bank.len() < config.quiz.rounds as usize {
        warn!(
            "Question bank has {} questions for {} rounds; the quiz will be skipped",
            bank.len(),
            config.quiz.rounds
        );
    }

    let (tx, rx) = channel();
    let orchestrator = Orchestrator::new(
        config.clone(),
        hardware,
        surface.clone(),
        store,
        Arc::new(SystemClock),
        tx.clone(),
    );

    let ui = Arc::new(UiServer::new(config.ui.bind_addr, surface, tx.clone()));
    let ui_task = {
        let ui = ui.clone();
        tokio::spawn(async move {
            if let Err(e) = ui.run().await {
                error!("UI server failed: {}", e);
            }
        })
    };

    if let Some(sim) = simulated {
        println!("Simulated kiosk. Commands: <button>, p, a <option>, k <text>, bs, submit, s, w, q");
        tokio::spawn(console_loop(sim, tx.clone()));
    }

    let shutdown_tx = tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received");
            let _ = shutdown_tx.send(KioskEvent::Shutdown);
        }
    });

    orchestrator.run(rx).await;

    ui.shutdown();
    let _ = ui_task.await;
    info!("Goodbye");
    Ok(())
}

fn open_hardware(
    config: &KioskConfig,
    simulate: bool,
) -> anyhow::Result<(Arc<dyn Hardware>, Option<SimulatedHardware>)> {
    if simulate {
        let sim = SimulatedHardware::new(config.hardware.led_count());
        return Ok((Arc::new(sim.clone()), Some(sim)));
    }

    #[cfg(feature = "gpio")]
    {
        let gpio = stand_game::hardware::GpioHardware::open(&config.hardware)
            .context("opening GPIO")?;
        Ok((Arc::new(gpio), None))
    }

    #[cfg(not(feature = "gpio"))]
    {
        warn!("Built without the `gpio` feature, using simulated hardware");
        let sim = SimulatedHardware::new(config.hardware.led_count());
        Ok((Arc::new(sim.clone()), Some(sim)))
    }
}

/// A line typed on the simulated kiosk's console.
#[derive(Debug, PartialEq)]
enum ConsoleInput {
    Press(usize),
    Event(KioskEvent),
    Type(String),
    Quit,
}

fn parse_console_line(line: &str) -> Option<ConsoleInput> {
    let line = line.trim();
    let (cmd, arg) = match line.split_once(' ') {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (line, ""),
    };
    let input = match cmd {
        "p" => ConsoleInput::Event(KioskEvent::Proceed),
        "a" => ConsoleInput::Event(KioskEvent::Answer { option: arg.parse().ok()? }),
        "k" if !arg.is_empty() => ConsoleInput::Type(arg.to_string()),
        "bs" => ConsoleInput::Event(KioskEvent::key(NameKey::Backspace, KeySource::Physical)),
        "submit" => ConsoleInput::Event(KioskEvent::key(NameKey::Submit, KeySource::Physical)),
        "s" => ConsoleInput::Event(KioskEvent::SkipAgility),
        "w" => ConsoleInput::Event(KioskEvent::ReturnToWelcome),
        "q" => ConsoleInput::Quit,
        other => ConsoleInput::Press(other.parse().ok()?),
    };
    Some(input)
}

async fn console_loop(sim: SimulatedHardware, tx: EventSender) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match parse_console_line(&line) {
            Some(ConsoleInput::Press(index)) => {
                if !sim.press(index) {
                    println!("No button {}", index);
                }
            }
            Some(ConsoleInput::Event(event)) => {
                let _ = tx.send(event);
            }
            Some(ConsoleInput::Type(text)) => {
                for c in text.chars() {
                    let _ = tx.send(KioskEvent::key(NameKey::Char(c), KeySource::Physical));
                }
            }
            Some(ConsoleInput::Quit) => {
                let _ = tx.send(KioskEvent::Shutdown);
                break;
            }
            None => println!("Unknown command: {}", line.trim()),
        }
    }
}

// =============================================================================
// HW-TEST
// =============================================================================

async fn hw_test(config: KioskConfig, simulate: bool) -> anyhow::Result<()> {
    let (hardware, simulated) = open_hardware(&config, simulate)?;
    let count = hardware.led_count();

    println!("Cycling {} LEDs...", count);
    for index in 0..count {
        println!("LED {}", index);
        hardware.set_led(index, true)?;
        tokio::time::sleep(Duration::from_millis(200)).await;
        hardware.set_led(index, false)?;
    }

    let (press_tx, mut press_rx) = mpsc::unbounded_channel();
    hardware.set_button_callback(Box::new(move |index| {
        let _ = press_tx.send(index);
    }))?;

    if let Some(sim) = simulated {
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if let Ok(index) = line.trim().parse() {
                    sim.press(index);
                }
            }
        });
    }

    println!("Press buttons to see feedback. Ctrl-C to exit.");
    loop {
        tokio::select! {
            Some(index) = press_rx.recv() => {
                println!("Button {} pressed", index);
                if let Err(e) = hardware.set_led(index, true) {
                    warn!("{}", e);
                    continue;
                }
                tokio::time::sleep(Duration::from_millis(200)).await;
                hardware.set_led(index, false)?;
            }
            _ = tokio::signal::ctrl_c() => {
                println!("Exit signal received");
                break;
            }
        }
    }

    hardware.shutdown();
    println!("GPIO resources released");
    Ok(())
}

// =============================================================================
// CHECK-CONFIG
// =============================================================================

fn check_config(config: &KioskConfig) -> anyhow::Result<()> {
    let agility = &config.agility;
    let quiz = &config.quiz;

    println!("Agility: {} buttons, max {} points, {} points lost per ms", agility.buttons_count, agility.max_score, agility.penalty_per_ms);
    for secs in [1u64, 2, 3, 5, 10, 15, 20, 30] {
        let elapsed = Duration::from_secs(secs);
        println!(
            "  {:>7} -> {:>6}",
            format_elapsed(elapsed),
            agility_score(elapsed, agility.max_score, agility.penalty_per_ms)
        );
    }

    println!("Quiz: {} rounds, {} points per right answer", quiz.rounds, quiz.points_per_correct);
    for correct in 0..=quiz.rounds {
        println!(
            "  {}/{} right -> {:>6}",
            correct,
            quiz.rounds,
            quiz_score(correct, quiz.points_per_correct)
        );
    }

    println!("Combined:");
    let scenarios = [
        ("fast and sharp", 3, quiz.rounds),
        ("average", 8, quiz.rounds / 2),
        ("slow", 15, quiz.rounds.min(1)),
    ];
    for (label, secs, correct) in scenarios {
        let total = agility_score(Duration::from_secs(secs), agility.max_score, agility.penalty_per_ms)
            + quiz_score(correct, quiz.points_per_correct);
        println!("  {:<15} {:>3}s, {}/{} right -> {:>6}", label, secs, correct, quiz.rounds, total);
    }

    let store = ScoreStore::from_config(&config.paths);
    let bank = store.load_questions();
    println!("Question bank: {} valid questions in {}", bank.len(), store.questions_path().display());
    if bank.len() < quiz.rounds as usize {
        bail!(
            "question bank has {} questions but {} rounds are configured",
            bank.len(),
            quiz.rounds
        );
    }
    println!("Configuration OK");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_commands() {
        assert_eq!(parse_console_line("3"), Some(ConsoleInput::Press(3)));
        assert_eq!(parse_console_line(" p "), Some(ConsoleInput::Event(KioskEvent::Proceed)));
        assert_eq!(
            parse_console_line("a 2"),
            Some(ConsoleInput::Event(KioskEvent::Answer { option: 2 }))
        );
        assert_eq!(parse_console_line("k abc"), Some(ConsoleInput::Type("abc".into())));
        assert_eq!(parse_console_line("q"), Some(ConsoleInput::Quit));
        assert_eq!(parse_console_line("a"), None);
        assert_eq!(parse_console_line("jump"), None);
    }

    #[test]
    fn test_cli_parses_preset() {
        let cli = Cli::try_parse_from(["stand-game", "--preset", "kids", "run", "--simulate"]).unwrap();
        assert_eq!(cli.preset, Some(Preset::Kids));
        assert!(matches!(cli.command, Some(Command::Run { simulate: true })));
    }
}
