#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
use anyhow::{Context, bail};
#[cfg(not(target_arch = "wasm32"))]
use blockfall::{Command, DropOutcome, GameConfig, Session};
#[cfg(not(target_arch = "wasm32"))]
use log::{LevelFilter, Log, Metadata, Record};
#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

/// Plays a seeded session from a script and prints the final frame as JSON.
///
/// Script letters: `L` left, `R` right, `U` rotate, `D` soft drop, `H` hard drop,
/// `.` lets one full gravity interval pass. Whitespace is ignored.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug)]
struct Opts {
    /// Command script to replay
    #[arg(long, default_value = "")]
    script: String,
    /// Seed for the shape generator
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(long, default_value_t = blockfall::DEFAULT_WIDTH)]
    width: usize,
    #[arg(long, default_value_t = blockfall::DEFAULT_HEIGHT)]
    height: usize,
    /// JSON game config; replaces --seed, --width and --height
    #[arg(long)]
    config: Option<PathBuf>,
    /// Pretty-print the JSON frame
    #[arg(long)]
    pretty: bool,
}

#[cfg(not(target_arch = "wasm32"))]
struct StderrLogger;

#[cfg(not(target_arch = "wasm32"))]
impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

#[cfg(not(target_arch = "wasm32"))]
static LOGGER: StderrLogger = StderrLogger;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    log::set_logger(&LOGGER)
        .map(|()| log::set_max_level(LevelFilter::Info))
        .map_err(|e| anyhow::anyhow!("installing logger: {e}"))?;
    let config = match opts.config.as_ref() {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            GameConfig::from_json(&raw).map_err(anyhow::Error::msg)?
        }
        None => GameConfig {
            width: opts.width,
            height: opts.height,
            seed: Some(opts.seed),
            ..GameConfig::default()
        },
    };

    let mut session = Session::new(&config).map_err(anyhow::Error::msg)?;
    let mut landed = 0u32;
    for (idx, step) in opts.script.chars().filter(|c| !c.is_whitespace()).enumerate() {
        if session.is_game_over() {
            eprintln!("game over after {idx} steps, rest of script skipped");
            break;
        }
        let outcome =
            step_once(&mut session, step).with_context(|| format!("script position {idx}"))?;
        if outcome.is_some_and(|o| o.landed) {
            landed += 1;
        }
    }

    eprintln!(
        "pieces landed {landed}, score {}, lines {}, level {}",
        session.score(),
        session.lines(),
        session.level()
    );
    let frame = session.snapshot();
    let json = if opts.pretty {
        serde_json::to_string_pretty(&frame)?
    } else {
        serde_json::to_string(&frame)?
    };
    println!("{json}");
    Ok(())
}

// `.` waits just past one drop interval so gravity fires exactly once.
#[cfg(not(target_arch = "wasm32"))]
fn step_once(session: &mut Session, step: char) -> anyhow::Result<Option<DropOutcome>> {
    let outcome = match step.to_ascii_uppercase() {
        'L' => session.apply(Command::MoveLeft),
        'R' => session.apply(Command::MoveRight),
        'U' => session.apply(Command::Rotate),
        'D' => session.apply(Command::SoftDrop),
        'H' => session.apply(Command::HardDrop),
        '.' => session.advance(session.drop_interval_ms() as f32 + 1.0),
        other => bail!("unknown script step {other:?}"),
    };
    Ok(outcome)
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use blockfall::{Sequence, Tetromino};

    fn t_session() -> Session {
        Session::with_randomizer(10, 20, Box::new(Sequence::new(vec![Tetromino::T])))
            .expect("10x20 board is valid")
    }

    #[test]
    fn letters_map_to_commands() {
        let mut session = t_session();
        let start = session.current().clone();

        assert_eq!(step_once(&mut session, 'l').unwrap(), None);
        assert_eq!(session.current().x(), start.x() - 1);
        assert_eq!(step_once(&mut session, 'R').unwrap(), None);
        assert_eq!(session.current().x(), start.x());

        step_once(&mut session, 'U').unwrap();
        assert_ne!(session.current().matrix(), start.matrix());

        let before = session.current().y();
        let outcome = step_once(&mut session, 'D').unwrap().expect("soft drop reports");
        assert!(!outcome.landed);
        assert_eq!(session.current().y(), before + 1);

        let outcome = step_once(&mut session, 'h').unwrap().expect("hard drop reports");
        assert!(outcome.landed);
    }

    #[test]
    fn dot_lets_gravity_drop_once() {
        let mut session = t_session();
        let y = session.current().y();
        let outcome = step_once(&mut session, '.').unwrap().expect("gravity fired");
        assert!(!outcome.landed);
        assert_eq!(session.current().y(), y + 1);
    }

    #[test]
    fn unknown_steps_fail() {
        let mut session = t_session();
        let before = session.current().clone();
        let err = step_once(&mut session, 'X').unwrap_err();
        assert!(err.to_string().contains("unknown script step"));
        assert_eq!(session.current(), &before);
    }
}
