use std::error::Error;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{execute, queue};
use rand::rngs::StdRng;
use rand::SeedableRng;

use klotski::{
    random_walk, BoardState, Dedupe, Move, PuzzleDefinition, Session, Shape, SolverConfig, SolverStatus,
};

/// Solve the classic sliding-block puzzle and replay the solution.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Start from a random position this many legal moves away from the classic layout.
    #[arg(long)]
    scramble: Option<usize>,

    /// Seed for --scramble.
    #[arg(long)]
    seed: Option<u64>,

    /// Pause between replayed moves.
    #[arg(long, default_value_t = 150)]
    delay_ms: u64,

    /// Treat same-shape pieces as distinct while searching (much slower).
    #[arg(long)]
    exact: bool,

    /// Overrides KLOTSKI_MAX_EXPANSIONS.
    #[arg(long)]
    max_expansions: Option<usize>,

    /// Print the move list instead of animating it.
    #[arg(long)]
    no_replay: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(code) => code,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode, Box<dyn Error>> {
    let mut config = SolverConfig::from_env()?;
    if let Some(max_expansions) = args.max_expansions {
        config.max_expansions = max_expansions;
    }
    if args.exact {
        config.dedupe = Dedupe::Exact;
    }

    let mut definition = PuzzleDefinition::classic();
    if let Some(steps) = args.scramble {
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let scrambled = random_walk(&definition.initial_state(), steps, &mut rng);
        definition = definition.starting_from(&scrambled)?;
    }

    let mut session = Session::new(Arc::new(definition));
    println!("Initial Puzzle:\n{}", session.state());

    let stopwatch = Instant::now();
    session.begin_solve(config)?;
    while *session.poll_solver() == SolverStatus::Solving {
        thread::sleep(Duration::from_millis(20));
    }

    let moves = match session.status() {
        SolverStatus::Solved(moves) => moves.clone(),
        SolverStatus::Failed(err) => {
            eprintln!("No solution found: {err}");
            return Ok(ExitCode::FAILURE);
        }
        SolverStatus::Idle | SolverStatus::Solving => return Ok(ExitCode::FAILURE),
    };
    println!(
        "Found optimal solution with {} moves in {:.2?}",
        moves.len(),
        stopwatch.elapsed()
    );

    let Some(replay) = session.replay() else {
        return Ok(ExitCode::FAILURE);
    };

    if args.no_replay {
        for mv in &moves {
            println!("{}", mv);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut stdout = io::stdout();
    let total = moves.len();
    for (i, frame) in replay.enumerate() {
        let (mv, state) = frame?;
        draw(&mut stdout, &state, i + 1, total, mv)?;
        thread::sleep(Duration::from_millis(args.delay_ms));
    }

    Ok(ExitCode::SUCCESS)
}

fn color_of(shape: Shape) -> Color {
    match shape {
        Shape::Square => Color::Red,
        Shape::Tall => Color::Blue,
        Shape::Wide => Color::Green,
        Shape::Single => Color::Yellow,
    }
}

fn draw(out: &mut impl Write, state: &BoardState, step: usize, total: usize, mv: Move) -> io::Result<()> {
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    queue!(out, Print(format!("Move {step}/{total}: {mv}\n\n")))?;

    for row in state.grid() {
        for cell in row {
            match cell.and_then(|id| Some((id, state.shape(id)?))) {
                Some((id, shape)) => queue!(
                    out,
                    SetBackgroundColor(color_of(shape)),
                    SetForegroundColor(Color::Black),
                    Print(format!(" {:>2} ", id.0)),
                    ResetColor
                )?,
                None => queue!(out, Print("  . "))?,
            }
        }
        queue!(out, Print("\n"))?;
    }

    out.flush()
}
