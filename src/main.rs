use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Key, Term};
use fifteen_solver::{
    scramble, solve_staged, AStar, Bfs, Board, Direction, Heuristic, Iddfs, Policy, Session,
    Strategy,
};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "fifteen-solver", about = "Staged A* solver for the 15-puzzle")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Play in the terminal: arrows or WASD slide, `m` scrambles, `x` solves,
    /// `z` undoes, `r` resets, `q` quits.
    Play {
        #[command(flatten)]
        policy: PolicyArgs,
        /// Seed for scrambles (random if omitted)
        #[arg(long)]
        seed: Option<u64>,
        /// Number of slides per scramble
        #[arg(long, default_value_t = 50)]
        scramble: usize,
        /// Delay between animated slides, in milliseconds
        #[arg(long, default_value_t = 80)]
        delay: u64,
    },
    /// Solve the board stored in a file.
    Solve {
        /// Board file: four rows of four cells, blank written as `.` or 16
        board: PathBuf,
        #[command(flatten)]
        policy: PolicyArgs,
        #[arg(long, value_enum, default_value_t = StrategyOpt::Astar)]
        strategy: StrategyOpt,
        /// Estimate guiding A*
        #[arg(long, value_enum, default_value_t = HeuristicOpt::Manhattan)]
        heuristic: HeuristicOpt,
    },
    /// Compare policies on random scrambles, solved in parallel.
    Bench {
        /// Number of boards
        #[arg(long, default_value_t = 100)]
        count: u64,
        /// Scramble length
        #[arg(long, default_value_t = 50)]
        moves: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Built-in policies to compare
        #[arg(long, value_delimiter = ',', default_values_t = [7, 5, 4])]
        breaks: Vec<usize>,
        /// Estimates to compare, each run against every policy
        #[arg(long, value_enum, value_delimiter = ',', default_value = "manhattan")]
        heuristic: Vec<HeuristicOpt>,
        /// Also run BFS and IDDFS on the whole board (short scrambles only)
        #[arg(long)]
        uninformed: bool,
    },
}

#[derive(Debug, clap::Args)]
struct PolicyArgs {
    /// Stages of a built-in policy: 1, 2, 4, 5, 6 or 7
    #[arg(long, default_value_t = 7)]
    breaks: usize,
    /// Policy file, one target set per line; overrides --breaks
    #[arg(long)]
    policy: Option<PathBuf>,
}

impl PolicyArgs {
    fn load(&self) -> Result<Policy> {
        let Some(path) = &self.policy else {
            return Ok(Policy::breaks(self.breaks)?);
        };
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read the policy {}", path.display()))?;
        data.parse::<Policy>().context("Failed to parse the policy")
    }
}

type BoxedStrategy = Box<dyn Strategy + Send + Sync>;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyOpt {
    Astar,
    Bfs,
    Iddfs,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HeuristicOpt {
    Null,
    Misplaced,
    Manhattan,
}

impl From<HeuristicOpt> for Heuristic {
    fn from(opt: HeuristicOpt) -> Self {
        match opt {
            HeuristicOpt::Null => Heuristic::Null,
            HeuristicOpt::Misplaced => Heuristic::Misplaced,
            HeuristicOpt::Manhattan => Heuristic::Manhattan,
        }
    }
}

impl StrategyOpt {
    fn strategy(self, heuristic: Heuristic) -> BoxedStrategy {
        match self {
            StrategyOpt::Astar => Box::new(AStar::new(heuristic)),
            StrategyOpt::Bfs => Box::new(Bfs),
            StrategyOpt::Iddfs => Box::new(Iddfs::default()),
        }
    }
}

enum Action {
    Exit,
    Slide(Direction),
    Scramble,
    Solve,
    Undo,
    Reset,
}

impl TryFrom<Key> for Action {
    type Error = ();

    fn try_from(key: Key) -> Result<Self, Self::Error> {
        Ok(match key {
            Key::ArrowLeft | Key::Char('a') => Self::Slide(Direction::Left),
            Key::ArrowRight | Key::Char('d') => Self::Slide(Direction::Right),
            Key::ArrowUp | Key::Char('w') => Self::Slide(Direction::Up),
            Key::ArrowDown | Key::Char('s') => Self::Slide(Direction::Down),
            Key::Char('S') | Key::Char('m') => Self::Scramble,
            Key::Char('x') | Key::Enter => Self::Solve,
            Key::Escape | Key::Char('q') => Self::Exit,
            Key::Char('z') => Self::Undo,
            Key::Char('r') => Self::Reset,
            _ => return Err(()),
        })
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .init();

    match Args::parse().command {
        Command::Play {
            policy,
            seed,
            scramble,
            delay,
        } => play(
            policy.load()?,
            seed,
            scramble,
            Duration::from_millis(delay),
        ),
        Command::Solve {
            board,
            policy,
            strategy,
            heuristic,
        } => solve_file(board, policy.load()?, strategy.strategy(heuristic.into())),
        Command::Bench {
            count,
            moves,
            seed,
            breaks,
            heuristic,
            uninformed,
        } => {
            let heuristics = heuristic
                .into_iter()
                .map(Heuristic::from)
                .collect::<Vec<_>>();
            bench(count, moves, seed, &breaks, &heuristics, uninformed)
        }
    }
}

fn play(policy: Policy, seed: Option<u64>, scramble_moves: usize, delay: Duration) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut session = Session::new(Board::solved());

    let term = Term::stderr();
    loop {
        term.clear_screen()?;
        eprintln!("{}", session.board());
        if session.board().is_solved() {
            eprintln!("{}", style("Solved").green());
        }

        let action = loop {
            if let Ok(action) = Action::try_from(term.read_key()?) {
                break action;
            }
        };

        let ret = match action {
            Action::Exit => break,
            // The tile on the opposite side of the blank slides in `dir`.
            Action::Slide(dir) => match session.board().blank().sibling(dir.reversed()) {
                Some(pos) => session.click(pos),
                None => continue,
            },
            Action::Scramble => session.start_scramble(scramble_moves, &mut rng).map(drop),
            Action::Solve => {
                eprintln!("{}", style("Solving...").dim());
                session
                    .start_solve(&AStar::default(), &policy, || {})
                    .map(drop)
            }
            Action::Undo => session.undo().map(drop),
            Action::Reset => session.reset(),
        };
        if let Err(err) = ret {
            log::warn!("{err}");
            continue;
        }

        loop {
            let phase = session.phase();
            let Some(pos) = session.step() else { break };
            term.clear_screen()?;
            eprintln!("{}", session.board());
            eprintln!(
                "{} {pos}, {} left",
                style(phase).cyan(),
                session.pending(),
            );
            std::thread::sleep(delay);
        }
    }

    Ok(())
}

fn solve_file(path: PathBuf, policy: Policy, strategy: BoxedStrategy) -> Result<()> {
    let data = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read the board {}", path.display()))?;
    let board = data.parse::<Board>().context("Failed to parse the board")?;

    let pb = ProgressBar::new_spinner().with_style(
        ProgressStyle::with_template("{spinner} {pos} expanded [{elapsed}] {per_sec}")
            .context("Invalid progress template")?,
    );
    let inst = Instant::now();
    let solution = solve_staged(&*strategy, &board, &policy, || pb.inc(1))?;
    pb.finish_and_clear();

    let steps = solution
        .actions
        .iter()
        .map(|pos| pos.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    println!("{steps}");
    print!("{}", solution.board);
    eprintln!(
        "{}: {} moves, {} expanded, {:?}",
        strategy.name(),
        solution.actions.len(),
        solution.expanded(),
        inst.elapsed(),
    );
    Ok(())
}

fn bench(
    count: u64,
    moves: usize,
    seed: u64,
    breaks: &[usize],
    heuristics: &[Heuristic],
    uninformed: bool,
) -> Result<()> {
    ensure!(count > 0, "Nothing to benchmark");

    let boards = (0..count)
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i));
            let actions = scramble(&Board::solved(), moves, &mut rng);
            actions
                .into_iter()
                .try_fold(Board::solved(), |board, action| board.apply(action))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut runs = Vec::new();
    for &heuristic in heuristics {
        for &n in breaks {
            let strategy = StrategyOpt::Astar.strategy(heuristic);
            let name = format!("{}/{n}", strategy.name());
            runs.push((name, strategy, Policy::breaks(n)?));
        }
    }
    if uninformed {
        if moves > 16 {
            log::warn!("BFS and IDDFS on {moves}-move scrambles may not finish");
        }
        for opt in [StrategyOpt::Bfs, StrategyOpt::Iddfs] {
            let strategy = opt.strategy(Heuristic::default());
            runs.push((strategy.name().to_owned(), strategy, Policy::single()));
        }
    }

    println!(
        "{:<18} {:>10} {:>12} {:>12}",
        style("policy").bold(),
        style("moves").bold(),
        style("expanded").bold(),
        style("time").bold(),
    );
    for (name, strategy, policy) in &runs {
        let bar_style = ProgressStyle::with_template("{msg:18} {wide_bar} {pos}/{len} [{elapsed}]")
            .context("Invalid progress template")?;
        let pb = ProgressBar::new(count)
            .with_message(name.clone())
            .with_style(bar_style);

        let inst = Instant::now();
        let results = boards
            .par_iter()
            .map(|board| -> Result<(usize, usize)> {
                let solution = solve_staged(&**strategy, board, policy, || {})?;
                pb.inc(1);
                Ok((solution.actions.len(), solution.expanded()))
            })
            .collect::<Result<Vec<_>>>()?;
        let elapsed = inst.elapsed();
        pb.finish_and_clear();

        let (total_moves, total_expanded) = results
            .iter()
            .fold((0, 0), |(m, e), &(moves, expanded)| (m + moves, e + expanded));
        println!(
            "{:<18} {:>10.1} {:>12.0} {:>12}",
            name,
            total_moves as f64 / count as f64,
            total_expanded as f64 / count as f64,
            format!("{elapsed:.2?}"),
        );
    }
    Ok(())
}
