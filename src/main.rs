use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use hampath::bench::{run_benchmark, BenchConfig, Density};
use hampath::graph::{Graph, MAX_VERTICES};
use hampath::solver::{Algorithm, Outcome};
use hampath::watchdog::{budget_from_secs, solve_with_budget, RunStatus};
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit status of `solve` when the budget expires.
const EXIT_TIMEOUT: u8 = 3;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = cli().get_matches();
    let result = match matches.subcommand() {
        Some(("solve", sub)) => solve(sub),
        Some(("bench", sub)) => bench(sub).map(|()| ExitCode::SUCCESS),
        _ => unreachable!("clap enforces a subcommand"),
    };

    result.unwrap_or_else(|e| {
        eprintln!("error: {e:#}");
        ExitCode::FAILURE
    })
}

fn cli() -> Command {
    Command::new("hampath")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Exact Hamiltonian path decision by backtracking or subset DP")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("solve")
                .about("Decide one graph; prints YES or NO")
                .arg(
                    Arg::new("input")
                        .value_name("FILE")
                        .help("Edge-list file: `n m` header then m lines `v u`")
                        .value_parser(value_parser!(PathBuf))
                        .required_unless_present("random")
                        .conflicts_with("random"),
                )
                .arg(
                    Arg::new("algorithm")
                        .short('a')
                        .long("algorithm")
                        .help("Solver to use")
                        .value_parser(["bt", "dp"])
                        .default_value("bt"),
                )
                .arg(
                    Arg::new("stats")
                        .long("stats")
                        .help("Print work counters to stderr")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("random")
                        .long("random")
                        .value_name("N")
                        .help("Solve a random G(n, p) graph on N vertices instead of a file")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("density")
                        .long("density")
                        .help("Density class of the random graph (default: sparse)")
                        .value_parser(["sparse", "dense"])
                        .requires("random"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Seed of the random graph (default: from entropy)")
                        .value_parser(value_parser!(u64))
                        .requires("random"),
                )
                .arg(
                    Arg::new("timeout")
                        .long("timeout")
                        .value_name("SECS")
                        .help("Give up after this many seconds and print TIMEOUT")
                        .value_parser(value_parser!(f64)),
                ),
        )
        .subcommand(
            Command::new("bench")
                .about("Run the benchmark sweep and write results.csv / summary.csv")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_name("FILE")
                        .help("TOML file with sweep settings; flags below override it")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("sizes")
                        .long("sizes")
                        .value_name("N,..")
                        .help("Vertex counts to sweep")
                        .value_delimiter(',')
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("densities")
                        .long("densities")
                        .value_name("D,..")
                        .help("Density classes to sweep")
                        .value_delimiter(',')
                        .value_parser(["sparse", "dense"]),
                )
                .arg(
                    Arg::new("instances")
                        .long("instances")
                        .value_name("K")
                        .help("Instances per (size, density)")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Base seed")
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    Arg::new("timeout")
                        .long("timeout")
                        .value_name("SECS")
                        .help("Per-solve budget in seconds")
                        .value_parser(value_parser!(f64))
                        .conflicts_with("no-timeout"),
                )
                .arg(
                    Arg::new("no-timeout")
                        .long("no-timeout")
                        .help("Let every solve run to completion")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("algorithms")
                        .long("algorithms")
                        .value_name("A,..")
                        .help("Solvers to run on each instance")
                        .value_delimiter(',')
                        .value_parser(["bt", "dp"]),
                )
                .arg(
                    Arg::new("out-dir")
                        .short('o')
                        .long("out-dir")
                        .value_name("DIR")
                        .help("Directory for instances and result files")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("dot")
                        .long("dot")
                        .help("Also write a Graphviz .dot file per instance")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("parallel")
                        .long("parallel")
                        .help("Run instances in parallel (timings become noisier)")
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn solve(m: &ArgMatches) -> anyhow::Result<ExitCode> {
    let algorithm: Algorithm = m
        .get_one::<String>("algorithm")
        .map_or(Ok(Algorithm::Backtracking), |s| s.parse::<Algorithm>())?;

    let graph = if let Some(&n) = m.get_one::<usize>("random") {
        let density: Density = m
            .get_one::<String>("density")
            .map_or(Ok(Density::Sparse), |s| s.parse::<Density>())?;
        if n > MAX_VERTICES {
            bail!("--random {n}: at most {MAX_VERTICES} vertices are supported");
        }
        let mut rng = match m.get_one::<u64>("seed") {
            Some(&seed) => XorShiftRng::seed_from_u64(seed),
            None => XorShiftRng::from_os_rng(),
        };
        Graph::new_random(n, density.edge_probability(n), &mut rng)
    } else {
        let path = m
            .get_one::<PathBuf>("input")
            .context("an input file or --random is required")?;
        Graph::load_from_file(path).with_context(|| format!("reading {}", path.display()))?
    };

    let budget = match m.get_one::<f64>("timeout") {
        Some(&secs) => match budget_from_secs(secs) {
            Some(budget) => Some(budget),
            None => bail!("--timeout {secs}: expected a positive number of seconds"),
        },
        None => None,
    };

    log::debug!(
        "solving n={} m={} with {algorithm}",
        graph.order(),
        graph.edge_count()
    );
    let report = solve_with_budget(algorithm, &graph, budget);
    print_status(
        algorithm,
        report.status,
        m.get_flag("stats"),
        io::stdout().lock(),
        io::stderr().lock(),
    )
}

/// Prints the verdict token alone on `out` and, when asked, the `[stats]` line on `err`.
fn print_status(
    algorithm: Algorithm,
    status: RunStatus<Outcome>,
    stats: bool,
    mut out: impl Write,
    mut err: impl Write,
) -> anyhow::Result<ExitCode> {
    match status {
        RunStatus::Ok(outcome) => {
            writeln!(out, "{}", outcome.verdict)?;
            if stats {
                writeln!(err, "{}", outcome.metrics)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        RunStatus::Timeout => {
            writeln!(out, "TIMEOUT")?;
            Ok(ExitCode::from(EXIT_TIMEOUT))
        }
        RunStatus::Error(msg) => bail!("{algorithm}: {msg}"),
    }
}

fn bench(m: &ArgMatches) -> anyhow::Result<()> {
    let mut cfg = match m.get_one::<PathBuf>("config") {
        Some(path) => BenchConfig::load(path)?,
        None => BenchConfig::default(),
    };

    if let Some(sizes) = m.get_many::<usize>("sizes") {
        cfg.sizes = sizes.copied().collect();
    }
    if let Some(densities) = m.get_many::<String>("densities") {
        cfg.densities = densities
            .map(|s| s.parse::<Density>())
            .collect::<Result<_, _>>()?;
    }
    if let Some(&k) = m.get_one::<usize>("instances") {
        cfg.instances_per_config = k;
    }
    if let Some(&seed) = m.get_one::<u64>("seed") {
        cfg.base_seed = seed;
    }
    if let Some(&secs) = m.get_one::<f64>("timeout") {
        cfg.timeout_secs = Some(secs);
    }
    if m.get_flag("no-timeout") {
        cfg.timeout_secs = None;
    }
    if let Some(algorithms) = m.get_many::<String>("algorithms") {
        cfg.algorithms = algorithms
            .map(|s| s.parse::<Algorithm>())
            .collect::<Result<_, _>>()?;
    }
    if let Some(dir) = m.get_one::<PathBuf>("out-dir") {
        cfg.out_dir.clone_from(dir);
    }
    cfg.write_dot |= m.get_flag("dot");
    cfg.parallel |= m.get_flag("parallel");

    let records = run_benchmark(&cfg)?;
    let timeouts = records
        .iter()
        .filter(|r| r.status == RunStatus::Timeout)
        .count();
    log::info!("{} runs, {timeouts} timed out", records.len());
    Ok(())
}
