//! Benchmark sweep: generate `G(n, p)` instances, time both solvers on each, and write
//! per-run results and per-configuration summaries as CSV.

use crate::graph::{Graph, MAX_VERTICES};
use crate::solver::{Algorithm, Outcome};
use crate::watchdog::{budget_from_secs, solve_with_budget, RunStatus};
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Configuration
// ============================================================================

/// Edge density class of a generated instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    /// Expected degree about 4, capped at `p = 0.2`.
    Sparse,
    /// `p = 0.8`.
    Dense,
}

impl Density {
    /// Both classes, sparse first.
    pub const ALL: [Density; 2] = [Density::Sparse, Density::Dense];

    /// Edge probability for an `n`-vertex instance of this class.
    pub fn edge_probability(self, n: usize) -> f64 {
        if n <= 1 {
            return 0.0;
        }
        match self {
            Density::Dense => 0.8,
            Density::Sparse => (4.0 / n as f64).min(0.2),
        }
    }

    /// Keeps sparse and dense seeds of the same `n` apart.
    fn seed_offset(self) -> u64 {
        match self {
            Density::Sparse => 0,
            Density::Dense => 500,
        }
    }

    /// Lowercase name used in file names and result files.
    pub fn tag(self) -> &'static str {
        match self {
            Density::Sparse => "sparse",
            Density::Dense => "dense",
        }
    }
}

impl fmt::Display for Density {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Unrecognized density name.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown density {0:?}, expected `sparse` or `dense`")]
pub struct ParseDensityError(String);

impl FromStr for Density {
    type Err = ParseDensityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sparse" => Ok(Density::Sparse),
            "dense" => Ok(Density::Dense),
            _ => Err(ParseDensityError(s.to_string())),
        }
    }
}

/// Benchmark sweep parameters.
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    /// Vertex counts to sweep.
    pub sizes: Vec<usize>,
    /// Density classes to sweep.
    pub densities: Vec<Density>,
    /// Instances generated per `(n, density)`.
    pub instances_per_config: usize,
    /// Base of the per-instance seed.
    pub base_seed: u64,
    /// Per-solve wall-clock budget; `None` waits indefinitely.
    pub timeout_secs: Option<f64>,
    /// Solvers to run on every instance, in order.
    pub algorithms: Vec<Algorithm>,
    /// Root directory for everything the sweep writes.
    pub out_dir: PathBuf,
    /// Subdirectory of `out_dir` receiving instance files.
    pub instances_dir: String,
    /// Per-run results file name inside `out_dir`.
    pub results_file: String,
    /// Summary file name inside `out_dir`.
    pub summary_file: String,
    /// Also write a Graphviz `.dot` file per instance.
    pub write_dot: bool,
    /// Run instances on the rayon pool instead of one after another.
    pub parallel: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            sizes: vec![5, 6, 9, 11, 16, 20],
            densities: Density::ALL.to_vec(),
            instances_per_config: 5,
            base_seed: 12_345,
            timeout_secs: Some(2.0),
            algorithms: Algorithm::ALL.to_vec(),
            out_dir: PathBuf::from("."),
            instances_dir: "instances".to_string(),
            results_file: "results.csv".to_string(),
            summary_file: "summary.csv".to_string(),
            write_dot: false,
            parallel: false,
        }
    }
}

impl BenchConfig {
    /// Parses a TOML document; missing keys keep their defaults.
    ///
    /// # Errors
    /// Returns an error on malformed TOML, unknown keys, or invalid values.
    pub fn from_toml_str(text: &str) -> Result<Self, BenchError> {
        let cfg: Self = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads and parses a TOML config file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BenchError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| BenchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks values the type system cannot.
    ///
    /// # Errors
    /// Returns [`BenchError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), BenchError> {
        if let Some(&n) = self.sizes.iter().find(|&&n| n > MAX_VERTICES) {
            return Err(BenchError::Invalid(format!(
                "sizes: {n} exceeds the {MAX_VERTICES}-vertex limit"
            )));
        }
        self.timeout()?;
        if self.algorithms.is_empty() {
            return Err(BenchError::Invalid("algorithms: at least one is required".into()));
        }
        Ok(())
    }

    /// The per-solve budget as a [`Duration`].
    ///
    /// # Errors
    /// Returns [`BenchError::Invalid`] if `timeout_secs` is not positive or does not fit
    /// in a [`Duration`].
    pub fn timeout(&self) -> Result<Option<Duration>, BenchError> {
        self.timeout_secs
            .map(|secs| {
                budget_from_secs(secs).ok_or_else(|| {
                    BenchError::Invalid(format!(
                        "timeout_secs: expected a positive number of seconds, got {secs}"
                    ))
                })
            })
            .transpose()
    }

    fn instances_path(&self) -> PathBuf {
        self.out_dir.join(&self.instances_dir)
    }

    /// Enumerates every instance of the sweep: sizes, then densities, then ids.
    pub fn instances(&self) -> Vec<InstanceSpec> {
        let mut specs = Vec::new();
        for &n in &self.sizes {
            for &density in &self.densities {
                for id in 0..self.instances_per_config {
                    specs.push(InstanceSpec::new(self.base_seed, n, density, id));
                }
            }
        }
        specs
    }
}

/// Errors of the benchmark driver and its configuration.
#[derive(Debug, Error)]
pub enum BenchError {
    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The config file is not valid TOML for [`BenchConfig`].
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
    /// A config value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

fn io_at(path: &Path) -> impl FnOnce(io::Error) -> BenchError + '_ {
    move |source| BenchError::Io {
        path: path.to_path_buf(),
        source,
    }
}

// ============================================================================
// Instances
// ============================================================================

/// One generated instance of the sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstanceSpec {
    /// Vertex count.
    pub n: usize,
    /// Density class.
    pub density: Density,
    /// Index within its `(n, density)` configuration.
    pub id: usize,
    /// Seed of the generator for this instance.
    pub seed: u64,
}

impl InstanceSpec {
    /// Derives the seed as `base + n*1000 + density offset + id`, so each instance can be
    /// regenerated on its own.
    pub fn new(base_seed: u64, n: usize, density: Density, id: usize) -> Self {
        let seed = base_seed + n as u64 * 1000 + density.seed_offset() + id as u64;
        Self {
            n,
            density,
            id,
            seed,
        }
    }

    /// File stem shared by the instance's files.
    pub fn name(&self) -> String {
        format!(
            "n{}_{}_id{}_seed{}",
            self.n, self.density, self.id, self.seed
        )
    }

    /// Samples the instance graph.
    pub fn generate(&self) -> Graph {
        let mut rng = XorShiftRng::seed_from_u64(self.seed);
        Graph::new_random(self.n, self.density.edge_probability(self.n), &mut rng)
    }
}

// ============================================================================
// Running
// ============================================================================

/// One solver run on one instance.
#[derive(Clone, Debug, PartialEq)]
pub struct RunRecord {
    /// Solver used.
    pub algorithm: Algorithm,
    /// The instance.
    pub instance: InstanceSpec,
    /// How the run ended; carries verdict and metrics when `ok`.
    pub status: RunStatus<Outcome>,
    /// Wall-clock seconds.
    pub seconds: f64,
    /// Path of the saved edge list.
    pub instance_file: PathBuf,
    /// Path of the saved DOT file, if written.
    pub dot_file: Option<PathBuf>,
}

impl RunRecord {
    fn outcome(&self) -> Option<&Outcome> {
        match &self.status {
            RunStatus::Ok(outcome) => Some(outcome),
            _ => None,
        }
    }
}

/// Runs the whole sweep and writes instances, results and summary under `cfg.out_dir`.
///
/// # Errors
/// Returns an error if the configuration is invalid or a file cannot be written.
/// Timeouts and solver errors are recorded, not returned.
pub fn run_benchmark(cfg: &BenchConfig) -> Result<Vec<RunRecord>, BenchError> {
    cfg.validate()?;
    let budget = cfg.timeout()?;
    let instances_dir = cfg.instances_path();
    fs::create_dir_all(&instances_dir).map_err(io_at(&instances_dir))?;

    let specs = cfg.instances();
    log::info!(
        "benchmark: {} instances x {} algorithms, timeout {:?}, {}",
        specs.len(),
        cfg.algorithms.len(),
        budget,
        if cfg.parallel { "parallel" } else { "sequential" }
    );

    let per_instance: Vec<Vec<RunRecord>> = if cfg.parallel {
        specs
            .par_iter()
            .map(|spec| run_instance(cfg, spec, &instances_dir))
            .collect::<Result<_, _>>()?
    } else {
        specs
            .iter()
            .map(|spec| run_instance(cfg, spec, &instances_dir))
            .collect::<Result<_, _>>()?
    };
    let records: Vec<RunRecord> = per_instance.into_iter().flatten().collect();

    let results_path = cfg.out_dir.join(&cfg.results_file);
    write_file(&results_path, |w| write_results_csv(&records, w))?;

    let summary = summarize(&records);
    for row in &summary {
        log::info!(
            "{} n={} {}: ok={}/{} timeouts={} yes={} median={}",
            row.algorithm,
            row.n,
            row.density,
            row.ok,
            row.runs,
            row.timeouts,
            row.yes,
            row.median_seconds
                .map_or_else(|| "-".to_string(), |s| format!("{s:.6}s"))
        );
    }
    let summary_path = cfg.out_dir.join(&cfg.summary_file);
    write_file(&summary_path, |w| write_summary_csv(&summary, w))?;

    log::info!(
        "wrote {} and {}",
        results_path.display(),
        summary_path.display()
    );
    Ok(records)
}

/// Generates and saves one instance, then runs every configured algorithm on it.
///
/// # Errors
/// Returns an error if an instance file cannot be written.
pub fn run_instance(
    cfg: &BenchConfig,
    spec: &InstanceSpec,
    instances_dir: &Path,
) -> Result<Vec<RunRecord>, BenchError> {
    let graph = spec.generate();
    let name = spec.name();

    let instance_file = instances_dir.join(format!("{name}.txt"));
    graph
        .save_to_file(&instance_file)
        .map_err(io_at(&instance_file))?;

    let dot_file = if cfg.write_dot {
        let path = instances_dir.join(format!("{name}.dot"));
        let title = format!("{name} (p={:.3})", spec.density.edge_probability(spec.n));
        write_file(&path, |w| graph.write_dot(w, &title))?;
        Some(path)
    } else {
        None
    };

    log::debug!("{name}: {} edges", graph.edge_count());
    let budget = cfg.timeout()?;
    Ok(cfg
        .algorithms
        .iter()
        .map(|&algorithm| {
            let report = solve_with_budget(algorithm, &graph, budget);
            RunRecord {
                algorithm,
                instance: *spec,
                status: report.status,
                seconds: report.elapsed.as_secs_f64(),
                instance_file: instance_file.clone(),
                dot_file: dot_file.clone(),
            }
        })
        .collect())
}

fn write_file<F>(path: &Path, body: F) -> Result<(), BenchError>
where
    F: FnOnce(&mut BufWriter<fs::File>) -> io::Result<()>,
{
    let file = fs::File::create(path).map_err(io_at(path))?;
    let mut w = BufWriter::new(file);
    body(&mut w).and_then(|()| w.flush()).map_err(io_at(path))
}

// ============================================================================
// Results
// ============================================================================

fn opt<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(String::new, |v| v.to_string())
}

/// Writes one row per run.
///
/// # Errors
/// Returns an error if writing fails.
pub fn write_results_csv<W: Write>(records: &[RunRecord], w: W) -> io::Result<()> {
    let mut out = csv::Writer::from_writer(w);
    out.write_record([
        "algorithm",
        "n_vertices",
        "density",
        "instance_id",
        "seed",
        "status",
        "verdict",
        "seconds",
        "metric_1",
        "metric_2",
        "instance_file",
        "dot_file",
        "message",
    ])?;
    for r in records {
        let outcome = r.outcome();
        let message = match &r.status {
            RunStatus::Error(msg) => msg.as_str(),
            _ => "",
        };
        let dot_file = r
            .dot_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let fields: [&str; 13] = [
            r.algorithm.tag(),
            &r.instance.n.to_string(),
            r.instance.density.tag(),
            &r.instance.id.to_string(),
            &r.instance.seed.to_string(),
            r.status.label(),
            &opt(outcome.map(|o| o.verdict)),
            &format!("{:.6}", r.seconds),
            &opt(outcome.map(|o| o.metrics.metric_1())),
            &opt(outcome.and_then(|o| o.metrics.metric_2())),
            &r.instance_file.display().to_string(),
            &dot_file,
            message,
        ];
        out.write_record(fields)?;
    }
    out.flush()
}

/// Aggregate over all runs of one `(algorithm, n, density)`.
#[derive(Clone, Debug, PartialEq)]
pub struct SummaryRow {
    /// Solver.
    pub algorithm: Algorithm,
    /// Vertex count.
    pub n: usize,
    /// Density class.
    pub density: Density,
    /// Total runs.
    pub runs: usize,
    /// Runs that finished.
    pub ok: usize,
    /// Runs that hit the budget.
    pub timeouts: usize,
    /// Runs that failed.
    pub errors: usize,
    /// Finished runs answering `YES`.
    pub yes: usize,
    /// Mean seconds over finished runs.
    pub mean_seconds: Option<f64>,
    /// Median seconds over finished runs.
    pub median_seconds: Option<f64>,
    /// Mean of the first metric over finished runs.
    pub mean_metric_1: Option<f64>,
    /// Mean of the second metric over finished runs that report it.
    pub mean_metric_2: Option<f64>,
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

/// Groups records by `(algorithm, n, density)`, ordered by algorithm, then `n`, then density.
pub fn summarize(records: &[RunRecord]) -> Vec<SummaryRow> {
    let mut groups: BTreeMap<(Algorithm, usize, Density), Vec<&RunRecord>> = BTreeMap::new();
    for r in records {
        groups
            .entry((r.algorithm, r.instance.n, r.instance.density))
            .or_default()
            .push(r);
    }

    groups
        .into_iter()
        .map(|((algorithm, n, density), runs)| {
            let finished: Vec<(&RunRecord, &Outcome)> = runs
                .iter()
                .filter_map(|&r| r.outcome().map(|o| (r, o)))
                .collect();
            let mut seconds: Vec<f64> = finished.iter().map(|(r, _)| r.seconds).collect();
            let metric_1: Vec<f64> = finished
                .iter()
                .map(|(_, o)| o.metrics.metric_1() as f64)
                .collect();
            let metric_2: Vec<f64> = finished
                .iter()
                .filter_map(|(_, o)| o.metrics.metric_2())
                .map(|m| m as f64)
                .collect();

            SummaryRow {
                algorithm,
                n,
                density,
                runs: runs.len(),
                ok: finished.len(),
                timeouts: runs
                    .iter()
                    .filter(|r| r.status == RunStatus::Timeout)
                    .count(),
                errors: runs
                    .iter()
                    .filter(|r| matches!(r.status, RunStatus::Error(_)))
                    .count(),
                yes: finished.iter().filter(|(_, o)| o.verdict.exists()).count(),
                mean_seconds: mean(&seconds),
                median_seconds: median(&mut seconds),
                mean_metric_1: mean(&metric_1),
                mean_metric_2: mean(&metric_2),
            }
        })
        .collect()
}

/// Writes one row per [`SummaryRow`].
///
/// # Errors
/// Returns an error if writing fails.
pub fn write_summary_csv<W: Write>(rows: &[SummaryRow], w: W) -> io::Result<()> {
    let fixed = |v: Option<f64>, digits: usize| v.map_or_else(String::new, |x| format!("{x:.digits$}"));
    let mut out = csv::Writer::from_writer(w);
    out.write_record([
        "algorithm",
        "n_vertices",
        "density",
        "runs",
        "ok",
        "timeouts",
        "errors",
        "yes",
        "mean_seconds",
        "median_seconds",
        "mean_metric_1",
        "mean_metric_2",
    ])?;
    for row in rows {
        let fields: [&str; 12] = [
            row.algorithm.tag(),
            &row.n.to_string(),
            row.density.tag(),
            &row.runs.to_string(),
            &row.ok.to_string(),
            &row.timeouts.to_string(),
            &row.errors.to_string(),
            &row.yes.to_string(),
            &fixed(row.mean_seconds, 6),
            &fixed(row.median_seconds, 6),
            &fixed(row.mean_metric_1, 1),
            &fixed(row.mean_metric_2, 1),
        ];
        out.write_record(fields)?;
    }
    out.flush()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::parse_edge_list;
    use crate::metrics::{BacktrackMetrics, DpMetrics, Metrics};
    use crate::solver::Solution;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A fresh directory under the system temp dir, removed on drop.
    struct Scratch(PathBuf);

    impl Scratch {
        fn new(label: &str) -> Self {
            static NEXT: AtomicUsize = AtomicUsize::new(0);
            let dir = std::env::temp_dir().join(format!(
                "hampath-{label}-{}-{}",
                std::process::id(),
                NEXT.fetch_add(1, Ordering::Relaxed)
            ));
            fs::create_dir_all(&dir).unwrap();
            Self(dir)
        }
    }

    impl Drop for Scratch {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    fn record(algorithm: Algorithm, status: RunStatus<Outcome>, seconds: f64) -> RunRecord {
        RunRecord {
            algorithm,
            instance: InstanceSpec::new(0, 5, Density::Sparse, 0),
            status,
            seconds,
            instance_file: PathBuf::from("instances/a.txt"),
            dot_file: None,
        }
    }

    fn ok_bt(found: bool, calls: u64) -> RunStatus<Outcome> {
        RunStatus::Ok(Solution::new(found, BacktrackMetrics { recursive_calls: calls }).erase())
    }

    #[test]
    fn density_probabilities() {
        assert_eq!(Density::Dense.edge_probability(10), 0.8);
        assert_eq!(Density::Sparse.edge_probability(10), 0.2);
        assert_eq!(Density::Sparse.edge_probability(40), 0.1);
        assert_eq!(Density::Dense.edge_probability(1), 0.0);
        assert_eq!(Density::Sparse.edge_probability(0), 0.0);
    }

    #[test]
    fn seeds_follow_the_sweep_scheme() {
        let spec = InstanceSpec::new(12_345, 9, Density::Dense, 3);
        assert_eq!(spec.seed, 12_345 + 9_000 + 500 + 3);
        assert_eq!(spec.name(), "n9_dense_id3_seed21848");
        assert_eq!(InstanceSpec::new(12_345, 9, Density::Sparse, 3).seed, 21_348);
    }

    #[test]
    fn generated_instances_are_reproducible() {
        let spec = InstanceSpec::new(1, 12, Density::Dense, 0);
        assert_eq!(spec.generate(), spec.generate());
        assert_eq!(spec.generate().order(), 12);
    }

    #[test]
    fn instances_enumerate_in_sweep_order() {
        let cfg = BenchConfig {
            sizes: vec![4, 6],
            instances_per_config: 2,
            ..BenchConfig::default()
        };
        let specs = cfg.instances();
        assert_eq!(specs.len(), 2 * 2 * 2);
        assert_eq!((specs[0].n, specs[0].density, specs[0].id), (4, Density::Sparse, 0));
        assert_eq!((specs[3].n, specs[3].density, specs[3].id), (4, Density::Dense, 1));
        assert_eq!(specs[7].n, 6);
    }

    #[test]
    fn config_defaults_and_overrides_from_toml() {
        let cfg = BenchConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, BenchConfig::default());
        assert_eq!(cfg.timeout().unwrap(), Some(Duration::from_secs(2)));

        let cfg = BenchConfig::from_toml_str(
            "sizes = [4, 7]\ndensities = [\"dense\"]\nalgorithms = [\"dp\"]\ntimeout_secs = 0.5\nparallel = true\n",
        )
        .unwrap();
        assert_eq!(cfg.sizes, vec![4, 7]);
        assert_eq!(cfg.densities, vec![Density::Dense]);
        assert_eq!(cfg.algorithms, vec![Algorithm::SubsetDp]);
        assert_eq!(cfg.timeout().unwrap(), Some(Duration::from_millis(500)));
        assert!(cfg.parallel);
        assert_eq!(cfg.instances_per_config, 5);
    }

    #[test]
    fn config_rejects_bad_values() {
        assert!(matches!(
            BenchConfig::from_toml_str("bogus = 1"),
            Err(BenchError::Config(_))
        ));
        assert!(matches!(
            BenchConfig::from_toml_str("densities = [\"medium\"]"),
            Err(BenchError::Config(_))
        ));
        assert!(matches!(
            BenchConfig::from_toml_str("sizes = [65]"),
            Err(BenchError::Invalid(_))
        ));
        assert!(matches!(
            BenchConfig::from_toml_str("timeout_secs = -1.0"),
            Err(BenchError::Invalid(_))
        ));
        assert!(matches!(
            BenchConfig::from_toml_str("timeout_secs = 1e20"),
            Err(BenchError::Invalid(_))
        ));
        assert!(matches!(
            BenchConfig::from_toml_str("timeout_secs = inf"),
            Err(BenchError::Invalid(_))
        ));
        assert!(matches!(
            BenchConfig::from_toml_str("algorithms = []"),
            Err(BenchError::Invalid(_))
        ));
    }

    #[test]
    fn awkward_fields_survive_a_csv_reader() {
        let mut r = record(
            Algorithm::SubsetDp,
            RunStatus::Error("said \"no\",\nthen left".into()),
            0.0,
        );
        r.instance_file = PathBuf::from("dir, with comma/a.txt");
        let mut buf = Vec::new();
        write_results_csv(&[r], &mut buf).unwrap();

        let mut reader = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 13);
        assert_eq!(&rows[0][5], "error");
        assert_eq!(&rows[0][10], "dir, with comma/a.txt");
        assert_eq!(&rows[0][12], "said \"no\",\nthen left");
    }

    #[test]
    fn oversized_timeout_is_rejected_before_running() {
        let cfg = BenchConfig {
            timeout_secs: Some(1e20),
            ..BenchConfig::default()
        };
        assert!(matches!(cfg.timeout(), Err(BenchError::Invalid(_))));
        assert!(matches!(run_benchmark(&cfg), Err(BenchError::Invalid(_))));
    }

    #[test]
    fn results_rows_leave_missing_values_empty() {
        let records = vec![
            record(Algorithm::Backtracking, ok_bt(true, 12), 0.25),
            record(Algorithm::SubsetDp, RunStatus::Timeout, 2.0),
            record(Algorithm::SubsetDp, RunStatus::Error("too big, sorry".into()), 0.0),
        ];
        let mut buf = Vec::new();
        write_results_csv(&records, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("algorithm,n_vertices,density"));
        assert_eq!(
            lines[1],
            "bt,5,sparse,0,5000,ok,YES,0.250000,12,,instances/a.txt,,"
        );
        assert_eq!(
            lines[2],
            "dp,5,sparse,0,5000,timeout,,2.000000,,,instances/a.txt,,"
        );
        assert!(lines[3].ends_with(",\"too big, sorry\""));
    }

    #[test]
    fn summary_aggregates_finished_runs_only() {
        let dp = |found, states, transitions| {
            RunStatus::Ok(
                Solution::new(
                    found,
                    DpMetrics {
                        states_visited: states,
                        transitions,
                    },
                )
                .erase(),
            )
        };
        let records = vec![
            record(Algorithm::SubsetDp, dp(true, 10, 20), 1.0),
            record(Algorithm::SubsetDp, dp(false, 30, 40), 3.0),
            record(Algorithm::SubsetDp, RunStatus::Timeout, 2.0),
            record(Algorithm::Backtracking, ok_bt(false, 8), 0.5),
            record(Algorithm::Backtracking, ok_bt(true, 4), 1.5),
            record(Algorithm::Backtracking, ok_bt(true, 6), 0.1),
        ];
        let rows = summarize(&records);
        assert_eq!(rows.len(), 2);

        let bt = &rows[0];
        assert_eq!(bt.algorithm, Algorithm::Backtracking);
        assert_eq!((bt.runs, bt.ok, bt.timeouts, bt.errors, bt.yes), (3, 3, 0, 0, 2));
        assert_eq!(bt.median_seconds, Some(0.5));
        assert_eq!(bt.mean_metric_1, Some(6.0));
        assert_eq!(bt.mean_metric_2, None);

        let dp = &rows[1];
        assert_eq!((dp.runs, dp.ok, dp.timeouts, dp.yes), (3, 2, 1, 1));
        assert_eq!(dp.mean_seconds, Some(2.0));
        assert_eq!(dp.median_seconds, Some(2.0));
        assert_eq!(dp.mean_metric_1, Some(20.0));
        assert_eq!(dp.mean_metric_2, Some(30.0));

        let mut buf = Vec::new();
        write_summary_csv(&rows, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\nbt,5,sparse,3,3,0,0,2,0.700000,0.500000,6.0,\n"));
    }

    #[test]
    fn sweep_writes_instances_results_and_summary() {
        let scratch = Scratch::new("sweep");
        let cfg = BenchConfig {
            sizes: vec![1, 5, 8],
            instances_per_config: 2,
            timeout_secs: Some(10.0),
            out_dir: scratch.0.clone(),
            write_dot: true,
            ..BenchConfig::default()
        };

        let records = run_benchmark(&cfg).unwrap();
        assert_eq!(records.len(), 3 * 2 * 2 * 2);
        assert!(records.iter().all(|r| r.status.label() == "ok"));

        // Both solvers agree on every instance.
        for pair in records.chunks(2) {
            let verdicts: Vec<_> = pair.iter().map(|r| r.outcome().map(|o| o.verdict)).collect();
            assert_eq!(verdicts[0], verdicts[1], "{:?}", pair[0].instance);
        }

        let spec = InstanceSpec::new(cfg.base_seed, 8, Density::Dense, 1);
        let saved = scratch.0.join("instances").join(format!("{}.txt", spec.name()));
        let text = fs::read_to_string(&saved).unwrap();
        assert_eq!(parse_edge_list(&text).unwrap(), spec.generate());
        assert!(scratch
            .0
            .join("instances")
            .join(format!("{}.dot", spec.name()))
            .exists());

        let results = fs::read_to_string(scratch.0.join("results.csv")).unwrap();
        assert_eq!(results.lines().count(), 1 + records.len());
        let summary = fs::read_to_string(scratch.0.join("summary.csv")).unwrap();
        assert_eq!(summary.lines().count(), 1 + 2 * 3 * 2);
    }

    #[test]
    fn parallel_sweep_matches_sequential() {
        let scratch = Scratch::new("par");
        let sequential = BenchConfig {
            sizes: vec![6, 7],
            instances_per_config: 3,
            timeout_secs: None,
            out_dir: scratch.0.clone(),
            ..BenchConfig::default()
        };
        let parallel = BenchConfig {
            parallel: true,
            ..sequential.clone()
        };

        let strip = |records: Vec<RunRecord>| -> Vec<(Algorithm, InstanceSpec, Option<Metrics>)> {
            records
                .into_iter()
                .map(|r| (r.algorithm, r.instance, r.outcome().map(|o| o.metrics)))
                .collect()
        };
        assert_eq!(
            strip(run_benchmark(&sequential).unwrap()),
            strip(run_benchmark(&parallel).unwrap())
        );
    }

    #[test]
    fn unwritable_out_dir_is_io_error() {
        let scratch = Scratch::new("blocked");
        let blocker = scratch.0.join("file");
        fs::write(&blocker, "not a directory").unwrap();
        let cfg = BenchConfig {
            sizes: vec![3],
            instances_per_config: 1,
            out_dir: blocker,
            ..BenchConfig::default()
        };
        assert!(matches!(run_benchmark(&cfg), Err(BenchError::Io { .. })));
    }
}
