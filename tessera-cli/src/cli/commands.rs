//! Command implementations and argument parsing for the tessera CLI.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tracing::{Span, field, info, instrument, warn};

use tessera_core::{
    ClusteringResult, ExecutionStrategy, QualityError, Tessera, TesseraBuilder, TesseraError,
    silhouette_score,
};
use tessera_providers_csv::{CsvPointsProvider, CsvProviderError, write_clustered_csv};

const DEFAULT_POINTS_PER_TILE: usize = 128;

/// Silhouette level below which the run is flagged as a parameter-selection
/// warning.
const SILHOUETTE_WARN_BOUND: f64 = 0.8;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "tessera", about = "Execute the tessera clustering pipeline.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Cluster a point table and report the labelling.
    Run(RunCommand),
}

/// Backend selection tokens accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BackendArg {
    /// Let the library pick the best compiled-in backend.
    Auto,
    /// Single-threaded execution.
    Serial,
    /// Multi-threaded CPU execution.
    Parallel,
    /// Prefer a GPU backend when one is available.
    Gpu,
}

impl From<BackendArg> for ExecutionStrategy {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Auto => Self::Auto,
            BackendArg::Serial => Self::Serial,
            BackendArg::Parallel => Self::Parallel,
            BackendArg::Gpu => Self::GpuPreferred,
        }
    }
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Critical radius for the density estimate.
    #[arg(long = "critical-distance")]
    pub critical_distance: f32,

    /// Density a point must reach to seed a cluster.
    #[arg(long = "density-threshold")]
    pub density_threshold: f32,

    /// Search radius for the nearest higher-density neighbour
    /// (defaults to the critical distance).
    #[arg(long = "follower-distance")]
    pub follower_distance: Option<f32>,

    /// Distance beyond which a dense point roots its own cluster
    /// (defaults to the critical distance).
    #[arg(long = "seed-distance")]
    pub seed_distance: Option<f32>,

    /// Average number of points per spatial tile.
    #[arg(long = "points-per-tile", default_value_t = DEFAULT_POINTS_PER_TILE)]
    pub points_per_tile: usize,

    /// Execution backend.
    #[arg(long, value_enum, default_value_t = BackendArg::Auto)]
    pub backend: BackendArg,

    /// Write the clustered table to this path.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Input data source configuration.
    #[command(subcommand)]
    pub source: RunSource,
}

/// Input data sources supported by the driver.
#[derive(Debug, Subcommand, Clone)]
pub enum RunSource {
    /// Cluster a CSV coordinate table.
    Csv(CsvArgs),
}

/// CSV ingestion arguments.
#[derive(Debug, Args, Clone)]
pub struct CsvArgs {
    /// Path to the CSV file: coordinate columns, optional trailing weight.
    pub path: PathBuf,

    /// Number of coordinate columns.
    #[arg(long, default_value_t = 2)]
    pub dimensions: usize,

    /// Override name for the point cloud (defaults to the file name).
    #[arg(long)]
    pub name: Option<String>,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The configured dimensionality was zero.
    #[error("--dimensions must be at least 1")]
    ZeroDimensions,
    /// CSV ingestion or export failed.
    #[error(transparent)]
    Csv(#[from] CsvProviderError),
    /// Core construction or execution failed.
    #[error(transparent)]
    Core(#[from] TesseraError),
    /// Writing the clustered table failed.
    #[error("failed to write `{path}`: {source}")]
    Output {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Name of the clustered point cloud.
    pub cloud: String,
    /// Labels produced by the pipeline.
    pub result: ClusteringResult,
    /// Silhouette score, when at least two clusters were found.
    pub silhouette: Option<f64>,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when parsing or execution fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use tessera_cli::cli::{BackendArg, Cli, Command, CsvArgs, RunCommand, RunSource, run_cli};
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "x0,x1\n0.0,0.0\n0.5,0.5\n9.0,9.0\n")?;
/// let cli = Cli {
///     command: Command::Run(RunCommand {
///         critical_distance: 1.0,
///         density_threshold: 1.0,
///         follower_distance: None,
///         seed_distance: None,
///         points_per_tile: 128,
///         backend: BackendArg::Serial,
///         output: None,
///         source: RunSource::Csv(CsvArgs {
///             path: file.path().to_path_buf(),
///             dimensions: 2,
///             name: None,
///         }),
///     }),
/// };
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.result.labels().len(), 3);
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => {
            Span::current().record("command", field::display("run"));
            run_command(run)
        }
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command),
    fields(backend = field::Empty, path = field::Empty),
)]
pub(super) fn run_command(command: RunCommand) -> Result<ExecutionSummary, CliError> {
    let tessera = build_tessera(&command)?;

    let RunSource::Csv(args) = command.source;
    let span = Span::current();
    span.record("backend", field::debug(command.backend));
    span.record("path", field::display(args.path.display()));

    let dimensions = NonZeroUsize::new(args.dimensions).ok_or(CliError::ZeroDimensions)?;
    let chosen_name = derive_cloud_name(&args.path, args.name.as_deref());
    let provider = CsvPointsProvider::try_from_path(chosen_name, &args.path, dimensions)?;

    let cloud = provider.cloud();
    let result = tessera.run(cloud)?;

    let silhouette = score_quality(cloud, &result);

    if let Some(path) = &command.output {
        let file = File::create(path).map_err(|source| CliError::Output {
            path: path.clone(),
            source,
        })?;
        write_clustered_csv(BufWriter::new(file), cloud, result.labels())?;
        info!(path = %path.display(), "clustered table written");
    }

    info!(
        cloud = provider.name(),
        clusters = result.cluster_count(),
        outliers = result.outlier_count(),
        "command completed"
    );
    Ok(ExecutionSummary {
        cloud: provider.name().to_owned(),
        result,
        silhouette,
    })
}

fn build_tessera(command: &RunCommand) -> Result<Tessera, CliError> {
    let mut builder = TesseraBuilder::new(command.critical_distance, command.density_threshold)
        .with_points_per_tile(command.points_per_tile)
        .with_execution_strategy(command.backend.into());
    if let Some(distance) = command.follower_distance {
        builder = builder.with_follower_distance(distance);
    }
    if let Some(distance) = command.seed_distance {
        builder = builder.with_seed_distance(distance);
    }
    Ok(builder.build()?)
}

/// Scores the labelling and warns when it looks degenerate. A poor score is
/// a parameter-selection hint, never a failure.
fn score_quality(
    cloud: &tessera_core::PointCloud,
    result: &ClusteringResult,
) -> Option<f64> {
    match silhouette_score(cloud, result.labels()) {
        Ok(score) => {
            if score < SILHOUETTE_WARN_BOUND {
                warn!(
                    score,
                    "silhouette score is low - this could be due to parameter selection"
                );
            }
            Some(score)
        }
        // A single cluster or an all-outlier labelling is not scorable.
        Err(QualityError::TooFewClusters { .. } | QualityError::LabelLengthMismatch { .. }) => None,
    }
}

pub(super) fn derive_cloud_name(path: &std::path::Path, override_name: Option<&str>) -> String {
    if let Some(name) = override_name {
        return name.to_owned();
    }

    path.file_stem()
        .and_then(|value| value.to_str())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| "point_cloud".to_owned())
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "cloud: {}", summary.cloud)?;
    writeln!(writer, "clusters: {}", summary.result.cluster_count())?;
    writeln!(writer, "outliers: {}", summary.result.outlier_count())?;
    if let Some(score) = summary.silhouette {
        writeln!(writer, "silhouette: {score:.3}")?;
    }
    for (index, label) in summary.result.labels().iter().enumerate() {
        writeln!(writer, "{index}\t{}", label.as_i64())?;
    }
    Ok(())
}
