use anyhow::Result;
use clap::{Parser, ValueEnum};

use graph_community_analyzer::cluster::{
    betweenness, community_map, count_partitions, density, louvain,
};
use graph_community_analyzer::config::AnalysisConfig;
use graph_community_analyzer::data;
use graph_community_analyzer::graph::pruning::{self, PrunePolicy};
use graph_community_analyzer::{path, rank, storage, GraphError};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Use --prune-value as the threshold directly
    Fixed,
    /// Use the --prune-value percentile of the weight distribution
    Percentile,
    /// Use the first quartile of the weight distribution
    LowerQuartile,
    /// Use the median of the weight distribution
    Median,
}

#[derive(Parser, Debug)]
#[clap(
    name = "graph-community-analyzer",
    about = "Community and centrality analysis of weighted undirected graphs"
)]
struct Cli {
    /// Path to the input JSON graph document
    #[clap(long)]
    input: String,

    /// Output directory for results
    #[clap(long, default_value = "analysis_results")]
    output_dir: String,

    /// Pruning threshold policy
    #[clap(long, value_enum, default_value = "lower-quartile")]
    prune_policy: PolicyArg,

    /// Threshold weight (fixed policy) or percentile 0-100 (percentile policy)
    #[clap(long, default_value = "0.0")]
    prune_value: f64,

    /// Number of top-authority nodes to report
    #[clap(long, default_value = "5")]
    top_k: usize,

    /// Number of divisive betweenness steps to run
    #[clap(long, default_value = "1")]
    betweenness_steps: usize,

    /// Dendrogram level to report (defaults to the coarsest)
    #[clap(long)]
    level: Option<usize>,

    /// Start node id for an optional shortest-path query
    #[clap(long, requires = "path_to")]
    path_from: Option<String>,

    /// End node id for an optional shortest-path query
    #[clap(long, requires = "path_from")]
    path_to: Option<String>,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    // Set number of threads
    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    let config = AnalysisConfig {
        prune_policy: match args.prune_policy {
            PolicyArg::Fixed => PrunePolicy::Fixed(args.prune_value),
            PolicyArg::Percentile => PrunePolicy::Percentile(args.prune_value),
            PolicyArg::LowerQuartile => PrunePolicy::LowerQuartile,
            PolicyArg::Median => PrunePolicy::Median,
        },
        top_k: args.top_k,
        betweenness_steps: args.betweenness_steps,
        partition_level: args.level,
        ..AnalysisConfig::default()
    };

    log::info!("Starting graph community analysis");
    log::info!("Input: {}", args.input);
    log::info!("Output: {}", args.output_dir);

    // Create output directory
    std::fs::create_dir_all(&args.output_dir)?;

    // 1. Load the graph document
    let graph = data::load_graph(&args.input)?;

    // 2. Prune low-weight edges
    let pruned = pruning::prune(&graph, &config.prune_policy)?;
    let mut working = pruned.graph;

    // 3. Edge-weight distribution summary
    let weights = pruning::weight_summary(&working);

    // 4. HITS ranking
    let scores = rank::hits(&working, config.hits_epsilon, config.hits_max_iterations);
    let top = rank::top_k(&working, &scores, config.top_k, rank::RankBy::Authority);
    for (rank_pos, &idx) in top.iter().enumerate() {
        log::info!("HITS {} : {}", rank_pos, working.node(idx).label);
    }

    // 5. Community detection and densities
    let dendrogram = louvain::detect(&working);
    let partition = dendrogram
        .partition(config.partition_level.unwrap_or(usize::MAX))
        .clone();
    log::info!("Reporting {} communities", count_partitions(&partition));

    let report = match density::densities(&working, &community_map(&partition)) {
        Ok(report) => {
            log::info!(
                "Internal density = {} - External density = {}",
                report.internal_density,
                report.external_density
            );
            Some(report)
        }
        Err(err) => {
            log::warn!("Density computation skipped: {}", err);
            None
        }
    };

    // 6. Optional shortest-path query, answered before any edge removal.
    // An unknown endpoint is a caller mistake and fails the run; a
    // disconnected pair is only worth a warning, the other results
    // still get saved.
    if let (Some(from), Some(to)) = (&args.path_from, &args.path_to) {
        match path::shortest_path(&working, from, to) {
            Ok(route) => {
                log::info!("Shortest path {} -> {}: {}", from, to, route.join(" -> "));
            }
            Err(err @ GraphError::NodeNotFound { .. }) => return Err(err.into()),
            Err(err) => log::warn!("Shortest path query failed: {}", err),
        }
    }

    // 7. Divisive betweenness steps
    let stats = storage::GraphStats::capture(&working);
    let mut steps = Vec::new();
    for _ in 0..config.betweenness_steps {
        match betweenness::step(&mut working) {
            Ok(step) => steps.push(step),
            Err(err) => {
                log::warn!("Stopping betweenness iteration: {}", err);
                break;
            }
        }
    }

    // 8. Save results
    storage::save_results(
        &working,
        stats,
        &scores,
        &top,
        &dendrogram,
        &partition,
        report.as_ref(),
        weights.as_ref(),
        &steps,
        &args.output_dir,
    )?;

    log::info!("Analysis complete. Results saved to {}", args.output_dir);

    Ok(())
}
