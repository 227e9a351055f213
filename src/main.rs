use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gitdot_core::{
    load_branch_colours, CachedPrLookup, GitdotConfig, JsonFileStore, MergeInfoSource,
    MergeInformant, PrLookup, RangeGatherer, Repository,
};
use graph::{parse_records, DotWriter, GraphAnalyser, MergeDecorator};
use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "gitdot")]
#[command(about = "Render commit ancestry as a Graphviz graph, squashing linear history", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read "%p -> %h" records and print the squashed graph as DOT
    Render(RenderArgs),
    /// Read commit ranges from stdin and print their unique log lines
    Gather {
        /// Path to the repository
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        /// Cache of the previous run's ranges and lines
        #[arg(long, default_value = ".gitdot/ranges.json")]
        cache: PathBuf,
    },
    /// Print the ranges around the merge base of two diverged commits
    Pincer {
        /// The two commits to compare
        #[arg(num_args = 2, required = true)]
        commits: Vec<String>,
        /// Path to the repository
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },
    /// Check whether one commit is an ancestor of another
    Descendant {
        /// Queried ancestor commit
        #[arg(long)]
        anc: String,
        /// Possible descendant commit
        #[arg(long)]
        desc: String,
        /// Path to the repository
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },
}

#[derive(Args)]
struct RenderArgs {
    /// Read records from a file instead of stdin
    #[arg(short, long, conflicts_with = "range")]
    input: Option<PathBuf>,
    /// Walk these commit ranges in the repository instead of reading records
    #[arg(short, long)]
    range: Vec<String>,
    /// Path to the repository
    #[arg(long, default_value = ".")]
    repo: PathBuf,
    /// Tool configuration (GitHub repository and token variable)
    #[arg(long, default_value = "gitdot.json")]
    config: PathBuf,
    /// Destination branch -> colour table
    #[arg(long, default_value = "branch_colours.json")]
    colours: PathBuf,
    /// Pull request lookup cache
    #[arg(long, default_value = ".gitdot/pr_cache.json")]
    pr_cache: PathBuf,
    /// Skip merge metadata lookup entirely
    #[arg(long)]
    no_metadata: bool,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // stdout carries the graph
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn read_stdin_lines() -> Result<Vec<String>> {
    io::stdin()
        .lock()
        .lines()
        .collect::<io::Result<_>>()
        .context("Failed to read stdin")
}

fn read_records(args: &RenderArgs) -> Result<Vec<String>> {
    if !args.range.is_empty() {
        let repo = Repository::open(&args.repo)?;
        return gitdot_core::collect_log_lines(&repo, &args.range);
    }

    match &args.input {
        Some(path) => Ok(fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
            .lines()
            .map(str::to_string)
            .collect()),
        None => read_stdin_lines(),
    }
}

/// Resolve merge metadata for every merge commit still in the graph
async fn decorate_merges(
    args: &RenderArgs,
    analyser: &GraphAnalyser,
    decorator: &mut MergeDecorator,
) -> Result<()> {
    let repo = match Repository::open(&args.repo) {
        Ok(repo) => repo,
        Err(e) => {
            warn!("Merge metadata unavailable: {:#}", e);
            return Ok(());
        }
    };

    let config = GitdotConfig::load(&args.config)?;
    let cached_lookup = match config.github_lookup(|var| std::env::var(var).ok())? {
        Some(github) => Some(Arc::new(CachedPrLookup::load(
            github,
            Box::new(JsonFileStore::new(&args.pr_cache)),
        )?)),
        None => None,
    };
    let pr_lookup = cached_lookup.clone().map(|l| l as Arc<dyn PrLookup>);

    let informant = MergeInformant::new(&repo, pr_lookup);
    for merge in analyser.merge_commits() {
        match informant.merge_info(merge).await {
            Ok(info) => decorator.add_info(merge, info),
            Err(e) => warn!("No merge metadata for {}: {:#}", merge, e),
        }
    }

    if let Some(lookup) = cached_lookup {
        lookup.save()?;
    }
    Ok(())
}

async fn render(args: RenderArgs) -> Result<()> {
    let lines = read_records(&args)?;
    let records = parse_records(&lines)?;

    let mut analyser = GraphAnalyser::new();
    let summary = analyser.process(&records)?;
    let stats = analyser.graph().stats();
    info!(
        records = records.len(),
        squashed = summary.removed_commits,
        commits = stats.total_commits,
        merges = stats.merge_commits,
        "Built commit graph"
    );

    let mut decorator = MergeDecorator::new(load_branch_colours(&args.colours)?);
    if !args.no_metadata {
        decorate_merges(&args, &analyser, &mut decorator).await?;
    }

    print!("{}", DotWriter::new(&decorator).render(&analyser.snapshot()));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Render(args) => render(args).await?,
        Commands::Gather { repo, cache } => {
            let repo = Repository::open(&repo)?;
            let ranges = read_stdin_lines()?;
            let mut gatherer = RangeGatherer::load(JsonFileStore::new(cache))?;
            for line in gatherer.gather(&repo, &ranges)? {
                println!("{}", line);
            }
        }
        Commands::Pincer { commits, repo } => {
            let repo = Repository::open(&repo)?;
            match repo.pincer_ranges(&commits[0], &commits[1])? {
                Some(ranges) => {
                    for range in ranges {
                        println!("{}", range);
                    }
                }
                None => eprintln!(
                    "Direct lineage detected between {} and {}",
                    commits[0], commits[1]
                ),
            }
        }
        Commands::Descendant { anc, desc, repo } => {
            let repo = Repository::open(&repo)?;
            let verdict = if repo.is_ancestor(&anc, &desc) { "is" } else { "is not" };
            println!("{} {} an ancestor of {}", anc, verdict, desc);
        }
    }

    Ok(())
}
