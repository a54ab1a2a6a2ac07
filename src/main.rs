use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use termsearch::config::SearchConfig;
use termsearch::error::SearchError;
use termsearch::index::{self, IndexReader, PostingCache};
use termsearch::output;
use termsearch::query::{MergeOp, QueryExecutor, RankedResults};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "termsearch")]
#[command(about = "Ranked term search over positional posting lists")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an index from a directory of text files
    Index {
        /// Directory to index
        corpus: PathBuf,

        /// Where to store the index
        #[arg(short = 'p', long = "path")]
        index_path: PathBuf,

        /// Only index files matching this glob
        #[arg(long)]
        include: Option<String>,

        /// Suppress progress output
        #[arg(short, long)]
        silent: bool,
    },
    /// Search the index
    Search {
        /// Index path
        #[arg(short = 'p', long = "path")]
        index_path: PathBuf,

        /// Query term (repeatable)
        #[arg(short = 't', long = "term", required = true)]
        terms: Vec<String>,

        /// How terms combine: AND or OR
        #[arg(short = 'o', long = "op", default_value = "OR")]
        op: String,

        /// Results per page
        #[arg(long)]
        page_size: Option<usize>,

        /// Maximum number of results kept
        #[arg(long)]
        capacity: Option<usize>,

        /// Disable the term proximity bonus
        #[arg(long)]
        no_proximity: bool,

        /// Serve this term's posting list from memory (repeatable)
        #[arg(long = "cache-term")]
        cache_terms: Vec<String>,

        /// Config file (defaults to the user config directory)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
    /// Show index statistics
    Stats {
        /// Index path
        #[arg(short = 'p', long = "path")]
        index_path: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Index {
            corpus,
            index_path,
            include,
            silent,
        } => {
            index::build::build_index(&corpus, &index_path, include.as_deref(), silent)?;
        }
        Commands::Search {
            index_path,
            terms,
            op,
            page_size,
            capacity,
            no_proximity,
            cache_terms,
            config,
            no_color,
        } => {
            let mut config = SearchConfig::load(config.as_deref())?;
            if let Some(page_size) = page_size {
                config.page_size = page_size;
            }
            if let Some(capacity) = capacity {
                config.result_capacity = capacity;
            }
            if no_proximity {
                config.proximity = false;
            }

            run_search(&index_path, &terms, MergeOp::parse(&op), &cache_terms, &config, !no_color)?;
        }
        Commands::Stats { index_path } => {
            index::stats::show_stats(&index_path)?;
        }
    }

    Ok(())
}

fn run_search(
    index_path: &std::path::Path,
    terms: &[String],
    op: MergeOp,
    cache_terms: &[String],
    config: &SearchConfig,
    color: bool,
) -> Result<()> {
    let reader = IndexReader::open(index_path)?;

    let cache = PostingCache::new(config.posting_cache_capacity.max(cache_terms.len()));
    for term in cache_terms {
        let normalized = termsearch::utils::normalize_term(term);
        if !cache
            .warm(&reader, &normalized)
            .with_context(|| format!("Failed to cache posting list of `{}'", term))?
        {
            tracing::warn!(term = %normalized, "cannot cache posting list: term not found");
        }
    }

    let executor = QueryExecutor::new(&reader, config).with_cache(&cache);
    let results = match executor.execute_query(terms, op) {
        Ok(results) => results,
        Err(err @ SearchError::UndefinedMergeOp) => {
            // Configuration error: report it and show an empty result set
            eprintln!("error: {}", err);
            RankedResults::default()
        }
        Err(err) => return Err(err.into()),
    };

    output::print_pages(&results, &reader, config.page_size, config.max_text_bytes, color)?;
    Ok(())
}
