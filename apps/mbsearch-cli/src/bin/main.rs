use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mbsearch_core::config::Config;
use mbsearch_core::payload_loader::PayloadLoader;
use mbsearch_core::traits::SearchCore;
use mbsearch_core::types::SearchRequest;
use mbsearch_index::{CoreIndexer, CoreSchema, CoreSearcher};
use mbsearch_writer::{WriterRegistry, XML_WRITER};

/// Index MusicBrainz entity payloads and answer searches with MMD documents.
#[derive(Parser, Debug)]
#[command(name = "mbsearch", version)]
struct Cli {
    /// Directory holding config.toml
    #[arg(long, env = "MBSEARCH_CONFIG_DIR", default_value = ".")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rebuild a core's index from its payload directory
    Index {
        #[arg(long)]
        core: String,

        /// Override the configured payload directory
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Index at most this many payload files
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Run a query and print the response document
    Query {
        #[arg(long)]
        core: String,

        #[arg(short = 'q', long = "query", default_value = "*:*")]
        query: String,

        /// Field list; the core's default applies when omitted
        #[arg(long)]
        fl: Option<String>,

        #[arg(long, default_value_t = 0)]
        start: usize,

        #[arg(long, default_value_t = 25)]
        rows: usize,

        /// Response writer name
        #[arg(long, default_value = XML_WRITER)]
        wt: String,
    },
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = Config::load_from(&cli.config_dir).map_err(|e| { eprintln!("Error loading config: {}", e); e })?;

    match cli.command {
        Commands::Index { core, dir, limit } => run_index(&config, &core, dir, limit),
        Commands::Query { core, query, fl, start, rows, wt } => {
            let mut request = SearchRequest::new(query).with_page(start, rows).with_writer(wt);
            if let Some(fl) = fl {
                request = request.with_field_list(&fl);
            }
            run_query(&config, &core, &request)
        }
    }
}

fn run_index(config: &Config, name: &str, dir: Option<PathBuf>, limit: Option<usize>) -> anyhow::Result<()> {
    let core = config.core(name)?;
    let payload_dir = match dir.or_else(|| core.payload_path(config.base_dir())) {
        Some(dir) => dir,
        None => anyhow::bail!("core '{}' has no payload_dir; pass --dir", name),
    };
    let index_dir = core.index_path(config.base_dir());
    info!(core = name, payloads = %payload_dir.display(), index = %index_dir.display(), "rebuilding core");

    let loader = PayloadLoader::new();
    let payloads = match limit {
        Some(limit) => loader.load_directory_limited(&payload_dir, limit)?,
        None => loader.load_directory(&payload_dir)?,
    };
    let indexer = CoreIndexer::create_in_dir(index_dir, CoreSchema::from_config(&core)?)?;
    let report = indexer.index_payloads(&payloads)?;
    eprintln!("Indexed {} {} documents ({} skipped)", report.indexed, core.writer.entity_type, report.skipped);
    Ok(())
}

fn run_query(config: &Config, name: &str, request: &SearchRequest) -> anyhow::Result<()> {
    let core = config.core(name)?;
    let registry = WriterRegistry::for_core(&core.writer)?;
    let Some(writer) = registry.get(&request.writer_name) else {
        let known: Vec<_> = registry.names().collect();
        eprintln!("Unknown writer '{}' (available: {})", request.writer_name, known.join(", "));
        std::process::exit(1);
    };

    let searcher = CoreSearcher::open_in_dir(&core.index_path(config.base_dir()), CoreSchema::from_config(&core)?)?;
    let result = searcher.execute(request)?;

    let mut body = Vec::new();
    if let Err(e) = writer.write(&mut body, request, &result) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&body)?;
    stdout.write_all(b"\n")?;
    stdout.flush()?;
    Ok(())
}
