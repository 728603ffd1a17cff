use clap::Parser;
use tapwater_sources::{RetrievalConfig, RetrievedDocument, Retriever};

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let loaded = match &args.config {
        Some(path) => RetrievalConfig::from_file(path),
        None => RetrievalConfig::from_env(),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(2);
        }
    };
    apply_overrides(&mut config, &args);

    let default_level = log_level(&config);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let retriever = match Retriever::new(config) {
        Ok(retriever) => retriever,
        Err(e) => {
            ::log::error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let start_time = std::time::Instant::now();
    let docs = retriever
        .fetch_authoritative(&args.location, &args.question)
        .await;
    ::log::info!(
        "Retrieved {} documents in {:.2} seconds",
        docs.len(),
        start_time.elapsed().as_secs_f64()
    );

    print_documents(&docs);
}

/// Command-line flags win over the file or environment
fn apply_overrides(config: &mut RetrievalConfig, args: &Args) {
    if args.no_strict {
        config.strict_local = false;
    }
    if args.debug {
        config.debug = true;
    }
    if let Some(concurrency) = args.concurrency {
        config.max_concurrency = concurrency;
    }
    if let Some(total_timeout) = args.total_timeout {
        config.total_timeout_secs = total_timeout;
    }
}

/// Default log filter: the debug toggle from any source raises it
fn log_level(config: &RetrievalConfig) -> &'static str {
    if config.debug { "debug" } else { "warn" }
}

fn print_documents(docs: &[RetrievedDocument]) {
    match serde_json::to_string_pretty(docs) {
        Ok(json) => println!("{}", json),
        Err(e) => ::log::error!("Failed to serialize documents: {}", e),
    }
}
