use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use tapwater_sources::{RetrievalConfig, Retriever};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to retrieval configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Location to look up
    #[arg(short, long, default_value = "Flint, MI")]
    location: String,

    /// Question used for search seeds
    #[arg(short, long, default_value = "is my tap water safe to drink")]
    question: String,

    /// Override total timeout in seconds
    #[arg(short, long)]
    total_timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args = Args::parse();

    let mut config = RetrievalConfig::from_file(&args.config)?;
    if let Some(total_timeout) = args.total_timeout {
        println!("Overriding total timeout: {}s", total_timeout);
        config.total_timeout_secs = total_timeout;
    }

    println!("Retrieval configuration:");
    println!("  Strict local: {}", config.strict_local);
    println!("  Max concurrency: {}", config.max_concurrency);
    println!("  Total timeout: {}s", config.total_timeout_secs);
    match &config.search {
        Some(search) => println!("  Search: {:?} via {}", search.provider, search.endpoint()),
        None => println!("  Search: disabled"),
    }

    let retriever = Retriever::new(config)?;
    let start_time = std::time::Instant::now();
    let docs = retriever
        .fetch_authoritative(&args.location, &args.question)
        .await;

    for (rank, doc) in docs.iter().enumerate() {
        println!(
            "{}. [{}] {} ({:?}, score {})",
            rank + 1,
            doc.publisher_or_host(),
            doc.title,
            doc.tier(),
            doc.score.unwrap_or_default()
        );
        println!("   {}", doc.url);
        if let Some(published) = doc.published_at_iso() {
            println!("   published {}", published);
        }
    }

    println!(
        "Retrieved {} documents in {:.2} seconds.",
        docs.len(),
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}
