//! Kennel dog catalog CLI.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kennel_core::{Dog, DogId, KennelConfig, SearchFilter, SortSpec};
use kennel_query::{BrowseSession, MatchOutcome, PrefetchDecision, SearchOutcome};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "kennel")]
#[command(about = "Browse the dog catalog from the command line")]
struct Args {
    /// Server URL (overrides the config file)
    #[arg(long, env = "KENNEL_SERVER")]
    server: Option<String>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Name to sign in with
    #[arg(long, env = "KENNEL_NAME")]
    name: String,

    /// Email to sign in with
    #[arg(long, env = "KENNEL_EMAIL")]
    email: String,

    /// Hydrate in parallel and prefetch further ahead
    #[arg(long)]
    eager: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all breeds
    Breeds,
    /// Search and page through dogs
    Browse {
        /// Breed to filter on
        #[arg(long)]
        breed: Option<String>,
        /// UI pages to print
        #[arg(long, default_value = "1")]
        pages: usize,
        /// Sort order, e.g. breed:asc or age:desc
        #[arg(long)]
        sort: Option<SortSpec>,
        /// Ids per backend page
        #[arg(long)]
        size: Option<u32>,
        /// Zip code filter (repeatable)
        #[arg(long = "zip-code")]
        zip_codes: Vec<String>,
        /// Minimum age
        #[arg(long)]
        age_min: Option<u32>,
        /// Maximum age
        #[arg(long)]
        age_max: Option<u32>,
    },
    /// Favorite the given dogs and ask for a match
    Match {
        /// Dog id (repeatable)
        #[arg(long = "id", required = true)]
        ids: Vec<String>,
    },
}

fn load_config(args: &Args) -> Result<KennelConfig> {
    let mut config = match &args.config {
        Some(path) => KennelConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => KennelConfig::default(),
    };
    if args.eager {
        let eager = KennelConfig::eager();
        config.hydration = eager.hydration;
        config.prefetch = eager.prefetch;
    }
    if let Some(server) = &args.server {
        config = config.with_base_url(server.clone());
    }
    Ok(config)
}

fn print_dogs(dogs: &[Dog]) {
    println!(
        "{:<24} {:<16} {:<24} {:>4} {:<8}",
        "ID", "NAME", "BREED", "AGE", "ZIP"
    );
    println!("{}", "-".repeat(80));
    for dog in dogs {
        println!(
            "{:<24} {:<16} {:<24} {:>4} {:<8}",
            dog.id.as_str(), dog.name, dog.breed, dog.age, dog.zip_code
        );
    }
}

async fn list_breeds(session: &BrowseSession) -> Result<()> {
    let count = session.refresh_breeds().await?;
    if count == 0 {
        println!("No breeds found");
        return Ok(());
    }
    for breed in session.breeds() {
        println!("{}", breed);
    }
    Ok(())
}

async fn browse(session: &BrowseSession, filter: SearchFilter, pages: usize) -> Result<()> {
    let controller = session.controller();
    let display = controller.display_page_size();

    let start = Instant::now();
    let summary = match controller.search(filter.clone()).await? {
        SearchOutcome::Applied(summary) => summary,
        SearchOutcome::Superseded => {
            println!("Search was superseded");
            return Ok(());
        }
    };
    println!(
        "{}: {} matches, {} pages ({:.2?})",
        filter,
        summary.total,
        summary.total_pages,
        start.elapsed()
    );

    for index in 0..pages {
        if let PrefetchDecision::Triggered(outcome) =
            session.prefetch().on_page_change(index, display).await?
        {
            tracing::debug!("Prefetch at page {}: {:?}", index, outcome);
        }

        let collection = controller.collection();
        let rows = collection.page(index, display);
        if rows.is_empty() {
            break;
        }
        println!("\nPage {}/{}", index + 1, controller.total_pages());
        print_dogs(rows);
    }

    let stats = session.prefetch().stats();
    println!(
        "\nLoaded {} records ({} prefetches)",
        controller.collection().len(),
        stats.triggered
    );
    Ok(())
}

async fn request_match(session: &BrowseSession, ids: Vec<String>) -> Result<()> {
    let favorites = session.favorites();
    for id in ids {
        favorites.toggle(&DogId::new(id));
    }

    match favorites.request_match().await? {
        MatchOutcome::Matched(dog) => {
            println!("Matched:");
            print_dogs(std::slice::from_ref(&dog));
        }
        MatchOutcome::NoMatch => println!("No match found"),
        MatchOutcome::Skipped => println!("No favorites given"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let session = BrowseSession::connect(config)?;

    session.login(&args.name, &args.email).await?;

    let result = match args.command {
        Commands::Breeds => list_breeds(&session).await,
        Commands::Browse {
            breed,
            pages,
            sort,
            size,
            zip_codes,
            age_min,
            age_max,
        } => {
            let mut filter = session
                .config()
                .default_filter()
                .with_zip_codes(zip_codes)
                .with_age_range(age_min, age_max);
            if let Some(breed) = breed {
                filter = filter.with_breed(breed);
            }
            if let Some(sort) = sort {
                filter = filter.with_sort(sort);
            }
            if let Some(size) = size {
                filter = filter.with_page_size(size);
            }
            browse(&session, filter, pages).await
        }
        Commands::Match { ids } => request_match(&session, ids).await,
    };

    if let Err(err) = session.logout().await {
        tracing::warn!("Logout failed: {}", err);
    }

    result
}
