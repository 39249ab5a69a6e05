use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use oddly_core::{Article, ArticleApi, Result, TrackEvent, ALL_CATEGORIES, CATEGORIES};
use oddly_news::api::DEFAULT_API_URL;
use oddly_news::{deduplicate, ApiClient, ArticleCache, ContentCache, NewsService};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Storage backend for the offline caches
    #[arg(long, default_value = "sqlite")]
    storage: String,
    /// Database file for the sqlite backend
    #[arg(long, default_value = "oddly.db")]
    db_path: PathBuf,
    /// Base URL of the article API
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Fetch articles (memory cache, persistent cache, network, fallback)
    Fetch {
        /// Category to show, or "all"
        #[arg(default_value = ALL_CATEGORIES)]
        category: String,
        /// Skip warming the content cache for the top articles
        #[arg(long)]
        no_preload: bool,
    },
    /// Force a network refresh, bypassing the server's cache
    Refresh,
    /// Show view/reaction stats for article ids
    Stats {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Report a view or reaction for an article
    Track {
        article_id: String,
        /// Reaction emoji; omit to record a plain view
        #[arg(long)]
        reaction: Option<String>,
    },
    /// List known categories
    Categories,
    /// Check whether offline data is available
    Offline,
    /// Cache administration
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(clap::Subcommand, Debug)]
enum CacheCommands {
    /// Show article-cache age
    Info,
    /// Drop the cached article list
    Clear,
    /// Drop all cached article content
    ClearContent,
}

fn print_articles(articles: &[Article]) {
    println!("Found {} articles", articles.len());
    for article in articles {
        println!(
            "- [{}] {} ({}, {})",
            article.category,
            article.title,
            article.source,
            article.published_at.format("%Y-%m-%d")
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let store = oddly_storage::create_store(&cli.storage, &cli.db_path).await?;
    info!("💾 Storage initialized (using {})", cli.storage);

    let api: Arc<dyn ArticleApi> = Arc::new(ApiClient::new(cli.api_url.clone()));
    let service = NewsService::new(api.clone(), store.clone());
    let content = ContentCache::new(store.clone());

    match cli.command {
        Commands::Fetch { category, no_preload } => {
            let articles = deduplicate(service.fetch_articles(&category).await);
            print_articles(&articles);

            if !no_preload {
                let urls: Vec<String> = articles.iter().map(|a| a.url.clone()).collect();
                content.preload_article_content(&urls, api.as_ref()).await;
            }
        }
        Commands::Refresh => {
            let articles = deduplicate(service.refresh_articles().await);
            print_articles(&articles);
        }
        Commands::Stats { ids } => {
            let stats = api.fetch_stats(&ids).await?;
            for id in &ids {
                match stats.get(id) {
                    Some(s) => {
                        let reactions: Vec<String> =
                            s.reactions.iter().map(|(e, n)| format!("{} {}", e, n)).collect();
                        println!("{}: {} views, {}", id, s.views, reactions.join(", "));
                    }
                    None => println!("{}: no stats", id),
                }
            }
        }
        Commands::Track { article_id, reaction } => {
            let event = match reaction {
                Some(emoji) => TrackEvent::Reaction(emoji),
                None => TrackEvent::View,
            };
            api.track_event(&article_id, event).await?;
            println!("Tracked");
        }
        Commands::Categories => {
            for category in CATEGORIES {
                println!("{} {} ({})", category.emoji, category.label, category.id);
            }
        }
        Commands::Offline => {
            if service.has_offline_data().await {
                println!("Offline data available");
            } else {
                println!("No offline data");
            }
        }
        Commands::Cache { command } => match command {
            CacheCommands::Info => {
                let info = ArticleCache::new(store.clone()).cache_info().await;
                if info.cached {
                    let age = info.age.map(|a| a.as_secs()).unwrap_or(0);
                    println!("Article cache present, {}s old", age);
                } else {
                    println!("No article cache");
                }
            }
            CacheCommands::Clear => {
                ArticleCache::new(store.clone()).clear().await;
                println!("Article cache cleared");
            }
            CacheCommands::ClearContent => {
                let cleared = content.clear_content_cache().await;
                println!("Cleared {} cached articles", cleared);
            }
        },
    }

    // Let tracked fire-and-forget work (cache writes, background refresh)
    // finish before the process exits
    service.drain_background().await;

    Ok(())
}
