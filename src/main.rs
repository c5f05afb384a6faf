mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use cli::{Cli, Commands};
use unfurl::cache::MetadataCache;
use unfurl::resolver::fetch::HttpFetcher;
use unfurl::resolver::Resolver;
use unfurl_common::MetadataRecord;
use unfurl_db::pool::init_pool;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on the
    // verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "unfurl=trace,unfurl_archive=trace,unfurl_parser=trace,unfurl_db=debug".to_string()
        } else {
            "unfurl=info,unfurl_db=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Resolve {
            urls,
            payload,
            json,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(resolve(&cli.db, &urls, payload.as_deref(), json))
        }
        Commands::Sweep => sweep(&cli.db),
    }
}

async fn resolve(
    db_path: &Path,
    urls: &[String],
    payload_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    // A payload belongs to exactly one link; applying it across a batch
    // would cache its metadata under unrelated URLs.
    if payload_path.is_some() && urls.len() > 1 {
        anyhow::bail!("--payload applies to a single URL, got {}", urls.len());
    }
    let payload = payload_path.map(std::fs::read).transpose()?;

    // A broken cache database must not block resolution.
    let pool = match init_pool(&db_path.to_string_lossy()) {
        Ok(pool) => Some(pool),
        Err(e) => {
            tracing::warn!(error = %e, "cache database unavailable, running memory-only");
            None
        }
    };

    let cache = Arc::new(MetadataCache::new(pool));
    cache.sweep(Utc::now().timestamp());

    let fetcher = Arc::new(HttpFetcher::new()?);
    let resolver = Resolver::new(cache, fetcher);

    let results = match (&payload, urls) {
        (Some(bytes), [url]) => vec![resolver.resolve(url, Some(bytes.as_slice())).await],
        _ => resolver.resolve_many(urls).await,
    };

    if json {
        let entries: Vec<serde_json::Value> = urls
            .iter()
            .zip(&results)
            .map(|(url, record)| {
                serde_json::json!({
                    "url": url,
                    "metadata": record,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for (url, record) in urls.iter().zip(&results) {
            match record {
                Some(record) => print_record(url, record),
                None => println!("{}: no metadata", url),
            }
        }
    }

    Ok(())
}

fn print_record(url: &str, record: &MetadataRecord) {
    println!("{}", url);
    if let Some(ref title) = record.title {
        println!("  title:       {}", title.replace('\n', " / "));
    }
    if let Some(ref description) = record.description {
        println!("  description: {}", description);
    }
    if let Some(ref site_name) = record.site_name {
        println!("  site:        {}", site_name);
    }
    if let Some(ref image_url) = record.image_url {
        println!("  image:       {}", image_url);
    }
    if let Some(ref social) = record.social {
        if let Some(ref author) = social.author_name {
            println!("  author:      {}", author);
        }
        if let Some(ref handle) = social.handle {
            println!("  handle:      {}", handle);
        }
        if let Some(ref likes) = social.like_count {
            println!("  likes:       {}", likes);
        }
        if let Some(ref replies) = social.reply_count {
            println!("  replies:     {}", replies);
        }
    }
}

fn sweep(db_path: &Path) -> Result<()> {
    let pool = init_pool(&db_path.to_string_lossy())?;
    let conn = unfurl_db::get_conn(&pool)?;
    let removed =
        unfurl_db::queries::metadata_cache::sweep_expired(&conn, Utc::now().timestamp())?;
    println!("Removed {} expired cache entries", removed);
    Ok(())
}
