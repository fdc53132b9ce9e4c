//! Fetch a catalog listing and print each movie with its derived display fields.
//! Usage:
//!   cargo run --bin catalog_props -- popular
//!   cargo run --bin catalog_props -- search <query...>
//!   cargo run --bin catalog_props -- search <query...> --raw
//! Requires KINOPOISK_API_KEY in the environment (.env supported).

use anyhow::{bail, Result};
use dotenvy::dotenv;
use movie_collection::adapter::poster_source;
use movie_collection::catalog::{CatalogApi, KinopoiskClient, PopularRequest, SearchRequest};
use movie_collection::config::AppConfig;
use movie_collection::view::ImageSource;
use serde_json::json;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Listing {
    Popular,
    Search,
}

impl FromStr for Listing {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "popular" => Ok(Listing::Popular),
            "search" => Ok(Listing::Search),
            _ => Err(anyhow::anyhow!("listing must be 'popular' or 'search'")),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv();
    let mut args: Vec<String> = env::args().skip(1).collect();
    let raw = if let Some(pos) = args.iter().position(|a| a == "--raw") {
        args.remove(pos);
        true
    } else {
        false
    };
    let Some(first) = args.first() else {
        bail!("usage: catalog_props popular | search <query...> [--raw]");
    };
    let listing: Listing = first.parse()?;

    let config = AppConfig::from_env()?;
    let client = KinopoiskClient::from_config(&config)?;

    let page = match listing {
        Listing::Popular => {
            let request = PopularRequest::default();
            println!("GET {}", client.popular_url(&request));
            client.popular(&request).await?
        }
        Listing::Search => {
            let query = args[1..].join(" ");
            if query.trim().is_empty() {
                bail!("search needs a query");
            }
            let request = SearchRequest::new(query.trim());
            println!("GET {}", client.search_url(&request));
            client.search(&request).await?
        }
    };

    if raw {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    let rows: Vec<_> = page
        .docs
        .iter()
        .map(|m| {
            let poster = match poster_source(m) {
                ImageSource::Url(url) => json!(url),
                ImageSource::Placeholder => json!("<placeholder>"),
            };
            json!({
                "id": m.id,
                "title": m.title(),
                "displayYear": m.display_year(),
                "poster": poster,
                "criticsRating": m.rating.as_ref().and_then(|r| r.film_critics),
            })
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "count": rows.len(),
            "total": page.total,
            "movies": rows,
        }))?
    );
    Ok(())
}
