//! Print the raw SubDL JSON for a search, bypassing all parsing.
//! Usage:
//!   cargo run --bin subdl_raw -- file <file_name> <movie|tv>
//!   cargo run --bin subdl_raw -- film <film_name>
//!   cargo run --bin subdl_raw -- subs <sd_id> [season]
//! Requires SUBDL_API_KEY in the environment (.env supported).

use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use serde_json::Value;
use std::env;
use subgrab::config::ApiKey;
use subgrab::media::{CatalogId, MediaKind};
use subgrab::query::SearchRequest;
use subgrab::subdl::{SubdlApi, SubdlClient};

fn request_from_args(args: &[String]) -> Result<SearchRequest> {
    let request = match args {
        [mode, name, kind] if mode == "file" => SearchRequest::releases(name, kind.parse::<MediaKind>()?),
        [mode, name] if mode == "film" => SearchRequest::default().with_film_name(name.as_str()),
        [mode, id] if mode == "subs" => {
            SearchRequest::movie_subtitles(CatalogId(id.parse().context("sd_id must be numeric")?))
        }
        [mode, id, season] if mode == "subs" => SearchRequest::tv_season_subtitles(
            CatalogId(id.parse().context("sd_id must be numeric")?),
            season.parse().context("season must be numeric")?,
        ),
        _ => bail!("usage: subdl_raw file <name> <movie|tv> | film <name> | subs <sd_id> [season]"),
    };
    Ok(request)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let args: Vec<String> = env::args().skip(1).collect();
    let request = request_from_args(&args)?;
    let client = SubdlClient::new(ApiKey::from_env()?)?;

    eprintln!("GET {}", client.describe(&request));
    let body = client.search(&request).await?;
    match serde_json::from_str::<Value>(&body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{body}"),
    }
    Ok(())
}
