use tracing::{debug, info};

use crate::error::{SubdlError, CATALOG_NOT_FOUND};
use crate::media::{CatalogCandidate, CatalogId, MediaKind, SubtitleCandidate};
use crate::query::SearchRequest;
use crate::response;
use crate::subdl::SubdlApi;

/// Which entries of a TV season listing are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeasonFilter {
    /// Everything the API returns for the season, episodes included.
    #[default]
    All,
    /// Only uploads without an episode number.
    FullSeasonOnly,
}

impl SeasonFilter {
    fn apply(self, subs: Vec<SubtitleCandidate>) -> Vec<SubtitleCandidate> {
        match self {
            SeasonFilter::All => subs,
            SeasonFilter::FullSeasonOnly => subs.into_iter().filter(|s| s.is_full_season()).collect(),
        }
    }
}

pub async fn resolve_catalog(
    api: &dyn SubdlApi,
    file_name: &str,
    kind: MediaKind,
) -> Result<Vec<CatalogCandidate>, SubdlError> {
    info!("Fetching SD IDs for {}", file_name);
    let request = SearchRequest::releases(file_name, kind);
    let candidates = match api.search(&request).await {
        Ok(body) => response::parse_catalog_candidates(&body),
        Err(err) => Err(err),
    }
    .map_err(|err| match err {
        SubdlError::Api(msg) if msg.contains(CATALOG_NOT_FOUND) => {
            debug!("SubDL reported '{}' for {}", msg, api.describe(&request));
            SubdlError::NoCandidates {
                query: file_name.to_string(),
            }
        }
        other => other,
    })?;
    if candidates.is_empty() {
        debug!("Empty result for {}", api.describe(&request));
        return Err(SubdlError::NoCandidates {
            query: file_name.to_string(),
        });
    }
    info!("Fetched {} SD IDs", candidates.len());
    Ok(candidates)
}

pub async fn resolve_movie_subtitles(
    api: &dyn SubdlApi,
    id: CatalogId,
) -> Result<Vec<SubtitleCandidate>, SubdlError> {
    fetch_subtitles(api, SearchRequest::movie_subtitles(id), SeasonFilter::All).await
}

pub async fn resolve_tv_season_subtitles(
    api: &dyn SubdlApi,
    id: CatalogId,
    season: u32,
    filter: SeasonFilter,
) -> Result<Vec<SubtitleCandidate>, SubdlError> {
    fetch_subtitles(api, SearchRequest::tv_season_subtitles(id, season), filter).await
}

async fn fetch_subtitles(
    api: &dyn SubdlApi,
    request: SearchRequest,
    filter: SeasonFilter,
) -> Result<Vec<SubtitleCandidate>, SubdlError> {
    let body = api.search(&request).await?;
    let subs = filter.apply(response::parse_subtitles(&body)?);
    if subs.is_empty() {
        return Err(SubdlError::NoSubtitles {
            url: api.describe(&request),
        });
    }
    info!("Fetched {} subtitles", subs.len());
    Ok(subs)
}
