//! SubDL response envelope: `{status, results?, subtitles?, error?}`.

use serde::Deserialize;

use crate::error::SubdlError;
use crate::media::{CatalogCandidate, MediaRecord, RawMediaRecord, SubtitleCandidate};

#[derive(Debug, Deserialize)]
struct Envelope {
    status: bool,
    #[serde(default)]
    results: Option<Vec<RawMediaRecord>>,
    #[serde(default)]
    subtitles: Option<Vec<SubtitleCandidate>>,
    #[serde(default)]
    error: Option<String>,
}

fn parse_envelope(body: &str) -> Result<Envelope, SubdlError> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" || trimmed == r#""""# {
        return Err(SubdlError::EmptyResponse(body.to_string()));
    }
    let envelope: Envelope = serde_json::from_str(trimmed)?;
    if !envelope.status {
        return Err(match envelope.error {
            Some(message) => SubdlError::Api(message),
            None => SubdlError::Malformed("status=false without an error message".to_string()),
        });
    }
    Ok(envelope)
}

/// The API-reported failure carried by a body, if it is a failed envelope.
/// Used on non-2xx responses where the body may or may not be JSON.
pub fn api_failure(body: &str) -> Option<SubdlError> {
    match parse_envelope(body) {
        Err(err @ SubdlError::Api(_)) => Some(err),
        _ => None,
    }
}

pub fn parse_media_records(body: &str) -> Result<Vec<MediaRecord>, SubdlError> {
    parse_envelope(body)?
        .results
        .unwrap_or_default()
        .into_iter()
        .map(MediaRecord::try_from)
        .collect()
}

pub fn parse_catalog_candidates(body: &str) -> Result<Vec<CatalogCandidate>, SubdlError> {
    Ok(parse_media_records(body)?
        .into_iter()
        .map(CatalogCandidate::from)
        .collect())
}

pub fn parse_subtitles(body: &str) -> Result<Vec<SubtitleCandidate>, SubdlError> {
    Ok(parse_envelope(body)?.subtitles.unwrap_or_default())
}
