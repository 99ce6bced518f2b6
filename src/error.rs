use thiserror::Error;

/// What SubDL answers (with `status: false`) when a name matches nothing.
pub const CATALOG_NOT_FOUND: &str = "can't find movie or tv";

/// Longest slice of a non-2xx body kept in an error message.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Everything that can go wrong between building a request and holding a
/// parsed list of records.
#[derive(Debug, Error)]
pub enum SubdlError {
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from SubDL: {body}")]
    Http { status: u16, body: String },

    /// The envelope came back with `status: false`.
    #[error("GET failed: '{0}'")]
    Api(String),

    #[error("invalid empty or null response: '{0}'")]
    EmptyResponse(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("failed to parse SubDL JSON")]
    Json(#[from] serde_json::Error),

    #[error("invalid media type: '{0}'")]
    InvalidMediaType(String),

    #[error("invalid IMDb id: '{0}'")]
    InvalidImdbId(String),

    #[error("invalid date: '{0}'")]
    InvalidDate(String),

    #[error("couldn't derive a file name from subtitle url '{0}'")]
    InvalidSubtitleUrl(String),

    #[error("no candidates found for '{query}'")]
    NoCandidates { query: String },

    #[error("could not fetch any subtitles; URL: '{url}'")]
    NoSubtitles { url: String },

    #[error("could not extract a season number (SxxExx) from '{0}'")]
    SeasonNotFound(String),
}

impl SubdlError {
    /// Non-2xx reply, keeping only the start of the body.
    pub fn http(status: u16, body: &str) -> Self {
        let mut kept: String = body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect();
        if body.trim().chars().count() > MAX_ERROR_BODY_CHARS {
            kept.push_str("...");
        }
        SubdlError::Http { status, body: kept }
    }

    /// The only recoverable condition: the catalog search matched nothing and
    /// the user may retype the name.
    pub fn is_no_candidates(&self) -> bool {
        matches!(self, SubdlError::NoCandidates { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_candidates_is_the_only_recoverable_error() {
        let err = SubdlError::NoCandidates {
            query: "Some.File.mkv".to_string(),
        };
        assert!(err.is_no_candidates());
        assert_eq!(err.to_string(), "no candidates found for 'Some.File.mkv'");

        assert!(!SubdlError::Api("invalid api key".to_string()).is_no_candidates());
        assert!(!SubdlError::NoSubtitles {
            url: "x".to_string()
        }
        .is_no_candidates());
    }

    #[test]
    fn http_error_body_is_truncated() {
        let page = format!("<html>{}</html>", "x".repeat(1000));
        let err = SubdlError::http(502, &page);
        let SubdlError::Http { status, body } = &err else {
            panic!("expected http error");
        };
        assert_eq!(*status, 502);
        assert_eq!(body.chars().count(), MAX_ERROR_BODY_CHARS + 3);
        assert!(body.ends_with("..."));

        let err = SubdlError::http(404, "not found\n");
        assert_eq!(err.to_string(), "HTTP 404 from SubDL: not found");
    }

    #[test]
    fn api_error_keeps_the_server_message() {
        let err = SubdlError::Api("not found".to_string());
        assert!(err.to_string().contains("not found"));
    }
}
