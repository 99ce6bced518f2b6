//! Typed SubDL search requests and their query-string form.
//!
//! Every field is optional and only present fields reach the wire. The API
//! key is not part of the builder; it is supplied at serialization time so a
//! request can be built, logged and compared without carrying the secret.

use crate::config::ApiKey;
use crate::media::{CatalogId, MediaKind};

/// Page size for name searches; `0` lets the API use its default.
pub const RELEASES_PAGE_SIZE: u32 = 0;
/// SubDL caps `subs_per_page` at 30.
pub const SUBTITLES_PAGE_SIZE: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub film_name: Option<String>,
    pub file_name: Option<String>,
    pub sd_id: Option<CatalogId>,
    pub imdb_id: Option<String>,
    pub tmdb_id: Option<String>,
    pub season_number: Option<u32>,
    pub episode_number: Option<u32>,
    pub kind: Option<MediaKind>,
    pub year: Option<i32>,
    pub languages: Option<Vec<String>>,
    pub subs_per_page: Option<u32>,
    pub comment: Option<bool>,
    pub releases: Option<bool>,
    pub hearing_impaired: Option<bool>,
    /// Rarely useful: full-season uploads are seldom flagged as such.
    pub full_season: Option<bool>,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self::empty()
            .with_languages(["EN"])
            .with_hearing_impaired(false)
    }
}

impl SearchRequest {
    /// A request with nothing set, not even the default language.
    pub fn empty() -> Self {
        Self {
            film_name: None,
            file_name: None,
            sd_id: None,
            imdb_id: None,
            tmdb_id: None,
            season_number: None,
            episode_number: None,
            kind: None,
            year: None,
            languages: None,
            subs_per_page: None,
            comment: None,
            releases: None,
            hearing_impaired: None,
            full_season: None,
        }
    }

    /// Catalog search by raw file name.
    pub fn releases(file_name: &str, kind: MediaKind) -> Self {
        Self::default()
            .with_kind(kind)
            .with_file_name(file_name)
            .with_subs_per_page(RELEASES_PAGE_SIZE)
    }

    pub fn movie_subtitles(id: CatalogId) -> Self {
        Self::default()
            .with_sd_id(id)
            .with_kind(MediaKind::Movie)
            .with_subs_per_page(SUBTITLES_PAGE_SIZE)
    }

    pub fn tv_season_subtitles(id: CatalogId, season: u32) -> Self {
        Self::default()
            .with_sd_id(id)
            .with_kind(MediaKind::Tv)
            .with_season_number(season)
            .with_subs_per_page(SUBTITLES_PAGE_SIZE)
    }

    pub fn with_film_name(mut self, name: impl Into<String>) -> Self {
        self.film_name = Some(name.into());
        self
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn with_sd_id(mut self, id: CatalogId) -> Self {
        self.sd_id = Some(id);
        self
    }

    pub fn with_imdb_id(mut self, id: impl Into<String>) -> Self {
        self.imdb_id = Some(id.into());
        self
    }

    pub fn with_tmdb_id(mut self, id: impl Into<String>) -> Self {
        self.tmdb_id = Some(id.into());
        self
    }

    pub fn with_season_number(mut self, season: u32) -> Self {
        self.season_number = Some(season);
        self
    }

    pub fn with_episode_number(mut self, episode: u32) -> Self {
        self.episode_number = Some(episode);
        self
    }

    pub fn with_kind(mut self, kind: MediaKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = Some(languages.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_subs_per_page(mut self, count: u32) -> Self {
        self.subs_per_page = Some(count);
        self
    }

    pub fn with_comment(mut self, on: bool) -> Self {
        self.comment = Some(on);
        self
    }

    pub fn with_releases(mut self, on: bool) -> Self {
        self.releases = Some(on);
        self
    }

    pub fn with_hearing_impaired(mut self, on: bool) -> Self {
        self.hearing_impaired = Some(on);
        self
    }

    pub fn with_full_season(mut self, on: bool) -> Self {
        self.full_season = Some(on);
        self
    }

    /// Wire parameters in declared order, `api_key` first.
    pub fn to_params(&self, api_key: &ApiKey) -> Vec<(&'static str, String)> {
        fn flag(on: bool) -> String {
            let value = if on { "1" } else { "0" };
            value.to_string()
        }

        let mut params = vec![("api_key", api_key.expose().to_string())];
        let mut push = |key: &'static str, value: Option<String>| {
            if let Some(value) = value {
                params.push((key, value));
            }
        };
        push("film_name", self.film_name.clone());
        push("file_name", self.file_name.clone());
        push("sd_id", self.sd_id.map(|id| id.to_string()));
        push("imdb_id", self.imdb_id.clone());
        push("tmdb_id", self.tmdb_id.clone());
        push("season_number", self.season_number.map(|n| n.to_string()));
        push("episode_number", self.episode_number.map(|n| n.to_string()));
        push("type", self.kind.map(|k| k.as_str().to_string()));
        push("year", self.year.map(|y| y.to_string()));
        push("languages", self.languages.as_ref().map(|l| l.join(",")));
        push("subs_per_page", self.subs_per_page.map(|n| n.to_string()));
        push("comment", self.comment.map(flag));
        push("releases", self.releases.map(flag));
        push("hi", self.hearing_impaired.map(flag));
        push("full_season", self.full_season.map(flag));
        params
    }

    pub fn to_query_string(&self, api_key: &ApiKey) -> String {
        encode_params(&self.to_params(api_key))
    }
}

pub(crate) fn encode_params(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn key() -> ApiKey {
        ApiKey::new("secret")
    }

    fn keys(params: &[(&'static str, String)]) -> Vec<&'static str> {
        params.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn empty_request_only_carries_the_key() {
        let params = SearchRequest::empty().to_params(&key());
        assert_eq!(params, vec![("api_key", "secret".to_string())]);
    }

    #[test]
    fn defaults_are_english_and_not_hearing_impaired() {
        let params = SearchRequest::default().to_params(&key());
        assert_eq!(
            params,
            vec![
                ("api_key", "secret".to_string()),
                ("languages", "EN".to_string()),
                ("hi", "0".to_string()),
            ]
        );
    }

    #[test]
    fn releases_search_for_a_movie_file() {
        let query = SearchRequest::releases("The.Matrix.1999.mkv", MediaKind::Movie)
            .to_query_string(&key());
        assert_eq!(
            query,
            "api_key=secret&file_name=The.Matrix.1999.mkv&type=movie&languages=EN&subs_per_page=0&hi=0"
        );
    }

    #[test]
    fn tv_season_listing_carries_season_and_page_size() {
        let params = SearchRequest::tv_season_subtitles(CatalogId(42), 2).to_params(&key());
        assert!(params.contains(&("sd_id", "42".to_string())));
        assert!(params.contains(&("season_number", "2".to_string())));
        assert!(params.contains(&("type", "tv".to_string())));
        assert!(params.contains(&("subs_per_page", "30".to_string())));
        assert!(!keys(&params).contains(&"episode_number"));
    }

    #[test]
    fn movie_listing_has_no_season() {
        let params = SearchRequest::movie_subtitles(CatalogId(7)).to_params(&key());
        assert!(params.contains(&("type", "movie".to_string())));
        assert!(!keys(&params).contains(&"season_number"));
    }

    #[test]
    fn every_present_field_appears_exactly_once() {
        let request = SearchRequest::default()
            .with_film_name("Dune")
            .with_file_name("Dune.2021.mkv")
            .with_sd_id(CatalogId(1))
            .with_imdb_id("tt1160419")
            .with_tmdb_id("438631")
            .with_season_number(1)
            .with_episode_number(2)
            .with_kind(MediaKind::Movie)
            .with_year(2021)
            .with_languages(["EN", "FR"])
            .with_subs_per_page(10)
            .with_comment(true)
            .with_releases(false)
            .with_hearing_impaired(true)
            .with_full_season(false);
        let params = request.to_params(&key());
        let names = keys(&params);
        assert_eq!(names.len(), 16);
        assert_eq!(names.iter().collect::<HashSet<_>>().len(), 16);
        assert_eq!(names[0], "api_key");
        assert!(params.contains(&("languages", "EN,FR".to_string())));
        assert!(params.contains(&("comment", "1".to_string())));
        assert!(params.contains(&("releases", "0".to_string())));
        assert!(params.contains(&("hi", "1".to_string())));
    }

    #[test]
    fn serialization_is_repeatable() {
        let request = SearchRequest::tv_season_subtitles(CatalogId(9), 4);
        assert_eq!(request.to_params(&key()), request.to_params(&key()));
    }

    #[test]
    fn values_are_percent_encoded() {
        let query = SearchRequest::empty()
            .with_film_name("Amélie & Co")
            .to_query_string(&key());
        assert_eq!(query, "api_key=secret&film_name=Am%C3%A9lie%20%26%20Co");
    }
}
