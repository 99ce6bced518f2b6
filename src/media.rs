use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::SubdlError;

static SEASON_EPISODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)S(\d\d)E\d\d").expect("season pattern compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Tv,
    Movie,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Tv => "tv",
            MediaKind::Movie => "movie",
        }
    }

    /// Picks the kind from the directory the user is running in: media
    /// libraries are usually laid out as `.../Movies/...` and `.../TV/...`.
    pub fn infer_from_dir(dir: &Path) -> Option<Self> {
        let path = dir.to_string_lossy();
        if path.contains("Movies") {
            Some(MediaKind::Movie)
        } else if path.contains("TV") {
            Some(MediaKind::Tv)
        } else {
            None
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = SubdlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tv" => Ok(MediaKind::Tv),
            "movie" => Ok(MediaKind::Movie),
            other => Err(SubdlError::InvalidMediaType(other.to_string())),
        }
    }
}

/// SubDL's own identifier (`sd_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct CatalogId(pub u64);

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogCandidate {
    pub id: CatalogId,
    pub kind: MediaKind,
    pub year: i32,
    pub name: String,
}

impl fmt::Display for CatalogCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {}) [sd_id {}]", self.name, self.year, self.kind, self.id)
    }
}

impl From<MediaRecord> for CatalogCandidate {
    fn from(record: MediaRecord) -> Self {
        Self {
            id: record.catalog_id,
            kind: record.kind,
            year: record.year,
            name: record.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRecord {
    pub catalog_id: CatalogId,
    pub kind: MediaKind,
    pub name: String,
    pub imdb_id: Option<CatalogId>,
    pub tmdb_id: Option<i64>,
    pub first_air_date: Option<NaiveDate>,
    pub release_date: Option<NaiveDate>,
    pub year: i32,
}

/// Wire shape of an entry in `results`.
#[derive(Debug, Deserialize)]
pub(crate) struct RawMediaRecord {
    sd_id: CatalogId,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    name: String,
    imdb_id: Option<String>,
    tmdb_id: Option<i64>,
    first_air_date: Option<String>,
    release_date: Option<String>,
    #[serde(default)]
    year: i32,
}

impl TryFrom<RawMediaRecord> for MediaRecord {
    type Error = SubdlError;

    fn try_from(raw: RawMediaRecord) -> Result<Self, Self::Error> {
        let kind = raw.kind.parse()?;
        let imdb_id = match raw.imdb_id.as_deref() {
            None | Some("") => None,
            Some(imdb) => Some(parse_imdb_id(imdb)?),
        };
        Ok(Self {
            catalog_id: raw.sd_id,
            kind,
            name: raw.name,
            imdb_id,
            tmdb_id: raw.tmdb_id,
            first_air_date: parse_optional_date(raw.first_air_date.as_deref())?,
            release_date: parse_optional_date(raw.release_date.as_deref())?,
            year: raw.year,
        })
    }
}

impl fmt::Display for MediaRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn opt<T: fmt::Display>(v: &Option<T>) -> String {
            v.as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "nil".to_string())
        }
        write!(
            f,
            "Media(SdId: {}, Type: {}, Name: {:?}, ImdbId: {}, TmdbId: {}, FirstAirDate: {}, ReleaseDate: {}, Year: {})",
            self.catalog_id,
            self.kind,
            self.name,
            opt(&self.imdb_id),
            opt(&self.tmdb_id),
            opt(&self.first_air_date),
            opt(&self.release_date),
            self.year
        )
    }
}

/// `tt0133093` -> `133093`. The prefix is dropped without being inspected.
pub fn parse_imdb_id(input: &str) -> Result<CatalogId, SubdlError> {
    input
        .get(2..)
        .and_then(|digits| digits.parse::<u64>().ok())
        .map(CatalogId)
        .ok_or_else(|| SubdlError::InvalidImdbId(input.to_string()))
}

fn parse_optional_date(input: Option<&str>) -> Result<Option<NaiveDate>, SubdlError> {
    let Some(raw) = input.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| Some(dt.date_naive()))
        .map_err(|_| SubdlError::InvalidDate(raw.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubtitleCandidate {
    pub release_name: String,
    pub url: String,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    #[serde(rename = "hi", default)]
    pub hearing_impaired: bool,
    #[serde(rename = "lang", default)]
    pub language: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

impl SubtitleCandidate {
    pub fn is_full_season(&self) -> bool {
        self.episode.is_none()
    }

    /// Last path segment of the relative url, used as the name on disk.
    pub fn file_name(&self) -> Result<&str, SubdlError> {
        let path = self
            .url
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        match path.rfind('/') {
            Some(pos) if pos + 1 < path.len() => Ok(&path[pos + 1..]),
            _ => Err(SubdlError::InvalidSubtitleUrl(self.url.clone())),
        }
    }
}

impl fmt::Display for SubtitleCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.release_name)?;
        match (self.season, self.episode) {
            (Some(s), Some(e)) => write!(f, " S{s:02}E{e:02}")?,
            (Some(s), None) => write!(f, " S{s:02} (full season)")?,
            _ => {}
        }
        if let Some(lang) = &self.language {
            write!(f, " [{lang}]")?;
        }
        if self.hearing_impaired {
            f.write_str(" [HI]")?;
        }
        if let Some(author) = &self.author {
            write!(f, " by {author}")?;
        }
        Ok(())
    }
}

/// Season number from an `SxxExx` marker anywhere in the file name.
pub fn extract_season(file_name: &str) -> Result<u32, SubdlError> {
    SEASON_EPISODE
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| SubdlError::SeasonNotFound(file_name.to_string()))
}
