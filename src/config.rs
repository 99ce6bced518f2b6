use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::media::MediaKind;
use crate::resolve::SeasonFilter;

pub const API_KEY_VAR: &str = "SUBDL_API_KEY";

/// Key baked in at compile time, used when the environment has none.
const BUILD_TIME_API_KEY: Option<&str> = option_env!("SUBDL_API_KEY");

/// The SubDL credential. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn from_env() -> Result<Self> {
        Self::resolve(env::var(API_KEY_VAR).ok(), BUILD_TIME_API_KEY)
    }

    /// Environment first, then the build-time value; empty strings count as
    /// missing.
    pub fn resolve(from_env: Option<String>, built_in: Option<&str>) -> Result<Self> {
        if let Some(key) = from_env.filter(|k| !k.is_empty()) {
            return Ok(Self(key));
        }
        if let Some(key) = built_in.filter(|k| !k.is_empty()) {
            info!("{} not set, using the key embedded at build time", API_KEY_VAR);
            return Ok(Self(key.to_string()));
        }
        Err(anyhow!("Missing {} environment variable", API_KEY_VAR))
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Tv,
    Movie,
}

impl From<ModeArg> for MediaKind {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Tv => MediaKind::Tv,
            ModeArg::Movie => MediaKind::Movie,
        }
    }
}

/// Find and download subtitles for a movie or TV episode from SubDL.
#[derive(Debug, Parser)]
#[command(name = "subgrab", version, about)]
pub struct Cli {
    /// Video file to find subtitles for
    pub file: PathBuf,

    /// Media kind; inferred from the working directory ("Movies"/"TV") when omitted
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Where the subtitle file is written (default: ~/Downloads)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Only offer subtitles that cover a whole season (TV only)
    #[arg(long)]
    pub full_season_only: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: ApiKey,
    pub file_name: String,
    pub kind: MediaKind,
    pub download_dir: PathBuf,
    pub season_filter: SeasonFilter,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let api_key = ApiKey::from_env()?;
        let cwd = env::current_dir().context("Failed to read the current directory")?;
        let kind = resolve_kind(cli.mode, &cwd)?;
        let download_dir = match cli.output_dir {
            Some(dir) => dir,
            None => default_download_dir()?,
        };
        let season_filter = if cli.full_season_only {
            SeasonFilter::FullSeasonOnly
        } else {
            SeasonFilter::All
        };
        Ok(Self {
            api_key,
            file_name: file_name_of(&cli.file)?,
            kind,
            download_dir,
            season_filter,
        })
    }
}

pub fn resolve_kind(mode: Option<ModeArg>, cwd: &Path) -> Result<MediaKind> {
    if let Some(mode) = mode {
        return Ok(mode.into());
    }
    MediaKind::infer_from_dir(cwd).ok_or_else(|| {
        anyhow!(
            "Could not infer media kind from '{}', please specify it using -m",
            cwd.display()
        )
    })
}

/// Only the final path component is sent to the search API.
pub fn file_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("'{}' does not name a file", path.display()))
}

fn default_download_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join("Downloads"))
        .context("Could not determine the home directory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_key_wins_over_build_time_key() {
        let key = ApiKey::resolve(Some("from-env".to_string()), Some("baked")).unwrap();
        assert_eq!(key.expose(), "from-env");
    }

    #[test]
    fn build_time_key_is_the_fallback() {
        let key = ApiKey::resolve(None, Some("baked")).unwrap();
        assert_eq!(key.expose(), "baked");
        let key = ApiKey::resolve(Some(String::new()), Some("baked")).unwrap();
        assert_eq!(key.expose(), "baked");
    }

    #[test]
    fn missing_key_is_fatal() {
        let err = ApiKey::resolve(None, None).unwrap_err();
        assert!(err.to_string().contains(API_KEY_VAR));
        assert!(ApiKey::resolve(None, Some("")).is_err());
    }

    #[test]
    fn debug_output_hides_the_key() {
        let key = ApiKey::new("top-secret");
        assert!(!format!("{key:?}").contains("top-secret"));
    }

    #[test]
    fn explicit_mode_overrides_directory() {
        let kind = resolve_kind(Some(ModeArg::Tv), Path::new("/data/Movies")).unwrap();
        assert_eq!(kind, MediaKind::Tv);
    }

    #[test]
    fn mode_falls_back_to_directory_and_fails_without_hint() {
        assert_eq!(
            resolve_kind(None, Path::new("/data/Movies/Heat")).unwrap(),
            MediaKind::Movie
        );
        assert!(resolve_kind(None, Path::new("/data/misc")).is_err());
    }

    #[test]
    fn only_the_file_name_is_kept() {
        assert_eq!(
            file_name_of(Path::new("/data/TV/Show/Show.S01E02.mkv")).unwrap(),
            "Show.S01E02.mkv"
        );
        assert!(file_name_of(Path::new("/")).is_err());
    }

    #[test]
    fn cli_parses_mode_and_flags() {
        let cli = Cli::try_parse_from([
            "subgrab",
            "-m",
            "tv",
            "--full-season-only",
            "-o",
            "/tmp/subs",
            "Show.S01E01.mkv",
        ])
        .unwrap();
        assert_eq!(cli.mode, Some(ModeArg::Tv));
        assert!(cli.full_season_only);
        assert_eq!(cli.output_dir, Some(PathBuf::from("/tmp/subs")));
        assert_eq!(cli.file, PathBuf::from("Show.S01E01.mkv"));

        assert!(Cli::try_parse_from(["subgrab", "-m", "anime", "x.mkv"]).is_err());
    }
}
