//! Filename in, subtitle file out.
//!
//! ```text
//! season (tv) -> catalog search -> pick entry -> subtitle list -> pick -> download
//!                    ^                |
//!                    +-- new name ----+ (only when nothing matched)
//! ```

use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::download::download_subtitle;
use crate::media::{extract_season, CatalogCandidate, MediaKind, SubtitleCandidate};
use crate::prompt::{choose, Prompt, SelectionPolicy};
use crate::resolve::{self, SeasonFilter};
use crate::subdl::SubdlApi;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub download_dir: PathBuf,
    pub season_filter: SeasonFilter,
}

pub struct Pipeline<'a> {
    api: &'a dyn SubdlApi,
    prompt: &'a mut dyn Prompt,
    options: PipelineOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(api: &'a dyn SubdlApi, prompt: &'a mut dyn Prompt, options: PipelineOptions) -> Self {
        Self {
            api,
            prompt,
            options,
        }
    }

    pub async fn run(&mut self, file_name: &str, kind: MediaKind) -> Result<PathBuf> {
        let season = match kind {
            MediaKind::Tv => Some(extract_season(file_name)?),
            MediaKind::Movie => None,
        };

        let catalog = self.resolve_catalog(file_name, kind).await?;
        let index = choose(&mut *self.prompt, &catalog, SelectionPolicy::Digit)?;
        let entry = &catalog[index];
        info!("Selected {}", entry);

        let subtitles = self.resolve_subtitles(entry, season).await?;
        let index = choose(&mut *self.prompt, &subtitles, SelectionPolicy::Line)?;
        let subtitle = &subtitles[index];
        info!("Selected {}", subtitle.release_name);

        download_subtitle(self.api, subtitle, &self.options.download_dir).await
    }

    /// Searches until something matches; the user retypes the name each time
    /// nothing does.
    async fn resolve_catalog(
        &mut self,
        file_name: &str,
        kind: MediaKind,
    ) -> Result<Vec<CatalogCandidate>> {
        let mut name = file_name.to_string();
        loop {
            match resolve::resolve_catalog(self.api, &name, kind).await {
                Ok(candidates) => return Ok(candidates),
                Err(err) if err.is_no_candidates() => {
                    warn!("{}", err);
                    name = self.ask_for_name()?;
                    info!("Using new file name: {}", name);
                }
                Err(err) => return Err(err).context("catalog search failed"),
            }
        }
    }

    fn ask_for_name(&mut self) -> Result<String> {
        self.prompt.show(
            "Could not find movie or tv show with that file name, please type the correct name",
        )?;
        self.prompt
            .read_line()?
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .ok_or_else(|| anyhow!("no replacement name given"))
    }

    async fn resolve_subtitles(
        &self,
        entry: &CatalogCandidate,
        season: Option<u32>,
    ) -> Result<Vec<SubtitleCandidate>> {
        let subs = match season {
            Some(season) => {
                resolve::resolve_tv_season_subtitles(
                    self.api,
                    entry.id,
                    season,
                    self.options.season_filter,
                )
                .await
            }
            None => resolve::resolve_movie_subtitles(self.api, entry.id).await,
        };
        subs.context("subtitle listing failed")
    }
}
