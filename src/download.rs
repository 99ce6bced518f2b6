use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::media::SubtitleCandidate;
use crate::subdl::{download_url, SubdlApi};

/// Fetches the subtitle archive and writes it into `dest_dir` under the name
/// the url ends with. Returns the written path.
pub async fn download_subtitle(
    api: &dyn SubdlApi,
    subtitle: &SubtitleCandidate,
    dest_dir: &Path,
) -> Result<PathBuf> {
    let target = dest_dir.join(subtitle.file_name()?);
    info!(
        "Downloading subtitles {} to {}",
        download_url(&subtitle.url),
        target.display()
    );
    let bytes = api.fetch_file(&subtitle.url).await?;
    tokio::fs::write(&target, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", target.display()))?;
    info!("Written {} bytes", bytes.len());
    Ok(target)
}
