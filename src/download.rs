use crate::error::{FsContext, InstallError};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Stream `url` into `destination`, replacing whatever is there.
///
/// The body is written to a temporary file next to `destination` and renamed
/// into place only once the whole body has arrived, so an interrupted
/// download never leaves a truncated artifact under the final name.
pub async fn download_artifact(
    client: &reqwest::Client,
    url: &str,
    destination: &Path,
    show_progress: bool,
) -> Result<(), InstallError> {
    let filename = destination
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| url.to_string());
    tracing::info!("Downloading {} from {}", filename, url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| InstallError::download(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(InstallError::download(url, format!("server returned {}", status)));
    }

    let parent = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut staged = NamedTempFile::new_in(parent)
        .fs_context("could not create temporary file in", parent)?;

    let pb = progress_bar(response.content_length().unwrap_or(0), show_progress);
    pb.set_message(format!("Downloading {}", filename));

    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| InstallError::download(url, e))?;
        staged
            .write_all(&chunk)
            .map_err(|e| InstallError::download(url, format!("write failed: {}", e)))?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }

    staged
        .as_file()
        .sync_all()
        .map_err(|e| InstallError::download(url, format!("write failed: {}", e)))?;

    staged
        .persist(destination)
        .map_err(|e| InstallError::fs("could not move download to", destination, e.error))?;

    pb.finish_with_message("Download complete");
    tracing::debug!("Wrote {} bytes to {}", downloaded, destination.display());
    Ok(())
}

fn progress_bar(total_size: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::with_draw_target(Some(total_size), ProgressDrawTarget::stderr());
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{msg} {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
    ) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
