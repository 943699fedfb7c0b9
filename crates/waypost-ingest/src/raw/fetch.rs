use std::fs;
use std::path::PathBuf;

use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};
use zip::ZipArchive;

use super::PostalSource;
use crate::{IngestError, Result};

#[instrument(name = "Download postal data", skip_all, level = "info")]
pub fn download_postal_data(source: &PostalSource) -> Result<NamedTempFile> {
    let url = source
        .geonames_url()
        .ok_or(IngestError::RequiredFilesNotFound)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let client = Client::new();
        download_zip_and_extract_postal_entry(&client, &url).await
    })
}

async fn download_to_temp_file(client: &Client, url: &str) -> Result<NamedTempFile> {
    info!(url, "Starting download");
    let response = client.get(url).send().await?.error_for_status()?;

    let total_size = response.content_length().unwrap_or(0);

    let pb = ProgressBar::new(total_size);
    pb.set_style(ProgressStyle::default_bar()
        .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})").expect("Progress bar template")
        .progress_chars("█░"));
    pb.set_message(format!(
        "Downloading {}",
        url.split('/').next_back().unwrap_or(url)
    ));

    let temp_file = NamedTempFile::new()?;
    let mut dest_file = tokio::fs::File::create(temp_file.path()).await?;

    let mut stream = response.bytes_stream();
    while let Some(item) = stream.next().await {
        let chunk = item?;
        dest_file.write_all(&chunk).await?;
        pb.inc(chunk.len() as u64);
    }
    dest_file.flush().await?;
    pb.finish_and_clear();
    Ok(temp_file)
}

async fn download_zip_and_extract_postal_entry(
    client: &Client,
    zip_url: &str,
) -> Result<NamedTempFile> {
    info!(zip_url, "Starting ZIP download");
    let zip_temp_file = download_to_temp_file(client, zip_url).await?;
    info!(path = ?zip_temp_file.path(), "ZIP download complete");

    let zip_file_path = zip_temp_file.path().to_path_buf();

    let extracted = tokio::task::spawn_blocking(move || extract_postal_entry_from_zip(zip_file_path))
        .await??;

    Ok(extracted)
}

/// Pull the postal data entry out of a GeoNames zip. Each archive holds the
/// `.txt` dump plus a `readme.txt`, which is skipped.
fn extract_postal_entry_from_zip(zip_file_path: PathBuf) -> Result<NamedTempFile> {
    let zip_fs_file = fs::File::open(&zip_file_path)?;
    let mut archive = ZipArchive::new(zip_fs_file)?;

    let mut data_entry = None;
    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        let name = entry.name().to_ascii_lowercase();
        if name.ends_with(".txt") && !name.contains("readme") {
            data_entry = Some(index);
            break;
        }
    }
    let Some(index) = data_entry else {
        return Err(zip::result::ZipError::FileNotFound.into());
    };

    let mut file_in_zip = archive.by_index(index)?;

    let extracted_content_temp_file = NamedTempFile::with_suffix(".txt")?;
    let mut extracted_fs_file = fs::File::create(extracted_content_temp_file.path())?;

    std::io::copy(&mut file_in_zip, &mut extracted_fs_file)?;
    info!(path = ?extracted_content_temp_file.path(), "Postal dump extracted");

    Ok(extracted_content_temp_file)
}
