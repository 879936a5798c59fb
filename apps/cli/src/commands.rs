//! Subcommand implementations.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use slideship_client::{
    ChunkedUploader, ConversionTrigger, HttpChunkSender, UploadEvent, build_http_client,
};
use slideship_protocol::constants::direction;
use slideship_protocol::ConversionRequest;
use slideship_transfer::{FileSource, JsonFileProgressStore, UploadSource};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::ConversionArgs;
use crate::config::ClientConfig;
use crate::progress::{UploadProgress, format_bytes};

/// Uploads `file`, then converts it.
pub async fn upload(
    config: &ClientConfig,
    file: &Path,
    resume: bool,
    args: &ConversionArgs,
) -> anyhow::Result<()> {
    let size = check_file(file, config.max_file_size).await?;
    let source = FileSource::open(file)
        .await
        .with_context(|| format!("cannot upload {}", file.display()))?;

    let http = build_http_client(config.request_timeout())?;
    let endpoints = config.endpoints();
    let sender = Arc::new(HttpChunkSender::new(http.clone(), &endpoints));
    let mut uploader = ChunkedUploader::new(sender, config.uploader_config());
    if resume {
        let store = JsonFileProgressStore::new(config.state_dir())?;
        info!(dir = %store.dir().display(), "resume state enabled");
        uploader = uploader.with_store(Arc::new(store));
    }

    let cancel = uploader.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling upload");
            cancel.cancel();
        }
    });

    info!(
        file = %source.name(),
        size = %format_bytes(size),
        server = %endpoints.base_url(),
        "uploading"
    );

    let (tx, rx) = mpsc::channel::<UploadEvent>(64);
    let display = tokio::spawn(UploadProgress::new(size, source.name()).run(rx));
    let uploaded = uploader.upload_with_events(&source, &tx).await;
    drop(tx);
    let _ = display.await;
    let outcome = uploaded?;

    info!(
        job = %outcome.job_id,
        chunks = outcome.total_chunks,
        sent = %format_bytes(outcome.bytes_sent),
        "upload finished"
    );

    let trigger = ConversionTrigger::new(http, endpoints);
    run_conversion(&trigger, &outcome.file_name, args).await
}

/// Converts a file that was uploaded earlier.
pub async fn convert(
    config: &ClientConfig,
    filename: &str,
    args: &ConversionArgs,
) -> anyhow::Result<()> {
    let http = build_http_client(config.request_timeout())?;
    let trigger = ConversionTrigger::new(http, config.endpoints());
    run_conversion(&trigger, filename, args).await
}

async fn run_conversion(
    trigger: &ConversionTrigger,
    filename: &str,
    args: &ConversionArgs,
) -> anyhow::Result<()> {
    let request = build_request(filename, args);
    let result = trigger.request_conversion(&request).await?;

    let Some(locator) = result.download_locator() else {
        println!("Conversion finished; the server returned no download location.");
        return Ok(());
    };
    let url = trigger.endpoints().resolve(locator);
    println!("Converted file: {url}");

    if let Some(dest) = &args.download {
        let bytes = trigger.download(locator, dest).await?;
        println!("Saved {} to {}", format_bytes(bytes), dest.display());
    }
    Ok(())
}

/// Builds the conversion request; the direction is forwarded even if unknown.
pub fn build_request(filename: &str, args: &ConversionArgs) -> ConversionRequest {
    if !direction::KNOWN.contains(&args.direction.as_str()) {
        warn!(direction = %args.direction, "unknown conversion direction, sending as is");
    }
    let request = ConversionRequest::new(
        filename,
        args.output_name.as_str(),
        args.slides.as_str(),
        args.direction.as_str(),
    );
    if args.translate {
        request.with_translation(true)
    } else {
        request
    }
}

/// Checks that `path` is a regular file no larger than `max_size`.
pub async fn check_file(path: &Path, max_size: u64) -> anyhow::Result<u64> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    if !metadata.is_file() {
        bail!("{} is not a regular file", path.display());
    }
    if metadata.len() > max_size {
        bail!(
            "{} is {}, above the {} limit",
            path.display(),
            format_bytes(metadata.len()),
            format_bytes(max_size)
        );
    }
    Ok(metadata.len())
}
