//! Derivative worker: resizes uploaded images in the background.
//!
//! A single task drains the job queue. Image decode and resize run on
//! the blocking pool; only the finished bytes are written back through
//! the async blob store. A failure marks the job Failed and removes any
//! variant already written, leaving the original untouched.

use std::io::Cursor;
use std::sync::Arc;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::queue::{DerivativeJob, JobId, JobQueue, JobStatus};
use crate::db::Database;
use crate::file::{BlobStorage, NodeRepository, VARIANT_WIDTHS};
use crate::{DepotError, Result};

/// Background worker generating image derivatives.
pub struct DerivativeWorker {
    queue: Arc<JobQueue>,
    rx: UnboundedReceiver<JobId>,
    db: Database,
    storage: Arc<BlobStorage>,
}

impl DerivativeWorker {
    /// Create a worker over the shared queue, database and blob store.
    pub fn new(
        queue: Arc<JobQueue>,
        rx: UnboundedReceiver<JobId>,
        db: Database,
        storage: Arc<BlobStorage>,
    ) -> Self {
        Self {
            queue,
            rx,
            db,
            storage,
        }
    }

    /// Spawn the worker loop on the runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        info!("Derivative worker started");

        while let Some(id) = self.rx.recv().await {
            let Some(job) = self.queue.job(id) else {
                warn!(job_id = id, "Received unknown job ID");
                continue;
            };

            self.queue.set_status(id, JobStatus::Running);

            match self.process(&job).await {
                Ok(()) => {
                    debug!(job_id = id, file_id = job.file_id, "Derivatives generated");
                    self.queue.set_status(id, JobStatus::Succeeded);
                }
                Err(e) => {
                    warn!(
                        job_id = id,
                        file_id = job.file_id,
                        error = %e,
                        "Derivative generation failed"
                    );
                    self.queue.set_status(id, JobStatus::Failed);
                }
            }
        }

        info!("Derivative worker stopped");
    }

    async fn process(&self, job: &DerivativeJob) -> Result<()> {
        let repo = NodeRepository::new(self.db.pool());
        let node = repo
            .get(job.owner_id, job.file_id)
            .await?
            .ok_or_else(|| DepotError::NotFound("node".to_string()))?;

        let blob_ref = node
            .content_ref
            .as_deref()
            .ok_or_else(|| DepotError::Storage("node has no content".to_string()))?;

        let bytes = self.storage.load(blob_ref).await?;

        let variants = tokio::task::spawn_blocking(move || generate_derivatives(&bytes))
            .await
            .map_err(|e| DepotError::Storage(format!("derivative task panicked: {e}")))??;

        let mut written = Vec::new();
        for (width, data) in variants {
            if let Err(e) = self.storage.store_variant(blob_ref, width, &data).await {
                // Don't leave a partial set behind
                for w in written {
                    let _ = self.storage.remove_variant(blob_ref, w).await;
                }
                return Err(e);
            }
            written.push(width);
        }

        Ok(())
    }
}

/// Decode an image and produce encoded derivatives at every standard width.
///
/// Re-encodes in the source format when it can be detected, PNG otherwise.
fn generate_derivatives(bytes: &[u8]) -> Result<Vec<(u32, Vec<u8>)>> {
    let format = image::guess_format(bytes).unwrap_or(ImageFormat::Png);
    let img = image::load_from_memory(bytes)
        .map_err(|e| DepotError::Storage(format!("cannot decode image: {e}")))?;

    let mut variants = Vec::with_capacity(VARIANT_WIDTHS.len());
    for &width in VARIANT_WIDTHS {
        let resized = scale_to_width(&img, width);
        let encoded = encode(&resized, format)?;
        variants.push((width, encoded));
    }

    Ok(variants)
}

fn scale_to_width(img: &DynamicImage, width: u32) -> DynamicImage {
    let height = ((img.height() as u64 * width as u64) / img.width() as u64).max(1) as u32;
    img.resize_exact(width, height, FilterType::Triangle)
}

fn encode(img: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());

    let result = match format {
        // JPEG has no alpha channel
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()).write_to(&mut buf, format),
        _ => img.write_to(&mut buf, format),
    };

    result.map_err(|e| DepotError::Storage(format!("cannot encode image: {e}")))?;
    Ok(buf.into_inner())
}
