//! Chunk transfer engine.
//!
//! Reads the source stream in strict chunk order and uploads the chunks
//! through a bounded worker pool. Streams are read-once, so extraction
//! is single-threaded even while uploads overlap; the collected part
//! acknowledgments are re-sorted into sequence order before they reach
//! the commit step, since network completion order is not transfer
//! order.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use chunkdrive_client::{Client, PartUploadRequest};
use chunkdrive_protocol::types::{FilePart, UploadedPart};

use crate::DriverError;
use crate::plan::UploadPlan;

/// Progress observer for one put: receives the cumulative percentage of
/// uploaded bytes in `[0, 100]`, at most once per chunk.
pub type ProgressFn = dyn Fn(f64) + Send + Sync;

/// Uploads every chunk of `plan` from `reader`.
///
/// At most `concurrency` part uploads are in flight at once; a permit is
/// taken *before* the next chunk is read, so buffered memory is bounded
/// by `concurrency * chunk_size`. Returns the part list in ascending
/// sequence order, one entry per planned chunk.
///
/// Any failure aborts the whole transfer: the first upload error, a
/// truncated source, or cancellation. In-flight requests are dropped on
/// the way out, so nothing races past a failure into the commit step.
pub(crate) async fn upload_parts<R>(
    client: &Client,
    plan: &Arc<UploadPlan>,
    reader: &mut R,
    concurrency: usize,
    progress: Option<&ProgressFn>,
    cancel: &CancellationToken,
) -> Result<Vec<FilePart>, DriverError>
where
    R: AsyncRead + Unpin + Send,
{
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut tasks: JoinSet<Result<(u64, UploadedPart), DriverError>> = JoinSet::new();
    let mut acks: Vec<(u64, UploadedPart)> = Vec::with_capacity(plan.total_chunks as usize);
    let mut uploaded_bytes: u64 = 0;

    for part_no in 1..=plan.total_chunks {
        // Collect finished uploads first, so an upload failure stops the
        // stream from being consumed any further.
        while let Some(done) = tasks.try_join_next() {
            let (no, ack) = flatten(done)?;
            uploaded_bytes += plan.chunk_len(no);
            report(progress, uploaded_bytes, plan.size);
            acks.push((no, ack));
        }

        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(DriverError::Cancelled),
            permit = Arc::clone(&semaphore).acquire_owned() => {
                permit.map_err(|e| DriverError::Upload(format!("semaphore closed: {e}")))?
            }
        };

        let len = plan.chunk_len(part_no);
        let mut buf = vec![0u8; len as usize];
        reader.read_exact(&mut buf).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::UnexpectedEof => DriverError::TruncatedStream {
                part_no,
                expected: len,
            },
            _ => DriverError::Io(e),
        })?;

        let client = client.clone();
        let plan = Arc::clone(plan);
        let cancel = cancel.clone();
        tasks.spawn(async move {
            let part_name = plan.part_name(part_no);
            let request = PartUploadRequest {
                part_name: &part_name,
                file_name: &plan.file_name,
                part_no,
                channel_id: plan.channel_id,
                encrypted: plan.encrypted,
            };
            let ack = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(DriverError::Cancelled),
                res = client.upload_part(&plan.upload_id, &request, buf) => res?,
            };
            debug!(part_no, part_id = ack.part_id, "chunk uploaded");
            drop(permit);
            Ok((part_no, ack))
        });
    }

    while let Some(done) = tasks.join_next().await {
        let (no, ack) = flatten(done)?;
        uploaded_bytes += plan.chunk_len(no);
        report(progress, uploaded_bytes, plan.size);
        acks.push((no, ack));
    }

    // Completion order is network order; the commit request needs
    // ascending sequence order.
    acks.sort_by_key(|(no, _)| *no);
    Ok(acks
        .into_iter()
        .map(|(_, ack)| FilePart {
            id: ack.part_id,
            salt: ack.salt,
        })
        .collect())
}

fn flatten(
    joined: Result<Result<(u64, UploadedPart), DriverError>, tokio::task::JoinError>,
) -> Result<(u64, UploadedPart), DriverError> {
    joined.map_err(|e| DriverError::Upload(format!("task join error: {e}")))?
}

fn report(progress: Option<&ProgressFn>, uploaded: u64, total: u64) {
    if let Some(cb) = progress {
        cb(uploaded as f64 / total as f64 * 100.0);
    }
}
