use crate::AssetDocument;
use crate::error::{ErrorKind, Result};
use async_stream::stream;
use exn::ResultExt;
use futures::Stream;
use std::sync::Arc;
use tracing::{debug, instrument};
use vista_digest::{DigestRow, Extensions, friendly_size, friendly_timestamp, wrappable_path};
use vista_storage::BackendHandle;

/// A stage of the scan that appends to the digest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigestStep {
    /// The `path` row.
    Path,
    /// The `size` and `modified` rows.
    Metadata,
    /// Rows produced by the format digester.
    Content,
}

/// Progress events emitted by [`digest_stream`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started), exactly once.
/// 2. [`Appended`](Self::Appended), once per step that added rows, in step
///    order.
/// 3. Either [`Finalized`](Self::Finalized) or [`Abandoned`](Self::Abandoned),
///    exactly once, ending the stream.
///
/// Any other failure ends the stream with an `Err` item instead, and the
/// digest is left open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigestEvent {
    Started,
    Appended(DigestStep),
    Finalized,
    /// The document was disposed mid-scan; nothing more will be appended.
    Abandoned,
}

/// Streams the scan of `doc`: resource path, then size and modification
/// time, then format-specific rows, then finalization.
///
/// Every step re-checks that the document is still live before doing any
/// I/O and again (atomically) when appending. Disposal is never an error:
/// the stream simply ends with [`DigestEvent::Abandoned`].
pub fn digest_stream<'a>(
    doc: &'a Arc<AssetDocument>,
    backend: &'a BackendHandle,
    extensions: &'a Extensions,
) -> impl Stream<Item = Result<DigestEvent>> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        yield Ok(DigestEvent::Started);
        for step in [DigestStep::Path, DigestStep::Metadata, DigestStep::Content] {
            match run_step(doc, backend, extensions, step).await {
                Ok(true) => {
                    yield Ok(DigestEvent::Appended(step));
                },
                Ok(false) => {},
                Err(err) if matches!(&*err, ErrorKind::Disposed) => {
                    debug!(uri = %doc.uri(), ?step, "document disposed mid-scan, abandoning");
                    yield Ok(DigestEvent::Abandoned);
                    return;
                },
                Err(err) => {
                    yield Err(err);
                    return;
                },
            }
        }
        match doc.append_to_digest(vec![], true) {
            Ok(()) => {
                yield Ok(DigestEvent::Finalized);
            },
            Err(err) if matches!(&*err, ErrorKind::Disposed) => {
                debug!(uri = %doc.uri(), "document disposed before finalization, abandoning");
                yield Ok(DigestEvent::Abandoned);
            },
            Err(err) => {
                yield Err(err);
            },
        }
    })
}

/// Returns whether the step appended anything.
#[instrument(skip(doc, backend, extensions), fields(uri = %doc.uri()))]
async fn run_step(
    doc: &AssetDocument,
    backend: &BackendHandle,
    extensions: &Extensions,
    step: DigestStep,
) -> Result<bool> {
    let path = doc.uri().path();
    match step {
        DigestStep::Path => {
            let row = DigestRow::new("path", wrappable_path(&path.to_string_lossy()));
            doc.append_to_digest(vec![row], false)?;
        },
        DigestStep::Metadata => {
            doc.ensure_live()?;
            let info = backend.stat(path).await.or_raise(|| ErrorKind::Storage)?;
            let rows = vec![
                DigestRow::new("size", friendly_size(info.size)),
                DigestRow::new("modified", friendly_timestamp(info.modified)),
            ];
            doc.append_to_digest(rows, false)?;
        },
        DigestStep::Content => {
            let Some(format) = extensions.format_for(&doc.extension()) else {
                return Ok(false);
            };
            doc.ensure_live()?;
            let content = backend.read(path).await.or_raise(|| ErrorKind::Storage)?;
            let rows = vista_digest::digest(format, &content).or_raise(|| ErrorKind::Digest)?;
            if rows.is_empty() {
                return Ok(false);
            }
            doc.append_to_digest(rows, false)?;
        },
    }
    Ok(true)
}
