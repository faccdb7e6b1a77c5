//! The scan that fills an [`AssetDocument`]'s digest.
//!
//! The primary entry point is [`digest_asset`], a fire-and-forget future that
//! providers spawn right after opening a document. It drives
//! [`digest_stream`] to completion; use the stream directly when progress
//! matters.

mod stream;

pub use self::stream::{DigestEvent, DigestStep, digest_stream};
use crate::AssetDocument;
use crate::error::Result;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, instrument};
use vista_digest::Extensions;
use vista_storage::BackendHandle;

/// How a scan that did not fail came to an end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigestOutcome {
    /// Every step ran and the digest is finalized.
    Finalized,
    /// The document was disposed first; the digest stays open.
    Abandoned,
}

/// Scan `doc` to completion.
///
/// Disposal of the document at any point is reported as
/// [`DigestOutcome::Abandoned`], never as an error. Storage and digester
/// failures propagate, leaving the digest unfinalized. Nothing is retried.
#[instrument(skip_all, fields(uri = %doc.uri()))]
pub async fn digest_asset(
    doc: Arc<AssetDocument>,
    backend: BackendHandle,
    extensions: Extensions,
) -> Result<DigestOutcome> {
    let mut events = std::pin::pin!(digest_stream(&doc, &backend, &extensions));
    while let Some(event) = events.next().await {
        match event? {
            DigestEvent::Finalized => return Ok(DigestOutcome::Finalized),
            DigestEvent::Abandoned => return Ok(DigestOutcome::Abandoned),
            DigestEvent::Started => {},
            DigestEvent::Appended(step) => debug!(?step, "appended to digest"),
        }
    }
    // The stream always ends on one of the terminal events above.
    Ok(DigestOutcome::Abandoned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;
    use vista_digest::DigestRow;
    use vista_storage::backend::{MockBackend, StorageBackend};
    use vista_storage::{AssetUri, FileInfo};

    const SCENE: &str = r#"{
        "cameras": [{"name": "camera"}],
        "lights": [{"name": "sun"}],
        "meshes": [{"name": "ground"}, {"id": "box"}]
    }"#;

    /// Holds every `stat` until released, announcing when one has started.
    struct GatedBackend {
        inner: MockBackend,
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl StorageBackend for GatedBackend {
        fn name(&self) -> &str {
            "gated"
        }

        async fn exists(&self, path: &Path) -> vista_storage::error::Result<bool> {
            self.inner.exists(path).await
        }

        async fn read(&self, path: &Path) -> vista_storage::error::Result<Vec<u8>> {
            self.inner.read(path).await
        }

        async fn write(&self, path: &Path, data: &[u8]) -> vista_storage::error::Result<()> {
            self.inner.write(path, data).await
        }

        async fn stat(&self, path: &Path) -> vista_storage::error::Result<FileInfo> {
            self.entered.notify_one();
            self.release.notified().await;
            self.inner.stat(path).await
        }
    }

    fn backend(files: &[(&str, &str)]) -> BackendHandle {
        Arc::new(MockBackend::with_files(files.iter().copied()))
    }

    fn notifications(doc: &AssetDocument) -> (Arc<AtomicUsize>, crate::Subscription) {
        let count = Arc::new(AtomicUsize::new(0));
        let subscription = doc.on_change({
            let count = Arc::clone(&count);
            move || {
                count.fetch_add(1, Ordering::SeqCst);
            }
        });
        (count, subscription)
    }

    fn labels(doc: &AssetDocument) -> Vec<String> {
        doc.snapshot().rows.into_iter().map(|row| row.label).collect()
    }

    #[tokio::test]
    async fn test_full_scan() {
        let doc = AssetDocument::open(AssetUri::file("/models/scene.babylon"));
        let (count, _subscription) = notifications(&doc);
        let backend = backend(&[("/models/scene.babylon", SCENE)]);

        let outcome = digest_asset(doc.clone(), backend, Extensions::default()).await.unwrap();

        assert_eq!(outcome, DigestOutcome::Finalized);
        assert_eq!(labels(&doc), vec!["path", "size", "modified", "cameras", "lights", "meshes"]);
        let snapshot = doc.snapshot();
        assert!(snapshot.finalized);
        assert_eq!(snapshot.rows[0], DigestRow::new("path", "/\u{200b}models/\u{200b}scene.babylon"));
        assert_eq!(snapshot.rows[1], DigestRow::new("size", format!("{} B", SCENE.len())));
        assert_eq!(snapshot.rows[5], DigestRow::new("meshes", "[2] ground, box"));
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_stream_events() {
        let doc = AssetDocument::open(AssetUri::file("/models/scene.babylon"));
        let backend = backend(&[("/models/scene.babylon", SCENE)]);
        let extensions = Extensions::default();

        let events: Vec<_> = digest_stream(&doc, &backend, &extensions).map(|e| e.unwrap()).collect().await;
        assert_eq!(
            events,
            vec![
                DigestEvent::Started,
                DigestEvent::Appended(DigestStep::Path),
                DigestEvent::Appended(DigestStep::Metadata),
                DigestEvent::Appended(DigestStep::Content),
                DigestEvent::Finalized,
            ]
        );
    }

    #[tokio::test]
    async fn test_unrecognized_extension_skips_content() {
        let doc = AssetDocument::open(AssetUri::file("/models/duck.fbx"));
        let (count, _subscription) = notifications(&doc);
        let backend = backend(&[("/models/duck.fbx", "binary junk")]);

        let outcome = digest_asset(doc.clone(), backend, Extensions::default()).await.unwrap();

        assert_eq!(outcome, DigestOutcome::Finalized);
        assert_eq!(labels(&doc), vec!["path", "size", "modified"]);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_unconfigured_extension_skips_content() {
        let doc = AssetDocument::open(AssetUri::file("/models/scene.babylon"));
        let backend = backend(&[("/models/scene.babylon", SCENE)]);
        let extensions = Extensions {
            text: vec![".gltf".into()],
            binary: vec![],
        };

        digest_asset(doc.clone(), backend, extensions).await.unwrap();
        assert_eq!(labels(&doc), vec!["path", "size", "modified"]);
    }

    #[tokio::test]
    async fn test_digest_failure_propagates() {
        let doc = AssetDocument::open(AssetUri::file("/models/broken.gltf"));
        let backend = backend(&[("/models/broken.gltf", "{ not json")]);

        let err = digest_asset(doc.clone(), backend, Extensions::default()).await.unwrap_err();

        assert_eq!(*err, ErrorKind::Digest);
        assert_eq!(labels(&doc), vec!["path", "size", "modified"]);
        assert!(!doc.snapshot().finalized);
    }

    #[tokio::test]
    async fn test_missing_resource_propagates() {
        let doc = AssetDocument::open(AssetUri::file("/models/gone.obj"));

        let err = digest_asset(doc.clone(), backend(&[]), Extensions::default()).await.unwrap_err();

        assert_eq!(*err, ErrorKind::Storage);
        assert_eq!(labels(&doc), vec!["path"]);
        assert!(!doc.snapshot().finalized);
    }

    #[tokio::test]
    async fn test_already_finalized_propagates() {
        let doc = AssetDocument::open(AssetUri::file("/models/scene.babylon"));
        doc.append_to_digest(vec![], true).unwrap();

        let err = digest_asset(doc.clone(), backend(&[]), Extensions::default()).await.unwrap_err();
        assert_eq!(*err, ErrorKind::AlreadyFinalized);
        assert!(doc.snapshot().rows.is_empty());
    }

    #[tokio::test]
    async fn test_dispose_before_stat_resolves() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let backend: BackendHandle = Arc::new(GatedBackend {
            inner: MockBackend::with_files([("/models/scene.babylon", SCENE)]),
            entered: Arc::clone(&entered),
            release: Arc::clone(&release),
        });
        let doc = AssetDocument::open(AssetUri::file("/models/scene.babylon"));
        let (count, _subscription) = notifications(&doc);

        let scan = tokio::spawn(digest_asset(doc.clone(), backend, Extensions::default()));
        entered.notified().await;
        doc.dispose();
        release.notify_one();

        let outcome = scan.await.unwrap().unwrap();
        assert_eq!(outcome, DigestOutcome::Abandoned);
        assert_eq!(labels(&doc), vec!["path"]);
        assert!(!doc.snapshot().finalized);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disposed_before_start() {
        let doc = AssetDocument::open(AssetUri::file("/models/scene.babylon"));
        doc.dispose();
        let backend = backend(&[("/models/scene.babylon", SCENE)]);
        let extensions = Extensions::default();

        let events: Vec<_> = digest_stream(&doc, &backend, &extensions).map(|e| e.unwrap()).collect().await;
        assert_eq!(events, vec![DigestEvent::Started, DigestEvent::Abandoned]);
        assert!(doc.snapshot().rows.is_empty());
    }
}
