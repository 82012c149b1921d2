use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tagsight_model::{AssetId, DraftId};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::create::draft::CreationDraft;
use crate::error::{Result, ScanError};
use crate::remote::{DirectoryError, EntityDirectory};

/// Outcome of one phase of the two-phase protocol.
#[derive(Debug)]
pub enum Phase<T> {
    Succeeded(T),
    Failed(ScanError),
    /// Never attempted because an earlier phase failed.
    Skipped,
}

impl<T> Phase<T> {
    pub fn succeeded(&self) -> Option<&T> {
        match self {
            Phase::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ScanError> {
        match self {
            Phase::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Phase::Skipped)
    }
}

/// Outcome of submitting a [`CreationDraft`].
///
/// Partial success is a first-class value: `phase1` succeeded with `phase2`
/// failed means the entity exists in the directory but lacks its image
/// artifact. Phase 2 failing never reverses phase 1.
#[derive(Debug)]
pub struct CreationResult {
    pub draft: DraftId,
    pub phase1: Phase<AssetId>,
    pub phase2: Phase<()>,
    pub submitted_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CreationResult {
    /// Identifier minted by phase 1, if it succeeded.
    pub fn created_id(&self) -> Option<&AssetId> {
        self.phase1.succeeded()
    }

    /// Both phases succeeded.
    pub fn is_complete(&self) -> bool {
        self.phase1.succeeded().is_some() && self.phase2.succeeded().is_some()
    }

    /// Entity created, artifact attachment failed.
    pub fn is_partial(&self) -> bool {
        self.phase1.succeeded().is_some() && self.phase2.error().is_some()
    }
}

#[derive(Default)]
struct DraftLedger {
    in_flight: HashSet<DraftId>,
    consumed: HashSet<DraftId>,
}

/// Drives two-phase asset creation against an [`EntityDirectory`]: entity
/// fields first, then the image artifact keyed by the created identifier.
///
/// Submission is guarded per draft id. A draft already in flight or whose
/// phase 1 succeeded is rejected with `DraftAlreadySubmitted` before any
/// network call (resubmitting it would duplicate the entity). A draft whose
/// phase 1 failed is released again; retry is a fresh user action.
pub struct CreateBinder {
    directory: Arc<dyn EntityDirectory>,
    ledger: Mutex<DraftLedger>,
}

impl CreateBinder {
    pub fn new(directory: Arc<dyn EntityDirectory>) -> Self {
        Self {
            directory,
            ledger: Mutex::new(DraftLedger::default()),
        }
    }

    /// Run the two-phase protocol for `draft`.
    ///
    /// Validation failures and the submit-once guard surface as errors before
    /// any network call. Once the network is involved, the outcome is always
    /// an `Ok(CreationResult)` whose phases say what happened.
    pub async fn submit(&self, draft: CreationDraft) -> Result<CreationResult> {
        let draft_id = draft.id();
        {
            let mut ledger = self.ledger.lock().await;
            if ledger.consumed.contains(&draft_id) {
                return Err(ScanError::DraftAlreadySubmitted(format!(
                    "draft {draft_id} already created an entity"
                )));
            }
            if !ledger.in_flight.insert(draft_id) {
                return Err(ScanError::DraftAlreadySubmitted(format!(
                    "draft {draft_id} has a submission in flight"
                )));
            }
        }

        let (_, fields, artifact) = match draft.into_submission() {
            Ok(parts) => parts,
            Err(err) => {
                self.release(draft_id).await;
                return Err(err);
            }
        };

        let submitted_at = Utc::now();
        info!(target: "create", draft = %draft_id, "submitting entity fields");

        let created = match self.directory.create_entity(&fields).await {
            Ok(record) => record,
            Err(err) => {
                error!(
                    target: "create",
                    draft = %draft_id,
                    error = %err,
                    "entity creation failed"
                );
                let failure = create_failure(err);
                self.release(draft_id).await;
                return Ok(CreationResult {
                    draft: draft_id,
                    phase1: Phase::Failed(failure),
                    phase2: Phase::Skipped,
                    submitted_at,
                    finished_at: Utc::now(),
                });
            }
        };

        // The entity now exists; this draft must never create another.
        {
            let mut ledger = self.ledger.lock().await;
            ledger.in_flight.remove(&draft_id);
            ledger.consumed.insert(draft_id);
        }
        info!(
            target: "create",
            draft = %draft_id,
            asset = %created.id,
            "entity created; attaching artifact"
        );

        let phase2 = match self.directory.attach_artifact(&created.id, &artifact).await {
            Ok(()) => Phase::Succeeded(()),
            Err(err) => {
                warn!(
                    target: "create",
                    draft = %draft_id,
                    asset = %created.id,
                    error = %err,
                    "entity exists but artifact attachment failed"
                );
                Phase::Failed(ScanError::AttachFailed {
                    id: created.id.clone(),
                    reason: err.to_string(),
                })
            }
        };

        Ok(CreationResult {
            draft: draft_id,
            phase1: Phase::Succeeded(created.id),
            phase2,
            submitted_at,
            finished_at: Utc::now(),
        })
    }

    async fn release(&self, draft_id: DraftId) {
        self.ledger.lock().await.in_flight.remove(&draft_id);
    }
}

impl fmt::Debug for CreateBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateBinder").finish_non_exhaustive()
    }
}

fn create_failure(err: DirectoryError) -> ScanError {
    match err {
        DirectoryError::MissingIdentifier => ScanError::CreateFailed(
            "the directory accepted the entity but returned no usable identifier; \
             the remote write may have partially succeeded and needs manual \
             follow-up"
                .into(),
        ),
        other => ScanError::CreateFailed(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;
    use tagsight_model::{CatalogEntity, ImageArtifact};
    use tokio::sync::Notify;

    use super::*;
    use crate::remote::CreatedRecord;

    #[derive(Default)]
    struct RecordingDirectory {
        create_calls: AtomicUsize,
        attach_calls: AtomicUsize,
        fail_create: AtomicBool,
        fail_attach: AtomicBool,
        omit_id: AtomicBool,
        attached_to: std::sync::Mutex<Vec<AssetId>>,
    }

    impl RecordingDirectory {
        fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }
    }

    #[async_trait]
    impl EntityDirectory for RecordingDirectory {
        async fn fetch_catalog(&self) -> std::result::Result<Vec<CatalogEntity>, DirectoryError> {
            Ok(Vec::new())
        }

        async fn create_entity(
            &self,
            _fields: &crate::create::EntityFields,
        ) -> std::result::Result<CreatedRecord, DirectoryError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_create.load(Ordering::SeqCst) {
                return Err(DirectoryError::Status {
                    status: 500,
                    body: "creation refused".into(),
                });
            }
            if self.omit_id.load(Ordering::SeqCst) {
                return Err(DirectoryError::MissingIdentifier);
            }
            Ok(CreatedRecord {
                id: AssetId::new("asset-1"),
                raw: json!({"id": "asset-1"}),
            })
        }

        async fn attach_artifact(
            &self,
            id: &AssetId,
            _artifact: &ImageArtifact,
        ) -> std::result::Result<(), DirectoryError> {
            self.attach_calls.fetch_add(1, Ordering::SeqCst);
            self.attached_to.lock().unwrap().push(id.clone());
            if self.fail_attach.load(Ordering::SeqCst) {
                return Err(DirectoryError::Status {
                    status: 503,
                    body: "storage offline".into(),
                });
            }
            Ok(())
        }
    }

    fn complete_draft() -> CreationDraft {
        CreationDraft::new()
            .with_name("Projector")
            .with_property_number("PN-1024")
            .with_code("QR-77")
            .with_artifact(ImageArtifact::png(vec![0xAA, 0xBB]))
    }

    #[tokio::test]
    async fn a_valid_draft_creates_and_attaches() {
        let directory = RecordingDirectory::new();
        let binder = CreateBinder::new(directory.clone());

        let result = binder.submit(complete_draft()).await.unwrap();

        assert!(result.is_complete());
        assert_eq!(result.created_id().unwrap().as_str(), "asset-1");
        assert_eq!(directory.create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(directory.attach_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            directory.attached_to.lock().unwrap()[0].as_str(),
            "asset-1"
        );
        assert!(result.finished_at >= result.submitted_at);
    }

    #[tokio::test]
    async fn phase_one_failure_skips_attachment_and_releases_the_draft() {
        let directory = RecordingDirectory::new();
        directory.fail_create.store(true, Ordering::SeqCst);
        let binder = CreateBinder::new(directory.clone());

        let draft = complete_draft();
        let retry = draft.clone();
        let result = binder.submit(draft).await.unwrap();

        assert!(matches!(
            result.phase1.error(),
            Some(ScanError::CreateFailed(_))
        ));
        assert!(result.phase2.is_skipped());
        assert!(result.created_id().is_none());
        assert_eq!(directory.attach_calls.load(Ordering::SeqCst), 0);

        // The draft id was released; a fresh attempt may run.
        directory.fail_create.store(false, Ordering::SeqCst);
        let result = binder.submit(retry).await.unwrap();
        assert!(result.is_complete());
    }

    #[tokio::test]
    async fn phase_two_failure_is_a_partial_success() {
        let directory = RecordingDirectory::new();
        directory.fail_attach.store(true, Ordering::SeqCst);
        let binder = CreateBinder::new(directory.clone());

        let draft = complete_draft();
        let dup = draft.clone();
        let result = binder.submit(draft).await.unwrap();

        assert!(result.is_partial());
        assert!(!result.is_complete());
        assert_eq!(result.created_id().unwrap().as_str(), "asset-1");
        match result.phase2.error() {
            Some(ScanError::AttachFailed { id, .. }) => {
                assert_eq!(id.as_str(), "asset-1");
            }
            other => panic!("expected AttachFailed, got {other:?}"),
        }

        // Resubmitting would duplicate the entity; the draft stays consumed.
        let err = binder.submit(dup).await.unwrap_err();
        assert!(matches!(err, ScanError::DraftAlreadySubmitted(_)));
    }

    #[tokio::test]
    async fn an_incomplete_draft_never_reaches_the_network() {
        let directory = RecordingDirectory::new();
        let binder = CreateBinder::new(directory.clone());

        let incomplete = CreationDraft::new().with_name("Projector");
        let completed_later = incomplete
            .clone()
            .with_property_number("PN-1024")
            .with_code("QR-77")
            .with_artifact(ImageArtifact::png(vec![1]));

        let err = binder.submit(incomplete).await.unwrap_err();
        assert!(matches!(err, ScanError::DraftIncomplete(_)));
        assert_eq!(directory.create_calls.load(Ordering::SeqCst), 0);
        assert_eq!(directory.attach_calls.load(Ordering::SeqCst), 0);

        // Validation failure releases the id for the corrected draft.
        let result = binder.submit(completed_later).await.unwrap();
        assert!(result.is_complete());
    }

    #[tokio::test]
    async fn resubmitting_a_completed_draft_is_rejected() {
        let directory = RecordingDirectory::new();
        let binder = CreateBinder::new(directory.clone());

        let draft = complete_draft();
        let dup = draft.clone();
        binder.submit(draft).await.unwrap();

        let err = binder.submit(dup).await.unwrap_err();
        assert!(matches!(err, ScanError::DraftAlreadySubmitted(_)));
        assert_eq!(directory.create_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn a_missing_identifier_is_a_create_failure() {
        let directory = RecordingDirectory::new();
        directory.omit_id.store(true, Ordering::SeqCst);
        let binder = CreateBinder::new(directory.clone());

        let result = binder.submit(complete_draft()).await.unwrap();

        match result.phase1.error() {
            Some(ScanError::CreateFailed(message)) => {
                assert!(message.contains("identifier"));
                assert!(message.contains("manual follow-up"));
            }
            other => panic!("expected CreateFailed, got {other:?}"),
        }
        assert!(result.phase2.is_skipped());
        assert_eq!(directory.attach_calls.load(Ordering::SeqCst), 0);
    }

    struct GatedDirectory {
        inner: Arc<RecordingDirectory>,
        gate: Notify,
    }

    #[async_trait]
    impl EntityDirectory for GatedDirectory {
        async fn fetch_catalog(&self) -> std::result::Result<Vec<CatalogEntity>, DirectoryError> {
            self.inner.fetch_catalog().await
        }

        async fn create_entity(
            &self,
            fields: &crate::create::EntityFields,
        ) -> std::result::Result<CreatedRecord, DirectoryError> {
            self.gate.notified().await;
            self.inner.create_entity(fields).await
        }

        async fn attach_artifact(
            &self,
            id: &AssetId,
            artifact: &ImageArtifact,
        ) -> std::result::Result<(), DirectoryError> {
            self.inner.attach_artifact(id, artifact).await
        }
    }

    #[tokio::test]
    async fn a_draft_in_flight_cannot_be_submitted_again() {
        let recording = RecordingDirectory::new();
        let directory = Arc::new(GatedDirectory {
            inner: recording.clone(),
            gate: Notify::new(),
        });
        let binder = Arc::new(CreateBinder::new(directory.clone()));

        let draft = complete_draft();
        let dup = draft.clone();
        let first = tokio::spawn({
            let binder = binder.clone();
            async move { binder.submit(draft).await }
        });
        tokio::task::yield_now().await;

        let err = binder.submit(dup).await.unwrap_err();
        assert!(matches!(err, ScanError::DraftAlreadySubmitted(_)));

        directory.gate.notify_one();
        let result = first.await.unwrap().unwrap();
        assert!(result.is_complete());
        assert_eq!(recording.create_calls.load(Ordering::SeqCst), 1);
    }
}
