//! Handoff pipeline and retrieval guard behavior over an in-memory store.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use proptest::prelude::*;

use intake_core::{
    DocumentId, DocumentKey, DocumentRecord, DocumentRoadmap, ErrorKind, NewDocumentRecord,
    RecommendationId, UploadStatus, UserId,
};
use intake_docs::{
    data_uri, sanitize_file_name, DocumentStore, HandoffPipeline, MemoryDocumentStore,
    RetrievalGuard, RetrieveError, SelectedFile, StoreError, UploadError, UploadLimits,
    UploadPhase, UploadRequest, BUCKET_NAME,
};

// ── fixtures ────────────────────────────────────────────────────────

fn line(id: &str, key: &str, category: &str, sent: bool) -> DocumentRoadmap {
    DocumentRoadmap {
        recommendation_id: RecommendationId::new(id),
        user_id: Some(UserId::new("u-1")),
        document_key: DocumentKey::new(key),
        name: key.to_uppercase(),
        category: category.into(),
        priority: 1,
        is_mandatory: true,
        sent,
        updated_at: None,
    }
}

fn request(key: &str, recommendation: &str, file: SelectedFile) -> UploadRequest {
    UploadRequest {
        user_id: Some(UserId::new("u-1")),
        file: Some(file),
        document_key: DocumentKey::new(key),
        recommendation_id: Some(RecommendationId::new(recommendation)),
    }
}

fn one_kib(name: &str) -> SelectedFile {
    SelectedFile::from_bytes(name, vec![7u8; 1024])
}

/// Wraps the memory store, counting writes and optionally failing a phase
/// or delaying inserts.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryDocumentStore,
    fail_insert: AtomicBool,
    fail_mark_sent: AtomicBool,
    inserts: AtomicUsize,
    mark_sent_calls: AtomicUsize,
    insert_delay_ms: u64,
}

impl FlakyStore {
    fn failure(operation: &str) -> StoreError {
        StoreError::Api {
            operation: operation.into(),
            status: 503,
            body: "unavailable".into(),
        }
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn insert_document(
        &self,
        record: NewDocumentRecord,
    ) -> Result<DocumentRecord, StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        if self.insert_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.insert_delay_ms)).await;
        }
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(Self::failure("insert_document"));
        }
        self.inner.insert_document(record).await
    }

    async fn mark_sent(
        &self,
        recommendation_id: &RecommendationId,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.mark_sent_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_mark_sent.load(Ordering::SeqCst) {
            return Err(Self::failure("mark_sent"));
        }
        self.inner.mark_sent(recommendation_id, at).await
    }

    async fn get_document(&self, id: &DocumentId) -> Result<Option<DocumentRecord>, StoreError> {
        self.inner.get_document(id).await
    }

    async fn list_roadmap(&self, user_id: &UserId) -> Result<Vec<DocumentRoadmap>, StoreError> {
        self.inner.list_roadmap(user_id).await
    }
}

fn flaky() -> Arc<FlakyStore> {
    let store = FlakyStore::default();
    store.inner.seed_roadmap([
        line("r-1", "rg", "pessoal", false),
        line("r-2", "cpf", "pessoal", false),
        line("r-3", "matricula_imovel_1", "imoveis", false),
    ]);
    Arc::new(store)
}

// ── two-phase upload ────────────────────────────────────────────────

#[tokio::test]
async fn upload_success_persists_and_flags_sent() {
    let store = flaky();
    let pipeline = HandoffPipeline::new(store.clone());
    let key = DocumentKey::new("rg");
    assert_eq!(pipeline.status(&key), UploadStatus::Pending);

    let record = pipeline
        .submit(request("rg", "r-1", one_kib("rg frente.pdf")))
        .await
        .unwrap();

    assert_eq!(pipeline.status(&key), UploadStatus::Uploaded);
    assert_eq!(store.inner.document_count(), 1);
    assert_eq!(record.file_size, 1024);
    assert_eq!(record.file_type, "application/pdf");
    assert_eq!(record.bucket_name, BUCKET_NAME);
    assert!(record.object_key.starts_with("u-1/rg_"));
    assert!(record.object_key.ends_with("_rg_frente.pdf"));
    let decoded = data_uri::decode(record.file_data.as_deref().unwrap()).unwrap();
    assert_eq!(decoded.bytes, vec![7u8; 1024]);

    let line = store.inner.roadmap_line(&RecommendationId::new("r-1")).unwrap();
    assert!(line.sent);
    assert!(line.updated_at.is_some());
}

#[tokio::test]
async fn status_sync_failure_keeps_single_record() {
    let store = flaky();
    store.fail_mark_sent.store(true, Ordering::SeqCst);
    let pipeline = HandoffPipeline::new(store.clone());

    let err = pipeline
        .submit(request("rg", "r-1", one_kib("rg.pdf")))
        .await
        .unwrap_err();

    assert_eq!(err.phase(), UploadPhase::StatusSync);
    assert_eq!(err.kind(), ErrorKind::StatusSync);
    assert!(err.stored_record().is_some());
    assert_eq!(pipeline.status(&DocumentKey::new("rg")), UploadStatus::Error);
    assert_eq!(store.inner.document_count(), 1);
    assert!(!store.inner.roadmap_line(&RecommendationId::new("r-1")).unwrap().sent);
}

#[tokio::test]
async fn storage_failure_is_distinct_phase() {
    let store = flaky();
    store.fail_insert.store(true, Ordering::SeqCst);
    let pipeline = HandoffPipeline::new(store.clone());

    let err = pipeline
        .submit(request("rg", "r-1", one_kib("rg.pdf")))
        .await
        .unwrap_err();

    assert_eq!(err.phase(), UploadPhase::Storage);
    assert!(err.stored_record().is_none());
    assert_eq!(store.mark_sent_calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.inner.document_count(), 0);
    assert_eq!(pipeline.status(&DocumentKey::new("rg")), UploadStatus::Error);
}

#[tokio::test]
async fn retry_status_sync_completes_without_reinserting() {
    let store = flaky();
    store.fail_mark_sent.store(true, Ordering::SeqCst);
    let pipeline = HandoffPipeline::new(store.clone());

    let err = pipeline
        .submit(request("rg", "r-1", one_kib("rg.pdf")))
        .await
        .unwrap_err();
    let record = err.stored_record().cloned().unwrap();

    store.fail_mark_sent.store(false, Ordering::SeqCst);
    pipeline.retry_status_sync(&record).await.unwrap();

    assert_eq!(pipeline.status(&DocumentKey::new("rg")), UploadStatus::Uploaded);
    assert_eq!(store.inserts.load(Ordering::SeqCst), 1);
    assert!(store.inner.roadmap_line(&RecommendationId::new("r-1")).unwrap().sent);
}

#[tokio::test]
async fn unknown_recommendation_is_a_status_sync_failure() {
    let store = flaky();
    let pipeline = HandoffPipeline::new(store.clone());

    let err = pipeline
        .submit(request("rg", "r-missing", one_kib("rg.pdf")))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        UploadError::StatusSync {
            source: StoreError::NotFound { .. },
            ..
        }
    ));
    assert_eq!(store.inner.document_count(), 1);
}

#[tokio::test]
async fn unreadable_file_fails_in_read_phase() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rg.pdf");
    std::fs::write(&path, b"%PDF-1.4").unwrap();
    let file = SelectedFile::from_path(&path).await.unwrap();
    std::fs::remove_file(&path).unwrap();

    let store = flaky();
    let pipeline = HandoffPipeline::new(store.clone());
    let err = pipeline.submit(request("rg", "r-1", file)).await.unwrap_err();

    assert_eq!(err.phase(), UploadPhase::Read);
    assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
    assert_eq!(pipeline.status(&DocumentKey::new("rg")), UploadStatus::Error);
}

#[tokio::test]
async fn file_on_disk_is_uploaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("comprovante.png");
    std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

    let store = flaky();
    let pipeline = HandoffPipeline::new(store.clone());
    let file = SelectedFile::from_path(&path).await.unwrap();
    assert_eq!(file.size, 4);
    let record = pipeline.submit(request("cpf", "r-2", file)).await.unwrap();

    assert_eq!(record.file_type, "image/png");
    assert_eq!(record.file_name, "comprovante.png");
}

// ── preconditions ───────────────────────────────────────────────────

#[tokio::test]
async fn oversized_file_is_rejected_before_io() {
    let store = flaky();
    let pipeline = HandoffPipeline::new(store.clone());
    let big = SelectedFile::from_bytes("scan.pdf", vec![0u8; 10 * 1024 * 1024 + 1]);

    let err = pipeline.submit(request("rg", "r-1", big)).await.unwrap_err();

    assert!(matches!(err, UploadError::TooLarge { .. }));
    assert_eq!(err.kind(), ErrorKind::Precondition);
    assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
    assert_eq!(store.mark_sent_calls.load(Ordering::SeqCst), 0);
    assert_eq!(pipeline.status(&DocumentKey::new("rg")), UploadStatus::Error);
}

#[tokio::test]
async fn custom_limit_applies() {
    let store = flaky();
    let pipeline = HandoffPipeline::with_limits(store.clone(), UploadLimits { max_bytes: 512 });
    let err = pipeline
        .submit(request("rg", "r-1", one_kib("rg.pdf")))
        .await
        .unwrap_err();
    assert!(matches!(err, UploadError::TooLarge { size: 1024, max: 512 }));
}

#[tokio::test]
async fn preconditions_are_checked_in_order() {
    let store = flaky();
    let pipeline = HandoffPipeline::new(store.clone());
    let base = request("rg", "r-1", one_kib("rg.pdf"));

    let mut no_user = base.clone();
    no_user.user_id = None;
    no_user.file = None;
    assert!(matches!(
        pipeline.submit(no_user).await,
        Err(UploadError::Unauthenticated)
    ));

    let mut no_file = base.clone();
    no_file.file = None;
    no_file.recommendation_id = None;
    assert!(matches!(pipeline.submit(no_file).await, Err(UploadError::NoFile)));

    let mut no_recommendation = base.clone();
    no_recommendation.recommendation_id = Some(RecommendationId::new("  "));
    assert!(matches!(
        pipeline.submit(no_recommendation).await,
        Err(UploadError::MissingRecommendation)
    ));

    assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
}

// ── concurrency ─────────────────────────────────────────────────────

#[tokio::test]
async fn independent_uploads_run_concurrently() {
    let store = FlakyStore {
        insert_delay_ms: 50,
        ..Default::default()
    };
    store.inner.seed_roadmap([
        line("r-1", "rg", "pessoal", false),
        line("r-2", "cpf", "pessoal", false),
    ]);
    let store = Arc::new(store);
    let pipeline = HandoffPipeline::new(store.clone());

    let (a, b) = tokio::join!(
        pipeline.submit(request("rg", "r-1", one_kib("rg.pdf"))),
        pipeline.submit(request("cpf", "r-2", one_kib("cpf.pdf"))),
    );

    assert!(a.is_ok());
    assert!(b.is_ok());
    assert_eq!(pipeline.status(&DocumentKey::new("rg")), UploadStatus::Uploaded);
    assert_eq!(pipeline.status(&DocumentKey::new("cpf")), UploadStatus::Uploaded);
    assert_eq!(store.inner.document_count(), 2);
}

#[tokio::test]
async fn status_reads_uploading_while_insert_is_pending() {
    let store = FlakyStore {
        insert_delay_ms: 200,
        ..Default::default()
    };
    store.inner.seed_roadmap([line("r-1", "rg", "pessoal", false)]);
    let store = Arc::new(store);
    let pipeline = HandoffPipeline::new(store.clone());
    let key = DocumentKey::new("rg");
    assert_eq!(pipeline.status(&key), UploadStatus::Pending);

    let (result, during) = tokio::join!(
        pipeline.submit(request("rg", "r-1", one_kib("rg.pdf"))),
        async {
            while store.inserts.load(Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
            pipeline.status(&key)
        },
    );

    assert_eq!(during, UploadStatus::Uploading);
    assert!(result.is_ok());
    assert_eq!(pipeline.status(&key), UploadStatus::Uploaded);
}

#[tokio::test]
async fn same_key_upload_in_flight_is_rejected() {
    let store = FlakyStore {
        insert_delay_ms: 50,
        ..Default::default()
    };
    store.inner.seed_roadmap([line("r-1", "rg", "pessoal", false)]);
    let store = Arc::new(store);
    let pipeline = HandoffPipeline::new(store.clone());

    let (first, second) = tokio::join!(
        pipeline.submit(request("rg", "r-1", one_kib("rg.pdf"))),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            pipeline.submit(request("rg", "r-1", one_kib("rg-2.pdf"))).await
        },
    );

    assert!(first.is_ok());
    let err = second.unwrap_err();
    assert!(matches!(err, UploadError::InFlight { .. }));
    assert_eq!(err.kind(), ErrorKind::Busy);
    assert_eq!(store.inserts.load(Ordering::SeqCst), 1);
    assert_eq!(pipeline.status(&DocumentKey::new("rg")), UploadStatus::Uploaded);
}

// ── reconcile and progress ──────────────────────────────────────────

#[tokio::test]
async fn reconcile_seeds_from_sent_flags() {
    let store = flaky();
    let pipeline = HandoffPipeline::new(store.clone());
    let lines = vec![
        line("r-1", "rg", "pessoal", true),
        line("r-2", "cpf", "pessoal", false),
    ];
    pipeline.board().set(&DocumentKey::new("cpf"), UploadStatus::Error);

    pipeline.reconcile(&lines);

    assert_eq!(pipeline.status(&DocumentKey::new("rg")), UploadStatus::Uploaded);
    assert_eq!(pipeline.status(&DocumentKey::new("cpf")), UploadStatus::Pending);
}

#[tokio::test]
async fn reconcile_leaves_in_flight_upload_alone() {
    let store = flaky();
    let pipeline = HandoffPipeline::new(store.clone());
    pipeline.board().set(&DocumentKey::new("rg"), UploadStatus::Uploading);

    pipeline.reconcile(&[line("r-1", "rg", "pessoal", false)]);

    assert_eq!(pipeline.status(&DocumentKey::new("rg")), UploadStatus::Uploading);
}

#[tokio::test]
async fn progress_counts_sent_and_local_uploads() {
    let store = flaky();
    let pipeline = HandoffPipeline::new(store.clone());
    pipeline
        .submit(request("cpf", "r-2", one_kib("cpf.pdf")))
        .await
        .unwrap();

    let lines = vec![
        line("r-1", "rg", "pessoal", true),
        line("r-2", "cpf", "pessoal", false),
        line("r-3", "matricula_imovel_1", "imoveis", false),
    ];
    let progress = pipeline.progress(&lines);

    assert_eq!(progress.uploaded, 2);
    assert_eq!(progress.total, 3);
    assert_eq!(progress.percentage, 67);
    assert_eq!(progress.by_category["pessoal"].uploaded, 2);
    assert_eq!(progress.by_category["imoveis"].uploaded, 0);
    assert_eq!(progress.by_category["imoveis"].total, 1);
}

#[test]
fn progress_of_empty_checklist_is_zero() {
    let pipeline = HandoffPipeline::new(Arc::new(MemoryDocumentStore::new()));
    let progress = pipeline.progress(&[]);
    assert_eq!(progress.total, 0);
    assert_eq!(progress.percentage, 0);
}

// ── retrieval ───────────────────────────────────────────────────────

fn stored(id: &str, owner: &str, file_name: &str, file_data: Option<String>) -> DocumentRecord {
    let now = Utc::now();
    DocumentRecord {
        id: DocumentId::new(id),
        user_id: UserId::new(owner),
        recommendation_id: RecommendationId::new("r-1"),
        bucket_name: BUCKET_NAME.into(),
        object_key: format!("{owner}/rg_0_{file_name}"),
        file_name: file_name.into(),
        file_type: "application/pdf".into(),
        file_size: 3,
        file_data,
        document_key: DocumentKey::new("rg"),
        created_at: now,
        updated_at: now,
    }
}

fn guard_with(records: Vec<DocumentRecord>) -> RetrievalGuard {
    let store = MemoryDocumentStore::new();
    for record in records {
        store.seed_document(record);
    }
    RetrievalGuard::new(Arc::new(store))
}

#[tokio::test]
async fn owner_downloads_bytes() {
    let data = data_uri::encode("application/pdf", b"abc");
    let guard = guard_with(vec![stored("d-1", "u-1", "rg.pdf", Some(data))]);

    let doc = guard
        .retrieve(&DocumentId::new("d-1"), &UserId::new("u-1"), None)
        .await
        .unwrap();

    assert_eq!(doc.bytes, b"abc");
    assert_eq!(doc.file_name, "rg.pdf");
    assert_eq!(doc.content_type, "application/pdf");
}

#[tokio::test]
async fn other_user_is_refused() {
    let data = data_uri::encode("application/pdf", b"abc");
    let guard = guard_with(vec![stored("d-1", "u-1", "rg.pdf", Some(data))]);

    let err = guard
        .retrieve(&DocumentId::new("d-1"), &UserId::new("u-2"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, RetrieveError::NotAuthorized));
    assert_eq!(err.kind(), ErrorKind::NotAuthorized);
}

#[tokio::test]
async fn missing_record_or_payload_is_not_found() {
    let guard = guard_with(vec![stored("d-2", "u-1", "rg.pdf", None)]);

    let absent = guard
        .retrieve(&DocumentId::new("d-9"), &UserId::new("u-1"), None)
        .await
        .unwrap_err();
    let empty = guard
        .retrieve(&DocumentId::new("d-2"), &UserId::new("u-1"), None)
        .await
        .unwrap_err();

    assert!(matches!(absent, RetrieveError::NotFound));
    assert!(matches!(empty, RetrieveError::NotFound));
}

#[tokio::test]
async fn file_name_falls_back() {
    let data = data_uri::encode("application/pdf", b"abc");
    let guard = guard_with(vec![
        stored("d-1", "u-1", "", Some(data.clone())),
        stored("d-2", "u-1", "rg.pdf", Some(data)),
    ]);

    let unnamed = guard
        .retrieve(&DocumentId::new("d-1"), &UserId::new("u-1"), None)
        .await
        .unwrap();
    let renamed = guard
        .retrieve(&DocumentId::new("d-2"), &UserId::new("u-1"), Some("identidade.pdf"))
        .await
        .unwrap();

    assert_eq!(unnamed.file_name, "downloaded_file");
    assert_eq!(renamed.file_name, "identidade.pdf");
}

#[tokio::test]
async fn malformed_payload_is_decode_error() {
    let guard = guard_with(vec![stored("d-1", "u-1", "rg.pdf", Some("not-a-uri".into()))]);
    let err = guard
        .retrieve(&DocumentId::new("d-1"), &UserId::new("u-1"), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

// ── sanitizer properties ────────────────────────────────────────────

proptest! {
    #[test]
    fn sanitized_names_use_safe_alphabet(name in "\\PC{0,40}") {
        let clean = sanitize_file_name(&name);
        prop_assert_eq!(clean.chars().count(), name.chars().count());
        prop_assert!(clean
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_'));
    }

    #[test]
    fn safe_names_are_unchanged(name in "[A-Za-z0-9.-]{1,40}") {
        prop_assert_eq!(sanitize_file_name(&name), name);
    }
}
