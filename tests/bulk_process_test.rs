use process_workflow::error::{AppError, AppResult, DatabaseError};
use process_workflow::models::{
    Document, DocumentId, DocumentStatus, DocumentUpdate, Group, GroupRight, User,
};
use process_workflow::orchestrator::{DocumentArchivation, DocumentBulkProcess, DocumentShredding};
use process_workflow::repository::{DocumentRepository, InMemoryStore, Repositories, Transactional};
use process_workflow::workflow::RequestContext;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const ARCHIVIST: u64 = 1;
const AUTHOR: u64 = 2;

/// 对指定文档写入失败，并统计回滚次数
struct FailingDocuments {
    inner: Arc<InMemoryStore>,
    failing: Vec<DocumentId>,
    rollbacks: AtomicUsize,
}

impl Transactional for FailingDocuments {
    fn begin_transaction(&self) -> AppResult<()> {
        self.inner.begin_transaction()
    }

    fn commit(&self) -> AppResult<()> {
        self.inner.commit()
    }

    fn rollback(&self) -> AppResult<()> {
        self.rollbacks.fetch_add(1, Ordering::SeqCst);
        self.inner.rollback()
    }
}

impl DocumentRepository for FailingDocuments {
    fn get_document_by_id(&self, id: DocumentId) -> AppResult<Document> {
        self.inner.get_document_by_id(id)
    }

    fn update_document(&self, id: DocumentId, update: &DocumentUpdate) -> AppResult<()> {
        if self.failing.contains(&id) {
            return Err(DatabaseError::WriteFailed(format!("文档 #{}", id)).into());
        }
        self.inner.update_document(id, update)
    }
}

fn store_with(statuses: &[DocumentStatus]) -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store
        .add_user(User {
            id: ARCHIVIST,
            fullname: "Eva Malá".to_string(),
        })
        .unwrap();
    store
        .add_user(User {
            id: AUTHOR,
            fullname: "Karel Dvořák".to_string(),
        })
        .unwrap();
    store
        .add_group(Group {
            id: 20,
            title: "Spisovna".to_string(),
            members: vec![ARCHIVIST],
            rights: vec![GroupRight::Archive, GroupRight::Shred],
        })
        .unwrap();
    for (i, status) in statuses.iter().enumerate() {
        store
            .add_document(Document {
                id: i as u64 + 1,
                title: format!("Dokument {}", i + 1),
                status: *status,
                author_id: AUTHOR,
            })
            .unwrap();
    }
    store
}

#[test]
fn test_authorization_failures_are_collected_per_document() {
    // 10 个文档，其中 3 个状态不允许归档
    let mut statuses = vec![DocumentStatus::Finished; 10];
    statuses[2] = DocumentStatus::Shredded;
    statuses[5] = DocumentStatus::InProcess;
    statuses[9] = DocumentStatus::Archived;
    let store = store_with(&statuses);
    let ids: Vec<DocumentId> = (1..=10).collect();

    let process = DocumentArchivation::new(
        Repositories::from_store(store.clone()),
        RequestContext::for_user(ARCHIVIST),
    );
    let mut failures = Vec::new();
    let ok = process.execute(&ids, None, &mut failures);

    assert!(!ok);
    let failed: Vec<DocumentId> = failures.iter().map(|f| f.document_id).collect();
    assert_eq!(failed, vec![3, 6, 10]);
    assert!(failures.iter().all(|f| f.error.is_authorization()));

    let archived = ids
        .iter()
        .filter(|id| store.get_document_by_id(**id).unwrap().status == DocumentStatus::Archived)
        .count();
    // 7 个成功，加上原本就已归档的 #10
    assert_eq!(archived, 8);
}

#[test]
fn test_write_failure_rolls_back_and_continues() {
    let store = store_with(&[DocumentStatus::Finished; 3]);
    let documents = Arc::new(FailingDocuments {
        inner: store.clone(),
        failing: vec![2],
        rollbacks: AtomicUsize::new(0),
    });
    let mut repos = Repositories::from_store(store.clone());
    repos.documents = documents.clone() as Arc<dyn DocumentRepository>;

    let process = DocumentArchivation::new(repos, RequestContext::for_user(AUTHOR));

    let mut failures = Vec::new();
    assert!(!process.final_execute(2, None, &mut failures));
    assert_eq!(documents.rollbacks.load(Ordering::SeqCst), 1);
    assert!(matches!(
        failures[0].error,
        AppError::Database(DatabaseError::WriteFailed(_))
    ));

    let report = process.execute_with_report(&[1, 2, 3], None);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].document_id, 2);
    assert_eq!(documents.rollbacks.load(Ordering::SeqCst), 2);
    assert!(!store.in_transaction().unwrap());

    assert_eq!(store.get_document_by_id(1).unwrap().status, DocumentStatus::Archived);
    assert_eq!(store.get_document_by_id(2).unwrap().status, DocumentStatus::Finished);
    assert_eq!(store.get_document_by_id(3).unwrap().status, DocumentStatus::Archived);
}

#[test]
fn test_leftover_transaction_is_reported_not_panicked() {
    let store = store_with(&[DocumentStatus::Archived]);
    store.begin_transaction().unwrap();

    let process = DocumentShredding::new(
        Repositories::from_store(store.clone()),
        RequestContext::for_user(ARCHIVIST),
    );
    let mut failures = Vec::new();
    assert!(!process.final_execute(1, None, &mut failures));
    assert!(failures[0].error.is_database());

    store.rollback().unwrap();
    assert_eq!(store.get_document_by_id(1).unwrap().status, DocumentStatus::Archived);
}

#[test]
fn test_report_lists_failure_reasons() {
    let store = store_with(&[DocumentStatus::Archived, DocumentStatus::New]);
    let process = DocumentShredding::new(
        Repositories::from_store(store),
        RequestContext::for_user(ARCHIVIST),
    );

    let report = process.execute_with_report(&[1, 2, 404], None);
    assert_eq!(report.succeeded(), 1);
    let summary = report.to_string();
    assert!(summary.starts_with("1 of 3 documents shredded; 2 failed: #2: "));
    assert!(summary.contains("#404: "));
}
