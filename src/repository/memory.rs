//! 内存存储
//!
//! 事务通过整体快照实现：begin 复制一份状态，rollback 恢复，commit 丢弃。

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::error::{AppError, AppResult, DatabaseError, NotFoundError};
use crate::models::loaders::WorkspaceFixture;
use crate::models::{
    Document, DocumentId, DocumentUpdate, Group, GroupId, InstanceId, ProcessDefinition,
    ProcessId, ProcessInstance, ProcessInstanceStatus, User, UserId,
};
use crate::repository::{
    DocumentRepository, GroupRepository, ProcessInstanceRepository, ProcessRepository,
    Transactional, UserRepository,
};

#[derive(Debug, Clone, Default)]
struct StoreState {
    processes: BTreeMap<ProcessId, ProcessDefinition>,
    instances: BTreeMap<InstanceId, ProcessInstance>,
    documents: BTreeMap<DocumentId, Document>,
    users: BTreeMap<UserId, User>,
    groups: BTreeMap<GroupId, Group>,
}

/// 内存存储，实现全部仓储接口
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
    snapshot: Mutex<Option<StoreState>>,
}

fn poisoned<T>(err: std::sync::PoisonError<T>) -> AppError {
    AppError::Database(DatabaseError::LockPoisoned(err.to_string()))
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由工作区数据构建，序列化字段在这里解析
    pub fn from_fixture(fixture: WorkspaceFixture) -> AppResult<Self> {
        let store = Self::new();
        {
            let mut state = store.lock()?;
            for user in fixture.users {
                state.users.insert(user.id, user);
            }
            for group in fixture.groups {
                state.groups.insert(group.id, group);
            }
            for document in fixture.documents {
                state.documents.insert(document.id, document);
            }
            for record in fixture.processes {
                let definition = record.into_definition()?;
                state.processes.insert(definition.id, definition);
            }
            for record in fixture.instances {
                let instance = record.into_instance()?;
                state.instances.insert(instance.id, instance);
            }
        }
        Ok(store)
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, StoreState>> {
        self.state.lock().map_err(poisoned)
    }

    pub fn add_user(&self, user: User) -> AppResult<()> {
        self.lock()?.users.insert(user.id, user);
        Ok(())
    }

    pub fn add_group(&self, group: Group) -> AppResult<()> {
        self.lock()?.groups.insert(group.id, group);
        Ok(())
    }

    pub fn add_document(&self, document: Document) -> AppResult<()> {
        self.lock()?.documents.insert(document.id, document);
        Ok(())
    }

    pub fn add_process(&self, definition: ProcessDefinition) -> AppResult<()> {
        self.lock()?.processes.insert(definition.id, definition);
        Ok(())
    }

    /// 按原 ID 写入实例（不分配新 ID）
    pub fn add_instance(&self, instance: ProcessInstance) -> AppResult<()> {
        self.lock()?.instances.insert(instance.id, instance);
        Ok(())
    }

    pub fn in_transaction(&self) -> AppResult<bool> {
        Ok(self.snapshot.lock().map_err(poisoned)?.is_some())
    }
}

impl Transactional for InMemoryStore {
    fn begin_transaction(&self) -> AppResult<()> {
        let mut snapshot = self.snapshot.lock().map_err(poisoned)?;
        if snapshot.is_some() {
            return Err(DatabaseError::TransactionAlreadyActive.into());
        }
        *snapshot = Some(self.lock()?.clone());
        debug!("事务开始");
        Ok(())
    }

    fn commit(&self) -> AppResult<()> {
        let mut snapshot = self.snapshot.lock().map_err(poisoned)?;
        if snapshot.take().is_none() {
            return Err(DatabaseError::NoActiveTransaction.into());
        }
        debug!("事务提交");
        Ok(())
    }

    fn rollback(&self) -> AppResult<()> {
        let mut snapshot = self.snapshot.lock().map_err(poisoned)?;
        let Some(saved) = snapshot.take() else {
            return Err(DatabaseError::NoActiveTransaction.into());
        };
        *self.lock()? = saved;
        debug!("事务回滚");
        Ok(())
    }
}

impl ProcessRepository for InMemoryStore {
    fn get_process_by_id(&self, id: ProcessId) -> AppResult<ProcessDefinition> {
        self.lock()?
            .processes
            .get(&id)
            .cloned()
            .ok_or(NotFoundError::Process(id).into())
    }
}

impl ProcessInstanceRepository for InMemoryStore {
    fn get_process_instance_by_id(&self, id: InstanceId) -> AppResult<ProcessInstance> {
        self.lock()?
            .instances
            .get(&id)
            .cloned()
            .ok_or(NotFoundError::ProcessInstance(id).into())
    }

    fn insert_process_instance(&self, mut instance: ProcessInstance) -> AppResult<InstanceId> {
        let mut state = self.lock()?;
        let id = state.instances.keys().next_back().map_or(1, |last| last + 1);
        instance.id = id;
        state.instances.insert(id, instance);
        Ok(id)
    }

    fn update_process_instance(&self, instance: &ProcessInstance) -> AppResult<()> {
        let mut state = self.lock()?;
        match state.instances.get_mut(&instance.id) {
            Some(existing) => {
                *existing = instance.clone();
                Ok(())
            }
            None => Err(NotFoundError::ProcessInstance(instance.id).into()),
        }
    }

    fn find_active_instance_for_document(
        &self,
        document_id: DocumentId,
    ) -> AppResult<Option<ProcessInstance>> {
        Ok(self
            .lock()?
            .instances
            .values()
            .find(|i| i.document_id == document_id && i.status == ProcessInstanceStatus::InProgress)
            .cloned())
    }

    fn list_process_instances(&self) -> AppResult<Vec<ProcessInstance>> {
        Ok(self.lock()?.instances.values().cloned().collect())
    }
}

impl GroupRepository for InMemoryStore {
    fn get_group_by_id(&self, id: GroupId) -> AppResult<Group> {
        self.lock()?
            .groups
            .get(&id)
            .cloned()
            .ok_or(NotFoundError::Group(id).into())
    }

    fn get_groups_for_user(&self, user_id: UserId) -> AppResult<Vec<GroupId>> {
        Ok(self
            .lock()?
            .groups
            .values()
            .filter(|g| g.has_member(user_id))
            .map(|g| g.id)
            .collect())
    }
}

impl UserRepository for InMemoryStore {
    fn get_user_by_id(&self, id: UserId) -> AppResult<User> {
        self.lock()?
            .users
            .get(&id)
            .cloned()
            .ok_or(NotFoundError::User(id).into())
    }
}

impl DocumentRepository for InMemoryStore {
    fn get_document_by_id(&self, id: DocumentId) -> AppResult<Document> {
        self.lock()?
            .documents
            .get(&id)
            .cloned()
            .ok_or(NotFoundError::Document(id).into())
    }

    fn update_document(&self, id: DocumentId, update: &DocumentUpdate) -> AppResult<()> {
        let mut state = self.lock()?;
        let document = state
            .documents
            .get_mut(&id)
            .ok_or(NotFoundError::Document(id))?;
        update.apply_to(document);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentStatus;

    fn store_with_document() -> InMemoryStore {
        let store = InMemoryStore::new();
        store
            .add_document(Document {
                id: 1,
                title: "Faktura".to_string(),
                status: DocumentStatus::New,
                author_id: 5,
            })
            .unwrap();
        store
    }

    #[test]
    fn test_rollback_restores_state() {
        let store = store_with_document();

        store.begin_transaction().unwrap();
        store
            .update_document(1, &DocumentUpdate::status(DocumentStatus::Archived))
            .unwrap();
        assert_eq!(store.get_document_by_id(1).unwrap().status, DocumentStatus::Archived);
        store.rollback().unwrap();

        assert_eq!(store.get_document_by_id(1).unwrap().status, DocumentStatus::New);
        assert!(!store.in_transaction().unwrap());
    }

    #[test]
    fn test_commit_keeps_changes() {
        let store = store_with_document();

        store.begin_transaction().unwrap();
        store
            .update_document(1, &DocumentUpdate::status(DocumentStatus::Finished))
            .unwrap();
        store.commit().unwrap();

        assert_eq!(store.get_document_by_id(1).unwrap().status, DocumentStatus::Finished);
    }

    #[test]
    fn test_transaction_misuse() {
        let store = store_with_document();
        assert!(store.commit().unwrap_err().is_database());
        assert!(store.rollback().unwrap_err().is_database());

        store.begin_transaction().unwrap();
        assert!(store.begin_transaction().unwrap_err().is_database());
        store.rollback().unwrap();
    }

    #[test]
    fn test_missing_records() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.get_document_by_id(9),
            Err(AppError::NotFound(NotFoundError::Document(9)))
        ));
        assert!(store.get_groups_for_user(1).unwrap().is_empty());
    }
}
