//! 仓储层（Repository）
//!
//! ## 职责
//!
//! 定义工作流核心依赖的外部协作者接口：流程、流程实例、文档、用户、用户组。
//! 真实系统里它们由数据库实现；本 crate 自带一个内存实现 `InMemoryStore`，
//! 供示例程序和测试使用。
//!
//! ## 事务
//!
//! 文档仓储和实例仓储共享同一个数据库连接，通过 `Transactional`
//! 提供 begin / commit / rollback。一次只能有一个事务。

pub mod memory;

use std::sync::Arc;

use crate::error::AppResult;
use crate::models::{
    Document, DocumentId, DocumentUpdate, Group, GroupId, InstanceId, ProcessDefinition,
    ProcessId, ProcessInstance, User, UserId,
};

pub use memory::InMemoryStore;

/// 事务控制
pub trait Transactional {
    fn begin_transaction(&self) -> AppResult<()>;
    fn commit(&self) -> AppResult<()>;
    fn rollback(&self) -> AppResult<()>;
}

pub trait ProcessRepository {
    fn get_process_by_id(&self, id: ProcessId) -> AppResult<ProcessDefinition>;
}

pub trait ProcessInstanceRepository: Transactional {
    fn get_process_instance_by_id(&self, id: InstanceId) -> AppResult<ProcessInstance>;

    /// 插入新实例，返回分配的 ID（忽略传入的 `id`）
    fn insert_process_instance(&self, instance: ProcessInstance) -> AppResult<InstanceId>;

    fn update_process_instance(&self, instance: &ProcessInstance) -> AppResult<()>;

    /// 查找文档上处理中的实例
    fn find_active_instance_for_document(
        &self,
        document_id: DocumentId,
    ) -> AppResult<Option<ProcessInstance>>;

    fn list_process_instances(&self) -> AppResult<Vec<ProcessInstance>>;
}

pub trait GroupRepository {
    fn get_group_by_id(&self, id: GroupId) -> AppResult<Group>;
    fn get_groups_for_user(&self, user_id: UserId) -> AppResult<Vec<GroupId>>;
}

pub trait UserRepository {
    fn get_user_by_id(&self, id: UserId) -> AppResult<User>;
}

pub trait DocumentRepository: Transactional {
    fn get_document_by_id(&self, id: DocumentId) -> AppResult<Document>;
    fn update_document(&self, id: DocumentId, update: &DocumentUpdate) -> AppResult<()>;
}

/// 仓储句柄集合，按需克隆传给各个服务
#[derive(Clone)]
pub struct Repositories {
    pub processes: Arc<dyn ProcessRepository>,
    pub instances: Arc<dyn ProcessInstanceRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub users: Arc<dyn UserRepository>,
    pub documents: Arc<dyn DocumentRepository>,
}

impl Repositories {
    /// 所有仓储都由同一个内存存储提供
    pub fn from_store(store: Arc<InMemoryStore>) -> Self {
        Self {
            processes: store.clone(),
            instances: store.clone(),
            groups: store.clone(),
            users: store.clone(),
            documents: store,
        }
    }
}
