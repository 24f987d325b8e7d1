//! 文档批量操作授权 - 业务能力层
//!
//! 只回答"这个用户能不能对这份文档做这个批量操作"，不做任何修改

use std::fmt;
use tracing::debug;

use crate::error::{AppResult, AuthorizationError};
use crate::models::{Document, DocumentId, DocumentStatus, GroupRight, UserId};
use crate::repository::Repositories;

/// 批量文档操作种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BulkAction {
    Archivation,
    ArchivationRequest,
    Shredding,
    ShreddingRequest,
}

impl BulkAction {
    pub fn name(self) -> &'static str {
        match self {
            BulkAction::Archivation => "archivation",
            BulkAction::ArchivationRequest => "archivation request",
            BulkAction::Shredding => "shredding",
            BulkAction::ShreddingRequest => "shredding request",
        }
    }

    /// 报告中使用的过去分词
    pub fn past_tense(self) -> &'static str {
        match self {
            BulkAction::Archivation => "archived",
            BulkAction::ArchivationRequest => "requested for archivation",
            BulkAction::Shredding => "shredded",
            BulkAction::ShreddingRequest => "requested for shredding",
        }
    }

    fn allowed_statuses(self) -> &'static [DocumentStatus] {
        match self {
            BulkAction::Archivation => &[
                DocumentStatus::New,
                DocumentStatus::Finished,
                DocumentStatus::ArchivationRequested,
            ],
            BulkAction::ArchivationRequest => &[DocumentStatus::New, DocumentStatus::Finished],
            BulkAction::Shredding => &[DocumentStatus::Archived, DocumentStatus::ShreddingRequested],
            BulkAction::ShreddingRequest => &[DocumentStatus::Archived],
        }
    }

    fn required_right(self) -> GroupRight {
        match self {
            BulkAction::Archivation | BulkAction::ArchivationRequest => GroupRight::Archive,
            BulkAction::Shredding | BulkAction::ShreddingRequest => GroupRight::Shred,
        }
    }

    /// 作者本人是否足够；销毁必须有组权限
    fn author_allowed(self) -> bool {
        !matches!(self, BulkAction::Shredding)
    }
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 文档批量操作授权服务
pub struct DocumentBulkActionAuthorizator {
    repos: Repositories,
}

impl DocumentBulkActionAuthorizator {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// 检查授权，失败时返回具体原因
    pub fn throw_exception_if_cannot_execute(
        &self,
        action: BulkAction,
        document_id: DocumentId,
        user_id: Option<UserId>,
    ) -> AppResult<()> {
        let user_id = user_id.ok_or(AuthorizationError::MissingActor)?;
        let document = self.repos.documents.get_document_by_id(document_id)?;

        if let Some(instance) = self
            .repos
            .instances
            .find_active_instance_for_document(document_id)?
        {
            return Err(AuthorizationError::DocumentInProcess {
                document_id,
                instance_id: instance.id,
            }
            .into());
        }

        if !action.allowed_statuses().contains(&document.status) {
            return Err(AuthorizationError::InvalidDocumentStatus {
                document_id,
                status: document.status.to_string(),
                action: action.name(),
            }
            .into());
        }

        if !self.is_permitted(action, &document, user_id)? {
            return Err(AuthorizationError::ActionNotPermitted {
                user_id,
                document_id,
                action: action.name(),
            }
            .into());
        }

        Ok(())
    }

    /// 检查授权，只返回结果
    pub fn can_execute(
        &self,
        action: BulkAction,
        document_id: DocumentId,
        user_id: Option<UserId>,
    ) -> bool {
        match self.throw_exception_if_cannot_execute(action, document_id, user_id) {
            Ok(()) => true,
            Err(e) => {
                debug!("[文档 {}] 不能执行 {}: {}", document_id, action, e);
                false
            }
        }
    }

    fn is_permitted(&self, action: BulkAction, document: &Document, user_id: UserId) -> AppResult<bool> {
        if action.author_allowed() && document.author_id == user_id {
            return Ok(true);
        }
        self.user_has_right(user_id, action.required_right())
    }

    fn user_has_right(&self, user_id: UserId, right: GroupRight) -> AppResult<bool> {
        for group_id in self.repos.groups.get_groups_for_user(user_id)? {
            if self.repos.groups.get_group_by_id(group_id)?.grants(right) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    // ========== 各操作的具名入口 ==========

    pub fn can_execute_archivation(&self, document_id: DocumentId, user_id: Option<UserId>) -> bool {
        self.can_execute(BulkAction::Archivation, document_id, user_id)
    }

    pub fn throw_exception_if_cannot_execute_archivation(
        &self,
        document_id: DocumentId,
        user_id: Option<UserId>,
    ) -> AppResult<()> {
        self.throw_exception_if_cannot_execute(BulkAction::Archivation, document_id, user_id)
    }

    pub fn can_execute_archivation_request(
        &self,
        document_id: DocumentId,
        user_id: Option<UserId>,
    ) -> bool {
        self.can_execute(BulkAction::ArchivationRequest, document_id, user_id)
    }

    pub fn throw_exception_if_cannot_execute_archivation_request(
        &self,
        document_id: DocumentId,
        user_id: Option<UserId>,
    ) -> AppResult<()> {
        self.throw_exception_if_cannot_execute(BulkAction::ArchivationRequest, document_id, user_id)
    }

    pub fn can_execute_shredding(&self, document_id: DocumentId, user_id: Option<UserId>) -> bool {
        self.can_execute(BulkAction::Shredding, document_id, user_id)
    }

    pub fn throw_exception_if_cannot_execute_shredding(
        &self,
        document_id: DocumentId,
        user_id: Option<UserId>,
    ) -> AppResult<()> {
        self.throw_exception_if_cannot_execute(BulkAction::Shredding, document_id, user_id)
    }

    pub fn can_execute_shredding_request(
        &self,
        document_id: DocumentId,
        user_id: Option<UserId>,
    ) -> bool {
        self.can_execute(BulkAction::ShreddingRequest, document_id, user_id)
    }

    pub fn throw_exception_if_cannot_execute_shredding_request(
        &self,
        document_id: DocumentId,
        user_id: Option<UserId>,
    ) -> AppResult<()> {
        self.throw_exception_if_cannot_execute(BulkAction::ShreddingRequest, document_id, user_id)
    }
}
