//! 具体的批量文档操作：归档、销毁以及对应的申请

use crate::models::DocumentStatus;
use crate::orchestrator::bulk_process::{BulkProcessBase, DocumentBulkProcess};
use crate::repository::Repositories;
use crate::services::BulkAction;
use crate::workflow::RequestContext;

/// 归档
pub struct DocumentArchivation {
    base: BulkProcessBase,
}

impl DocumentArchivation {
    pub fn new(repos: Repositories, ctx: RequestContext) -> Self {
        Self {
            base: BulkProcessBase::new(repos, ctx),
        }
    }
}

impl DocumentBulkProcess for DocumentArchivation {
    fn base(&self) -> &BulkProcessBase {
        &self.base
    }

    fn action(&self) -> BulkAction {
        BulkAction::Archivation
    }

    fn target_status(&self) -> DocumentStatus {
        DocumentStatus::Archived
    }
}

/// 申请归档
pub struct DocumentArchivationRequest {
    base: BulkProcessBase,
}

impl DocumentArchivationRequest {
    pub fn new(repos: Repositories, ctx: RequestContext) -> Self {
        Self {
            base: BulkProcessBase::new(repos, ctx),
        }
    }
}

impl DocumentBulkProcess for DocumentArchivationRequest {
    fn base(&self) -> &BulkProcessBase {
        &self.base
    }

    fn action(&self) -> BulkAction {
        BulkAction::ArchivationRequest
    }

    fn target_status(&self) -> DocumentStatus {
        DocumentStatus::ArchivationRequested
    }
}

/// 销毁
pub struct DocumentShredding {
    base: BulkProcessBase,
}

impl DocumentShredding {
    pub fn new(repos: Repositories, ctx: RequestContext) -> Self {
        Self {
            base: BulkProcessBase::new(repos, ctx),
        }
    }
}

impl DocumentBulkProcess for DocumentShredding {
    fn base(&self) -> &BulkProcessBase {
        &self.base
    }

    fn action(&self) -> BulkAction {
        BulkAction::Shredding
    }

    fn target_status(&self) -> DocumentStatus {
        DocumentStatus::Shredded
    }
}

/// 申请销毁
pub struct DocumentShreddingRequest {
    base: BulkProcessBase,
}

impl DocumentShreddingRequest {
    pub fn new(repos: Repositories, ctx: RequestContext) -> Self {
        Self {
            base: BulkProcessBase::new(repos, ctx),
        }
    }
}

impl DocumentBulkProcess for DocumentShreddingRequest {
    fn base(&self) -> &BulkProcessBase {
        &self.base
    }

    fn action(&self) -> BulkAction {
        BulkAction::ShreddingRequest
    }

    fn target_status(&self) -> DocumentStatus {
        DocumentStatus::ShreddingRequested
    }
}

/// 按操作种类创建对应的批量处理
pub fn bulk_process_for(
    action: BulkAction,
    repos: Repositories,
    ctx: RequestContext,
) -> Box<dyn DocumentBulkProcess> {
    match action {
        BulkAction::Archivation => Box::new(DocumentArchivation::new(repos, ctx)),
        BulkAction::ArchivationRequest => Box::new(DocumentArchivationRequest::new(repos, ctx)),
        BulkAction::Shredding => Box::new(DocumentShredding::new(repos, ctx)),
        BulkAction::ShreddingRequest => Box::new(DocumentShreddingRequest::new(repos, ctx)),
    }
}
