//! 批量文档处理模板 - 编排层
//!
//! ## 职责
//!
//! 为"对一批文档执行同一操作"（归档、销毁及其申请）提供统一流程：
//!
//! 1. **预检**：`can_execute` 对全部文档做授权检查，不做修改，收集全部原因
//! 2. **执行**：`execute` 逐个文档重新检查授权，再调用 `final_execute`
//! 3. **单文档事务**：`final_execute` 在事务内修改文档，失败时回滚并记录原因
//! 4. **结果判定**：`evaluate_result` 没有任何失败才算成功
//!
//! 单个文档失败不会中断整批处理，批次整体不是原子的。

use std::fmt;
use tracing::{error, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{DocumentId, DocumentStatus, DocumentUpdate, UserId};
use crate::repository::Repositories;
use crate::services::{BulkAction, DocumentBulkActionAuthorizator};
use crate::utils::logging;
use crate::workflow::RequestContext;

/// 单个文档的失败原因
#[derive(Debug)]
pub struct DocumentFailure {
    pub document_id: DocumentId,
    pub error: AppError,
}

impl DocumentFailure {
    pub fn new(document_id: DocumentId, error: AppError) -> Self {
        Self { document_id, error }
    }
}

impl fmt::Display for DocumentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}: {}", self.document_id, self.error)
    }
}

/// 批量处理的公共依赖
pub struct BulkProcessBase {
    repos: Repositories,
    authorizator: DocumentBulkActionAuthorizator,
    ctx: RequestContext,
}

impl BulkProcessBase {
    pub fn new(repos: Repositories, ctx: RequestContext) -> Self {
        Self {
            authorizator: DocumentBulkActionAuthorizator::new(repos.clone()),
            repos,
            ctx,
        }
    }
}

/// 批量文档处理
///
/// 具体操作只需提供 `base`、`action` 和 `target_status`。
pub trait DocumentBulkProcess {
    fn base(&self) -> &BulkProcessBase;

    fn action(&self) -> BulkAction;

    /// 执行成功后文档的状态
    fn target_status(&self) -> DocumentStatus;

    /// 授权检查；未显式指定用户时取请求上下文中的用户
    fn check(&self, document_id: DocumentId, user_id: Option<UserId>) -> AppResult<()> {
        let base = self.base();
        base.authorizator.throw_exception_if_cannot_execute(
            self.action(),
            document_id,
            base.ctx.effective_user(user_id),
        )
    }

    /// 预检全部文档，不做修改
    fn can_execute(
        &self,
        document_ids: &[DocumentId],
        user_id: Option<UserId>,
        failures: &mut Vec<DocumentFailure>,
    ) -> bool {
        let mut all_passed = true;
        for &document_id in document_ids {
            if let Err(e) = self.check(document_id, user_id) {
                all_passed = false;
                failures.push(DocumentFailure::new(document_id, e));
            }
        }
        all_passed
    }

    /// 逐个文档执行，失败记录后继续
    fn execute(
        &self,
        document_ids: &[DocumentId],
        user_id: Option<UserId>,
        failures: &mut Vec<DocumentFailure>,
    ) -> bool {
        logging::log_bulk_start(self.action().name(), document_ids.len());

        let mut succeeded = 0;
        for &document_id in document_ids {
            if let Err(e) = self.check(document_id, user_id) {
                warn!("[文档 {}] ⚠️ 不能执行 {}: {}", document_id, self.action(), e);
                failures.push(DocumentFailure::new(document_id, e));
                continue;
            }
            if self.final_execute(document_id, user_id, failures) {
                succeeded += 1;
            }
        }

        logging::log_bulk_complete(self.action().name(), succeeded, document_ids.len());
        self.evaluate_result(failures)
    }

    /// 在事务内修改单个文档；失败时回滚、记录原因并返回 false
    fn final_execute(
        &self,
        document_id: DocumentId,
        _user_id: Option<UserId>,
        failures: &mut Vec<DocumentFailure>,
    ) -> bool {
        let documents = &self.base().repos.documents;

        if let Err(e) = documents.begin_transaction() {
            error!("[文档 {}] 无法开启事务: {}", document_id, e);
            failures.push(DocumentFailure::new(document_id, e));
            return false;
        }

        let result = documents
            .update_document(document_id, &DocumentUpdate::status(self.target_status()))
            .and_then(|_| documents.commit());

        match result {
            Ok(()) => {
                info!("[文档 {}] ✓ {} -> {}", document_id, self.action(), self.target_status());
                true
            }
            Err(e) => {
                error!("[文档 {}] ❌ {} 失败，回滚: {}", document_id, self.action(), e);
                if let Err(rollback_err) = documents.rollback() {
                    error!("[文档 {}] 回滚失败: {}", document_id, rollback_err);
                }
                failures.push(DocumentFailure::new(document_id, e));
                false
            }
        }
    }

    /// 没有任何失败才算成功
    fn evaluate_result(&self, failures: &[DocumentFailure]) -> bool {
        failures.is_empty()
    }

    /// 执行并生成报告
    fn execute_with_report(&self, document_ids: &[DocumentId], user_id: Option<UserId>) -> BulkReport {
        let mut failures = Vec::new();
        self.execute(document_ids, user_id, &mut failures);
        BulkReport::new(self.action(), document_ids.len(), failures)
    }
}

/// 批量处理报告
#[derive(Debug)]
pub struct BulkReport {
    pub action: BulkAction,
    pub total: usize,
    pub failures: Vec<DocumentFailure>,
}

impl BulkReport {
    pub fn new(action: BulkAction, total: usize, failures: Vec<DocumentFailure>) -> Self {
        Self {
            action,
            total,
            failures,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.total.saturating_sub(self.failures.len())
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for BulkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} documents {}",
            self.succeeded(),
            self.total,
            self.action.past_tense()
        )?;
        if !self.failures.is_empty() {
            let reasons: Vec<String> = self.failures.iter().map(|f| f.to_string()).collect();
            write!(f, "; {} failed: {}", self.failures.len(), reasons.join("; "))?;
        }
        Ok(())
    }
}
