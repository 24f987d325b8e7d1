//! 流程实例管理 - 流程层
//!
//! 核心职责：处理人提交处理结果时推进实例
//!
//! - ACCEPT：记录历史，交给下一处理人（最后一步不允许）
//! - FINISH：记录历史，实例完成，文档完成（只允许在最后一步）
//! - ARCHIVE：记录历史，实例完成，文档归档（只允许在最后一步）
//! - REJECT / CANCEL：记录历史，实例取消，文档回到新建（任意一步）
//!
//! 每次提交都在一个事务内完成，失败时回滚。

use chrono::Utc;
use tracing::{error, info};

use crate::error::{AppError, AppResult, AuthorizationError, WorkflowError};
use crate::models::{
    Actor, DocumentId, DocumentStatus, DocumentUpdate, InstanceData, InstanceId, ProcessId,
    ProcessInstance, ProcessInstanceOperation, ProcessInstanceStatus,
};
use crate::repository::Repositories;
use crate::services::ActorResolver;
use crate::workflow::request_ctx::RequestContext;

/// 提交结果对实例的影响
enum Transition {
    /// 交给下一处理人
    Advance(Actor),
    /// 结束实例
    Close {
        status: ProcessInstanceStatus,
        document_status: DocumentStatus,
    },
}

/// 流程实例管理
pub struct ProcessInstanceManager {
    repos: Repositories,
    resolver: ActorResolver,
}

impl ProcessInstanceManager {
    pub fn new(repos: Repositories) -> Self {
        Self {
            resolver: ActorResolver::new(repos.clone()),
            repos,
        }
    }

    /// 在文档上启动流程，第一步交给 `first_officer`
    pub fn start_process(
        &self,
        process_id: ProcessId,
        document_id: DocumentId,
        first_officer: Actor,
        ctx: &RequestContext,
    ) -> AppResult<InstanceId> {
        let user_id = ctx.require_user()?;
        let definition = self.repos.processes.get_process_by_id(process_id)?;
        if definition.workflow.is_empty() {
            return Err(WorkflowError::EmptyDefinition(process_id).into());
        }
        self.repos.documents.get_document_by_id(document_id)?;
        if let Some(active) = self
            .repos
            .instances
            .find_active_instance_for_document(document_id)?
        {
            return Err(AuthorizationError::DocumentInProcess {
                document_id,
                instance_id: active.id,
            }
            .into());
        }
        self.resolver.ensure_exists(&first_officer)?;

        let instance_id = self.in_transaction(|| {
            let id = self.repos.instances.insert_process_instance(ProcessInstance {
                id: 0,
                process_id,
                document_id,
                status: ProcessInstanceStatus::InProgress,
                current_officer: Some(first_officer),
                data: InstanceData::default(),
            })?;
            self.repos
                .documents
                .update_document(document_id, &DocumentUpdate::status(DocumentStatus::InProcess))?;
            Ok(id)
        })?;

        info!(
            "[实例 {}] ✓ 用户 #{} 启动流程 #{}，文档 #{}，第一处理人 {}",
            instance_id, user_id, process_id, document_id, first_officer
        );
        Ok(instance_id)
    }

    /// 当前处理人提交处理结果
    pub fn respond(
        &self,
        instance_id: InstanceId,
        operation: ProcessInstanceOperation,
        next_officer: Option<Actor>,
        ctx: &RequestContext,
    ) -> AppResult<ProcessInstance> {
        let user_id = ctx.require_user()?;

        let instance = self.in_transaction(|| {
            let mut instance = self.repos.instances.get_process_instance_by_id(instance_id)?;

            if instance.status != ProcessInstanceStatus::InProgress {
                return Err(AppError::invalid_transition(
                    instance_id,
                    format!("实例状态为 {}", instance.status),
                ));
            }
            let officer = instance
                .current_officer
                .ok_or_else(|| AppError::invalid_transition(instance_id, "没有当前处理人"))?;
            if !self.resolver.is_represented_by(&officer, user_id)? {
                return Err(AuthorizationError::NotCurrentOfficer {
                    user_id,
                    instance_id,
                }
                .into());
            }

            let definition = self.repos.processes.get_process_by_id(instance.process_id)?;
            let completed = instance.history().len();
            if completed >= definition.step_count() {
                return Err(WorkflowError::HistoryOverflow {
                    instance_id,
                    steps: definition.step_count(),
                }
                .into());
            }
            let is_last_step = completed + 1 == definition.step_count();

            let transition = match &operation {
                ProcessInstanceOperation::Accept => {
                    if is_last_step {
                        return Err(AppError::invalid_transition(
                            instance_id,
                            "最后一步只能完成或归档",
                        ));
                    }
                    let next = next_officer
                        .ok_or_else(|| AppError::invalid_transition(instance_id, "缺少下一处理人"))?;
                    self.resolver.ensure_exists(&next)?;
                    Transition::Advance(next)
                }
                ProcessInstanceOperation::Finish | ProcessInstanceOperation::Archive
                    if !is_last_step =>
                {
                    return Err(AppError::invalid_transition(
                        instance_id,
                        format!("第 {} 步不是最后一步，只能通过、驳回或取消", completed + 1),
                    ));
                }
                ProcessInstanceOperation::Finish => Transition::Close {
                    status: ProcessInstanceStatus::Finished,
                    document_status: DocumentStatus::Finished,
                },
                ProcessInstanceOperation::Archive => Transition::Close {
                    status: ProcessInstanceStatus::Finished,
                    document_status: DocumentStatus::Archived,
                },
                ProcessInstanceOperation::Reject | ProcessInstanceOperation::Cancel => {
                    Transition::Close {
                        status: ProcessInstanceStatus::Canceled,
                        document_status: DocumentStatus::New,
                    }
                }
                ProcessInstanceOperation::Unknown(code) => {
                    return Err(WorkflowError::UnsupportedOperation(code.clone()).into());
                }
            };

            instance
                .data
                .history
                .append(user_id, operation.clone(), Utc::now());

            match transition {
                Transition::Advance(next) => {
                    instance.current_officer = Some(next);
                }
                Transition::Close {
                    status,
                    document_status,
                } => {
                    instance.status = status;
                    instance.current_officer = None;
                    self.repos.documents.update_document(
                        instance.document_id,
                        &DocumentUpdate::status(document_status),
                    )?;
                }
            }

            self.repos.instances.update_process_instance(&instance)?;
            Ok(instance)
        })?;

        info!(
            "[实例 {}] ✓ 用户 #{} 提交 {}，第 {} 步，实例状态 {}",
            instance_id,
            user_id,
            operation.label(),
            instance.history().len(),
            instance.status
        );
        Ok(instance)
    }

    /// 在事务内执行，出错时回滚
    fn in_transaction<T>(&self, f: impl FnOnce() -> AppResult<T>) -> AppResult<T> {
        let tx = &self.repos.instances;
        tx.begin_transaction()?;
        let result = f().and_then(|value| tx.commit().map(|_| value));
        if let Err(e) = &result {
            error!("事务失败，回滚: {}", e);
            if let Err(rollback_err) = tx.rollback() {
                error!("回滚失败: {}", rollback_err);
            }
        }
        result
    }
}
