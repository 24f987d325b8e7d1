use crate::error::{AppError, AppResult, DatabaseError};
use crate::models::actor::Actor;
use crate::models::constants::{OfficerType, ProcessInstanceStatus};
use crate::models::document::{Document, Group, User};
use crate::models::ids::{DocumentId, InstanceId, ProcessId};
use crate::models::process::{InstanceData, ProcessDefinition, ProcessInstance};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// 工作区数据文件（TOML）
///
/// 流程的步骤列表和实例的 `data` 保持数据库里的序列化形式，
/// 加载时再解析。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkspaceFixture {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub processes: Vec<ProcessRecord>,
    #[serde(default)]
    pub instances: Vec<InstanceRecord>,
}

/// 流程记录，`workflow` 为序列化的角色列表
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessRecord {
    pub id: ProcessId,
    pub title: String,
    pub workflow: String,
}

/// 流程实例记录，处理人仍是 ID + 整数类型标记
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceRecord {
    pub id: InstanceId,
    pub process_id: ProcessId,
    pub document_id: DocumentId,
    pub status: ProcessInstanceStatus,
    #[serde(default)]
    pub current_officer_id: Option<u64>,
    #[serde(default)]
    pub current_officer_type: Option<i64>,
    #[serde(default)]
    pub data: String,
}

impl ProcessRecord {
    pub fn into_definition(self) -> AppResult<ProcessDefinition> {
        ProcessDefinition::from_serialized(self.id, self.title, &self.workflow)
    }
}

impl InstanceRecord {
    pub fn into_instance(self) -> AppResult<ProcessInstance> {
        let current_officer = match (self.current_officer_id, self.current_officer_type) {
            (Some(id), Some(code)) => {
                let officer_type = OfficerType::from_code(code).ok_or_else(|| {
                    bad_record(self.id, format!("未知的处理人类型 {}", code))
                })?;
                Some(Actor::from_parts(id, officer_type))
            }
            (Some(_), None) => {
                return Err(bad_record(self.id, "当前处理人缺少类型".to_string()));
            }
            (None, _) => None,
        };
        if self.status == ProcessInstanceStatus::InProgress && current_officer.is_none() {
            return Err(bad_record(self.id, "处理中的实例缺少当前处理人".to_string()));
        }

        Ok(ProcessInstance {
            id: self.id,
            process_id: self.process_id,
            document_id: self.document_id,
            status: self.status,
            current_officer,
            data: InstanceData::parse(&self.data)?,
        })
    }
}

fn bad_record(instance_id: InstanceId, message: String) -> AppError {
    AppError::Database(DatabaseError::CorruptData {
        context: format!("实例 #{}", instance_id),
        source: message.into(),
    })
}

/// 解析 TOML 文本
pub fn parse_workspace(content: &str) -> AppResult<WorkspaceFixture> {
    Ok(toml::from_str(content)?)
}

/// 从 TOML 文件加载工作区数据
pub async fn load_workspace(path: &Path) -> Result<WorkspaceFixture> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", path.display()))?;

    let fixture = parse_workspace(&content)
        .with_context(|| format!("无法解析TOML文件: {}", path.display()))?;

    tracing::info!(
        "已加载工作区: {} 个文档, {} 个流程, {} 个实例",
        fixture.documents.len(),
        fixture.processes.len(),
        fixture.instances.len()
    );

    Ok(fixture)
}
