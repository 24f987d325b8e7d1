//! 流程定义与流程实例
//!
//! 流程定义是一组有序的处理人角色名称；流程实例记录当前处理人以及
//! 已完成步骤的历史。历史以带版本号的 JSON 保存在实例的 `data` 字段中，
//! 同时兼容旧格式 `{"workflowHistory": [{"<actorId>": "<CODE>"}]}`。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

use crate::error::{AppError, AppResult, DatabaseError};
use crate::models::actor::Actor;
use crate::models::constants::{ProcessInstanceOperation, ProcessInstanceStatus};
use crate::models::ids::{DocumentId, InstanceId, ProcessId, UserId};

/// 当前历史格式版本
pub const HISTORY_VERSION: u32 = 2;

/// 流程定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDefinition {
    pub id: ProcessId,
    pub title: String,
    /// 步骤角色名称，下标即步骤序号
    pub workflow: Vec<String>,
}

impl ProcessDefinition {
    /// 从流程记录上序列化保存的步骤列表解析
    pub fn from_serialized(id: ProcessId, title: impl Into<String>, workflow: &str) -> AppResult<Self> {
        let steps: Vec<String> = serde_json::from_str(workflow)
            .map_err(|e| AppError::corrupt_data(format!("流程 #{} workflow", id), e))?;
        Ok(Self {
            id,
            title: title.into(),
            workflow: steps,
        })
    }

    pub fn step_count(&self) -> usize {
        self.workflow.len()
    }
}

/// 一条已完成步骤的历史记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub step_index: usize,
    pub actor: Actor,
    pub response: ProcessInstanceOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// 只追加的步骤历史
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowHistory {
    entries: Vec<HistoryEntry>,
}

impl WorkflowHistory {
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, step_index: usize) -> Option<&HistoryEntry> {
        self.entries.get(step_index)
    }

    /// 追加一条记录，步骤序号取当前长度
    pub fn append(
        &mut self,
        user_id: UserId,
        response: ProcessInstanceOperation,
        timestamp: DateTime<Utc>,
    ) -> &HistoryEntry {
        let step_index = self.entries.len();
        self.entries.push(HistoryEntry {
            step_index,
            actor: Actor::User(user_id),
            response,
            timestamp: Some(timestamp),
        });
        &self.entries[step_index]
    }
}

/// 实例 `data` 字段的内容
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceData {
    pub history: WorkflowHistory,
    /// 其他未识别的键，原样保留
    pub extra: Map<String, JsonValue>,
}

#[derive(Deserialize)]
struct RawInstanceData {
    #[serde(default)]
    version: Option<u32>,
    #[serde(default, rename = "workflowHistory")]
    workflow_history: Vec<RawHistoryEntry>,
    #[serde(flatten)]
    extra: Map<String, JsonValue>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawHistoryEntry {
    Current(HistoryEntry),
    Legacy(BTreeMap<String, String>),
}

#[derive(Serialize)]
struct StoredInstanceData<'a> {
    version: u32,
    #[serde(rename = "workflowHistory")]
    workflow_history: &'a [HistoryEntry],
    #[serde(flatten)]
    extra: &'a Map<String, JsonValue>,
}

impl InstanceData {
    /// 解析序列化的 `data` 字段；空字符串视为空历史
    pub fn parse(raw: &str) -> AppResult<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        let data: RawInstanceData =
            serde_json::from_str(raw).map_err(|e| AppError::corrupt_data("实例 data", e))?;

        if let Some(version) = data.version {
            if version > HISTORY_VERSION {
                return Err(corrupt(format!("不支持的历史版本 {}", version)));
            }
        }

        let mut entries = Vec::with_capacity(data.workflow_history.len());
        for (position, raw_entry) in data.workflow_history.into_iter().enumerate() {
            let entry = match raw_entry {
                RawHistoryEntry::Current(entry) => {
                    if entry.step_index != position {
                        return Err(corrupt(format!(
                            "第 {} 条历史的步骤序号为 {}",
                            position, entry.step_index
                        )));
                    }
                    entry
                }
                RawHistoryEntry::Legacy(map) => legacy_entry(position, map)?,
            };
            entries.push(entry);
        }

        Ok(Self {
            history: WorkflowHistory { entries },
            extra: data.extra,
        })
    }

    /// 序列化为当前格式
    pub fn to_json(&self) -> AppResult<String> {
        let stored = StoredInstanceData {
            version: HISTORY_VERSION,
            workflow_history: self.history.entries(),
            extra: &self.extra,
        };
        Ok(serde_json::to_string(&stored)?)
    }
}

/// 旧格式：`{ actorId: response }`，没有类型标记，一律按用户处理
fn legacy_entry(position: usize, map: BTreeMap<String, String>) -> AppResult<HistoryEntry> {
    if map.len() != 1 {
        return Err(corrupt(format!(
            "第 {} 条旧格式历史应只有一个处理人，实际 {} 个",
            position,
            map.len()
        )));
    }
    let Some((actor_id, response)) = map.into_iter().next() else {
        return Err(corrupt(format!("第 {} 条旧格式历史为空", position)));
    };
    let user_id: UserId = actor_id
        .trim()
        .parse()
        .map_err(|e| AppError::corrupt_data(format!("第 {} 条旧格式历史的处理人", position), e))?;

    Ok(HistoryEntry {
        step_index: position,
        actor: Actor::User(user_id),
        response: ProcessInstanceOperation::from_code(&response),
        timestamp: None,
    })
}

fn corrupt(message: String) -> AppError {
    AppError::Database(DatabaseError::CorruptData {
        context: "workflowHistory".to_string(),
        source: message.into(),
    })
}

/// 流程实例
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessInstance {
    pub id: InstanceId,
    pub process_id: ProcessId,
    pub document_id: DocumentId,
    pub status: ProcessInstanceStatus,
    pub current_officer: Option<Actor>,
    pub data: InstanceData,
}

impl ProcessInstance {
    /// 处理中的实例返回当前处理人
    pub fn pending_officer(&self) -> Option<Actor> {
        if self.status == ProcessInstanceStatus::InProgress {
            self.current_officer
        } else {
            None
        }
    }

    pub fn history(&self) -> &WorkflowHistory {
        &self.data.history
    }
}
