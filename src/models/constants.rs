//! 工作流相关的封闭词表
//!
//! 实例状态、处理人类型、处理操作、文档状态、用户组权限

use serde::{Deserialize, Serialize};
use std::fmt;

/// 流程实例状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessInstanceStatus {
    /// 新建
    New = 1,
    /// 处理中
    InProgress = 2,
    /// 已完成
    Finished = 3,
    /// 已取消
    Canceled = 4,
}

impl ProcessInstanceStatus {
    /// 获取状态代码
    pub fn code(self) -> i64 {
        self as i64
    }

    /// 从代码解析状态
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::New),
            2 => Some(Self::InProgress),
            3 => Some(Self::Finished),
            4 => Some(Self::Canceled),
            _ => None,
        }
    }

    /// 是否为终止状态
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Canceled)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::Finished => "finished",
            Self::Canceled => "canceled",
        }
    }
}

impl fmt::Display for ProcessInstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 处理人类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfficerType {
    User = 1,
    Group = 2,
}

impl OfficerType {
    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::User),
            2 => Some(Self::Group),
            _ => None,
        }
    }
}

/// 操作代码 → 显示文本
static OPERATION_LABELS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "ACCEPT" => "Accepted",
    "ARCHIVE" => "Archived",
    "CANCEL" => "Canceled",
    "FINISH" => "Finished",
    "REJECT" => "Rejected",
};

/// 处理人对当前步骤的响应
///
/// 词表之外的代码保存在 `Unknown` 中，原样显示，原样写回。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProcessInstanceOperation {
    Accept,
    Archive,
    Cancel,
    Finish,
    Reject,
    Unknown(String),
}

impl ProcessInstanceOperation {
    /// 获取操作代码（大写）
    pub fn code(&self) -> &str {
        match self {
            Self::Accept => "ACCEPT",
            Self::Archive => "ARCHIVE",
            Self::Cancel => "CANCEL",
            Self::Finish => "FINISH",
            Self::Reject => "REJECT",
            Self::Unknown(code) => code,
        }
    }

    /// 从代码解析操作（不区分大小写）
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "ACCEPT" => Self::Accept,
            "ARCHIVE" => Self::Archive,
            "CANCEL" => Self::Cancel,
            "FINISH" => Self::Finish,
            "REJECT" => Self::Reject,
            _ => Self::Unknown(code.to_string()),
        }
    }

    /// 显示文本，未知代码直接显示代码本身
    pub fn label(&self) -> &str {
        match OPERATION_LABELS.get(self.code()) {
            Some(label) => *label,
            None => self.code(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<String> for ProcessInstanceOperation {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<ProcessInstanceOperation> for String {
    fn from(operation: ProcessInstanceOperation) -> Self {
        operation.code().to_string()
    }
}

impl fmt::Display for ProcessInstanceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// 文档状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    New,
    InProcess,
    Finished,
    ArchivationRequested,
    Archived,
    ShreddingRequested,
    Shredded,
}

impl DocumentStatus {
    pub fn name(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProcess => "in_process",
            Self::Finished => "finished",
            Self::ArchivationRequested => "archivation_requested",
            Self::Archived => "archived",
            Self::ShreddingRequested => "shredding_requested",
            Self::Shredded => "shredded",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 用户组授予成员的批量操作权限
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupRight {
    Archive,
    Shred,
}
