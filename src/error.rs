use thiserror::Error;

use crate::models::ids::{DocumentId, GroupId, InstanceId, ProcessId, UserId};

/// 应用程序错误类型
///
/// 整个工作流子系统只有这一套错误层级，按来源分类。
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 权限错误
    #[error("权限错误: {0}")]
    Authorization(#[from] AuthorizationError),
    /// 数据库 / 事务错误
    #[error("数据库错误: {0}")]
    Database(#[from] DatabaseError),
    /// 记录不存在
    #[error("记录不存在: {0}")]
    NotFound(#[from] NotFoundError),
    /// 工作流状态迁移错误
    #[error("工作流错误: {0}")]
    Workflow(#[from] WorkflowError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 渲染前未设置实例 ID
    #[error("未设置流程实例 ID")]
    MissingInstanceId,
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

/// 权限错误
#[derive(Debug, Error)]
pub enum AuthorizationError {
    /// 请求上下文中没有当前用户
    #[error("缺少操作用户")]
    MissingActor,
    /// 文档状态不允许该批量操作
    #[error("文档 #{document_id} 当前状态 {status} 不允许执行 {action}")]
    InvalidDocumentStatus {
        document_id: DocumentId,
        status: String,
        action: &'static str,
    },
    /// 文档正处于运行中的流程
    #[error("文档 #{document_id} 正在流程实例 #{instance_id} 中")]
    DocumentInProcess {
        document_id: DocumentId,
        instance_id: InstanceId,
    },
    /// 用户没有执行该批量操作的权限
    #[error("用户 #{user_id} 无权对文档 #{document_id} 执行 {action}")]
    ActionNotPermitted {
        user_id: UserId,
        document_id: DocumentId,
        action: &'static str,
    },
    /// 用户不是当前处理人
    #[error("用户 #{user_id} 不是实例 #{instance_id} 的当前处理人")]
    NotCurrentOfficer {
        user_id: UserId,
        instance_id: InstanceId,
    },
}

/// 数据库 / 事务错误
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// 事务已开启
    #[error("事务已开启，不支持嵌套事务")]
    TransactionAlreadyActive,
    /// 没有正在进行的事务
    #[error("没有正在进行的事务")]
    NoActiveTransaction,
    /// 存储锁失效
    #[error("存储锁已失效: {0}")]
    LockPoisoned(String),
    /// 序列化数据损坏
    #[error("序列化数据损坏 ({context}): {source}")]
    CorruptData {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入失败
    #[error("写入失败: {0}")]
    WriteFailed(String),
}

/// 记录不存在
#[derive(Debug, Error)]
pub enum NotFoundError {
    #[error("流程 #{0}")]
    Process(ProcessId),
    #[error("流程实例 #{0}")]
    ProcessInstance(InstanceId),
    #[error("文档 #{0}")]
    Document(DocumentId),
    #[error("用户 #{0}")]
    User(UserId),
    #[error("用户组 #{0}")]
    Group(GroupId),
}

/// 工作流状态迁移错误
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// 当前状态下不允许该操作
    #[error("实例 #{instance_id} 不允许该操作: {reason}")]
    InvalidTransition {
        instance_id: InstanceId,
        reason: String,
    },
    /// 无法识别的处理操作
    #[error("无法识别的处理操作: {0}")]
    UnsupportedOperation(String),
    /// 流程定义没有任何步骤
    #[error("流程 #{0} 没有定义任何步骤")]
    EmptyDefinition(ProcessId),
    /// 历史记录超出流程定义长度
    #[error("实例 #{instance_id} 的历史记录已满 ({steps} 步)")]
    HistoryOverflow { instance_id: InstanceId, steps: usize },
    /// 处理中的实例没有可待处理的步骤
    #[error("实例 #{instance_id} 处理中但没有待处理步骤: {reason}")]
    MissingPendingStep {
        instance_id: InstanceId,
        reason: String,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Database(DatabaseError::CorruptData {
            context: "json".to_string(),
            source: Box::new(err),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建数据损坏错误
    pub fn corrupt_data(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Database(DatabaseError::CorruptData {
            context: context.into(),
            source: Box::new(source),
        })
    }

    /// 创建非法状态迁移错误
    pub fn invalid_transition(instance_id: InstanceId, reason: impl Into<String>) -> Self {
        AppError::Workflow(WorkflowError::InvalidTransition {
            instance_id,
            reason: reason.into(),
        })
    }

    /// 是否为权限类错误
    pub fn is_authorization(&self) -> bool {
        matches!(self, AppError::Authorization(_))
    }

    /// 是否为数据库类错误
    pub fn is_database(&self) -> bool {
        matches!(self, AppError::Database(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
