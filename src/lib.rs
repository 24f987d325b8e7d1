//! # Process Workflow
//!
//! 文档审批流程的步骤渲染、流程实例处理与批量文档操作
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Repository）
//! - `repository/` - 仓储接口与共享事务
//! - `InMemoryStore` - 内存实现，支持快照式回滚
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `ActorResolver` - 处理人显示名称
//! - `RoleColors` - 角色徽章颜色
//! - `DocumentBulkActionAuthorizator` - 批量操作授权
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 单个流程实例
//! - `RequestContext` - 请求上下文（当前用户）
//! - `ProcessWorkflow` - 步骤列表渲染
//! - `ProcessInstanceManager` - 启动流程、处理步骤
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/bulk_process` - 批量文档处理模板
//! - `orchestrator/document_actions` - 归档、销毁及其申请
//! - `orchestrator/app` - 应用入口
//!
//! ## 模块结构

pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod repository;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{
    Actor, Document, DocumentStatus, ProcessInstance, ProcessInstanceOperation,
    ProcessInstanceStatus,
};
pub use orchestrator::{App, BulkReport, DocumentBulkProcess};
pub use repository::{InMemoryStore, Repositories};
pub use services::{BulkAction, DocumentBulkActionAuthorizator};
pub use workflow::{ProcessInstanceManager, ProcessWorkflow, RequestContext};
