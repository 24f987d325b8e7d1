//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量文档处理和应用生命周期。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理应用生命周期（初始化、运行）
//! - 加载工作区数据并建立存储
//! - 渲染全部流程实例
//! - 输出全局统计信息
//!
//! ### `bulk_process` - 批量处理模板
//! - 预检（`can_execute`）与执行（`execute`）
//! - 单文档事务与失败收集
//! - 结果判定与报告（`BulkReport`）
//!
//! ### `document_actions` - 具体批量操作
//! - 归档、销毁，以及两者的申请
//!
//! ## 层次关系
//!
//! ```text
//! app (处理全部实例 / 一批文档)
//!     ↓
//! document_actions → bulk_process (处理 Vec<DocumentId>)
//!     ↓
//! workflow::ProcessWorkflow (渲染单个实例)
//!     ↓
//! services (能力层：authorizator / actor_resolver / role_colors)
//!     ↓
//! repository (基础设施：仓储与事务)
//! ```

pub mod app;
pub mod bulk_process;
pub mod document_actions;

// 重新导出主要类型
pub use app::{App, RenderStats};
pub use bulk_process::{BulkProcessBase, BulkReport, DocumentBulkProcess, DocumentFailure};
pub use document_actions::{
    bulk_process_for, DocumentArchivation, DocumentArchivationRequest, DocumentShredding,
    DocumentShreddingRequest,
};
