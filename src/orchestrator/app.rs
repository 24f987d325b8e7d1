//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：写日志文件头，加载工作区数据，建立内存存储
//! 2. **流程渲染**：逐个渲染所有流程实例的步骤列表
//! 3. **批量归档**：按配置对指定文档执行批量归档
//! 4. **全局统计**：汇总渲染与批量处理结果
//!
//! 单个实例渲染失败只记录日志，不中断整个运行。

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::models::load_workspace;
use crate::orchestrator::bulk_process::{BulkReport, DocumentBulkProcess};
use crate::orchestrator::document_actions::DocumentArchivation;
use crate::repository::{InMemoryStore, Repositories};
use crate::utils::logging;
use crate::workflow::{ProcessWorkflow, RenderedWorkflow, RequestContext};

/// 渲染统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    pub rendered: usize,
    pub failed: usize,
}

/// 应用主结构
pub struct App {
    config: Config,
    repos: Repositories,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::init_log_file(&config.output_log_file, &config.fixture_path)?;

        let fixture = load_workspace(Path::new(&config.fixture_path)).await?;
        let instance_count = fixture.instances.len();
        let store = InMemoryStore::from_fixture(fixture)
            .with_context(|| format!("无法建立存储: {}", config.fixture_path))?;

        logging::log_startup(&config.fixture_path, instance_count);

        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// 使用已有存储创建应用
    pub fn with_store(config: Config, store: Arc<InMemoryStore>) -> Self {
        Self {
            config,
            repos: Repositories::from_store(store),
        }
    }

    pub fn repositories(&self) -> &Repositories {
        &self.repos
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let (rendered, stats) = self.render_all()?;
        for workflow in &rendered {
            self.log_rendered(workflow);
        }

        let bulk_summary = self.run_bulk_archivation().map(|report| {
            if report.is_success() {
                info!("✅ {}", report);
            } else {
                warn!("⚠️ {}", report);
            }
            report.to_string()
        });

        logging::print_final_stats(
            stats.rendered,
            stats.failed,
            bulk_summary.as_deref(),
            &self.config.output_log_file,
        );
        Ok(())
    }

    /// 渲染全部流程实例
    pub fn render_all(&self) -> Result<(Vec<RenderedWorkflow>, RenderStats)> {
        let instances = self
            .repos
            .instances
            .list_process_instances()
            .context("无法读取流程实例列表")?;

        if instances.is_empty() {
            warn!("⚠️ 没有找到流程实例");
        }

        let mut stats = RenderStats::default();
        let mut rendered = Vec::with_capacity(instances.len());

        for instance in instances {
            let mut workflow = ProcessWorkflow::new(self.repos.clone());
            workflow
                .set_instance_id(instance.id)
                .set_placeholder(self.config.unreached_placeholder.clone());

            match workflow.render() {
                Ok(result) => {
                    stats.rendered += 1;
                    rendered.push(result);
                }
                Err(e) => {
                    error!("[实例 {}] ❌ 渲染失败: {}", instance.id, e);
                    stats.failed += 1;
                }
            }
        }

        Ok((rendered, stats))
    }

    /// 按配置执行批量归档；未配置文档时返回 None
    pub fn run_bulk_archivation(&self) -> Option<BulkReport> {
        if self.config.bulk_archive_documents.is_empty() {
            return None;
        }
        let ctx = match self.config.current_user_id {
            Some(user_id) => RequestContext::for_user(user_id),
            None => RequestContext::anonymous(),
        };
        let process = DocumentArchivation::new(self.repos.clone(), ctx);

        let mut precheck = Vec::new();
        if !process.can_execute(&self.config.bulk_archive_documents, None, &mut precheck) {
            for failure in &precheck {
                warn!("[文档 {}] ⚠️ 预检未通过: {}", failure.document_id, failure.error);
            }
        }

        Some(process.execute_with_report(&self.config.bulk_archive_documents, None))
    }

    fn log_rendered(&self, workflow: &RenderedWorkflow) {
        info!(
            "[实例 {}] 流程 #{} ({}), {} 步",
            workflow.instance_id,
            workflow.process_id,
            workflow.status,
            workflow.steps.len()
        );
        for fragment in workflow.fragments() {
            if self.config.verbose_logging {
                debug!("  {}", fragment);
            } else {
                info!("  {}", logging::truncate_text(&fragment, 160));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Actor, Document, DocumentStatus, InstanceData, ProcessDefinition, ProcessInstance,
        ProcessInstanceStatus, User,
    };

    fn store() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store
            .add_user(User {
                id: 1,
                fullname: "Petr Svoboda".to_string(),
            })
            .unwrap();
        store
            .add_process(ProcessDefinition {
                id: 1,
                title: "Oběh".to_string(),
                workflow: vec!["Referent".to_string(), "Vedoucí".to_string()],
            })
            .unwrap();
        store
            .add_document(Document {
                id: 10,
                title: "Smlouva".to_string(),
                status: DocumentStatus::Finished,
                author_id: 1,
            })
            .unwrap();
        store
            .add_instance(ProcessInstance {
                id: 1,
                process_id: 1,
                document_id: 10,
                status: ProcessInstanceStatus::InProgress,
                current_officer: Some(Actor::User(1)),
                data: InstanceData::default(),
            })
            .unwrap();
        store
            .add_instance(ProcessInstance {
                id: 2,
                process_id: 99,
                document_id: 10,
                status: ProcessInstanceStatus::New,
                current_officer: None,
                data: InstanceData::default(),
            })
            .unwrap();
        store
    }

    #[test]
    fn test_render_all_counts_failures() {
        let app = App::with_store(Config::default(), store());
        let (rendered, stats) = app.render_all().unwrap();
        assert_eq!(stats, RenderStats { rendered: 1, failed: 1 });
        assert_eq!(rendered[0].instance_id, 1);
        assert_eq!(rendered[0].steps[0].actor_name, "Petr Svoboda");
    }

    #[test]
    fn test_bulk_archivation_only_when_configured() {
        let app = App::with_store(Config::default(), store());
        assert!(app.run_bulk_archivation().is_none());

        let config = Config {
            current_user_id: Some(1),
            bulk_archive_documents: vec![10],
            ..Config::default()
        };
        let app = App::with_store(config, store());
        let report = app.run_bulk_archivation().unwrap();
        // 文档仍处于运行中的流程
        assert!(!report.is_success());
        assert_eq!(report.failures.len(), 1);
    }
}
