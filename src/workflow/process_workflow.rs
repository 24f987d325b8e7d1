//! 流程步骤渲染 - 流程层
//!
//! 把流程定义（每一步需要什么角色）和实例历史（谁实际处理了、结果如何）
//! 按下标合并，得到一条线性的步骤列表：
//!
//! 1. 读取流程定义的步骤角色列表
//! 2. 读取实例及其历史
//! 3. 实例处理中时，追加一条属于当前处理人的待处理记录；
//!    没有当前处理人或没有空余步骤时报错
//! 4. 逐个步骤：有记录则显示处理人与结果，否则显示占位符 `?`
//! 5. 每个角色分配一对颜色，只在本次渲染内缓存
//!
//! 只读，不修改任何数据。

use tracing::{debug, warn};

use crate::error::{AppError, AppResult, ConfigError, WorkflowError};
use crate::models::{
    Actor, InstanceId, ProcessId, ProcessInstanceOperation, ProcessInstanceStatus,
};
use crate::repository::Repositories;
use crate::services::{ActorResolver, ColorPair, RoleColors};

/// 步骤未到达时的默认占位符
pub const DEFAULT_PLACEHOLDER: &str = "?";

/// 步骤状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    /// 已有处理结果
    Completed,
    /// 当前处理人正在处理
    Pending,
    /// 尚未到达
    NotReached,
}

impl StepState {
    fn css_modifier(self) -> &'static str {
        match self {
            StepState::Completed => "completed",
            StepState::Pending => "pending",
            StepState::NotReached => "not-reached",
        }
    }
}

/// 渲染后的单个步骤
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedStep {
    pub index: usize,
    pub role: String,
    pub colors: ColorPair,
    pub state: StepState,
    pub actor: Option<Actor>,
    /// 处理人显示名称；未到达的步骤为占位符
    pub actor_name: String,
    pub response: Option<ProcessInstanceOperation>,
}

impl RenderedStep {
    pub fn response_label(&self) -> Option<&str> {
        self.response.as_ref().map(|r| r.label())
    }

    /// HTML 片段：角色徽章 + 处理人 + 结果
    pub fn fragment(&self) -> String {
        let mut html = format!(
            r#"<div class="workflow-step workflow-step--{}"><span class="badge" style="background-color: {}; color: {}">{}</span> {}"#,
            self.state.css_modifier(),
            self.colors.background,
            self.colors.foreground,
            escape_html(&self.role),
            escape_html(&self.actor_name),
        );
        if let Some(label) = self.response_label() {
            html.push_str(&format!(" <em>({})</em>", escape_html(label)));
        }
        html.push_str("</div>");
        html
    }
}

/// 渲染结果
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedWorkflow {
    pub instance_id: InstanceId,
    pub process_id: ProcessId,
    pub status: ProcessInstanceStatus,
    pub steps: Vec<RenderedStep>,
}

impl RenderedWorkflow {
    pub fn fragments(&self) -> Vec<String> {
        self.steps.iter().map(RenderedStep::fragment).collect()
    }

    pub fn to_html(&self) -> String {
        format!(
            r#"<div class="workflow" data-instance="{}">{}</div>"#,
            self.instance_id,
            self.fragments().concat()
        )
    }

    /// 第一个待处理步骤
    pub fn pending_step(&self) -> Option<&RenderedStep> {
        self.steps.iter().find(|s| s.state == StepState::Pending)
    }
}

/// 合并用的中间记录：处理人 + 结果（待处理时为空）
struct StepEntry {
    actor: Actor,
    response: Option<ProcessInstanceOperation>,
}

/// 流程步骤渲染组件
pub struct ProcessWorkflow {
    repos: Repositories,
    resolver: ActorResolver,
    instance_id: Option<InstanceId>,
    process_id: Option<ProcessId>,
    placeholder: String,
}

impl ProcessWorkflow {
    pub fn new(repos: Repositories) -> Self {
        Self {
            resolver: ActorResolver::new(repos.clone()),
            repos,
            instance_id: None,
            process_id: None,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }

    pub fn set_instance_id(&mut self, instance_id: InstanceId) -> &mut Self {
        self.instance_id = Some(instance_id);
        self
    }

    /// 可选；未设置时取实例所属流程
    pub fn set_process_id(&mut self, process_id: ProcessId) -> &mut Self {
        self.process_id = Some(process_id);
        self
    }

    pub fn set_placeholder(&mut self, placeholder: impl Into<String>) -> &mut Self {
        self.placeholder = placeholder.into();
        self
    }

    /// 渲染步骤列表
    pub fn render(&self) -> AppResult<RenderedWorkflow> {
        let instance_id = self.instance_id.ok_or(ConfigError::MissingInstanceId)?;
        let instance = self.repos.instances.get_process_instance_by_id(instance_id)?;
        let process_id = self.process_id.unwrap_or(instance.process_id);
        let definition = self.repos.processes.get_process_by_id(process_id)?;

        let mut entries: Vec<StepEntry> = instance
            .history()
            .entries()
            .iter()
            .map(|e| StepEntry {
                actor: e.actor,
                response: Some(e.response.clone()),
            })
            .collect();

        if instance.status == ProcessInstanceStatus::InProgress {
            let officer = instance.current_officer.ok_or_else(|| {
                missing_pending_step(instance_id, "没有当前处理人".to_string())
            })?;
            if entries.len() >= definition.step_count() {
                return Err(missing_pending_step(
                    instance_id,
                    format!(
                        "历史记录 {} 条，流程定义只有 {} 步",
                        entries.len(),
                        definition.step_count()
                    ),
                ));
            }
            entries.push(StepEntry {
                actor: officer,
                response: None,
            });
        }

        if entries.len() > definition.step_count() {
            warn!(
                "[实例 {}] ⚠️ 历史记录 {} 条，超出流程定义的 {} 步，多余部分不显示",
                instance_id,
                entries.len(),
                definition.step_count()
            );
        }

        let mut colors = RoleColors::new();
        let mut steps = Vec::with_capacity(definition.step_count());

        for (index, role) in definition.workflow.iter().enumerate() {
            let pair = colors.color_for(role);
            let step = match entries.get(index) {
                Some(entry) => RenderedStep {
                    index,
                    role: role.clone(),
                    colors: pair,
                    state: if entry.response.is_some() {
                        StepState::Completed
                    } else {
                        StepState::Pending
                    },
                    actor: Some(entry.actor),
                    actor_name: self.resolver.resolve_display_name(&entry.actor)?,
                    response: entry.response.clone(),
                },
                None => RenderedStep {
                    index,
                    role: role.clone(),
                    colors: pair,
                    state: StepState::NotReached,
                    actor: None,
                    actor_name: self.placeholder.clone(),
                    response: None,
                },
            };
            steps.push(step);
        }

        debug!(
            "[实例 {}] 渲染完成: {} 步, {} 种角色",
            instance_id,
            steps.len(),
            colors.len()
        );

        Ok(RenderedWorkflow {
            instance_id,
            process_id,
            status: instance.status,
            steps,
        })
    }
}

fn missing_pending_step(instance_id: InstanceId, reason: String) -> AppError {
    AppError::Workflow(WorkflowError::MissingPendingStep {
        instance_id,
        reason,
    })
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Group, InstanceData, ProcessDefinition, ProcessInstance, User};
    use chrono::Utc;
    use crate::repository::InMemoryStore;
    use std::sync::Arc;

    fn store() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store
            .add_user(User {
                id: 1,
                fullname: "Jana Nováková".to_string(),
            })
            .unwrap();
        store
            .add_user(User {
                id: 2,
                fullname: "Karel <Boss>".to_string(),
            })
            .unwrap();
        store
            .add_group(Group {
                id: 30,
                title: "Ekonomické oddělení".to_string(),
                members: vec![2],
                rights: vec![],
            })
            .unwrap();
        store
            .add_process(ProcessDefinition {
                id: 1,
                title: "Schválení faktury".to_string(),
                workflow: vec![
                    "Referent".to_string(),
                    "Vedoucí".to_string(),
                    "Referent".to_string(),
                ],
            })
            .unwrap();
        store
    }

    fn instance(status: ProcessInstanceStatus, officer: Option<Actor>, data: &str) -> ProcessInstance {
        ProcessInstance {
            id: 5,
            process_id: 1,
            document_id: 100,
            status,
            current_officer: officer,
            data: InstanceData::parse(data).unwrap(),
        }
    }

    fn render(store: Arc<InMemoryStore>) -> RenderedWorkflow {
        let mut workflow = ProcessWorkflow::new(Repositories::from_store(store));
        workflow.set_instance_id(5);
        workflow.render().unwrap()
    }

    #[test]
    fn test_missing_instance_id_is_config_error() {
        let workflow = ProcessWorkflow::new(Repositories::from_store(store()));
        let err = workflow.render().unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::MissingInstanceId)));
    }

    #[test]
    fn test_pending_step_for_group_officer() {
        let store = store();
        store
            .add_instance(instance(
                ProcessInstanceStatus::InProgress,
                Some(Actor::Group(30)),
                r#"{"workflowHistory":[{"1":"ACCEPT"}]}"#,
            ))
            .unwrap();

        let rendered = render(store);
        assert_eq!(rendered.steps.len(), 3);
        assert_eq!(rendered.steps[0].state, StepState::Completed);
        assert_eq!(rendered.steps[0].response_label(), Some("Accepted"));

        let pending = rendered.pending_step().unwrap();
        assert_eq!(pending.index, 1);
        assert_eq!(pending.actor_name, "Ekonomické oddělení");
        assert_eq!(pending.response, None);

        assert_eq!(rendered.steps[2].state, StepState::NotReached);
        assert_eq!(rendered.steps[2].actor_name, "?");
    }

    #[test]
    fn test_same_role_gets_same_colors() {
        let store = store();
        store
            .add_instance(instance(ProcessInstanceStatus::Finished, None, ""))
            .unwrap();

        let rendered = render(store);
        assert_eq!(rendered.steps[0].colors, rendered.steps[2].colors);
    }

    #[test]
    fn test_fragment_escapes_text() {
        let store = store();
        store
            .add_instance(instance(
                ProcessInstanceStatus::Finished,
                None,
                r#"{"workflowHistory":[{"2":"REJECT"}]}"#,
            ))
            .unwrap();

        let rendered = render(store);
        let fragment = rendered.steps[0].fragment();
        assert!(fragment.contains("Karel &lt;Boss&gt;"));
        assert!(fragment.contains("<em>(Rejected)</em>"));
        assert!(fragment.contains("workflow-step--completed"));
        assert!(rendered.to_html().starts_with(r#"<div class="workflow" data-instance="5">"#));
    }

    #[test]
    fn test_explicit_process_id_and_placeholder() {
        let store = store();
        store
            .add_process(ProcessDefinition {
                id: 2,
                title: "Jednokrokový".to_string(),
                workflow: vec!["Podatelna".to_string()],
            })
            .unwrap();
        store
            .add_instance(instance(ProcessInstanceStatus::New, None, ""))
            .unwrap();

        let mut workflow = ProcessWorkflow::new(Repositories::from_store(store));
        workflow.set_instance_id(5).set_process_id(2).set_placeholder("n/a");
        let rendered = workflow.render().unwrap();

        assert_eq!(rendered.process_id, 2);
        assert_eq!(rendered.steps.len(), 1);
        assert_eq!(rendered.steps[0].actor_name, "n/a");
    }

    /// 两步已通过的历史，按当前格式写出
    fn two_accepted_steps() -> String {
        let mut data = InstanceData::default();
        data.history.append(1, ProcessInstanceOperation::Accept, Utc::now());
        data.history.append(2, ProcessInstanceOperation::Accept, Utc::now());
        data.to_json().unwrap()
    }

    #[test]
    fn test_written_history_renders_per_status() {
        let raw = two_accepted_steps();

        for status in [
            ProcessInstanceStatus::New,
            ProcessInstanceStatus::Finished,
            ProcessInstanceStatus::Canceled,
        ] {
            let store = store();
            store.add_instance(instance(status, None, &raw)).unwrap();
            let rendered = render(store);

            assert_eq!(rendered.steps.len(), 3);
            assert_eq!(rendered.steps[0].actor_name, "Jana Nováková");
            assert_eq!(rendered.steps[1].actor_name, "Karel <Boss>");
            assert_eq!(rendered.steps[1].response_label(), Some("Accepted"));
            assert_eq!(rendered.steps[2].state, StepState::NotReached);
            assert_eq!(rendered.steps[2].actor_name, "?");
            assert!(rendered.pending_step().is_none());
        }

        let store = store();
        store
            .add_instance(instance(
                ProcessInstanceStatus::InProgress,
                Some(Actor::Group(30)),
                &raw,
            ))
            .unwrap();
        let rendered = render(store);

        assert_eq!(rendered.steps[2].state, StepState::Pending);
        assert_eq!(rendered.steps[2].actor, Some(Actor::Group(30)));
        assert_eq!(rendered.steps[2].actor_name, "Ekonomické oddělení");
        assert_eq!(rendered.steps[2].response, None);
        assert_eq!(
            rendered.steps.iter().filter(|s| s.state == StepState::Pending).count(),
            1
        );
    }

    #[test]
    fn test_unknown_response_code_is_shown_raw() {
        let store = store();
        store
            .add_instance(instance(
                ProcessInstanceStatus::Finished,
                None,
                r#"{"workflowHistory":[{"1":"DELEGATE"}]}"#,
            ))
            .unwrap();

        let rendered = render(store);
        assert_eq!(rendered.steps[0].state, StepState::Completed);
        assert_eq!(rendered.steps[0].response_label(), Some("DELEGATE"));
        assert!(rendered.steps[0].fragment().contains("<em>(DELEGATE)</em>"));
    }

    #[test]
    fn test_in_progress_without_officer_fails() {
        let store = store();
        store
            .add_instance(instance(
                ProcessInstanceStatus::InProgress,
                None,
                r#"{"workflowHistory":[{"1":"ACCEPT"}]}"#,
            ))
            .unwrap();

        let mut workflow = ProcessWorkflow::new(Repositories::from_store(store));
        workflow.set_instance_id(5);
        let err = workflow.render().unwrap_err();
        assert!(matches!(
            err,
            AppError::Workflow(WorkflowError::MissingPendingStep { instance_id: 5, .. })
        ));
    }

    #[test]
    fn test_in_progress_with_full_history_fails() {
        let store = store();
        store
            .add_instance(instance(
                ProcessInstanceStatus::InProgress,
                Some(Actor::User(1)),
                r#"{"workflowHistory":[{"1":"ACCEPT"},{"2":"ACCEPT"},{"1":"ACCEPT"}]}"#,
            ))
            .unwrap();

        let mut workflow = ProcessWorkflow::new(Repositories::from_store(store));
        workflow.set_instance_id(5);
        let err = workflow.render().unwrap_err();
        assert!(matches!(
            err,
            AppError::Workflow(WorkflowError::MissingPendingStep { .. })
        ));
    }
}
