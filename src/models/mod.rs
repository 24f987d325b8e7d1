pub mod actor;
pub mod constants;
pub mod document;
pub mod ids;
pub mod loaders;
pub mod process;

pub use actor::Actor;
pub use constants::{
    DocumentStatus, GroupRight, OfficerType, ProcessInstanceOperation, ProcessInstanceStatus,
};
pub use document::{Document, DocumentUpdate, Group, User};
pub use ids::{DocumentId, GroupId, InstanceId, ProcessId, UserId};
pub use loaders::{load_workspace, WorkspaceFixture};
pub use process::{HistoryEntry, InstanceData, ProcessDefinition, ProcessInstance, WorkflowHistory};
