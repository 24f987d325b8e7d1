pub mod instance_manager;
pub mod process_workflow;
pub mod request_ctx;

pub use instance_manager::ProcessInstanceManager;
pub use process_workflow::{ProcessWorkflow, RenderedStep, RenderedWorkflow, StepState};
pub use request_ctx::RequestContext;
