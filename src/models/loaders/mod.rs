pub mod toml_loader;

pub use toml_loader::{load_workspace, parse_workspace, InstanceRecord, ProcessRecord, WorkspaceFixture};
