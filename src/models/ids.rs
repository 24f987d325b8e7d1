//! 各类记录的标识符

pub type UserId = u64;
pub type GroupId = u64;
pub type DocumentId = u64;
pub type ProcessId = u64;
pub type InstanceId = u64;
