//! 处理人引用
//!
//! 处理人可以是用户，也可以是用户组

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::constants::OfficerType;
use crate::models::ids::{GroupId, UserId};

/// 处理人（用户或用户组）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Actor {
    User(UserId),
    Group(GroupId),
}

impl Actor {
    /// 由 ID + 类型标记构建
    pub fn from_parts(id: u64, officer_type: OfficerType) -> Self {
        match officer_type {
            OfficerType::User => Actor::User(id),
            OfficerType::Group => Actor::Group(id),
        }
    }

    pub fn officer_type(&self) -> OfficerType {
        match self {
            Actor::User(_) => OfficerType::User,
            Actor::Group(_) => OfficerType::Group,
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            Actor::User(id) | Actor::Group(id) => *id,
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::User(id) => write!(f, "user#{}", id),
            Actor::Group(id) => write!(f, "group#{}", id),
        }
    }
}
