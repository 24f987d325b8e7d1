use serde::{Deserialize, Serialize};

use crate::models::constants::{DocumentStatus, GroupRight};
use crate::models::ids::{DocumentId, GroupId, UserId};

/// 文档
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub status: DocumentStatus,
    pub author_id: UserId,
}

/// 文档更新内容，`None` 字段保持不变
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentUpdate {
    pub status: Option<DocumentStatus>,
    pub title: Option<String>,
}

impl DocumentUpdate {
    pub fn status(status: DocumentStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn apply_to(&self, document: &mut Document) {
        if let Some(status) = self.status {
            document.status = status;
        }
        if let Some(title) = &self.title {
            document.title = title.clone();
        }
    }
}

/// 用户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub fullname: String,
}

/// 系统用户组
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub title: String,
    #[serde(default)]
    pub members: Vec<UserId>,
    #[serde(default)]
    pub rights: Vec<GroupRight>,
}

impl Group {
    pub fn has_member(&self, user_id: UserId) -> bool {
        self.members.contains(&user_id)
    }

    pub fn grants(&self, right: GroupRight) -> bool {
        self.rights.contains(&right)
    }
}
