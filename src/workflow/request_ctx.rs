//! 请求上下文
//!
//! 封装"当前是谁在操作"这一信息，显式传给需要它的组件

use std::fmt::Display;

use crate::error::{AppResult, AuthorizationError};
use crate::models::UserId;

/// 请求上下文
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// 当前登录用户
    pub user_id: Option<UserId>,
}

impl RequestContext {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    /// 显式传入的用户优先，其次取当前用户
    pub fn effective_user(&self, explicit: Option<UserId>) -> Option<UserId> {
        explicit.or(self.user_id)
    }

    pub fn require_user(&self) -> AppResult<UserId> {
        Ok(self.user_id.ok_or(AuthorizationError::MissingActor)?)
    }
}

impl Display for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.user_id {
            Some(id) => write!(f, "[用户 #{}]", id),
            None => write!(f, "[匿名]"),
        }
    }
}
