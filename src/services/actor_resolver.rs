//! 处理人解析服务 - 业务能力层
//!
//! 只负责"把处理人变成显示名称"能力

use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::models::{Actor, UserId};
use crate::repository::Repositories;

/// 处理人解析服务
///
/// 职责：
/// - 用户 → 全名，用户组 → 组名
/// - 判断某个用户是否代表某个处理人（本人或所在组）
pub struct ActorResolver {
    repos: Repositories,
}

impl ActorResolver {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// 解析显示名称
    ///
    /// 已删除的用户 / 用户组不会中断渲染，返回 "Unknown user #id" 之类的占位名称。
    pub fn resolve_display_name(&self, actor: &Actor) -> AppResult<String> {
        let resolved = match actor {
            Actor::User(id) => self.repos.users.get_user_by_id(*id).map(|u| u.fullname),
            Actor::Group(id) => self.repos.groups.get_group_by_id(*id).map(|g| g.title),
        };

        match resolved {
            Ok(name) => Ok(name),
            Err(AppError::NotFound(e)) => {
                warn!("⚠️ 处理人 {} 不存在: {}", actor, e);
                Ok(unknown_name(actor))
            }
            Err(e) => Err(e),
        }
    }

    /// 用户是否代表该处理人：就是该用户，或属于该用户组
    pub fn is_represented_by(&self, actor: &Actor, user_id: UserId) -> AppResult<bool> {
        match actor {
            Actor::User(id) => Ok(*id == user_id),
            Actor::Group(group_id) => Ok(self
                .repos
                .groups
                .get_groups_for_user(user_id)?
                .contains(group_id)),
        }
    }

    /// 确认处理人存在
    pub fn ensure_exists(&self, actor: &Actor) -> AppResult<()> {
        match actor {
            Actor::User(id) => self.repos.users.get_user_by_id(*id).map(|_| ()),
            Actor::Group(id) => self.repos.groups.get_group_by_id(*id).map(|_| ()),
        }
    }
}

fn unknown_name(actor: &Actor) -> String {
    match actor {
        Actor::User(id) => format!("Unknown user #{}", id),
        Actor::Group(id) => format!("Unknown group #{}", id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Group, User};
    use crate::repository::InMemoryStore;
    use std::sync::Arc;

    fn resolver() -> ActorResolver {
        let store = Arc::new(InMemoryStore::new());
        store
            .add_user(User {
                id: 1,
                fullname: "Petr Svoboda".to_string(),
            })
            .unwrap();
        store
            .add_group(Group {
                id: 20,
                title: "Podatelna".to_string(),
                members: vec![1],
                rights: vec![],
            })
            .unwrap();
        ActorResolver::new(Repositories::from_store(store))
    }

    #[test]
    fn test_resolve_user_and_group() {
        let resolver = resolver();
        assert_eq!(resolver.resolve_display_name(&Actor::User(1)).unwrap(), "Petr Svoboda");
        assert_eq!(resolver.resolve_display_name(&Actor::Group(20)).unwrap(), "Podatelna");
    }

    #[test]
    fn test_missing_actor_gets_placeholder_name() {
        let resolver = resolver();
        assert_eq!(
            resolver.resolve_display_name(&Actor::User(99)).unwrap(),
            "Unknown user #99"
        );
        assert_eq!(
            resolver.resolve_display_name(&Actor::Group(98)).unwrap(),
            "Unknown group #98"
        );
        assert!(resolver.ensure_exists(&Actor::Group(98)).is_err());
    }

    #[test]
    fn test_is_represented_by() {
        let resolver = resolver();
        assert!(resolver.is_represented_by(&Actor::User(1), 1).unwrap());
        assert!(!resolver.is_represented_by(&Actor::User(1), 2).unwrap());
        assert!(resolver.is_represented_by(&Actor::Group(20), 1).unwrap());
        assert!(!resolver.is_represented_by(&Actor::Group(20), 2).unwrap());
    }
}
