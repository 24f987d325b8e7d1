use std::str::FromStr;

use tracing::warn;

use crate::error::ConfigError;
use crate::models::{DocumentId, UserId};
use crate::workflow::process_workflow::DEFAULT_PLACEHOLDER;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 工作区数据文件（TOML）
    pub fixture_path: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// tracing 过滤规则，`RUST_LOG` 优先
    pub log_filter: String,
    /// 未到达步骤的占位符
    pub unreached_placeholder: String,
    /// 当前操作用户
    pub current_user_id: Option<UserId>,
    /// 需要批量归档的文档，逗号分隔
    pub bulk_archive_documents: Vec<DocumentId>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fixture_path: "fixtures/workspace.toml".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            log_filter: "info".to_string(),
            unreached_placeholder: DEFAULT_PLACEHOLDER.to_string(),
            current_user_id: None,
            bulk_archive_documents: Vec::new(),
        }
    }
}

impl Config {
    /// 从环境变量读取配置；无法解析的值回退到默认值并记录警告
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 按给定的查找函数读取配置
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        Self {
            fixture_path: lookup("FIXTURE_PATH").unwrap_or(default.fixture_path),
            verbose_logging: or_default(
                parse_var(&lookup, "VERBOSE_LOGGING", "bool"),
                default.verbose_logging,
            ),
            output_log_file: lookup("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            log_filter: lookup("LOG_FILTER").unwrap_or(default.log_filter),
            unreached_placeholder: lookup("UNREACHED_PLACEHOLDER")
                .unwrap_or(default.unreached_placeholder),
            current_user_id: parse_var(&lookup, "CURRENT_USER_ID", "u64").unwrap_or_else(|e| {
                warn!("⚠️ {}", e);
                default.current_user_id
            }),
            bulk_archive_documents: parse_id_list(&lookup, "BULK_ARCHIVE_DOCUMENTS")
                .unwrap_or_else(|e| {
                    warn!("⚠️ {}", e);
                    default.bulk_archive_documents
                }),
        }
    }

    /// 详细日志打开时把默认过滤级别提到 debug
    pub fn effective_log_filter(&self) -> &str {
        if self.verbose_logging {
            "debug"
        } else {
            &self.log_filter
        }
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, expected_type: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
    }
}

fn parse_id_list<F>(lookup: &F, name: &str) -> Result<Vec<DocumentId>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(name) else {
        return Ok(Vec::new());
    };
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse().map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: name.to_string(),
                value: value.clone(),
                expected_type: "逗号分隔的 u64 列表".to_string(),
            })
        })
        .collect()
}

fn or_default<T>(parsed: Result<Option<T>, ConfigError>, default: T) -> T {
    match parsed {
        Ok(Some(value)) => value,
        Ok(None) => default,
        Err(e) => {
            warn!("⚠️ {}", e);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[]));
        assert_eq!(config.fixture_path, "fixtures/workspace.toml");
        assert_eq!(config.unreached_placeholder, "?");
        assert_eq!(config.current_user_id, None);
        assert!(config.bulk_archive_documents.is_empty());
        assert_eq!(config.effective_log_filter(), "info");
    }

    #[test]
    fn test_values_are_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("VERBOSE_LOGGING", "true"),
            ("CURRENT_USER_ID", " 42 "),
            ("BULK_ARCHIVE_DOCUMENTS", "1, 2,,3"),
            ("UNREACHED_PLACEHOLDER", "n/a"),
        ]));
        assert!(config.verbose_logging);
        assert_eq!(config.effective_log_filter(), "debug");
        assert_eq!(config.current_user_id, Some(42));
        assert_eq!(config.bulk_archive_documents, vec![1, 2, 3]);
        assert_eq!(config.unreached_placeholder, "n/a");
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("VERBOSE_LOGGING", "maybe"),
            ("CURRENT_USER_ID", "admin"),
            ("BULK_ARCHIVE_DOCUMENTS", "1,x"),
        ]));
        assert!(!config.verbose_logging);
        assert_eq!(config.current_user_id, None);
        assert!(config.bulk_archive_documents.is_empty());
    }

    #[test]
    fn test_parse_error_names_variable() {
        let lookup = lookup_from(&[("CURRENT_USER_ID", "admin")]);
        let err = parse_var::<_, u64>(&lookup, "CURRENT_USER_ID", "u64").unwrap_err();
        assert!(err.to_string().contains("CURRENT_USER_ID"));
        assert!(err.to_string().contains("'admin'"));
    }
}
