//! 日志工具模块
//!
//! tracing 订阅者初始化，以及启动、批量处理和结束时的分隔横幅

use anyhow::{Context, Result};
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

const BANNER_WIDTH: usize = 60;

fn heavy_rule() -> String {
    "=".repeat(BANNER_WIDTH)
}

fn light_rule() -> String {
    "─".repeat(BANNER_WIDTH)
}

fn now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// 初始化 tracing 订阅者
///
/// `RUST_LOG` 优先，否则使用传入的过滤规则。重复调用不会报错。
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 写入日志文件头（覆盖已有内容）
pub fn init_log_file(log_file_path: &str, fixture_path: &str) -> Result<()> {
    let header = [
        heavy_rule(),
        format!("流程渲染日志 - {}", now()),
        format!("数据文件: {}", fixture_path),
        heavy_rule(),
        String::new(),
    ]
    .join("\n");
    fs::write(log_file_path, header + "\n")
        .with_context(|| format!("无法写入日志文件: {}", log_file_path))
}

pub fn log_startup(fixture_path: &str, instances: usize) {
    info!("{}", heavy_rule());
    info!("🚀 程序启动 - 流程渲染与批量文档处理");
    info!("📁 数据文件: {}", fixture_path);
    info!("📊 流程实例数: {}", instances);
    info!("{}", heavy_rule());
}

pub fn log_bulk_start(action: &str, total: usize) {
    info!("\n{}", heavy_rule());
    info!("📦 开始批量 {}: 共 {} 个文档", action, total);
    info!("{}", heavy_rule());
}

pub fn log_bulk_complete(action: &str, success: usize, total: usize) {
    info!("\n{}", light_rule());
    info!("✓ 批量 {} 完成: 成功 {}/{}", action, success, total);
    info!("{}", light_rule());
}

/// 结束横幅：渲染统计，批量处理摘要（如有），日志文件位置
pub fn print_final_stats(
    rendered: usize,
    failed: usize,
    bulk_summary: Option<&str>,
    log_file_path: &str,
) {
    info!("\n{}", heavy_rule());
    info!("📊 运行结束 ({})", now());
    info!("🖼  流程实例: 渲染 {} 个, 失败 {} 个", rendered, failed);
    match bulk_summary {
        Some(summary) => info!("📦 批量处理: {}", summary),
        None => info!("📦 批量处理: 未配置"),
    }
    info!("{}", heavy_rule());
    info!("📝 日志文件: {}", log_file_path);
}

/// 按字符数截断，超出部分以 `...` 结尾
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("Ekonomické", 5), "Ekono...");
        assert_eq!(truncate_text("流程实例", 10), "流程实例");
        assert_eq!(truncate_text("流程实例", 4), "流程实例");
        assert_eq!(truncate_text("流程实例", 2), "流程...");
    }

    #[test]
    fn test_init_log_file_writes_header() {
        let path = std::env::temp_dir().join(format!("process_log_{}.txt", std::process::id()));
        let path_str = path.display().to_string();

        init_log_file(&path_str, "fixtures/workspace.toml").unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(&heavy_rule()));
        assert!(content.contains("数据文件: fixtures/workspace.toml"));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init("debug");
        init("info");
    }
}
