use anyhow::Result;
use process_workflow::utils::logging;
use process_workflow::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.effective_log_filter());

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
