use anyhow::Result;
use broadcast_scheduler::utils::logging;
use broadcast_scheduler::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init(&config.output_log_file, config.verbose_logging)?;

    // 初始化并运行应用
    App::initialize(config)?.run().await?;

    Ok(())
}
