//! Hornet - 漏洞 PoC 验证工作流
//!
//! 入口：初始化日志、加载配置、读入任务批次、批量驱动工作流并导出报告。
//! 真实的规划/生成/沙箱后端是外部协作者，默认装配内置 Mock 能力做演练。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};

use hornet::config;
use hornet::evaluator::KeywordEvaluator;
use hornet::report::export_reports;
use hornet::shutdown::ShutdownManager;
use hornet::stage::mock::{MockExecutor, MockGenerator, MockPlanner};
use hornet::task::load_batch;
use hornet::workflow::RunCoordinator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hornet::observability::init();

    let cfg = config::load().context("Failed to load config")?;

    let mut args = std::env::args().skip(1);
    let Some(tasks_path) = args.next() else {
        bail!("usage: hornet <tasks.json> [code_repo]");
    };
    let code_repo = args.next().unwrap_or_else(|| ".".to_string());

    let tasks = load_batch(Path::new(&tasks_path), &code_repo)
        .with_context(|| format!("Failed to load task batch from {}", tasks_path))?;
    if tasks.is_empty() {
        bail!("Task batch is empty: {}", tasks_path);
    }

    // Ctrl+C / SIGTERM -> 协作式取消，在下一个状态转换边界生效
    let shutdown = Arc::new(ShutdownManager::new());
    shutdown.install_signal_handlers();

    let coordinator = RunCoordinator::new(
        Arc::new(MockPlanner),
        Arc::new(MockGenerator),
        Arc::new(MockExecutor::with_output(
            "vulnerability confirmed: leaked address 0x7ffee1a0",
            Some(0),
        )),
        Arc::new(KeywordEvaluator::default()),
        (&cfg.workflow).into(),
    );

    let reports = coordinator.run_batch(tasks, shutdown.token()).await;

    let output_dir = cfg
        .app
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("./results"));
    export_reports(&reports, &output_dir).context("Failed to export reports")?;

    Ok(())
}
