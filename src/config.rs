//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `HORNET__*` 覆盖（双下划线表示嵌套，如 `HORNET__WORKFLOW__MAX_RETRIES=5`）。
//! 配置是显式对象，随 Coordinator 构造传入；不使用进程级可变状态，同进程内可并行多个不同策略的批次。

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::workflow::{CoordinatorConfig, EngineConfig};

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub workflow: WorkflowSection,
}

/// [app] 段：应用名与报告输出目录
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    pub name: Option<String>,
    /// 报告输出目录，未设置时用 ./results
    pub output_dir: Option<PathBuf>,
}

/// [workflow] 段：重试上限、阶段超时、批量并发
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowSection {
    /// 最大重试轮数（判定失败后允许的重启次数）
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// 单次能力调用超时（秒），超时等同基础设施失败
    #[serde(default = "default_stage_timeout_secs")]
    pub stage_timeout_secs: u64,
    /// 同时运行的工作流实例上限
    #[serde(default = "default_max_concurrent_tasks")]
    pub max_concurrent_tasks: usize,
}

fn default_max_retries() -> u32 {
    3
}

fn default_stage_timeout_secs() -> u64 {
    300
}

fn default_max_concurrent_tasks() -> usize {
    2
}

impl Default for WorkflowSection {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            stage_timeout_secs: default_stage_timeout_secs(),
            max_concurrent_tasks: default_max_concurrent_tasks(),
        }
    }
}

impl From<&WorkflowSection> for EngineConfig {
    fn from(section: &WorkflowSection) -> Self {
        Self {
            max_retries: section.max_retries,
            stage_timeout: Duration::from_secs(section.stage_timeout_secs),
        }
    }
}

impl From<&WorkflowSection> for CoordinatorConfig {
    fn from(section: &WorkflowSection) -> Self {
        Self {
            max_concurrent: section.max_concurrent_tasks,
            engine: section.into(),
        }
    }
}

/// 加载配置：config/default.toml（可缺省）+ HORNET__* 环境变量
pub fn load() -> Result<AppConfig, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/default").required(false))
        .add_source(
            config::Environment::with_prefix("HORNET")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;
    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_defaults() {
        let section = WorkflowSection::default();
        assert_eq!(section.max_retries, 3);
        assert_eq!(section.stage_timeout_secs, 300);
        assert_eq!(section.max_concurrent_tasks, 2);
    }

    #[test]
    fn test_engine_config_conversion() {
        let section = WorkflowSection {
            max_retries: 5,
            stage_timeout_secs: 10,
            max_concurrent_tasks: 4,
        };
        let engine: EngineConfig = (&section).into();
        assert_eq!(engine.max_retries, 5);
        assert_eq!(engine.stage_timeout, Duration::from_secs(10));

        let coord: CoordinatorConfig = (&section).into();
        assert_eq!(coord.max_concurrent, 4);
    }
}
