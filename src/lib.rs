//! Hornet - 漏洞 PoC 验证工作流引擎
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **evaluator**: 执行结果判定（关键字策略 + 可配置非致命规则）
//! - **history**: 仅追加的尝试历史
//! - **observability**: tracing 初始化
//! - **report**: JSON 明细与文本摘要导出
//! - **shutdown**: 取消信号（Ctrl+C / SIGTERM）
//! - **stage**: 阶段能力抽象（Planner / Generator / Executor）与 Mock 实现
//! - **task**: 任务记录与批量读入
//! - **workflow**: 状态机引擎与批量协调器

pub mod config;
pub mod evaluator;
pub mod history;
pub mod observability;
pub mod report;
pub mod shutdown;
pub mod stage;
pub mod task;
pub mod workflow;

pub use workflow::{RunCoordinator, WorkflowEngine};
