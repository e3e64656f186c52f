//! 工作流：状态机引擎与批量协调器
//!
//! engine 驱动单个任务 Planning→Generating→Executing→Evaluating 直至终态；
//! coordinator 按并发上限将一批任务分发给独立引擎实例并汇总终态报告。

mod coordinator;
mod engine;
mod types;

pub use coordinator::{CoordinatorConfig, RunCoordinator};
pub use engine::{EngineConfig, WorkflowEngine};
pub use types::{AbortReason, Outcome, Phase, RunReport};
