//! 阶段能力抽象
//!
//! Planner / Generator / Executor 三个独立可替换单元，各自只暴露一次「调用 -> 产物或失败」的契约。
//! 引擎不窥探其内部（远程模型调用、沙箱进程等副作用都封装在能力内部），只响应成败与对应载荷。
//! 能力实例可被多个并发工作流实例共享，调用之间不持有任务级可变状态。

pub mod mock;
mod traits;

pub use traits::{
    ExecutionRecord, Plan, PocArtifact, PocGenerator, PocPlanner, SandboxExecutor, StageFailure,
};
