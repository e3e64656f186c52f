//! 能力契约与阶段载荷类型

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::history::AttemptHistory;
use crate::task::TaskRecord;

/// 能力调用的基础设施失败（超时、网络、资源耗尽）
///
/// 区别于 Evaluator 的判定失败：这里表示协作者本身无法产出任何结果，对当前任务致命、不重试。
#[derive(Error, Debug, Clone)]
#[error("{stage} stage failed: {message}")]
pub struct StageFailure {
    /// 出错的阶段名（planning / generation / execution）
    pub stage: &'static str,
    pub message: String,
}

impl StageFailure {
    pub fn new(stage: &'static str, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

/// 规划产物：针对该漏洞的验证步骤清单
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub todolist: String,
}

/// 生成产物：PoC 代码
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PocArtifact {
    pub filename: String,
    pub code: String,
}

/// 执行产物：沙箱的原始输出与退出状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub output: String,
    pub exit_code: Option<i32>,
}

/// 规划能力：基于任务与已有尝试历史给出验证策略
///
/// 历史按时间顺序提供完整因果链，实现方可据此避免重复已失败的策略。
#[async_trait]
pub trait PocPlanner: Send + Sync {
    async fn plan(&self, task: &TaskRecord, history: &AttemptHistory)
        -> Result<Plan, StageFailure>;
}

/// 生成能力：按计划生成 PoC 代码
#[async_trait]
pub trait PocGenerator: Send + Sync {
    async fn generate(
        &self,
        plan: &Plan,
        history: &AttemptHistory,
    ) -> Result<PocArtifact, StageFailure>;
}

/// 执行能力：在隔离环境中运行 PoC
///
/// 只要产出了输出就算调用成功，输出内容的好坏交给 Evaluator 判定；
/// 能力内部可以流式处理，但交给引擎的是一份完整载荷。
#[async_trait]
pub trait SandboxExecutor: Send + Sync {
    async fn execute(&self, artifact: &PocArtifact) -> Result<ExecutionRecord, StageFailure>;
}
