//! 工作流类型定义

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::history::AttemptHistory;

/// 工作流阶段（状态机状态）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// 规划验证策略
    Planning,
    /// 生成 PoC 代码
    Generating,
    /// 沙箱执行
    Executing,
    /// 判定与路由
    Evaluating,
    /// 终态：验证成功
    Success,
    /// 终态：中止
    Aborted,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Success | Phase::Aborted)
    }
}

/// 中止原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AbortReason {
    /// 能力调用本身失败（含超时）：协作者坏了，不是策略错了，不重试
    InfraFailure,
    /// 判定失败次数达到上限：引擎放弃了
    MaxRetriesExceeded,
    /// 操作者取消
    Cancelled,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::InfraFailure => write!(f, "infra-failure"),
            AbortReason::MaxRetriesExceeded => write!(f, "max-retries-exceeded"),
            AbortReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// 终态结果；每次运行恰好设置一次，此后不再变更
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    Aborted(AbortReason),
}

impl Outcome {
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Success)
    }

    pub fn reason(self) -> Option<AbortReason> {
        match self {
            Outcome::Success => None,
            Outcome::Aborted(reason) => Some(reason),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "Success"),
            Outcome::Aborted(reason) => write!(f, "Aborted({})", reason),
        }
    }
}

/// 单任务终态报告，交给外部导出器使用
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// 本次运行 id
    pub run_id: String,
    pub task_id: String,
    pub vuln_type: String,
    pub filename: String,
    pub outcome: Outcome,
    /// 最终迭代计数
    pub iterations: u32,
    /// 完整尝试轨迹
    pub history: AttemptHistory,
    /// 处理耗时（秒）
    pub elapsed_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_phases() {
        assert!(Phase::Success.is_terminal());
        assert!(Phase::Aborted.is_terminal());
        assert!(!Phase::Evaluating.is_terminal());
    }

    #[test]
    fn test_abort_reason_tags() {
        assert_eq!(AbortReason::InfraFailure.to_string(), "infra-failure");
        assert_eq!(
            AbortReason::MaxRetriesExceeded.to_string(),
            "max-retries-exceeded"
        );
        assert_eq!(AbortReason::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn test_outcome_reason() {
        assert_eq!(Outcome::Success.reason(), None);
        assert_eq!(
            Outcome::Aborted(AbortReason::Cancelled).reason(),
            Some(AbortReason::Cancelled)
        );
    }
}
