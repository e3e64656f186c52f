//! 尝试历史：仅追加的因果记录
//!
//! 每条 Attempt 对应一次完整的 Planning→Evaluation 循环。只增不删不改、插入顺序即时间顺序，
//! 后续阶段据此获得完整上下文（Planner 可避免重复已失败的策略）。归属于单个工作流实例，随实例销毁。

use serde::{Deserialize, Serialize};

use crate::evaluator::Verdict;
use crate::stage::{ExecutionRecord, Plan, PocArtifact};

/// 一次完整循环的产物与判定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    /// 所属迭代轮次（从 0 开始）
    pub iteration: u32,
    pub plan: Plan,
    pub poc: PocArtifact,
    pub execution: ExecutionRecord,
    pub verdict: Verdict,
    /// 路由依据的文字说明
    pub rationale: String,
}

/// 仅追加的尝试序列
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttemptHistory {
    entries: Vec<Attempt>,
}

impl AttemptHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条记录；这是历史增长的唯一途径
    pub fn append(&mut self, attempt: Attempt) {
        self.entries.push(attempt);
    }

    /// 最近一条记录
    pub fn latest(&self) -> Option<&Attempt> {
        self.entries.last()
    }

    /// 按时间顺序返回全部记录
    pub fn all(&self) -> &[Attempt] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
