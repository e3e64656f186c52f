//! 执行结果判定
//!
//! classify 是纯函数：同一 ExecutionRecord 必得同一 Verdict，保证工作流可复现、可测试。
//! 歧义信号的取舍：成功与失败指标同时命中时，仅当命中的失败指标全部被配置为非致命才判成功，
//! 否则判 Inconclusive（误报「验证成功」的代价高于多重试一轮）。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::stage::ExecutionRecord;

/// 一次执行的判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// 漏洞验证成功
    Success,
    /// 代码缺陷（编译/语法/运行时错误），同一计划下重新生成即可
    CodeDefectFailure,
    /// 其他失败（策略错误、环境不符等），需要重新规划
    OtherFailure,
    /// 信号矛盾，无法判定；路由上等同 OtherFailure
    Inconclusive,
}

impl Verdict {
    pub fn is_success(self) -> bool {
        matches!(self, Verdict::Success)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Success => write!(f, "Success"),
            Verdict::CodeDefectFailure => write!(f, "CodeDefectFailure"),
            Verdict::OtherFailure => write!(f, "OtherFailure"),
            Verdict::Inconclusive => write!(f, "Inconclusive"),
        }
    }
}

/// 判定能力：对执行记录做确定性分类（无隐藏状态）
pub trait ExecutionEvaluator: Send + Sync {
    fn classify(&self, record: &ExecutionRecord) -> Verdict;
}

/// 关键字判定器
///
/// 成功 / 代码缺陷两组关键字做小写包含匹配；non_fatal 列出不阻止成功判定的失败关键字。
pub struct KeywordEvaluator {
    success_keywords: Vec<String>,
    defect_keywords: Vec<String>,
    non_fatal_keywords: Vec<String>,
}

impl Default for KeywordEvaluator {
    fn default() -> Self {
        Self {
            success_keywords: [
                "漏洞验证成功",
                "vulnerability confirmed",
                "内存地址",
                "0x",
                "leaked",
                "格式化字符串",
                "exploit",
                "payload",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            defect_keywords: [
                "编译错误",
                "compile error",
                "syntax error",
                "runtime error",
                "segmentation fault",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            non_fatal_keywords: Vec::new(),
        }
    }
}

impl KeywordEvaluator {
    pub fn new(
        success_keywords: Vec<String>,
        defect_keywords: Vec<String>,
        non_fatal_keywords: Vec<String>,
    ) -> Self {
        Self {
            success_keywords,
            defect_keywords,
            non_fatal_keywords,
        }
    }

    /// 将一个失败关键字标记为非致命
    pub fn with_non_fatal(mut self, keyword: impl Into<String>) -> Self {
        self.non_fatal_keywords.push(keyword.into());
        self
    }

    fn matched<'a>(&self, keywords: &'a [String], text: &str) -> Vec<&'a str> {
        keywords
            .iter()
            .filter(|k| text.contains(k.to_lowercase().as_str()))
            .map(|k| k.as_str())
            .collect()
    }
}

impl ExecutionEvaluator for KeywordEvaluator {
    fn classify(&self, record: &ExecutionRecord) -> Verdict {
        let text = record.output.to_lowercase();

        let success_hits = self.matched(&self.success_keywords, &text);
        let defect_hits = self.matched(&self.defect_keywords, &text);
        let fatal_hits: Vec<&str> = defect_hits
            .iter()
            .copied()
            .filter(|hit| !self.non_fatal_keywords.iter().any(|nf| nf.as_str() == *hit))
            .collect();

        if !success_hits.is_empty() {
            if fatal_hits.is_empty() {
                Verdict::Success
            } else {
                Verdict::Inconclusive
            }
        } else if !defect_hits.is_empty() {
            Verdict::CodeDefectFailure
        } else {
            Verdict::OtherFailure
        }
    }
}
