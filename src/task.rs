//! 任务记录与批量读入
//!
//! 每条 TaskRecord 对应输入文件中的一行漏洞数据，创建后不可变，生命周期覆盖整个工作流运行。
//! id 在读入时按「序号 + 时间戳」生成，批次内全局唯一且对同一输入行稳定。

use std::fs;
use std::path::Path;

use chrono::Local;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 批量读入错误
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Failed to read task file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse task file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 输入文件中的一行原始漏洞数据（尚未分配 id）
///
/// 字段名沿用原始表格列名：type / description / filename / code / impact / result。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VulnRow {
    #[serde(default, rename = "type")]
    pub vuln_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub impact: String,
    /// 先前的初步分析结论
    #[serde(default, rename = "result")]
    pub initial_analysis: String,
}

/// 一个待验证漏洞的完整描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    /// 全局唯一 id，形如 vuln_001_20250101_120000
    pub id: String,
    /// 漏洞类别，如 FORMAT_STRING_VULNERABILITY
    pub vuln_type: String,
    pub description: String,
    /// 源码位置
    pub filename: String,
    /// 触发代码片段
    pub code: String,
    /// 影响说明
    pub impact: String,
    /// 先前分析文本
    pub initial_analysis: String,
    /// 被测代码仓库路径
    pub code_repo: String,
}

impl TaskRecord {
    /// 由原始行构造；seq 从 1 开始，batch_stamp 为批次级时间戳
    pub fn from_row(seq: usize, row: VulnRow, code_repo: &str, batch_stamp: &str) -> Self {
        Self {
            id: format!("vuln_{:03}_{}", seq, batch_stamp),
            vuln_type: row.vuln_type,
            description: row.description,
            filename: row.filename,
            code: row.code,
            impact: row.impact,
            initial_analysis: row.initial_analysis,
            code_repo: code_repo.to_string(),
        }
    }
}

/// 从 JSON 文件读入任务批次（顶层为数组，每元素一行）
pub fn load_batch(path: &Path, code_repo: &str) -> Result<Vec<TaskRecord>, BatchError> {
    let content = fs::read_to_string(path).map_err(|source| BatchError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let rows: Vec<VulnRow> = serde_json::from_str(&content).map_err(|source| BatchError::Parse {
        path: path.display().to_string(),
        source,
    })?;

    let batch_stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let tasks: Vec<TaskRecord> = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| TaskRecord::from_row(i + 1, row, code_repo, &batch_stamp))
        .collect();

    tracing::info!(count = tasks.len(), path = %path.display(), "任务批次读入完成");
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_ids_unique_and_stable_format() {
        let rows = vec![VulnRow::default(), VulnRow::default(), VulnRow::default()];
        let tasks: Vec<TaskRecord> = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| TaskRecord::from_row(i + 1, row, "/repo", "20250101_120000"))
            .collect();

        assert_eq!(tasks[0].id, "vuln_001_20250101_120000");
        assert_eq!(tasks[2].id, "vuln_003_20250101_120000");
        let mut ids: Vec<_> = tasks.iter().map(|t| t.id.clone()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_load_batch_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"type": "FORMAT_STRING_VULNERABILITY", "description": "格式化字符串漏洞",
                 "filename": "test.cpp", "code": "ADD_ERR_MSG(user_input)",
                 "impact": "内存泄露", "result": "漏洞分析..."}}]"#
        )
        .unwrap();

        let tasks = load_batch(file.path(), "/codesec/AF8048").unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].vuln_type, "FORMAT_STRING_VULNERABILITY");
        assert_eq!(tasks[0].filename, "test.cpp");
        assert_eq!(tasks[0].initial_analysis, "漏洞分析...");
        assert_eq!(tasks[0].code_repo, "/codesec/AF8048");
    }

    #[test]
    fn test_load_batch_missing_file() {
        let err = load_batch(Path::new("/nonexistent/tasks.json"), ".").unwrap_err();
        assert!(matches!(err, BatchError::Io { .. }));
    }
}
