//! 结果导出
//!
//! 报告格式不属于编排核心：这里提供 JSON 明细与文本摘要两种最简导出，
//! JSON 保留尝试顺序与判定枚举名，可被外部报表工具再加工。

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use crate::workflow::RunReport;

/// 导出产物路径
#[derive(Debug)]
pub struct ExportPaths {
    pub detail: PathBuf,
    pub summary: PathBuf,
}

/// 导出一批报告：JSON 明细 + 文本摘要，文件名带时间戳
pub fn export_reports(reports: &[RunReport], output_dir: &Path) -> Result<ExportPaths> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output dir {}", output_dir.display()))?;

    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let detail = output_dir.join(format!("poc_workflow_results_{}.json", stamp));
    let summary = output_dir.join(format!("poc_workflow_summary_{}.txt", stamp));

    let json = serde_json::to_string_pretty(reports).context("Failed to serialize reports")?;
    fs::write(&detail, json)
        .with_context(|| format!("Failed to write detail file {}", detail.display()))?;

    fs::write(&summary, render_summary(reports))
        .with_context(|| format!("Failed to write summary file {}", summary.display()))?;

    tracing::info!(
        detail = %detail.display(),
        summary = %summary.display(),
        "报告已导出"
    );
    Ok(ExportPaths { detail, summary })
}

fn render_summary(reports: &[RunReport]) -> String {
    let total = reports.len();
    let success = reports.iter().filter(|r| r.outcome.is_success()).count();
    let rate = if total > 0 {
        success as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    let times: Vec<f64> = reports.iter().map(|r| r.elapsed_secs).collect();
    let total_time: f64 = times.iter().sum();
    let avg_time = if total > 0 { total_time / total as f64 } else { 0.0 };

    let mut out = String::new();
    out.push_str("PoC 工作流执行摘要\n");
    out.push_str(&"=".repeat(50));
    out.push_str(&format!(
        "\n\n生成时间: {}\n总处理数量: {}\n\n执行统计:\n  成功: {}\n  失败: {}\n  成功率: {:.1}%\n\n",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        total,
        success,
        total - success,
        rate
    ));
    out.push_str(&format!(
        "时间统计:\n  总处理时间: {:.2} 秒\n  平均处理时间: {:.2} 秒\n\n",
        total_time, avg_time
    ));
    out.push_str("详细结果:\n");
    out.push_str(&"-".repeat(50));
    out.push('\n');

    for report in reports {
        out.push_str(&format!("漏洞ID: {}\n", report.task_id));
        out.push_str(&format!("类型: {}\n", report.vuln_type));
        out.push_str(&format!("文件: {}\n", report.filename));
        out.push_str(&format!("结果: {}\n", report.outcome));
        out.push_str(&format!("迭代次数: {}\n", report.iterations));
        out.push_str(&format!("尝试记录: {}\n", report.history.len()));
        out.push_str(&format!("处理时间: {:.2} 秒\n\n", report.elapsed_secs));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::AttemptHistory;
    use crate::workflow::{AbortReason, Outcome};

    fn report(task_id: &str, outcome: Outcome) -> RunReport {
        RunReport {
            run_id: "run-1".to_string(),
            task_id: task_id.to_string(),
            vuln_type: "FORMAT_STRING_VULNERABILITY".to_string(),
            filename: "test.cpp".to_string(),
            outcome,
            iterations: 1,
            history: AttemptHistory::new(),
            elapsed_secs: 0.5,
        }
    }

    #[test]
    fn test_export_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let reports = vec![
            report("vuln_001", Outcome::Success),
            report("vuln_002", Outcome::Aborted(AbortReason::MaxRetriesExceeded)),
        ];

        let paths = export_reports(&reports, dir.path()).unwrap();
        assert!(paths.detail.exists());
        assert!(paths.summary.exists());

        // JSON 可解析回报告，顺序与中止原因标签保持不变
        let content = fs::read_to_string(&paths.detail).unwrap();
        let parsed: Vec<RunReport> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].task_id, "vuln_001");
        assert!(content.contains("max-retries-exceeded"));

        let summary = fs::read_to_string(&paths.summary).unwrap();
        assert!(summary.contains("成功率: 50.0%"));
    }
}
