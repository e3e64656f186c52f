//! 批量协调器
//!
//! 每个任务一个独立的工作流引擎实例，Semaphore 限制同时在跑的实例数；
//! 配置与能力实例跨任务共享，任务级状态互不共享。
//! 单个任务内部的 panic 被折叠为该任务的 Aborted(infra-failure)，不影响同批其他任务；
//! 输出集合与输入一一对应：无丢失、无重复。

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::evaluator::ExecutionEvaluator;
use crate::history::AttemptHistory;
use crate::stage::{PocGenerator, PocPlanner, SandboxExecutor};
use crate::task::TaskRecord;
use crate::workflow::engine::{EngineConfig, WorkflowEngine};
use crate::workflow::types::{AbortReason, Outcome, RunReport};

/// 协调器配置
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// 同时运行的工作流实例上限
    pub max_concurrent: usize,
    pub engine: EngineConfig,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 2,
            engine: EngineConfig::default(),
        }
    }
}

/// 批量协调器
pub struct RunCoordinator {
    planner: Arc<dyn PocPlanner>,
    generator: Arc<dyn PocGenerator>,
    executor: Arc<dyn SandboxExecutor>,
    evaluator: Arc<dyn ExecutionEvaluator>,
    config: CoordinatorConfig,
}

impl RunCoordinator {
    pub fn new(
        planner: Arc<dyn PocPlanner>,
        generator: Arc<dyn PocGenerator>,
        executor: Arc<dyn SandboxExecutor>,
        evaluator: Arc<dyn ExecutionEvaluator>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            planner,
            generator,
            executor,
            evaluator,
            config,
        }
    }

    /// 驱动一批任务到终态，按输入顺序返回每个任务恰好一份报告
    pub async fn run_batch(
        &self,
        tasks: Vec<TaskRecord>,
        cancel: CancellationToken,
    ) -> Vec<RunReport> {
        let total = tasks.len();
        tracing::info!(total, "开始批量处理");

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent.max(1)));
        let mut handles = Vec::with_capacity(total);

        for task in tasks {
            let engine = WorkflowEngine::new(
                Arc::clone(&self.planner),
                Arc::clone(&self.generator),
                Arc::clone(&self.executor),
                Arc::clone(&self.evaluator),
                self.config.engine.clone(),
            );
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            let meta = (task.id.clone(), task.vuln_type.clone(), task.filename.clone());

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("semaphore closed");
                engine.run(&task, cancel).await
            });
            handles.push((meta, handle));
        }

        let mut reports = Vec::with_capacity(total);
        for ((task_id, vuln_type, filename), handle) in handles {
            match handle.await {
                Ok(report) => {
                    tracing::info!(
                        task = %report.task_id,
                        outcome = %report.outcome,
                        iterations = report.iterations,
                        elapsed_secs = report.elapsed_secs,
                        "任务处理完成"
                    );
                    reports.push(report);
                }
                Err(join_error) => {
                    // 引擎内部异常不允许拖垮整批：记为该任务的基础设施失败
                    tracing::error!(task = %task_id, error = %join_error, "任务执行单元异常退出");
                    reports.push(RunReport {
                        run_id: Uuid::new_v4().to_string(),
                        task_id,
                        vuln_type,
                        filename,
                        outcome: Outcome::Aborted(AbortReason::InfraFailure),
                        iterations: 0,
                        history: AttemptHistory::new(),
                        elapsed_secs: 0.0,
                    });
                }
            }
        }

        let success = reports.iter().filter(|r| r.outcome.is_success()).count();
        let rate = if total > 0 {
            success as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        tracing::info!(
            total,
            success,
            failed = total - success,
            success_rate = rate,
            "批量处理完成"
        );

        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::KeywordEvaluator;
    use crate::stage::mock::{MockExecutor, MockGenerator, MockPlanner};
    use crate::stage::{ExecutionRecord, PocArtifact, StageFailure};
    use async_trait::async_trait;

    fn tasks(n: usize) -> Vec<TaskRecord> {
        (1..=n)
            .map(|i| TaskRecord {
                id: format!("vuln_{:03}_test", i),
                vuln_type: "BUFFER_OVERFLOW".to_string(),
                description: String::new(),
                filename: format!("file_{}.c", i),
                code: String::new(),
                impact: String::new(),
                initial_analysis: String::new(),
                code_repo: "/repo".to_string(),
            })
            .collect()
    }

    struct PanickingExecutor;

    #[async_trait]
    impl SandboxExecutor for PanickingExecutor {
        async fn execute(&self, _artifact: &PocArtifact) -> Result<ExecutionRecord, StageFailure> {
            panic!("sandbox crashed hard");
        }
    }

    fn coordinator(executor: Arc<dyn SandboxExecutor>) -> RunCoordinator {
        RunCoordinator::new(
            Arc::new(MockPlanner),
            Arc::new(MockGenerator),
            executor,
            Arc::new(KeywordEvaluator::default()),
            CoordinatorConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_one_report_per_task() {
        let coordinator = coordinator(Arc::new(MockExecutor::with_output(
            "vulnerability confirmed",
            Some(0),
        )));
        let input = tasks(5);
        let input_ids: Vec<String> = input.iter().map(|t| t.id.clone()).collect();

        let reports = coordinator
            .run_batch(input, CancellationToken::new())
            .await;

        assert_eq!(reports.len(), 5);
        let output_ids: Vec<String> = reports.iter().map(|r| r.task_id.clone()).collect();
        assert_eq!(output_ids, input_ids);
    }

    #[tokio::test]
    async fn test_panic_contained_per_task() {
        let coordinator = coordinator(Arc::new(PanickingExecutor));
        let reports = coordinator
            .run_batch(tasks(3), CancellationToken::new())
            .await;

        assert_eq!(reports.len(), 3);
        for report in &reports {
            assert_eq!(report.outcome, Outcome::Aborted(AbortReason::InfraFailure));
        }
    }
}
