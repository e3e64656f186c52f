//! 工作流引擎
//!
//! 显式状态机：Planning → Generating → Executing → Evaluating，终态 Success / Aborted。
//! 单实例内严格串行（每个阶段的输入是上一阶段的输出，不存在并行阶段）；
//! 每次状态转换边界检查取消信号；每个能力调用受超时约束，超时等同基础设施失败。
//! 迭代计数仅在以失败判定退出 Evaluating 时自增一次，且先自增、再与上限比较、后派发，
//! 保证上限即使瞬时也不会被越过。

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::evaluator::{ExecutionEvaluator, Verdict};
use crate::history::{Attempt, AttemptHistory};
use crate::stage::{
    ExecutionRecord, Plan, PocArtifact, PocGenerator, PocPlanner, SandboxExecutor, StageFailure,
};
use crate::task::TaskRecord;
use crate::workflow::types::{AbortReason, Outcome, Phase, RunReport};

/// 引擎配置：由 Coordinator 构造时显式传入，不走进程级可变状态
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// 判定失败后允许的最大重试轮数
    pub max_retries: u32,
    /// 单次能力调用超时
    pub stage_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            stage_timeout: Duration::from_secs(300),
        }
    }
}

/// 非终态的内部表示：每个状态携带进入它所需的上一阶段产物
enum Step {
    Planning,
    Generating {
        plan: Plan,
    },
    Executing {
        plan: Plan,
        poc: PocArtifact,
    },
    Evaluating {
        plan: Plan,
        poc: PocArtifact,
        execution: ExecutionRecord,
    },
}

impl Step {
    fn phase(&self) -> Phase {
        match self {
            Step::Planning => Phase::Planning,
            Step::Generating { .. } => Phase::Generating,
            Step::Executing { .. } => Phase::Executing,
            Step::Evaluating { .. } => Phase::Evaluating,
        }
    }
}

fn rationale_for(verdict: Verdict) -> String {
    match verdict {
        Verdict::Success => "命中成功指标，验证通过".to_string(),
        Verdict::CodeDefectFailure => "命中代码缺陷指标，沿用原计划重新生成 PoC".to_string(),
        Verdict::OtherFailure => "无明确指标，回到规划阶段调整策略".to_string(),
        Verdict::Inconclusive => "成功与致命失败指标并存，按失败处理重新规划".to_string(),
    }
}

/// 工作流引擎：把一个任务驱动到终态
///
/// 能力实例通过 Arc 共享，可被多个并发引擎实例复用；
/// 尝试历史与运行状态由本实例独占，任何其他实例或 Coordinator 都不直接改写。
pub struct WorkflowEngine {
    planner: Arc<dyn PocPlanner>,
    generator: Arc<dyn PocGenerator>,
    executor: Arc<dyn SandboxExecutor>,
    evaluator: Arc<dyn ExecutionEvaluator>,
    config: EngineConfig,
}

impl WorkflowEngine {
    pub fn new(
        planner: Arc<dyn PocPlanner>,
        generator: Arc<dyn PocGenerator>,
        executor: Arc<dyn SandboxExecutor>,
        evaluator: Arc<dyn ExecutionEvaluator>,
        config: EngineConfig,
    ) -> Self {
        Self {
            planner,
            generator,
            executor,
            evaluator,
            config,
        }
    }

    /// 运行直至终态；所有失败都折叠进 RunReport，本函数不返回 Err
    pub async fn run(&self, task: &TaskRecord, cancel: CancellationToken) -> RunReport {
        let started = Instant::now();
        let run_id = Uuid::new_v4().to_string();

        let mut step = Step::Planning;
        let mut iteration: u32 = 0;
        let mut history = AttemptHistory::new();

        let outcome = loop {
            // 取消只在状态转换边界生效；能力调用内部对引擎不透明，不可中断
            if cancel.is_cancelled() {
                tracing::warn!(task = %task.id, "收到取消信号，中止");
                break Outcome::Aborted(AbortReason::Cancelled);
            }
            tracing::debug!(task = %task.id, phase = ?step.phase(), iteration, "状态转换");

            step = match step {
                Step::Planning => {
                    tracing::info!(task = %task.id, iteration, "开始规划");
                    match self.call(self.planner.plan(task, &history), "planning").await {
                        Ok(plan) => Step::Generating { plan },
                        Err(failure) => {
                            tracing::error!(task = %task.id, %failure, "规划失败");
                            break Outcome::Aborted(AbortReason::InfraFailure);
                        }
                    }
                }
                Step::Generating { plan } => {
                    tracing::info!(task = %task.id, iteration, "生成 PoC");
                    match self
                        .call(self.generator.generate(&plan, &history), "generation")
                        .await
                    {
                        Ok(poc) => Step::Executing { plan, poc },
                        Err(failure) => {
                            tracing::error!(task = %task.id, %failure, "PoC 生成失败");
                            break Outcome::Aborted(AbortReason::InfraFailure);
                        }
                    }
                }
                Step::Executing { plan, poc } => {
                    tracing::info!(task = %task.id, iteration, "沙箱执行 PoC");
                    match self.call(self.executor.execute(&poc), "execution").await {
                        Ok(execution) => Step::Evaluating {
                            plan,
                            poc,
                            execution,
                        },
                        Err(failure) => {
                            tracing::error!(task = %task.id, %failure, "沙箱执行失败");
                            break Outcome::Aborted(AbortReason::InfraFailure);
                        }
                    }
                }
                Step::Evaluating {
                    plan,
                    poc,
                    execution,
                } => {
                    let verdict = self.evaluator.classify(&execution);
                    let rationale = rationale_for(verdict);
                    tracing::info!(task = %task.id, iteration, %verdict, "{}", rationale);
                    history.append(Attempt {
                        iteration,
                        plan: plan.clone(),
                        poc,
                        execution,
                        verdict,
                        rationale,
                    });

                    match verdict {
                        Verdict::Success => break Outcome::Success,
                        Verdict::CodeDefectFailure => {
                            iteration += 1;
                            if iteration >= self.config.max_retries {
                                tracing::warn!(task = %task.id, max = self.config.max_retries, "达到最大重试次数，中止");
                                break Outcome::Aborted(AbortReason::MaxRetriesExceeded);
                            }
                            // 纯代码缺陷不必重推策略，跳过规划
                            Step::Generating { plan }
                        }
                        Verdict::OtherFailure | Verdict::Inconclusive => {
                            iteration += 1;
                            if iteration >= self.config.max_retries {
                                tracing::warn!(task = %task.id, max = self.config.max_retries, "达到最大重试次数，中止");
                                break Outcome::Aborted(AbortReason::MaxRetriesExceeded);
                            }
                            Step::Planning
                        }
                    }
                }
            };
        };

        tracing::info!(
            task = %task.id,
            %outcome,
            iterations = iteration,
            attempts = history.len(),
            "工作流结束"
        );

        RunReport {
            run_id,
            task_id: task.id.clone(),
            vuln_type: task.vuln_type.clone(),
            filename: task.filename.clone(),
            outcome,
            iterations: iteration,
            history,
            elapsed_secs: started.elapsed().as_secs_f64(),
        }
    }

    /// 超时包装：一次能力调用要么产出结果，要么算基础设施失败
    async fn call<T>(
        &self,
        fut: impl Future<Output = Result<T, StageFailure>>,
        stage: &'static str,
    ) -> Result<T, StageFailure> {
        match timeout(self.config.stage_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StageFailure::new(
                stage,
                format!("timed out after {:?}", self.config.stage_timeout),
            )),
        }
    }
}
