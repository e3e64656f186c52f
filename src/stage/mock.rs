//! Mock 阶段能力（用于测试与本地演练，无需模型与沙箱）
//!
//! MockPlanner / MockGenerator 回显输入构造产物；MockExecutor 返回固定输出；
//! ScriptedExecutor 按预置脚本逐次出队，便于驱动多轮重试路径。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::history::AttemptHistory;
use crate::stage::{
    ExecutionRecord, Plan, PocArtifact, PocGenerator, PocPlanner, SandboxExecutor, StageFailure,
};
use crate::task::TaskRecord;

/// Mock Planner：把任务描述回显为待办清单，并附上已有尝试轮数
#[derive(Debug, Default)]
pub struct MockPlanner;

#[async_trait]
impl PocPlanner for MockPlanner {
    async fn plan(
        &self,
        task: &TaskRecord,
        history: &AttemptHistory,
    ) -> Result<Plan, StageFailure> {
        Ok(Plan {
            todolist: format!(
                "1. 分析 {} 中的 {}\n2. 构造触发输入\n3. 在沙箱中验证\n(prior attempts: {})",
                task.filename,
                task.vuln_type,
                history.len()
            ),
        })
    }
}

/// Mock Generator：把计划包装为伪 PoC 代码
#[derive(Debug, Default)]
pub struct MockGenerator;

#[async_trait]
impl PocGenerator for MockGenerator {
    async fn generate(
        &self,
        plan: &Plan,
        _history: &AttemptHistory,
    ) -> Result<PocArtifact, StageFailure> {
        Ok(PocArtifact {
            filename: "poc.c".to_string(),
            code: format!("// generated from plan:\n// {}\nint main() {{ return 0; }}\n", plan.todolist),
        })
    }
}

/// Mock Executor：固定返回同一份执行记录
#[derive(Debug)]
pub struct MockExecutor {
    output: String,
    exit_code: Option<i32>,
}

impl MockExecutor {
    pub fn with_output(output: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self {
            output: output.into(),
            exit_code,
        }
    }
}

#[async_trait]
impl SandboxExecutor for MockExecutor {
    async fn execute(&self, _artifact: &PocArtifact) -> Result<ExecutionRecord, StageFailure> {
        Ok(ExecutionRecord {
            output: self.output.clone(),
            exit_code: self.exit_code,
        })
    }
}

/// 脚本化 Executor：每次调用弹出一条预置输出，脚本耗尽后报基础设施失败
#[derive(Debug)]
pub struct ScriptedExecutor {
    outputs: Mutex<VecDeque<String>>,
}

impl ScriptedExecutor {
    pub fn new(outputs: Vec<&str>) -> Self {
        Self {
            outputs: Mutex::new(outputs.into_iter().map(String::from).collect()),
        }
    }
}

#[async_trait]
impl SandboxExecutor for ScriptedExecutor {
    async fn execute(&self, _artifact: &PocArtifact) -> Result<ExecutionRecord, StageFailure> {
        let next = self
            .outputs
            .lock()
            .map_err(|_| StageFailure::new("execution", "script mutex poisoned"))?
            .pop_front();
        match next {
            Some(output) => Ok(ExecutionRecord {
                output,
                exit_code: Some(0),
            }),
            None => Err(StageFailure::new("execution", "script exhausted")),
        }
    }
}
