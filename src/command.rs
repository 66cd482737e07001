// 外部命令执行模块
// 负责启动外部进程、收集输出并执行退出码约定

use std::process::Command;
use std::sync::Arc;

use tracing::debug;

use crate::error::{PlayerError, Result};

/// 一次外部命令执行的原始结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// 退出码，被信号终止时为 None
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// 标准输出在前，标准错误在后，便于调用方按文本语义判断
    pub fn merged(&self) -> String {
        let mut merged = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !merged.is_empty() && !merged.ends_with('\n') {
                merged.push('\n');
            }
            merged.push_str(&self.stderr);
        }
        merged
    }
}

/// 进程执行接口，测试中可以替换为假实现
pub trait CommandExecutor: Send + Sync {
    fn execute(&self, argv: &[String]) -> std::io::Result<CommandOutput>;
}

/// 基于 std::process 的真实执行器
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl CommandExecutor for SystemExecutor {
    fn execute(&self, argv: &[String]) -> std::io::Result<CommandOutput> {
        let (program, args) = argv.split_first().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "空命令")
        })?;

        let output = Command::new(program).args(args).output()?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// 命令运行器
/// 不做任何重试，重试只属于收敛等待
#[derive(Clone)]
pub struct CommandRunner {
    executor: Arc<dyn CommandExecutor>,
}

impl CommandRunner {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }

    /// 运行命令并返回合并后的输出
    ///
    /// `fail_on_non_zero` 为 false 时，任何输出（包括"未找到播放器"之类的错误文本）
    /// 都原样返回，由调用方按语义解释。
    pub fn run(&self, argv: &[String], fail_on_non_zero: bool) -> Result<String> {
        let output = self.executor.execute(argv).map_err(|source| PlayerError::Spawn {
            program: argv.first().cloned().unwrap_or_default(),
            source,
        })?;

        debug!("执行命令 {:?}，退出码: {:?}", argv, output.exit_code);

        let merged = output.merged();
        if fail_on_non_zero && !output.success() {
            return Err(PlayerError::ExternalCommand {
                argv: argv.to_vec(),
                exit_code: output.exit_code,
                output: merged,
            });
        }

        Ok(merged)
    }
}

/// 把字符串切片拼成 argv
pub fn argv<I, S>(parts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    parts.into_iter().map(Into::into).collect()
}
