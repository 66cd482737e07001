// 测试辅助：脚本化的假执行器与假时钟

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::command::{CommandExecutor, CommandOutput};
use crate::player::Clock;

type Responder = Box<dyn Fn(&[String]) -> CommandOutput + Send + Sync>;

/// 记录所有调用，并用闭包生成输出
pub struct FakeExecutor {
    calls: Mutex<Vec<Vec<String>>>,
    responder: Responder,
}

impl FakeExecutor {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&[String]) -> CommandOutput + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    /// 所有命令都成功且无输出
    pub fn silent() -> Self {
        Self::new(|_| ok(""))
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandExecutor for FakeExecutor {
    fn execute(&self, argv: &[String]) -> std::io::Result<CommandOutput> {
        self.calls.lock().unwrap().push(argv.to_vec());
        Ok((self.responder)(argv))
    }
}

pub fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        exit_code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

pub fn failed(stderr: &str) -> CommandOutput {
    CommandOutput {
        exit_code: Some(1),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

/// metadata 命令的输出
pub fn metadata_output(title: &str, position: i64) -> CommandOutput {
    ok(&format!(
        "artUrl:https://example.com/{title}.png\nartist:Artist\ntitle:{title}\nalbum:Album\nplayerName:spotify\nposition:{position}\n"
    ))
}

/// sleep 只推进虚拟时间的时钟
pub struct FakeClock {
    base: Instant,
    elapsed: Mutex<Duration>,
    sleeps: Mutex<usize>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(0),
        }
    }

    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap()
    }

    pub fn sleeps(&self) -> usize {
        *self.sleeps.lock().unwrap()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.base + self.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        *self.elapsed.lock().unwrap() += duration;
        *self.sleeps.lock().unwrap() += 1;
    }
}
