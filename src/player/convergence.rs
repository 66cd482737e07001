use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::Result;
use crate::player::types::{RepeatState, TrackMetadata};

/// 时钟接口，测试中用虚拟时间替代真实等待
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// 一次收敛等待的结果
#[derive(Debug, Clone)]
pub struct Convergence<T> {
    /// 谓词是否在预算内成立
    pub settled: bool,
    /// 实际轮询次数
    pub polls: usize,
    /// 最后一次成功读到的状态
    pub last: Option<T>,
}

/// 收敛等待器
///
/// 在变更命令之后以固定间隔轮询外部状态，直到谓词成立或时间预算用完。
/// 超时不是错误：调用方继续使用最后一次观察到的状态。
#[derive(Clone)]
pub struct ConvergenceWaiter {
    clock: Arc<dyn Clock>,
    interval: Duration,
    budget: Duration,
}

impl ConvergenceWaiter {
    pub fn new(clock: Arc<dyn Clock>, interval: Duration, budget: Duration) -> Self {
        Self {
            clock,
            interval,
            budget,
        }
    }

    /// ceil(budget / interval)，保证睡眠总时长不少于预算
    pub fn max_attempts(&self) -> usize {
        let interval = self.interval.as_nanos().max(1);
        self.budget.as_nanos().div_ceil(interval) as usize
    }

    pub fn wait_for<T, P, S>(&self, mut probe: P, settled: S) -> Convergence<T>
    where
        P: FnMut() -> Result<T>,
        S: Fn(&T) -> bool,
    {
        let start = self.clock.now();
        let max_attempts = self.max_attempts();
        let mut last = None;
        let mut polls = 0;

        for attempt in 0..=max_attempts {
            polls += 1;
            match probe() {
                Ok(observed) => {
                    let done = settled(&observed);
                    last = Some(observed);
                    if done {
                        debug!("状态在第 {} 次轮询后收敛", polls);
                        return Convergence {
                            settled: true,
                            polls,
                            last,
                        };
                    }
                }
                Err(e) => debug!("轮询状态失败，继续等待: {}", e),
            }

            if attempt == max_attempts || self.clock.now().duration_since(start) >= self.budget {
                break;
            }
            self.clock.sleep(self.interval);
        }

        debug!("等待 {} 次轮询后仍未收敛，使用最后观察到的状态", polls);
        Convergence {
            settled: false,
            polls,
            last,
        }
    }
}

/// 下一曲：标题发生变化
pub fn next_track_settled(before: &TrackMetadata, now: &TrackMetadata) -> bool {
    now.title != before.title
}

/// 上一曲：标题变化，或播放位置回退
///
/// 部分播放器在曲目开头附近按"上一曲"会重新播放当前曲目，所以位置回退也算收敛。
/// 这个判据并不能区分"重新播放"与"切到了一首从更靠后位置开始的曲目"。
pub fn previous_track_settled(before: &TrackMetadata, now: &TrackMetadata) -> bool {
    if now.title != before.title {
        return true;
    }
    matches!((before.position, now.position), (Some(old), Some(new)) if new < old)
}

/// 循环模式：状态发生变化
pub fn repeat_settled(before: RepeatState, now: RepeatState) -> bool {
    now != before
}
