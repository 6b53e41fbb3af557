//! 线程安全的运行状态
//!
//! 全局取消信号和生命周期阶段都通过 `watch` 通道广播，
//! 每次扫描持有自己的一份，不依赖全局静态变量。

use std::fmt;

use tokio::sync::watch;

/// 生命周期阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// 正在写入初始候选
    Seeding,
    /// worker 正在消费队列
    Running,
    /// 队列已关闭写入，等待 worker 退出
    Draining,
    /// 结果流已关闭，登记表只读
    Closed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Seeding => "SEEDING",
            Phase::Running => "RUNNING",
            Phase::Draining => "DRAINING",
            Phase::Closed => "CLOSED",
        };
        f.write_str(name)
    }
}

/// 触发取消的一端
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

/// 观察取消的一端，可随意克隆
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

/// 创建一对取消句柄
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl CancelSignal {
    /// 永远不会触发的信号
    pub fn never() -> Self {
        let (handle, signal) = cancel_pair();
        // 发送端丢弃后 changed() 立即报错，cancelled() 会转为永久挂起
        drop(handle);
        signal
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// 等待取消；发送端被丢弃且未取消时永久挂起
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn cancel_wakes_waiters() {
        let (handle, signal) = cancel_pair();
        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.cancelled().await })
        };

        assert!(!signal.is_cancelled());
        handle.cancel();
        waiter.await.unwrap();
        assert!(signal.is_cancelled());
        assert!(handle.signal().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn never_signal_stays_pending() {
        let signal = CancelSignal::never();
        let outcome = tokio::time::timeout(Duration::from_secs(60), signal.cancelled()).await;
        assert!(outcome.is_err());
        assert!(!signal.is_cancelled());
    }

    #[test]
    fn phase_names() {
        assert_eq!(Phase::Seeding.to_string(), "SEEDING");
        assert_eq!(Phase::Closed.to_string(), "CLOSED");
    }
}
