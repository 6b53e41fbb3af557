//! 可关闭的有界任务队列
//!
//! 多个 worker 共享一个接收端，写入端可以被生命周期协调器在任意时刻关闭。
//! 关闭之后的写入被静默丢弃，已经入队的任务仍会被消费完。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use log::trace;
use tokio::sync::{mpsc, Mutex, Notify};

/// 任务队列与结果流的默认容量
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

/// 尚未处理完的候选数量
///
/// 入队时加一，结果被处理器消费后减一，归零即流水线空闲。
#[derive(Debug, Default)]
pub struct Pending {
    count: AtomicUsize,
    idle: Notify,
}

impl Pending {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    pub fn finish(&self) {
        let previous = self
            .count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .unwrap_or(0);
        if previous <= 1 {
            self.idle.notify_waiters();
        }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// 等待计数归零
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            if self.count() == 0 {
                return;
            }
            notified.await;
        }
    }
}

pub struct JobQueue {
    sender: RwLock<Option<mpsc::Sender<String>>>,
    receiver: Mutex<mpsc::Receiver<String>>,
    pending: Pending,
}

impl JobQueue {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        JobQueue {
            sender: RwLock::new(Some(tx)),
            receiver: Mutex::new(rx),
            pending: Pending::new(),
        }
    }

    pub fn pending(&self) -> &Pending {
        &self.pending
    }

    pub fn is_closed(&self) -> bool {
        self.sender.read().map(|tx| tx.is_none()).unwrap_or(true)
    }

    fn current_sender(&self) -> Option<mpsc::Sender<String>> {
        self.sender.read().ok().and_then(|tx| tx.clone())
    }

    /// 入队，队列满时阻塞；返回 false 表示队列已关闭、候选被丢弃
    pub async fn push(&self, candidate: String) -> bool {
        self.pending.begin();
        self.send_reserved(candidate).await
    }

    /// 同步占位后在后台入队
    ///
    /// 结果处理器用它回灌派生候选，避免与 worker 互相等待对方的通道。
    pub fn push_detached(self: &Arc<Self>, candidate: String) {
        self.pending.begin();
        let queue = Arc::clone(self);
        tokio::spawn(async move {
            queue.send_reserved(candidate).await;
        });
    }

    async fn send_reserved(&self, candidate: String) -> bool {
        let Some(tx) = self.current_sender() else {
            return self.discard(candidate);
        };
        let Ok(permit) = tx.reserve().await else {
            return self.discard(candidate);
        };
        // 在读锁内确认未关闭再投递，close() 返回后不会再有写入落地
        let sender = match self.sender.read() {
            Ok(sender) => sender,
            Err(_) => return self.discard(candidate),
        };
        if sender.is_none() {
            drop(permit);
            return self.discard(candidate);
        }
        permit.send(candidate);
        true
    }

    fn discard(&self, candidate: String) -> bool {
        trace!("队列已关闭，丢弃 {}", candidate);
        self.pending.finish();
        false
    }

    /// 取下一个任务；队列关闭且取空后返回 None
    pub async fn next(&self) -> Option<String> {
        self.receiver.lock().await.recv().await
    }

    /// 关闭写入端，之后的 push 全部丢弃
    pub fn close(&self) {
        if let Ok(mut tx) = self.sender.write() {
            tx.take();
        }
    }

    /// worker 全部退出后调用，唤醒仍阻塞在满队列上的写入者
    pub async fn shutdown(&self) {
        self.close();
        let mut rx = self.receiver.lock().await;
        rx.close();
        while let Ok(candidate) = rx.try_recv() {
            trace!("丢弃未消费的 {}", candidate);
            self.pending.finish();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn drains_after_close() {
        let queue = JobQueue::new(8);
        assert!(queue.push("a.example.com".to_string()).await);
        assert!(queue.push("b.example.com".to_string()).await);
        queue.close();

        assert!(queue.is_closed());
        assert_eq!(queue.next().await.as_deref(), Some("a.example.com"));
        assert_eq!(queue.next().await.as_deref(), Some("b.example.com"));
        assert_eq!(queue.next().await, None);
    }

    #[tokio::test]
    async fn push_after_close_is_dropped() {
        let queue = JobQueue::new(8);
        queue.close();

        assert!(!queue.push("late.example.com".to_string()).await);
        assert_eq!(queue.pending().count(), 0);
        assert_eq!(queue.next().await, None);
    }

    #[tokio::test]
    async fn detached_push_after_close_is_dropped() {
        let queue = Arc::new(JobQueue::new(8));
        queue.close();
        queue.push_detached("late.example.com".to_string());

        queue.pending().wait_idle().await;
        assert_eq!(queue.next().await, None);
    }

    #[tokio::test]
    async fn detached_push_waiting_for_space_is_dropped_after_close() {
        let queue = Arc::new(JobQueue::new(1));
        assert!(queue.push("first.example.com".to_string()).await);

        // 后台写入拿到发送端后阻塞在满队列上
        queue.push_detached("late.example.com".to_string());
        tokio::task::yield_now().await;
        queue.close();

        assert_eq!(queue.next().await.as_deref(), Some("first.example.com"));
        assert_eq!(queue.next().await, None);
        assert_eq!(queue.pending().count(), 1);
    }

    #[tokio::test]
    async fn pending_reaches_idle() {
        let pending = Arc::new(Pending::new());
        pending.begin();
        pending.begin();

        let waiter = {
            let pending = pending.clone();
            tokio::spawn(async move { pending.wait_idle().await })
        };

        pending.finish();
        assert!(!waiter.is_finished());
        pending.finish();
        waiter.await.unwrap();
        assert_eq!(pending.count(), 0);
    }

    #[tokio::test]
    async fn shutdown_releases_blocked_writer() {
        let queue = Arc::new(JobQueue::new(1));
        assert!(queue.push("first.example.com".to_string()).await);

        let blocked = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.push("second.example.com".to_string()).await })
        };
        tokio::task::yield_now().await;

        queue.shutdown().await;
        assert!(!blocked.await.unwrap());
        assert_eq!(queue.pending().count(), 0);
    }
}
