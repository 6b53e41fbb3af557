use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::model::ProbeResult;
use crate::probe::Prober;
use crate::queue::JobQueue;
use crate::state::CancelSignal;

/// 固定大小的 worker 池
///
/// 每个 worker 循环：取一个候选、探测、发布一个结果。
/// 队列关闭且取空，或者收到取消信号时退出。结果顺序不做保证。
pub struct WorkerPool {
    workers: JoinSet<()>,
    size: usize,
}

impl WorkerPool {
    /// 启动 `size` 个 worker，`results` 的原始发送端在此处被消耗
    pub fn spawn(
        size: usize,
        prober: Arc<dyn Prober>,
        queue: Arc<JobQueue>,
        results: mpsc::Sender<ProbeResult>,
        cancel: CancelSignal,
    ) -> Self {
        let size = size.max(1);
        let mut workers = JoinSet::new();
        for id in 0..size {
            workers.spawn(run_worker(
                id,
                prober.clone(),
                queue.clone(),
                results.clone(),
                cancel.clone(),
            ));
        }
        WorkerPool { workers, size }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// 等待所有 worker 返回
    pub async fn join(mut self) {
        while let Some(outcome) = self.workers.join_next().await {
            if let Err(e) = outcome {
                warn!("worker 异常退出: {}", e);
            }
        }
    }
}

async fn run_worker(
    id: usize,
    prober: Arc<dyn Prober>,
    queue: Arc<JobQueue>,
    results: mpsc::Sender<ProbeResult>,
    cancel: CancelSignal,
) {
    loop {
        let candidate = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = queue.next() => match next {
                Some(candidate) => candidate,
                None => break,
            },
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = prober.probe(&candidate) => result,
        };

        debug!("[+] checked {}", result);

        if results.send(result).await.is_err() {
            break;
        }
    }
    debug!("worker {} 退出", id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::cancel_pair;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingProber {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Prober for CountingProber {
        async fn probe(&self, candidate: &str) -> ProbeResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ProbeResult::new(candidate, 200, None)
        }
    }

    struct SlowProber;

    #[async_trait]
    impl Prober for SlowProber {
        async fn probe(&self, candidate: &str) -> ProbeResult {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            ProbeResult::unreachable(candidate)
        }
    }

    #[tokio::test]
    async fn one_result_per_candidate() {
        let queue = Arc::new(JobQueue::new(64));
        for i in 0..20 {
            queue.push(format!("host{}.example.com", i)).await;
        }
        queue.close();

        let prober = Arc::new(CountingProber {
            calls: AtomicUsize::new(0),
        });
        let (tx, mut rx) = mpsc::channel(64);
        let pool = WorkerPool::spawn(4, prober.clone(), queue, tx, CancelSignal::never());
        assert_eq!(pool.size(), 4);
        pool.join().await;

        let mut seen = Vec::new();
        while let Some(result) = rx.recv().await {
            seen.push(result.subdomain);
        }
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 20);
        assert_eq!(prober.calls.load(Ordering::SeqCst), 20);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_probes() {
        let queue = Arc::new(JobQueue::new(8));
        queue.push("slow.example.com".to_string()).await;

        let (handle, signal) = cancel_pair();
        let (tx, mut rx) = mpsc::channel(8);
        let pool = WorkerPool::spawn(2, Arc::new(SlowProber), queue, tx, signal);

        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.cancel();
        pool.join().await;

        assert!(rx.recv().await.is_none());
    }
}
