//! 生命周期协调器
//!
//! `SEEDING → RUNNING → DRAINING → CLOSED`。非递归模式下写完初始候选立即关闭队列；
//! 递归模式下队列保持开放，直到时间预算耗尽或流水线空闲，以先到者为准。

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::{mpsc, watch};

use crate::error::ScanError;
use crate::handle::handle_results;
use crate::probe::Prober;
use crate::queue::{JobQueue, DEFAULT_QUEUE_CAPACITY};
use crate::recursion::{Expander, DEFAULT_MAX_DERIVED};
use crate::registry::Registry;
use crate::state::{CancelSignal, Phase};
use crate::worker::WorkerPool;

/// 递归模式下队列保持开放的默认时长
pub const DEFAULT_RECURSION_BUDGET: Duration = Duration::from_secs(6);

/// 流水线参数
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub root_domain: String,
    pub workers: usize,
    pub recursive: bool,
    pub recursion_budget: Duration,
    pub queue_capacity: usize,
    pub max_derived: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        PipelineSettings {
            root_domain: String::new(),
            workers: 30,
            recursive: false,
            recursion_budget: DEFAULT_RECURSION_BUDGET,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_derived: DEFAULT_MAX_DERIVED,
        }
    }
}

pub struct Coordinator {
    settings: PipelineSettings,
    phase: watch::Sender<Phase>,
}

impl Coordinator {
    pub fn new(settings: PipelineSettings) -> Self {
        let (phase, _) = watch::channel(Phase::Seeding);
        Coordinator { settings, phase }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    fn enter(&self, phase: Phase) {
        debug!("生命周期: {} -> {}", self.phase(), phase);
        self.phase.send_replace(phase);
    }

    /// 跑完整条流水线，返回稳定后的登记表
    ///
    /// 取消信号触发时不保留部分结果，直接返回 `ScanError::Cancelled`。
    pub async fn run(
        &self,
        candidates: Vec<String>,
        prober: Arc<dyn Prober>,
        cancel: CancelSignal,
    ) -> Result<Registry, ScanError> {
        let settings = &self.settings;
        self.enter(Phase::Seeding);

        let queue = Arc::new(JobQueue::new(settings.queue_capacity));
        let (result_tx, result_rx) = mpsc::channel(settings.queue_capacity.max(1));

        let pool = WorkerPool::spawn(
            settings.workers,
            prober,
            queue.clone(),
            result_tx,
            cancel.clone(),
        );
        let expander = Expander::new(
            settings.root_domain.clone(),
            settings.recursive,
            settings.max_derived,
        );
        let handler = tokio::spawn(handle_results(result_rx, queue.clone(), expander));

        let seeder = {
            let queue = queue.clone();
            tokio::spawn(async move {
                let mut seeded = 0usize;
                for candidate in candidates {
                    if !queue.push(candidate).await {
                        break;
                    }
                    seeded += 1;
                }
                seeded
            })
        };

        let closing = self.close_queue_when_done(&queue, seeder);
        let cancelled = tokio::select! {
            biased;
            _ = cancel.cancelled() => true,
            _ = closing => false,
        };

        if cancelled {
            warn!("收到取消信号，终止扫描");
            queue.close();
            pool.join().await;
            queue.shutdown().await;
            handler.abort();
            return Err(ScanError::Cancelled);
        }

        self.enter(Phase::Draining);
        pool.join().await;
        queue.shutdown().await;

        if cancel.is_cancelled() {
            handler.abort();
            return Err(ScanError::Cancelled);
        }

        let registry = handler.await?;
        self.enter(Phase::Closed);
        info!("扫描结束，共登记 {} 个子域名", registry.len());
        Ok(registry)
    }

    /// 决定何时不会再有新任务，并关闭队列写入端
    async fn close_queue_when_done(
        &self,
        queue: &Arc<JobQueue>,
        seeder: tokio::task::JoinHandle<usize>,
    ) {
        let settings = &self.settings;
        if settings.recursive {
            // 时间预算从开始写入初始候选时计算
            let deadline = tokio::time::sleep(settings.recursion_budget);
            tokio::pin!(deadline);

            let seeded = tokio::select! {
                _ = &mut deadline => None,
                seeded = seeder => Some(seeded),
            };
            match seeded {
                None => debug!("写入初始候选期间递归时间预算耗尽，关闭队列"),
                Some(seeded) => {
                    log_seeding(seeded);
                    self.enter(Phase::Running);
                    tokio::select! {
                        _ = &mut deadline => {
                            debug!("递归时间预算 {:?} 耗尽，关闭队列", settings.recursion_budget);
                        }
                        _ = queue.pending().wait_idle() => {
                            debug!("流水线空闲，提前关闭队列");
                        }
                    }
                }
            }
        } else {
            log_seeding(seeder.await);
            self.enter(Phase::Running);
        }
        queue.close();
    }
}

fn log_seeding(seeded: Result<usize, tokio::task::JoinError>) {
    match seeded {
        Ok(seeded) => debug!("初始候选写入完成: {}", seeded),
        Err(e) => warn!("写入初始候选失败: {}", e),
    }
}
