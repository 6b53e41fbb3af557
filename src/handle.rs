use std::sync::Arc;

use log::debug;
use tokio::sync::mpsc;

use crate::model::ProbeResult;
use crate::queue::JobQueue;
use crate::recursion::Expander;
use crate::registry::Registry;

/// 结果处理器
///
/// 唯一消费结果流的任务，独占登记表和递归扩展器。结果流关闭后返回登记表。
pub async fn handle_results(
    mut results: mpsc::Receiver<ProbeResult>,
    queue: Arc<JobQueue>,
    mut expander: Expander,
) -> Registry {
    let mut registry = Registry::new();

    while let Some(result) = results.recv().await {
        // 先登记再派生，派生名与自身相同时不会再次入队
        if !registry.insert(result.clone()) {
            debug!("重复结果已丢弃: {}", result.subdomain);
        }
        let derived = expander.expand(&result, &registry);
        let subdomain = result.subdomain;

        for candidate in derived {
            debug!("[+] 递归派生 {} <- {}", candidate, subdomain);
            queue.push_detached(candidate);
        }
        queue.pending().finish();
    }

    debug!(
        "结果流已关闭，登记 {} 个子域名，派生 {} 个候选",
        registry.len(),
        expander.derived_count()
    );
    registry
}
