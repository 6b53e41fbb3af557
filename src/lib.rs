//! # sublive
//!
//! 子域名存活扫描库：对候选子域名做 DNS 解析和 HTTP/HTTPS 探测，记录状态码与解析地址。
//!
//! ## 特性
//!
//! - 🚀 **固定并发**: 按速度档位启动固定数量的 worker，共享一个有界任务队列
//! - 🔁 **递归扩展**: 深度模式下从有响应的子域名派生新的候选，在时间预算内回灌队列
//! - 🧮 **去重登记**: 每个子域名只记录第一次的结果
//! - 📊 **分类汇总**: live / redirect / 404 / other / unreachable
//!
//! ## 快速开始
//!
//! ```rust,no_run
//! use sublive::{scan_subdomains, SpeedTier};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = scan_subdomains("example.com", SpeedTier::Medium).await?;
//!
//!     for line in report.lines(true) {
//!         println!("{}", line);
//!     }
//!     println!("live: {}", report.summary().live);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## 自定义探测器
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sublive::{CancelSignal, ProbeResult, Prober, ScanConfig, ScanEngine, SpeedTier};
//!
//! struct Offline;
//!
//! #[async_trait::async_trait]
//! impl Prober for Offline {
//!     async fn probe(&self, candidate: &str) -> ProbeResult {
//!         ProbeResult::unreachable(candidate)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScanConfig::new("example.com", SpeedTier::Fast);
//!     let engine = ScanEngine::with_prober(config, Arc::new(Offline));
//!     let outcome = engine
//!         .scan(vec!["www.example.com".to_string()], CancelSignal::never())
//!         .await?;
//!     assert_eq!(outcome.report.summary().unreachable, 1);
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub mod dns_resolver;
pub mod error;
pub mod handle;
pub mod input;
pub mod lifecycle;
pub mod logger;
pub mod model;
pub mod output;
pub mod probe;
pub mod queue;
pub mod recursion;
pub mod registry;
pub mod report;
pub mod state;
pub mod wordlist;
pub mod worker;

// 重新导出主要的公共API
pub use api::{scan_subdomains, ScanConfig, ScanEngine, ScanOutcome, SpeedTier};
pub use error::ScanError;
pub use input::{Opts, OutputFormat};
pub use lifecycle::{Coordinator, PipelineSettings};
pub use model::ProbeResult;
pub use probe::{HttpProber, Prober};
pub use registry::Registry;
pub use report::{classify, Bucket, Report, SummaryStats};
pub use state::{cancel_pair, CancelHandle, CancelSignal, Phase};
