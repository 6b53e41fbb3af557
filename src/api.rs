use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::info;
use tokio::time::Instant;

use crate::error::ScanError;
use crate::input::{Opts, OutputFormat};
use crate::lifecycle::{Coordinator, PipelineSettings, DEFAULT_RECURSION_BUDGET};
use crate::probe::{HttpProber, Prober, DEFAULT_PROBE_TIMEOUT};
use crate::queue::DEFAULT_QUEUE_CAPACITY;
use crate::recursion::DEFAULT_MAX_DERIVED;
use crate::report::Report;
use crate::state::CancelSignal;
use crate::wordlist;

/// 速度档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpeedTier {
    /// 1: 深度模式，开启递归
    Deep,
    /// 2: 默认
    #[default]
    Medium,
    /// 3: 按 CPU 核数放大并发
    Fast,
}

#[derive(Debug, Clone, Copy)]
enum WorkerCount {
    Fixed(usize),
    PerCore(usize),
}

struct TierProfile {
    tier: SpeedTier,
    workers: WorkerCount,
    recursive: bool,
    extra_words: &'static [&'static str],
}

static TIER_PROFILES: [TierProfile; 3] = [
    TierProfile {
        tier: SpeedTier::Deep,
        workers: WorkerCount::Fixed(30),
        recursive: true,
        extra_words: &[
            "app", "gateway", "auth", "accounts", "login", "payments", "images", "static", "docs",
            "status", "internal", "ops", "graphql", "socket", "router", "db",
        ],
    },
    TierProfile {
        tier: SpeedTier::Medium,
        workers: WorkerCount::Fixed(80),
        recursive: false,
        extra_words: &["app", "auth", "login", "api", "static", "cdn"],
    },
    TierProfile {
        tier: SpeedTier::Fast,
        workers: WorkerCount::PerCore(40),
        recursive: false,
        extra_words: &[],
    },
];

impl SpeedTier {
    fn profile(&self) -> &'static TierProfile {
        TIER_PROFILES
            .iter()
            .find(|profile| profile.tier == *self)
            .unwrap_or(&TIER_PROFILES[1])
    }

    pub fn level(&self) -> u8 {
        match self {
            SpeedTier::Deep => 1,
            SpeedTier::Medium => 2,
            SpeedTier::Fast => 3,
        }
    }

    pub fn workers(&self) -> usize {
        match self.profile().workers {
            WorkerCount::Fixed(n) => n,
            WorkerCount::PerCore(n) => num_cpus::get() * n,
        }
    }

    pub fn recursive(&self) -> bool {
        self.profile().recursive
    }

    pub fn extra_words(&self) -> &'static [&'static str] {
        self.profile().extra_words
    }
}

impl TryFrom<u8> for SpeedTier {
    type Error = ScanError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(SpeedTier::Deep),
            2 => Ok(SpeedTier::Medium),
            3 => Ok(SpeedTier::Fast),
            other => Err(ScanError::InvalidSpeed(other)),
        }
    }
}

impl fmt::Display for SpeedTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

/// 扫描配置
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// 目标根域名
    pub root_domain: String,
    /// 速度档位，决定并发数、内置字典和是否递归
    pub speed: SpeedTier,
    pub verbose: bool,
    /// 输出只保留 [200, 400) 的结果
    pub live_only: bool,
    /// 字典文件路径
    pub wordlist_file: Option<PathBuf>,
    /// 输出文件路径，为空时写到标准输出
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    /// 单次 DNS/HTTP/HTTPS 请求的超时
    pub probe_timeout: Duration,
    /// 递归模式下队列保持开放的最长时间
    pub recursion_budget: Duration,
    pub queue_capacity: usize,
    /// 派生候选总数上限
    pub max_derived: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            root_domain: String::new(),
            speed: SpeedTier::default(),
            verbose: false,
            live_only: false,
            wordlist_file: None,
            output: None,
            format: OutputFormat::Txt,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            recursion_budget: DEFAULT_RECURSION_BUDGET,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_derived: DEFAULT_MAX_DERIVED,
        }
    }
}

impl ScanConfig {
    pub fn new(root_domain: impl Into<String>, speed: SpeedTier) -> Self {
        ScanConfig {
            root_domain: root_domain.into(),
            speed,
            ..Default::default()
        }
    }

    pub fn workers(&self) -> usize {
        self.speed.workers()
    }

    pub fn recursive(&self) -> bool {
        self.speed.recursive()
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            root_domain: self.root_domain.clone(),
            workers: self.workers(),
            recursive: self.recursive(),
            recursion_budget: self.recursion_budget,
            queue_capacity: self.queue_capacity,
            max_derived: self.max_derived,
        }
    }
}

impl TryFrom<Opts> for ScanConfig {
    type Error = ScanError;

    fn try_from(opts: Opts) -> Result<Self, Self::Error> {
        let root_domain = opts
            .domain
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .ok_or(ScanError::MissingDomain)?;

        Ok(ScanConfig {
            root_domain,
            speed: SpeedTier::try_from(opts.speed)?,
            verbose: opts.verbose,
            live_only: opts.live_only,
            wordlist_file: opts.wordlist,
            output: opts.output,
            format: opts.format,
            ..Default::default()
        })
    }
}

/// 一次扫描的结果
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub report: Report,
    pub elapsed: Duration,
}

/// 扫描引擎
pub struct ScanEngine {
    config: ScanConfig,
    prober: Arc<dyn Prober>,
}

impl ScanEngine {
    /// 使用真实的 DNS + HTTP 探测器
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        let prober = HttpProber::new(config.probe_timeout)?;
        Ok(Self::with_prober(config, Arc::new(prober)))
    }

    pub fn with_prober(config: ScanConfig, prober: Arc<dyn Prober>) -> Self {
        ScanEngine { config, prober }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// 按配置选择字典并生成候选
    pub fn load_candidates(&self) -> Result<Vec<String>, ScanError> {
        let (words, source) =
            wordlist::select_words(self.config.wordlist_file.as_deref(), self.config.speed)?;
        let words = wordlist::uniq_words(words);
        info!("[+] loaded {} words from {}", words.len(), source);
        Ok(wordlist::build_candidates(&words, &self.config.root_domain))
    }

    /// 扫描给定的候选列表
    pub async fn scan(
        &self,
        candidates: Vec<String>,
        cancel: CancelSignal,
    ) -> Result<ScanOutcome, ScanError> {
        let start = Instant::now();
        let settings = self.config.pipeline_settings();
        info!(
            "[+] workers={} deep={} candidates={}",
            settings.workers,
            settings.recursive,
            candidates.len()
        );

        let coordinator = Coordinator::new(settings);
        let registry = coordinator
            .run(candidates, self.prober.clone(), cancel)
            .await?;

        Ok(ScanOutcome {
            report: Report::from_registry(registry),
            elapsed: start.elapsed(),
        })
    }

    /// 加载字典并扫描
    pub async fn run(&self, cancel: CancelSignal) -> Result<ScanOutcome, ScanError> {
        let candidates = self.load_candidates()?;
        self.scan(candidates, cancel).await
    }
}

/// 便捷的扫描函数，使用内置字典和真实探测器
pub async fn scan_subdomains(
    root_domain: &str,
    speed: SpeedTier,
) -> Result<Report, ScanError> {
    let config = ScanConfig::new(root_domain, speed);
    let engine = ScanEngine::new(config)?;
    let words = wordlist::uniq_words(wordlist::default_words(speed));
    let candidates = wordlist::build_candidates(&words, root_domain);
    let outcome = engine.scan(candidates, CancelSignal::never()).await?;
    Ok(outcome.report)
}
