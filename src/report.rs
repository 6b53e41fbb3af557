use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::model::ProbeResult;
use crate::registry::Registry;

/// 按状态码划分的分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Bucket {
    Live,
    Redirect,
    NotFound,
    Other,
    Unreachable,
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Bucket::Live => "live",
            Bucket::Redirect => "redirect",
            Bucket::NotFound => "not-found",
            Bucket::Other => "other",
            Bucket::Unreachable => "unreachable",
        };
        f.write_str(name)
    }
}

/// 每个状态码恰好落入一个分类
pub fn classify(status: u16) -> Bucket {
    match status {
        0 => Bucket::Unreachable,
        404 => Bucket::NotFound,
        301 | 302 => Bucket::Redirect,
        200..=399 => Bucket::Live,
        _ => Bucket::Other,
    }
}

/// 存活过滤使用的区间 [200, 400)，包含 301/302
pub fn is_live_status(status: u16) -> bool {
    (200..400).contains(&status)
}

/// 汇总统计信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub live: usize,
    pub redirect: usize,
    pub not_found: usize,
    pub other: usize,
    pub unreachable: usize,
}

impl SummaryStats {
    pub fn record(&mut self, bucket: Bucket) {
        match bucket {
            Bucket::Live => self.live += 1,
            Bucket::Redirect => self.redirect += 1,
            Bucket::NotFound => self.not_found += 1,
            Bucket::Other => self.other += 1,
            Bucket::Unreachable => self.unreachable += 1,
        }
    }

    pub fn get(&self, bucket: Bucket) -> usize {
        match bucket {
            Bucket::Live => self.live,
            Bucket::Redirect => self.redirect,
            Bucket::NotFound => self.not_found,
            Bucket::Other => self.other,
            Bucket::Unreachable => self.unreachable,
        }
    }

    pub fn total(&self) -> usize {
        self.live + self.redirect + self.not_found + self.other + self.unreachable
    }
}

/// 已分类、已排序的扫描报告
#[derive(Debug, Clone, Default)]
pub struct Report {
    entries: Vec<ProbeResult>,
    summary: SummaryStats,
}

impl Report {
    /// 从稳定后的登记表生成报告，按 `"subdomain status"` 行做字典序排序
    pub fn from_registry(registry: Registry) -> Self {
        Self::from_results(registry.into_results())
    }

    pub fn from_results(results: impl IntoIterator<Item = ProbeResult>) -> Self {
        let entries: Vec<ProbeResult> = results.into_iter().sorted_by_key(|r| r.line()).collect();
        let mut summary = SummaryStats::default();
        for entry in &entries {
            summary.record(classify(entry.status));
        }
        Report { entries, summary }
    }

    pub fn entries(&self) -> &[ProbeResult] {
        &self.entries
    }

    pub fn summary(&self) -> SummaryStats {
        self.summary
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 报告中保留的条目，`live_only` 时只保留 [200, 400)
    pub fn filtered(&self, live_only: bool) -> impl Iterator<Item = &ProbeResult> {
        self.entries
            .iter()
            .filter(move |entry| !live_only || is_live_status(entry.status))
    }

    pub fn lines(&self, live_only: bool) -> Vec<String> {
        self.filtered(live_only).map(ProbeResult::line).collect()
    }
}
