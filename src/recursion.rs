use std::collections::HashSet;

use log::debug;

use crate::model::ProbeResult;
use crate::registry::Registry;

/// 派生候选总数上限的默认值
pub const DEFAULT_MAX_DERIVED: usize = 10_000;

/// 按固定规则从响应的子域名派生新候选
///
/// 取最左侧标签 `label`，生成 `{label}-stage.{root}`、`{label}-dev.{root}`、
/// `api.{label}.{root}`。少于三段的名字不派生。
pub fn derive_candidates(subdomain: &str, root_domain: &str) -> Vec<String> {
    let labels: Vec<&str> = subdomain.split('.').collect();
    if labels.len() < 3 {
        return Vec::new();
    }
    let label = labels[0];
    vec![
        format!("{}-stage.{}", label, root_domain),
        format!("{}-dev.{}", label, root_domain),
        format!("api.{}.{}", label, root_domain),
    ]
}

/// 递归扩展器
///
/// 只扩展一层：自己派生出来的候选即使有响应也不会再派生。
#[derive(Debug)]
pub struct Expander {
    root_domain: String,
    enabled: bool,
    max_derived: usize,
    derived: HashSet<String>,
}

impl Expander {
    pub fn new(root_domain: impl Into<String>, enabled: bool, max_derived: usize) -> Self {
        Expander {
            root_domain: root_domain.into(),
            enabled,
            max_derived,
            derived: HashSet::new(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(String::new(), false, 0)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn derived_count(&self) -> usize {
        self.derived.len()
    }

    /// 返回需要入队的派生候选，已在登记表中的跳过
    pub fn expand(&mut self, result: &ProbeResult, registry: &Registry) -> Vec<String> {
        if !self.enabled || !result.is_responsive() || self.derived.contains(&result.subdomain) {
            return Vec::new();
        }

        let mut accepted = Vec::new();
        for candidate in derive_candidates(&result.subdomain, &self.root_domain) {
            if registry.contains(&candidate) || self.derived.contains(&candidate) {
                continue;
            }
            if self.derived.len() >= self.max_derived {
                debug!("派生候选已达上限 {}，停止扩展", self.max_derived);
                break;
            }
            self.derived.insert(candidate.clone());
            accepted.push(candidate);
        }
        accepted
    }
}
