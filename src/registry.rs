use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::model::ProbeResult;

/// 去重登记表
///
/// 每个子域名只记录第一次写入的结果，之后的结果直接丢弃，不做合并。
/// 只由结果处理器这一个任务修改，检查与插入天然是原子的。
#[derive(Debug, Default, Clone)]
pub struct Registry {
    entries: HashMap<String, ProbeResult>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 首次出现时插入并返回 true
    pub fn insert(&mut self, result: ProbeResult) -> bool {
        match self.entries.entry(result.subdomain.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(result);
                true
            }
        }
    }

    pub fn contains(&self, subdomain: &str) -> bool {
        self.entries.contains_key(subdomain)
    }

    pub fn get(&self, subdomain: &str) -> Option<&ProbeResult> {
        self.entries.get(subdomain)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn results(&self) -> impl Iterator<Item = &ProbeResult> {
        self.entries.values()
    }

    pub fn into_results(self) -> Vec<ProbeResult> {
        self.entries.into_values().collect()
    }
}
