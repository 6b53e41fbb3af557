use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// 单个候选域名的探测结果
///
/// `status == 0` 表示 HTTP 与 HTTPS 都没有拿到响应。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub subdomain: String,
    pub status: u16,
    pub address: Option<IpAddr>, // 首个解析地址，解析失败为 None
}

impl ProbeResult {
    pub fn new(subdomain: impl Into<String>, status: u16, address: Option<IpAddr>) -> Self {
        ProbeResult {
            subdomain: subdomain.into(),
            status,
            address,
        }
    }

    pub fn unreachable(subdomain: impl Into<String>) -> Self {
        Self::new(subdomain, 0, None)
    }

    pub fn is_responsive(&self) -> bool {
        self.status != 0
    }

    /// 报告行 `"<subdomain> <status>"`
    pub fn line(&self) -> String {
        format!("{} {}", self.subdomain, self.status)
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} {}",
            self.subdomain,
            self.status,
            self.address.map_or(String::new(), |ip| ip.to_string())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_and_display() {
        let result = ProbeResult::new("www.example.com", 200, Some("1.2.3.4".parse().unwrap()));
        assert_eq!(result.line(), "www.example.com 200");
        assert_eq!(result.to_string(), "www.example.com -> 200 1.2.3.4");
        assert!(result.is_responsive());

        let dead = ProbeResult::unreachable("mail.example.com");
        assert_eq!(dead.line(), "mail.example.com 0");
        assert_eq!(dead.to_string(), "mail.example.com -> 0 ");
        assert!(!dead.is_responsive());
    }
}
