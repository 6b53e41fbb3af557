use std::net::IpAddr;
use std::time::Duration;

use log::debug;
use trust_dns_resolver::config::*;
use trust_dns_resolver::system_conf::read_system_conf;
use trust_dns_resolver::TokioAsyncResolver;

/// DNS解析器
///
/// 只做地址解析，失败不影响后续的 HTTP 探测。
#[derive(Clone)]
pub struct DnsResolver {
    resolver: TokioAsyncResolver,
}

impl DnsResolver {
    /// 优先使用系统配置，读取失败时退回默认上游
    pub fn new(timeout: Duration) -> Self {
        let (config, mut opts) = match read_system_conf() {
            Ok(conf) => conf,
            Err(e) => {
                debug!("读取系统DNS配置失败，使用默认配置: {}", e);
                (ResolverConfig::default(), ResolverOpts::default())
            }
        };
        opts.timeout = timeout;
        opts.attempts = 1;

        DnsResolver {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }

    /// 返回第一个解析到的地址（IPv4 或 IPv6）
    pub async fn first_address(&self, domain: &str) -> Option<IpAddr> {
        match self.resolver.lookup_ip(domain).await {
            Ok(response) => response.iter().next(),
            Err(e) => {
                debug!("解析 {} 失败: {}", domain, e);
                None
            }
        }
    }
}
