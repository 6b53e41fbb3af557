use std::time::Duration;

use async_trait::async_trait;
use log::trace;
use reqwest::Client;
use tokio::time::timeout;

use crate::dns_resolver::DnsResolver;
use crate::error::ScanError;
use crate::model::ProbeResult;

/// 单次 DNS/HTTP/HTTPS 请求的默认超时
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(8);

/// 存活探测
///
/// 每个候选域名恰好产出一个结果，失败体现在结果里而不是返回错误。
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, candidate: &str) -> ProbeResult;
}

/// DNS + HTTP/HTTPS 探测器
#[derive(Clone)]
pub struct HttpProber {
    client: Client,
    resolver: DnsResolver,
    timeout_duration: Duration,
}

impl HttpProber {
    pub fn new(timeout_duration: Duration) -> Result<Self, ScanError> {
        let client = Client::builder()
            .timeout(timeout_duration)
            .danger_accept_invalid_certs(true) // 只关心存活，不校验证书
            .no_proxy()
            .build()?;

        Ok(HttpProber {
            client,
            resolver: DnsResolver::new(timeout_duration),
            timeout_duration,
        })
    }

    /// 单次 GET，拿到任意响应即返回状态码
    async fn fetch_status(&self, url: &str) -> Option<u16> {
        match timeout(self.timeout_duration, self.client.get(url).send()).await {
            Ok(Ok(response)) => Some(response.status().as_u16()),
            Ok(Err(e)) => {
                trace!("{} 请求失败: {}", url, e);
                None
            }
            Err(_) => {
                trace!("{} 请求超时", url);
                None
            }
        }
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, candidate: &str) -> ProbeResult {
        let address = timeout(self.timeout_duration, self.resolver.first_address(candidate))
            .await
            .ok()
            .flatten();

        let status = match self.fetch_status(&format!("http://{}", candidate)).await {
            Some(status) => status,
            None => self
                .fetch_status(&format!("https://{}", candidate))
                .await
                .unwrap_or(0),
        };

        ProbeResult::new(candidate, status, address)
    }
}
