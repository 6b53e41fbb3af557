use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// 扫描启动或收尾阶段的致命错误
///
/// 单个候选域名的探测失败不会出现在这里，它们只体现为 `status == 0`。
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("missing target root domain, usage: sublive -u example.com [-t 1..3] [-v] [-x] [-o file] [-w wordlist_file]")]
    MissingDomain,
    #[error("invalid speed tier {0}, expected 1, 2 or 3")]
    InvalidSpeed(u8),
    #[error("failed to open wordlist '{}': {source}", path.display())]
    Wordlist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read wordlist from stdin: {0}")]
    Stdin(#[source] io::Error),
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("pipeline task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("scan cancelled")]
    Cancelled,
}
