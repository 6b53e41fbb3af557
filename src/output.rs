use std::fs::File;
use std::io::{self, Write};
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use colored::Colorize;
use log::info;
use serde::{Deserialize, Serialize};

use crate::api::{ScanConfig, ScanOutcome};
use crate::error::ScanError;
use crate::input::OutputFormat;
use crate::model::ProbeResult;
use crate::report::{classify, Bucket, Report, SummaryStats};

/// 可序列化的单条结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableResult {
    pub subdomain: String,
    pub status: u16,
    pub address: Option<IpAddr>,
    pub bucket: Bucket,
}

/// 可序列化的汇总统计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableSummary {
    pub live: usize,
    pub redirect: usize,
    pub not_found: usize,
    pub other: usize,
    pub unreachable: usize,
    pub total: usize,
}

/// 完整的导出数据结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportData {
    pub domain: String,
    pub elapsed_ms: u64,
    pub export_time: String,
    pub summary: SerializableSummary,
    pub results: Vec<SerializableResult>,
}

impl From<&ProbeResult> for SerializableResult {
    fn from(result: &ProbeResult) -> Self {
        SerializableResult {
            subdomain: result.subdomain.clone(),
            status: result.status,
            address: result.address,
            bucket: classify(result.status),
        }
    }
}

impl From<SummaryStats> for SerializableSummary {
    fn from(stats: SummaryStats) -> Self {
        SerializableSummary {
            live: stats.live,
            redirect: stats.redirect,
            not_found: stats.not_found,
            other: stats.other,
            unreachable: stats.unreachable,
            total: stats.total(),
        }
    }
}

impl ExportData {
    pub fn new(domain: &str, report: &Report, live_only: bool, elapsed: Duration) -> Self {
        ExportData {
            domain: domain.to_string(),
            elapsed_ms: elapsed.as_millis() as u64,
            export_time: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            summary: report.summary().into(),
            results: report.filtered(live_only).map(SerializableResult::from).collect(),
        }
    }
}

/// 渲染报告正文
pub fn render(
    domain: &str,
    report: &Report,
    live_only: bool,
    format: OutputFormat,
    elapsed: Duration,
) -> Result<String, ScanError> {
    match format {
        OutputFormat::Txt => {
            let mut txt = String::new();
            for line in report.lines(live_only) {
                txt.push_str(&line);
                txt.push('\n');
            }
            Ok(txt)
        }
        OutputFormat::Json => {
            let data = ExportData::new(domain, report, live_only, elapsed);
            let mut json = serde_json::to_string_pretty(&data)?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// 写到文件，没有指定文件时写到标准输出
pub fn write_report(body: &str, output: Option<&Path>) -> Result<(), ScanError> {
    match output {
        Some(path) => {
            let mut file = File::create(path).map_err(ScanError::Output)?;
            file.write_all(body.as_bytes()).map_err(ScanError::Output)?;
            info!("[+] wrote {} lines to {}", body.lines().count(), path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(body.as_bytes()).map_err(ScanError::Output)?;
            handle.flush().map_err(ScanError::Output)?;
        }
    }
    Ok(())
}

/// 汇总文本
pub fn format_summary(domain: &str, level: u8, elapsed: Duration, stats: &SummaryStats) -> String {
    let elapsed = Duration::from_millis(elapsed.as_millis() as u64);
    let mut txt = String::new();
    txt.push_str(&format!(
        "\n{}\n",
        format!("Summary for {} (t={}) in {:?}:", domain, level, elapsed).bold()
    ));
    txt.push_str(&format!("  live (2xx): {}\n", stats.live.to_string().green()));
    txt.push_str(&format!(
        "  redirects (301/302): {}\n",
        stats.redirect.to_string().cyan()
    ));
    txt.push_str(&format!("  404: {}\n", stats.not_found.to_string().yellow()));
    txt.push_str(&format!("  other: {}\n", stats.other.to_string().magenta()));
    txt.push_str(&format!("  unreachable: {}\n", stats.unreachable.to_string().red()));
    txt
}

/// 输出报告和汇总
pub fn emit(config: &ScanConfig, outcome: &ScanOutcome) -> Result<(), ScanError> {
    let body = render(
        &config.root_domain,
        &outcome.report,
        config.live_only,
        config.format,
        outcome.elapsed,
    )?;
    write_report(&body, config.output.as_deref())?;

    let summary = format_summary(
        &config.root_domain,
        config.speed.level(),
        outcome.elapsed,
        &outcome.report.summary(),
    );
    if summary_on_stderr(config.format, config.output.as_deref()) {
        eprint!("{}", summary);
    } else {
        print!("{}", summary);
    }
    Ok(())
}

/// JSON 正文写到标准输出时，汇总改走标准错误，保证标准输出是合法 JSON
pub fn summary_on_stderr(format: OutputFormat, output: Option<&Path>) -> bool {
    format == OutputFormat::Json && output.is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> Report {
        Report::from_results(vec![
            ProbeResult::new("www.example.com", 200, Some("1.2.3.4".parse().unwrap())),
            ProbeResult::unreachable("mail.example.com"),
        ])
    }

    #[test]
    fn txt_body_is_sorted_lines() {
        let body = render("example.com", &sample_report(), false, OutputFormat::Txt, Duration::ZERO)
            .unwrap();
        assert_eq!(body, "mail.example.com 0\nwww.example.com 200\n");

        let live = render("example.com", &sample_report(), true, OutputFormat::Txt, Duration::ZERO)
            .unwrap();
        assert_eq!(live, "www.example.com 200\n");
    }

    #[test]
    fn json_body() {
        let body = render(
            "example.com",
            &sample_report(),
            false,
            OutputFormat::Json,
            Duration::from_millis(1500),
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();

        assert_eq!(value["domain"], "example.com");
        assert_eq!(value["elapsed_ms"], 1500);
        assert_eq!(value["summary"]["live"], 1);
        assert_eq!(value["summary"]["unreachable"], 1);
        assert_eq!(value["summary"]["total"], 2);
        assert_eq!(value["results"][0]["subdomain"], "mail.example.com");
        assert_eq!(value["results"][0]["bucket"], "unreachable");
        assert!(value["results"][0]["address"].is_null());
        assert_eq!(value["results"][1]["address"], "1.2.3.4");
    }

    #[test]
    fn summary_lists_every_bucket() {
        colored::control::set_override(false);
        let summary = format_summary(
            "example.com",
            2,
            Duration::from_millis(1234),
            &sample_report().summary(),
        );
        assert!(summary.contains("Summary for example.com (t=2) in 1.234s:"));
        assert!(summary.contains("  live (2xx): 1\n"));
        assert!(summary.contains("  redirects (301/302): 0\n"));
        assert!(summary.contains("  404: 0\n"));
        assert!(summary.contains("  other: 0\n"));
        assert!(summary.contains("  unreachable: 1\n"));
    }

    #[test]
    fn json_on_stdout_moves_summary_to_stderr() {
        assert!(summary_on_stderr(OutputFormat::Json, None));
        assert!(!summary_on_stderr(OutputFormat::Json, Some(Path::new("out.json"))));
        assert!(!summary_on_stderr(OutputFormat::Txt, None));
    }

    #[test]
    fn writes_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.txt");
        write_report("www.example.com 200\n", Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "www.example.com 200\n");
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let err = write_report("x\n", Some(Path::new("/nonexistent/sublive/out.txt"))).unwrap_err();
        assert!(matches!(err, ScanError::Output(_)));
    }
}
