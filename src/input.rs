use std::path::PathBuf;

use clap::Parser;

/// 输出格式枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// 每行 `subdomain status`
    #[default]
    Txt,
    /// 结果与汇总一起导出为 JSON
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "txt" => Ok(OutputFormat::Txt),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("unsupported output format: {}, expected txt or json", s)),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "sublive")]
#[command(version)]
#[command(about = "fast CLI subdomain liveness scanner", long_about = None)]
pub struct Opts {
    /// target root domain (e.g. example.com)
    #[arg(short = 'u', long)]
    pub domain: Option<String>,

    /// recursion / speed: 1=deep+slow, 2=medium, 3=fast
    #[arg(short = 't', long = "speed", default_value_t = 2)]
    pub speed: u8,

    /// verbose - show progress and statuses
    #[arg(short, long)]
    pub verbose: bool,

    /// output only live subdomains (status 200-399)
    #[arg(short = 'x', long)]
    pub live_only: bool,

    /// output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// path to a wordlist file, used instead of stdin/defaults
    #[arg(short, long)]
    pub wordlist: Option<PathBuf>,

    /// output format (txt, json)
    #[arg(long, default_value = "txt")]
    pub format: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_flags() {
        let opts = Opts::parse_from([
            "sublive", "-u", "example.com", "-t", "3", "-v", "-x", "-o", "out.txt", "-w", "words.txt",
        ]);
        assert_eq!(opts.domain.as_deref(), Some("example.com"));
        assert_eq!(opts.speed, 3);
        assert!(opts.verbose);
        assert!(opts.live_only);
        assert_eq!(opts.output, Some(PathBuf::from("out.txt")));
        assert_eq!(opts.wordlist, Some(PathBuf::from("words.txt")));
        assert_eq!(opts.format, OutputFormat::Txt);
    }

    #[test]
    fn defaults() {
        let opts = Opts::parse_from(["sublive"]);
        assert!(opts.domain.is_none());
        assert_eq!(opts.speed, 2);
        assert!(!opts.verbose && !opts.live_only);
    }

    #[test]
    fn output_format() {
        let opts = Opts::parse_from(["sublive", "-u", "example.com", "--format", "JSON"]);
        assert_eq!(opts.format, OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
