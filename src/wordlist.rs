//! 候选来源
//!
//! 字典优先级：`-w` 文件 > 管道输入 > 按速度档位选择的内置字典。
//! 所有来源都会去掉首尾空白、跳过空行，并按首次出现的顺序去重。

use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal};
use std::path::{Path, PathBuf};

use crate::api::SpeedTier;
use crate::error::ScanError;

/// 内置基础字典，所有档位共用
pub const DEFAULT_WORDS: &[&str] = &[
    "www", "mail", "ftp", "api", "dev", "test", "stage", "admin", "portal", "beta", "shop", "cdn",
    "m", "mobile", "secure", "webmail",
];

/// 字典来自哪里
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordSource {
    File(PathBuf),
    Stdin,
    Builtin(SpeedTier),
}

impl fmt::Display for WordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordSource::File(path) => write!(f, "{}", path.display()),
            WordSource::Stdin => f.write_str("stdin"),
            WordSource::Builtin(tier) => write!(f, "built-in list (t={})", tier.level()),
        }
    }
}

/// 档位对应的内置字典：基础字典加上档位的附加词
pub fn default_words(tier: SpeedTier) -> Vec<String> {
    DEFAULT_WORDS
        .iter()
        .chain(tier.extra_words())
        .map(|word| word.to_string())
        .collect()
}

/// 逐行读取，去掉空白并跳过空行
///
/// 非 UTF-8 字节按替换字符处理，只有真正的 I/O 错误才会返回。
pub fn read_words<R: BufRead>(mut reader: R) -> io::Result<Vec<String>> {
    let mut words = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let word = line.trim();
        if !word.is_empty() {
            words.push(word.to_string());
        }
    }
    Ok(words)
}

/// 从文件加载字典
pub fn load_wordlist_from_file(path: &Path) -> Result<Vec<String>, ScanError> {
    let wrap = |source| ScanError::Wordlist {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(wrap)?;
    read_words(BufReader::new(file)).map_err(wrap)
}

/// 标准输入是管道时读取字典，终端输入返回 None
pub fn load_wordlist_from_stdin() -> Result<Option<Vec<String>>, ScanError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }
    let words = read_words(stdin.lock()).map_err(ScanError::Stdin)?;
    Ok(Some(words))
}

/// 按优先级选择字典来源
pub fn select_words(
    wordlist_file: Option<&Path>,
    tier: SpeedTier,
) -> Result<(Vec<String>, WordSource), ScanError> {
    if let Some(path) = wordlist_file {
        return Ok((load_wordlist_from_file(path)?, WordSource::File(path.to_path_buf())));
    }
    match load_wordlist_from_stdin()? {
        Some(words) if !words.is_empty() => Ok((words, WordSource::Stdin)),
        _ => Ok((default_words(tier), WordSource::Builtin(tier))),
    }
}

/// 去重并保持首次出现的顺序
pub fn uniq_words(words: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    words
        .into_iter()
        .filter(|word| !word.is_empty() && seen.insert(word.clone()))
        .collect()
}

/// 拼接成完整的候选域名 `word.root`
pub fn build_candidates(words: &[String], root_domain: &str) -> Vec<String> {
    words
        .iter()
        .map(|word| format!("{}.{}", word, root_domain))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn reads_trimmed_non_empty_lines() {
        let input = Cursor::new("www\n  api  \n\n\t\nmail\r\n");
        assert_eq!(
            read_words(input).unwrap(),
            vec!["www".to_string(), "api".to_string(), "mail".to_string()]
        );
    }

    #[test]
    fn latin1_line_does_not_abort() {
        let input = Cursor::new(b"www\ncaf\xe9\nmail\n".to_vec());
        let words = read_words(input).unwrap();
        assert_eq!(words.len(), 3);
        assert_eq!(words[0], "www");
        assert_eq!(words[1], "caf\u{FFFD}");
        assert_eq!(words[2], "mail");
    }

    #[test]
    fn uniq_keeps_first_occurrence() {
        let words = vec!["b", "a", "b", "", "c", "a"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(uniq_words(words), vec!["b", "a", "c"]);
    }

    #[test]
    fn tier_dictionaries() {
        assert_eq!(uniq_words(default_words(SpeedTier::Fast)).len(), 16);
        assert_eq!(uniq_words(default_words(SpeedTier::Medium)).len(), 20);
        assert_eq!(uniq_words(default_words(SpeedTier::Deep)).len(), 32);
        assert!(default_words(SpeedTier::Deep).contains(&"graphql".to_string()));
    }

    #[test]
    fn candidates_are_fully_qualified() {
        let words = vec!["www".to_string(), "api".to_string()];
        assert_eq!(
            build_candidates(&words, "example.com"),
            vec!["www.example.com", "api.example.com"]
        );
    }

    #[test]
    fn file_has_priority() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "alpha\nbeta\n\nalpha").unwrap();

        let (words, source) = select_words(Some(file.path()), SpeedTier::Medium).unwrap();
        assert_eq!(words, vec!["alpha", "beta", "alpha"]);
        assert_eq!(source, WordSource::File(file.path().to_path_buf()));
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = load_wordlist_from_file(Path::new("/nonexistent/sublive/words.txt")).unwrap_err();
        assert!(matches!(err, ScanError::Wordlist { .. }));
        assert!(err.to_string().contains("/nonexistent/sublive/words.txt"));
    }
}
