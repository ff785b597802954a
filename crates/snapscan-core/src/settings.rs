//! 配置文件加载（TOML）
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::encoding::{Encoding, DEFAULT_FALLBACK_ENCODINGS};
use crate::filter::{FilterSpec, Pattern};
use crate::options::{ScanRequest, DEFAULT_MAX_DEPTH, DEFAULT_MAX_RESULTS};

/// 默认排除的二进制/归档扩展名
const DEFAULT_FILE_PATTERNS: &[&str] = &[
    r"\.(?:a|bmp|bz2|class|dll|exe|gif|gz|jar|jpeg|jpg|o|pdf|png|so|tar|tgz|tif|tiff|xz|zip)$",
];
/// 默认不递归的版本控制/依赖目录
const DEFAULT_FOLDER_PATTERNS: &[&str] = &[r"\.bzr$", r"\.git$", r"\.hg$", r"\.svn$", r"node_modules$"];

/// `[scan]` 段
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanSettings {
    pub max_depth: usize,
    pub max_results: usize,
    pub file_patterns: Vec<Pattern>,
    pub folder_patterns: Vec<Pattern>,
    /// 线程数：None 表示自动（等于 CPU 核数）
    pub threads: Option<usize>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_results: DEFAULT_MAX_RESULTS,
            file_patterns: DEFAULT_FILE_PATTERNS.iter().copied().map(Pattern::parse).collect(),
            folder_patterns: DEFAULT_FOLDER_PATTERNS.iter().copied().map(Pattern::parse).collect(),
            threads: None,
        }
    }
}

/// `[encoding]` 段
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodingSettings {
    /// 无 BOM 时依次尝试的编码
    pub fallback: Vec<Encoding>,
}

impl Default for EncodingSettings {
    fn default() -> Self {
        Self { fallback: DEFAULT_FALLBACK_ENCODINGS.to_vec() }
    }
}

/// 顶层配置结构（所有字段可省略）
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub scan: ScanSettings,
    pub encoding: EncodingSettings,
}

impl Settings {
    /// 从 TOML 文件加载；未知编码名或非法字段直接报错
    pub fn load(path: &Path) -> Result<Self> {
        let txt = std::fs::read_to_string(path).with_context(|| format!("read settings {}", path.display()))?;
        Self::from_toml(&txt).with_context(|| format!("parse settings {}", path.display()))
    }

    pub fn from_toml(txt: &str) -> Result<Self> {
        Ok(toml::from_str(txt)?)
    }

    /// 用配置组装扫描请求
    pub fn scan_request<I, P>(&self, roots: I) -> ScanRequest
    where
        I: IntoIterator<Item = P>,
        P: Into<std::path::PathBuf>,
    {
        let filter = FilterSpec {
            file_patterns: self.scan.file_patterns.clone(),
            folder_patterns: self.scan.folder_patterns.clone(),
        };
        ScanRequest::new(roots)
            .with_filter(filter)
            .with_max_depth(self.scan.max_depth)
            .with_max_results(self.scan.max_results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let s = Settings::from_toml("").unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.scan.max_results, 1000);
        assert_eq!(s.encoding.fallback, DEFAULT_FALLBACK_ENCODINGS);
        assert!(s.scan.folder_patterns.iter().any(|p| p.text == r"\.git$"));
    }

    #[test]
    fn partial_sections_override_selected_fields() {
        let s = Settings::from_toml(
            r#"
            [scan]
            max_depth = 2
            file_patterns = ['!\.lua$']

            [encoding]
            fallback = ["utf-8", "latin1"]
            "#,
        )
        .unwrap();
        assert_eq!(s.scan.max_depth, 2);
        assert_eq!(s.scan.max_results, DEFAULT_MAX_RESULTS);
        assert_eq!(s.scan.file_patterns, vec![Pattern { text: r"\.lua$".into(), negate: true }]);
        assert_eq!(s.encoding.fallback, vec![Encoding::Utf8, Encoding::Iso8859_1]);

        let req = s.scan_request(["."]);
        assert_eq!(req.max_depth, 2);
        assert!(req.filter.file_patterns[0].negate);
    }

    #[test]
    fn rejects_unknown_encodings_and_fields() {
        assert!(Settings::from_toml("[encoding]\nfallback = [\"EBCDIC\"]").is_err());
        assert!(Settings::from_toml("[scan]\ndepth = 3").is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Settings::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("read settings"));
    }
}
