//! 过滤模式：`!` 取反约定 + 正则匹配
//!
//! 约定：
//! - 普通模式：路径命中即排除；
//! - `!` 前缀模式：路径**未**命中即排除；
//! - 所有模式逐一判定，任意一条给出“排除”即排除（逻辑或），都未触发则保留。
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// 单条过滤模式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Pattern {
    /// 去掉 `!` 之后的正则文本
    pub text: String,
    pub negate: bool,
}

impl Pattern {
    /// 解析字符串：开头的 `!` 表示取反
    pub fn parse(s: &str) -> Self {
        match s.strip_prefix('!') {
            Some(rest) => Self { text: rest.to_string(), negate: true },
            None => Self { text: s.to_string(), negate: false },
        }
    }
}

impl From<String> for Pattern {
    fn from(s: String) -> Self { Self::parse(&s) }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self { Self::parse(s) }
}

impl From<Pattern> for String {
    fn from(p: Pattern) -> Self {
        if p.negate { format!("!{}", p.text) } else { p.text }
    }
}

/// 过滤规格：文件级模式与目录级模式（均有序）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default)]
    pub file_patterns: Vec<Pattern>,
    #[serde(default)]
    pub folder_patterns: Vec<Pattern>,
}

impl FilterSpec {
    /// 由单条模式构建（仅作用于文件）
    pub fn from_pattern(p: impl Into<Pattern>) -> Self {
        Self { file_patterns: vec![p.into()], folder_patterns: Vec::new() }
    }

    /// 由模式列表构建（仅作用于文件）
    pub fn from_patterns<I, P>(patterns: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Pattern>,
    {
        Self { file_patterns: patterns.into_iter().map(Into::into).collect(), folder_patterns: Vec::new() }
    }

    pub fn with_folder_patterns<I, P>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Pattern>,
    {
        self.folder_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// 编译为正则集合；任何一条非法都会在扫描开始前报错
    pub fn compile(&self) -> Result<CompiledFilter> {
        Ok(CompiledFilter {
            files: compile_list(&self.file_patterns)?,
            folders: compile_list(&self.folder_patterns)?,
        })
    }
}

/// 编译后的单条模式
#[derive(Debug, Clone)]
pub(crate) struct CompiledPattern {
    re: Regex,
    negate: bool,
}

/// 编译后的过滤器（可跨线程共享）
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    files: Vec<CompiledPattern>,
    folders: Vec<CompiledPattern>,
}

impl CompiledFilter {
    /// 文件是否被文件级模式排除
    pub fn excludes_file(&self, path: &str) -> bool { exclude(path, &self.files) }

    /// 目录是否被目录级模式排除（排除则不递归）
    pub fn excludes_folder(&self, path: &str) -> bool { exclude(path, &self.folders) }
}

fn compile_list(patterns: &[Pattern]) -> Result<Vec<CompiledPattern>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(&p.text)
                .map(|re| CompiledPattern { re, negate: p.negate })
                .map_err(|source| Error::InvalidPattern { pattern: p.text.clone(), source })
        })
        .collect()
}

/// 排除规则：任意一条模式触发即排除
pub(crate) fn exclude(name: &str, patterns: &[CompiledPattern]) -> bool {
    patterns.iter().any(|p| p.re.is_match(name) != p.negate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_strips_negation_marker() {
        assert_eq!(Pattern::parse(r"!\.lua$"), Pattern { text: r"\.lua$".into(), negate: true });
        assert_eq!(Pattern::parse("src"), Pattern { text: "src".into(), negate: false });
        assert_eq!(String::from(Pattern::parse("!x")), "!x");
    }

    #[test]
    fn positive_pattern_excludes_matches() {
        let f = FilterSpec::from_pattern(r"\.lua$").compile().unwrap();
        assert!(f.excludes_file("a.lua"));
        assert!(!f.excludes_file("b.txt"));
    }

    #[test]
    fn negated_pattern_excludes_non_matches() {
        let f = FilterSpec::from_pattern(r"!\.lua$").compile().unwrap();
        assert!(!f.excludes_file("a.lua"));
        assert!(f.excludes_file("b.txt"));
    }

    #[test]
    fn any_pattern_excluding_wins() {
        // 只保留 .rs 文件，且排除 target 下的内容
        let f = FilterSpec::from_patterns([r"!\.rs$", "target"]).compile().unwrap();
        assert!(!f.excludes_file("src/lib.rs"));
        assert!(f.excludes_file("target/debug/build.rs"));
        assert!(f.excludes_file("README.md"));
    }

    #[test]
    fn no_patterns_or_no_trigger_includes() {
        let f = FilterSpec::default().compile().unwrap();
        assert!(!f.excludes_file("anything"));
        assert!(!f.excludes_folder("anything"));
        let f = FilterSpec::from_patterns([r"\.o$", r"!/"]).compile().unwrap();
        assert!(!f.excludes_file("dir/main.c"));
    }

    #[test]
    fn folder_patterns_are_substring_matches() {
        let f = FilterSpec::default().with_folder_patterns([r"\.hg"]).compile().unwrap();
        assert!(f.excludes_folder("/p/repo/.hg"));
        assert!(f.excludes_folder("/p/.hgstore"));
        assert!(!f.excludes_folder("/p/repo/src"));
        assert!(!f.excludes_file("/p/repo/.hg"));
    }

    #[test]
    fn invalid_regex_is_reported() {
        let err = FilterSpec::from_pattern("(unclosed").compile().unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { ref pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    fn deserializes_from_plain_strings() {
        let spec: FilterSpec = toml::from_str("file_patterns = ['!\\.c$']\nfolder_patterns = ['\\.git$']").unwrap();
        assert!(spec.file_patterns[0].negate);
        assert_eq!(spec.folder_patterns[0].text, r"\.git$");
    }
}
