//! 扫描请求与统计信息（模块）
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::filter::FilterSpec;

/// 默认最大递归深度（根目录为第 1 层）
pub const DEFAULT_MAX_DEPTH: usize = 4;
/// 默认结果上限
pub const DEFAULT_MAX_RESULTS: usize = 1000;

/// 扫描请求（单次扫描期间不可变）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    /// 根目录列表；结果按此顺序排列
    pub roots: Vec<PathBuf>,
    pub filter: FilterSpec,
    /// 深度 < max_depth 时才继续递归子目录
    pub max_depth: usize,
    /// 结果上限（必须 > 0）
    pub max_results: usize,
}

impl Default for ScanRequest {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            filter: FilterSpec::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl ScanRequest {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self { roots: roots.into_iter().map(Into::into).collect(), ..Self::default() }
    }

    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_results == 0 { return Err(Error::InvalidLimit("max_results must be greater than zero")); }
        Ok(())
    }
}

/// 扫描统计信息（便于 CLI 打印）
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    pub dirs_visited: usize,
    /// 无法列出而按空目录处理的目录数
    pub dirs_unreadable: usize,
    /// 元数据获取失败而跳过的条目数
    pub entries_skipped: usize,
    pub files_written: usize,
}

impl ScanStats {
    pub(crate) fn merge(&mut self, other: &ScanStats) {
        self.dirs_visited += other.dirs_visited;
        self.dirs_unreadable += other.dirs_unreadable;
        self.entries_skipped += other.entries_skipped;
    }
}
