//! 错误类型（对外暴露）
use std::path::PathBuf;

use crate::encoding::Encoding;

/// 核心库统一错误
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 回退编码列表中没有任何一个能成功解码
    #[error("encoding conversion failed (tried: {tried})")]
    EncodingConversionFailed { tried: String },

    /// 按指定编码解码失败；offset 为首个非法字节的位置
    #[error("invalid {encoding} data at byte {offset}")]
    Decode { encoding: Encoding, offset: usize },

    /// 目标编码无法表示该字符
    #[error("character {ch:?} cannot be represented in {encoding}")]
    Unrepresentable { encoding: Encoding, ch: char },

    #[error("unknown encoding: {0}")]
    UnknownEncoding(String),

    /// 过滤模式编译失败（在任何 I/O 之前报告）
    #[error("invalid filter pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid scan limit: {0}")]
    InvalidLimit(&'static str),

    /// 结果序列化/写出失败
    #[error("failed to write output: {0}")]
    Output(#[from] serde_json::Error),

    /// 单文件读写/元数据错误（对该操作是致命的）
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
