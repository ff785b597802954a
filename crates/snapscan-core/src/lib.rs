//! 编辑器文件打开/快速打开（snap-open）的核心库
//!
//! 设计要点：
//! - 编码探测只看字节：BOM 嗅探 → NUL 字节判定二进制 → 其余交给回退编码列表。
//! - 目录扫描为有界深度优先遍历：深度、结果数两道上限；无法列出的目录按空目录处理。
//! - 结果顺序稳定：根目录顺序优先，其次为目录列举顺序；并行扫描按根目录下标重排后输出。
//! - 文件系统经 `FileSystem` trait 注入，便于替换为宿主实现或测试用内存实现。

mod codec;
mod detect;
mod encoding;
mod error;
mod filter;
mod fs;
mod open;
mod options;
mod scan;
mod settings;
mod types;

#[cfg(test)]
mod test_support;

pub use codec::{decode, decode_with_fallback, encode, transcode};
pub use detect::{detect, BINARY_SNIFF_LEN};
pub use encoding::{Encoding, DEFAULT_FALLBACK_ENCODINGS};
pub use error::{Error, Result};
pub use filter::{CompiledFilter, FilterSpec, Pattern};
pub use fs::{modified_since, FileStat, FileSystem, OsFileSystem};
pub use open::{encode_for_save, open_text};
pub use options::{ScanRequest, ScanStats, DEFAULT_MAX_DEPTH, DEFAULT_MAX_RESULTS};
pub use scan::{scan, scan_and_write, scan_parallel, scan_with_stats};
pub use settings::{EncodingSettings, ScanSettings, Settings};
pub use types::{EncodingResult, OpenedText, ScanResult};
