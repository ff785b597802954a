//! 文件系统抽象（宿主提供的读取/列目录/元数据能力）
use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::time::SystemTime;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// 路径元数据（只保留扫描与“外部修改”检查需要的字段）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub is_dir: bool,
    pub modified: SystemTime,
}

/// 宿主文件系统能力
/// 需要 `Sync` 以便并行扫描时在线程间共享
pub trait FileSystem: Sync {
    fn read_all_bytes(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// 列出目录项名称（不含 `.` 与 `..`），保持文件系统返回的顺序
    fn list_directory(&self, path: &Path) -> io::Result<Vec<OsString>>;

    fn stat_path(&self, path: &Path) -> io::Result<FileStat>;
}

/// 基于 std::fs / walkdir 的真实文件系统
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read_all_bytes(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn list_directory(&self, path: &Path) -> io::Result<Vec<OsString>> {
        let mut names = Vec::new();
        // 单层遍历，不排序，保持目录原始顺序
        for entry in WalkDir::new(path).min_depth(1).max_depth(1) {
            match entry {
                Ok(e) => names.push(e.file_name().to_os_string()),
                // 目录本身无法读取：整体失败，由调用方决定如何降级
                Err(err) if err.depth() == 0 => return Err(io::Error::from(err)),
                Err(err) => tracing::debug!(dir = %path.display(), error = %err, "skipping unreadable entry"),
            }
        }
        Ok(names)
    }

    fn stat_path(&self, path: &Path) -> io::Result<FileStat> {
        let md = std::fs::metadata(path)?;
        Ok(FileStat { is_dir: md.is_dir(), modified: md.modified()? })
    }
}

/// 文件自 `known` 之后是否在磁盘上被修改过（用于提示“文件已被外部修改”）
pub fn modified_since<F: FileSystem + ?Sized>(fs: &F, path: &Path, known: SystemTime) -> Result<bool> {
    let stat = fs.stat_path(path).map_err(|e| Error::io(path, e))?;
    Ok(stat.modified > known)
}
