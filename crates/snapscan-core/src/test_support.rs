//! 测试用内存文件系统（保持插入顺序，便于验证遍历顺序）
use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::fs::{FileStat, FileSystem};

enum Node {
    Dir(Vec<OsString>),
    File(Vec<u8>),
}

pub(crate) struct MemFileSystem {
    nodes: HashMap<PathBuf, Node>,
    unreadable: HashSet<PathBuf>,
}

impl MemFileSystem {
    pub(crate) fn new() -> Self {
        Self { nodes: HashMap::new(), unreadable: HashSet::new() }
    }

    pub(crate) fn with_file(mut self, path: &str, content: &[u8]) -> Self {
        let path = PathBuf::from(path);
        self.link_parent(&path);
        self.nodes.insert(path, Node::File(content.to_vec()));
        self
    }

    pub(crate) fn with_dir(mut self, path: &str) -> Self {
        let path = PathBuf::from(path);
        self.link_parent(&path);
        self.nodes.entry(path).or_insert_with(|| Node::Dir(Vec::new()));
        self
    }

    /// 目录存在但列目录失败（模拟权限错误）
    pub(crate) fn with_unreadable_dir(self, path: &str) -> Self {
        let mut fs = self.with_dir(path);
        fs.unreadable.insert(PathBuf::from(path));
        fs
    }

    /// 出现在父目录列表中、但元数据获取失败的条目（模拟悬空符号链接）
    pub(crate) fn with_dangling_entry(mut self, path: &str) -> Self {
        self.link_parent(Path::new(path));
        self
    }

    fn link_parent(&mut self, path: &Path) {
        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else { return };
        if parent.as_os_str().is_empty() { return; }
        if !self.nodes.contains_key(parent) {
            self.link_parent(parent);
            self.nodes.insert(parent.to_path_buf(), Node::Dir(Vec::new()));
        }
        if let Some(Node::Dir(children)) = self.nodes.get_mut(parent) {
            if !children.iter().any(|c| c == name) { children.push(name.to_os_string()); }
        }
    }
}

impl FileSystem for MemFileSystem {
    fn read_all_bytes(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        match self.nodes.get(path) {
            Some(Node::File(bytes)) => Ok(bytes.clone()),
            Some(Node::Dir(_)) => Err(Error::new(ErrorKind::Other, "is a directory")),
            None => Err(Error::new(ErrorKind::NotFound, "file not found")),
        }
    }

    fn list_directory(&self, path: &Path) -> std::io::Result<Vec<OsString>> {
        if self.unreadable.contains(path) {
            return Err(Error::new(ErrorKind::PermissionDenied, "permission denied"));
        }
        match self.nodes.get(path) {
            Some(Node::Dir(children)) => Ok(children.clone()),
            Some(Node::File(_)) => Err(Error::new(ErrorKind::Other, "not a directory")),
            None => Err(Error::new(ErrorKind::NotFound, "directory not found")),
        }
    }

    fn stat_path(&self, path: &Path) -> std::io::Result<FileStat> {
        let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        match self.nodes.get(path) {
            Some(Node::Dir(_)) => Ok(FileStat { is_dir: true, modified }),
            Some(Node::File(_)) => Ok(FileStat { is_dir: false, modified }),
            None => Err(Error::new(ErrorKind::NotFound, "not found")),
        }
    }
}
