//! 有界递归目录扫描（snap-open 文件列表）与并行调度
use std::io::Write;
use std::ops::ControlFlow;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace};

use crate::error::Result;
use crate::filter::CompiledFilter;
use crate::fs::FileSystem;
use crate::options::{ScanRequest, ScanStats};
use crate::types::ScanResult;

/// 顺序扫描所有根目录
/// 顺序保证：先按根目录顺序，再按各目录的列举顺序深度优先
pub fn scan<F: FileSystem + ?Sized>(request: &ScanRequest, fs: &F) -> Result<ScanResult> {
    scan_with_stats(request, fs).map(|(result, _)| result)
}

/// 同 `scan`，附带统计信息
pub fn scan_with_stats<F: FileSystem + ?Sized>(request: &ScanRequest, fs: &F) -> Result<(ScanResult, ScanStats)> {
    request.validate()?;
    let filter = request.filter.compile()?;
    let mut walker = Walker::new(fs, &filter, request);
    for root in &request.roots {
        if walker.walk_dir(root, 1).is_break() { break; }
    }
    Ok(walker.finish())
}

/// 以 JSON 对象 `{"files": [...], "truncated": bool}` 写出扫描结果
/// `threads`：None 表示自动（等于 CPU 核数）；Some(1) 走串行
pub fn scan_and_write<F: FileSystem + ?Sized>(
    request: &ScanRequest,
    fs: &F,
    out: &mut dyn Write,
    threads: Option<usize>,
) -> Result<ScanStats> {
    let threads = threads.unwrap_or_else(num_cpus::get);
    let (result, mut stats) = scan_parallel_with_stats(request, fs, threads)?;
    serde_json::to_writer(&mut *out, &result)?;
    stats.files_written = result.files.len();
    debug!(files = result.files.len(), truncated = result.truncated, "scan result written");
    Ok(stats)
}

/// 并行扫描：每个根目录一个任务，结果与 `scan` 完全一致
pub fn scan_parallel<F: FileSystem + ?Sized>(request: &ScanRequest, fs: &F, threads: usize) -> Result<ScanResult> {
    scan_parallel_with_stats(request, fs, threads).map(|(result, _)| result)
}

/// 并行调度：
/// - 根目录之间相互独立，在 Rayon 线程池内各自遍历（各自以 max_results 为上限）
/// - 单线程合并方按根目录下标重排，保证与串行一致的顺序，最后统一截断
/// - 合并方一旦确认截断即置位停止标志，其余 worker 在下一个条目处中止
fn scan_parallel_with_stats<F: FileSystem + ?Sized>(
    request: &ScanRequest,
    fs: &F,
    threads: usize,
) -> Result<(ScanResult, ScanStats)> {
    let stop = AtomicBool::new(false);
    scan_parallel_until(request, fs, threads, &stop)
}

fn scan_parallel_until<F: FileSystem + ?Sized>(
    request: &ScanRequest,
    fs: &F,
    threads: usize,
    stop: &AtomicBool,
) -> Result<(ScanResult, ScanStats)> {
    use crossbeam_channel as channel;
    use rayon::prelude::*;
    use std::collections::BTreeMap;

    if threads <= 1 || request.roots.len() <= 1 {
        return scan_with_stats(request, fs);
    }
    request.validate()?;
    let filter = request.filter.compile()?;
    let pool = match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(p) => p,
        Err(e) => {
            debug!(error = %e, "thread pool unavailable, scanning sequentially");
            return scan_with_stats(request, fs);
        }
    };

    // worker → merger：(根目录下标, 该根的局部结果)
    type Msg = (usize, (ScanResult, ScanStats));
    let (tx, rx) = channel::bounded::<Msg>(request.roots.len());

    let mut files: Vec<PathBuf> = Vec::new();
    let mut truncated = false;
    let mut stats = ScanStats::default();

    std::thread::scope(|s| {
        let filter = &filter;
        s.spawn(move || {
            pool.install(|| {
                request.roots.par_iter().enumerate().for_each_with(tx, |tx, (idx, root)| {
                    // 已截断：排在截断点之后的根目录不再遍历
                    if stop.load(Ordering::Relaxed) { return; }
                    let mut walker = Walker::new(fs, filter, request).with_stop(stop);
                    let flow = walker.walk_dir(root, 1);
                    // 中途被叫停的局部结果不完整，合并方也已不再接收
                    if flow.is_break() && stop.load(Ordering::Relaxed) { return; }
                    let _ = tx.send((idx, walker.finish()));
                });
            });
        });

        let mut next_idx = 0usize;
        let mut buffer: BTreeMap<usize, (ScanResult, ScanStats)> = BTreeMap::new();
        while let Ok((idx, partial)) = rx.recv() {
            buffer.insert(idx, partial);
            // 从 next_idx 开始按序冲刷
            while let Some((part, part_stats)) = buffer.remove(&next_idx) {
                stats.merge(&part_stats);
                truncated |= part.truncated;
                files.extend(part.files);
                next_idx += 1;
                if files.len() > request.max_results { truncated = true; }
                if truncated { break; }
            }
            if truncated {
                stop.store(true, Ordering::Relaxed);
                break;
            }
        }
        drop(rx);
    });

    files.truncate(request.max_results);
    Ok((ScanResult { files, truncated }, stats))
}

/// 单次遍历状态：深度作为参数逐层传递，不共享可变计数器
struct Walker<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
    filter: &'a CompiledFilter,
    max_depth: usize,
    max_results: usize,
    files: Vec<PathBuf>,
    truncated: bool,
    stats: ScanStats,
    /// 并行扫描时由合并方置位的停止标志
    stop: Option<&'a AtomicBool>,
}

impl<'a, F: FileSystem + ?Sized> Walker<'a, F> {
    fn new(fs: &'a F, filter: &'a CompiledFilter, request: &ScanRequest) -> Self {
        Self {
            fs,
            filter,
            max_depth: request.max_depth,
            max_results: request.max_results,
            files: Vec::new(),
            truncated: false,
            stats: ScanStats::default(),
            stop: None,
        }
    }

    fn with_stop(mut self, stop: &'a AtomicBool) -> Self {
        self.stop = Some(stop);
        self
    }

    fn stopped(&self) -> bool {
        self.stop.is_some_and(|s| s.load(Ordering::Relaxed))
    }

    /// 深度优先遍历 `dir`（位于第 `depth` 层）；达到上限时返回 Break
    fn walk_dir(&mut self, dir: &Path, depth: usize) -> ControlFlow<()> {
        let entries = match self.fs.list_directory(dir) {
            Ok(v) => v,
            Err(e) => {
                // 无法列出的目录按空目录处理，扫描继续
                debug!(dir = %dir.display(), error = %e, "directory unreadable, treating as empty");
                self.stats.dirs_unreadable += 1;
                return ControlFlow::Continue(());
            }
        };
        self.stats.dirs_visited += 1;
        trace!(dir = %dir.display(), depth, entries = entries.len(), "listing directory");

        for name in entries {
            if self.stopped() { return ControlFlow::Break(()); }
            if name == "." || name == ".." { continue; }
            let path = strip_cur_dir(&dir.join(&name));
            let stat = match self.fs.stat_path(&path) {
                Ok(st) => st,
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "stat failed, skipping entry");
                    self.stats.entries_skipped += 1;
                    continue;
                }
            };
            let key = path.to_string_lossy();
            if stat.is_dir {
                if depth < self.max_depth && !self.filter.excludes_folder(&key) {
                    self.walk_dir(&path, depth + 1)?;
                }
            } else if !self.filter.excludes_file(&key) {
                // 已满且还有匹配项：说明结果被截断
                if self.files.len() >= self.max_results {
                    self.truncated = true;
                    return ControlFlow::Break(());
                }
                self.files.push(path);
            }
        }
        ControlFlow::Continue(())
    }

    fn finish(self) -> (ScanResult, ScanStats) {
        (ScanResult { files: self.files, truncated: self.truncated }, self.stats)
    }
}

/// 去掉开头的 `./`（或 `.\`），其余保持原样
fn strip_cur_dir(path: &Path) -> PathBuf {
    let mut comps = path.components();
    match comps.next() {
        Some(Component::CurDir) => comps.as_path().to_path_buf(),
        _ => path.to_path_buf(),
    }
}
