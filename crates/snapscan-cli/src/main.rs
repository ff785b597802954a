use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use snapscan_core::{
    decode, detect, encode, open_text, scan_and_write, Encoding, OpenedText, OsFileSystem, Pattern, Settings,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "snapscan", version, about = "编辑器文件快速打开与编码探测工具")]
struct Cli {
    /// 配置文件（TOML）；省略时使用内置默认值
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 递归列出根目录下的文件（快速打开列表），输出 JSON
    Scan {
        /// 根目录（可多个，结果按此顺序排列）
        #[arg(default_value = ".")]
        roots: Vec<PathBuf>,

        /// 文件过滤模式（正则；`!` 前缀表示只保留匹配项），可重复；指定后替换配置中的列表
        #[arg(long = "filter")]
        filters: Vec<String>,

        /// 目录过滤模式，可重复；指定后替换配置中的列表
        #[arg(long = "folder-filter")]
        folder_filters: Vec<String>,

        /// 最大递归深度（根目录为第 1 层）
        #[arg(long)]
        max_depth: Option<usize>,

        /// 结果上限
        #[arg(long)]
        max_results: Option<usize>,

        /// 线程数（多个根目录时并行；"auto"=CPU 核心数）
        #[arg(long)]
        threads: Option<String>,

        /// 输出文件；省略则写到标准输出
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// 探测文件编码，每个文件输出一行 JSON
    Detect {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// 转换文件编码
    Convert {
        input: PathBuf,

        /// 目标编码，例如 UTF-8、UTF-16LE、MacRoman
        #[arg(long)]
        to: Encoding,

        /// 源编码；省略时自动探测
        #[arg(long)]
        from: Option<Encoding>,

        /// 目标编码支持时写入 BOM
        #[arg(long)]
        bom: bool,

        /// 输出文件；省略则写到标准输出
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    match cli.command {
        Commands::Scan { roots, filters, folder_filters, max_depth, max_results, threads, output } => {
            let mut settings = settings;
            if !filters.is_empty() { settings.scan.file_patterns = filters.iter().map(|s| Pattern::parse(s)).collect(); }
            if !folder_filters.is_empty() { settings.scan.folder_patterns = folder_filters.iter().map(|s| Pattern::parse(s)).collect(); }
            if let Some(d) = max_depth { settings.scan.max_depth = d; }
            if let Some(m) = max_results { settings.scan.max_results = m; }
            // 解析线程参数："auto" 表示自动（等于 CPU 核数）；其他为具体数值
            let threads = match threads {
                Some(t) => parse_threads(&t),
                None => settings.scan.threads,
            };

            info!(?roots, max_depth = settings.scan.max_depth, max_results = settings.scan.max_results, "starting scan");
            let request = settings.scan_request(roots);
            let mut out = open_output(output.as_deref())?;
            let stats = scan_and_write(&request, &OsFileSystem, &mut out, threads).context("scan and write failed")?;
            writeln!(out)?;
            out.flush()?;

            if stats.dirs_unreadable > 0 {
                warn!(dirs_unreadable = stats.dirs_unreadable, "some directories could not be listed");
            }
            info!(files_written = stats.files_written, dirs_visited = stats.dirs_visited, "scan finished");
        }

        Commands::Detect { files } => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for path in files {
                let line = describe_file(&path, &settings.encoding.fallback)?;
                serde_json::to_writer(&mut out, &line)?;
                writeln!(out)?;
            }
        }

        Commands::Convert { input, to, from, bom, output } => {
            let text = match from {
                Some(enc) => {
                    let bytes = std::fs::read(&input).with_context(|| format!("read {}", input.display()))?;
                    // 显式指定源编码时仍剥离与之匹配的 BOM
                    let body = match enc.bom() {
                        Some(b) if bytes.starts_with(b) => &bytes[b.len()..],
                        _ => &bytes[..],
                    };
                    decode(body, enc)?
                }
                None => match open_text(&OsFileSystem, &input, &settings.encoding.fallback)? {
                    OpenedText::Text { text, .. } => text,
                    OpenedText::Binary(_) => bail!("{} looks like a binary file; pass --from to force", input.display()),
                },
            };
            let bytes = encode(&text, to, bom)?;
            let mut out = open_output(output.as_deref())?;
            out.write_all(&bytes)?;
            out.flush()?;
            info!(input = %input.display(), %to, bytes = bytes.len(), "converted");
        }
    }

    Ok(())
}

/// 单文件探测结果（输出用）
fn describe_file(path: &Path, fallback: &[Encoding]) -> Result<serde_json::Value> {
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let detected = detect(&bytes);
    // 无 BOM 时按回退列表补全编码；全部失败则记为 null
    let encoding = match detected.encoding() {
        Some(enc) => Some(enc),
        None if detected.is_binary() => None,
        None => match snapscan_core::decode_with_fallback(&bytes, fallback) {
            Ok((enc, _)) => Some(enc),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "no fallback encoding matched");
                None
            }
        },
    };
    Ok(serde_json::json!({
        "path": path.display().to_string(),
        "encoding": encoding,
        "bom": detected.bom().map(|b| b.iter().map(|x| format!("{x:02X}")).collect::<Vec<_>>().join(" ")),
        "binary": detected.is_binary(),
    }))
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        // 以缓冲方式打开输出文件
        Some(p) => Box::new(BufWriter::new(File::create(p).context("create output file")?)),
        None => Box::new(BufWriter::new(io::stdout())),
    })
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 支持通过环境变量 RUST_LOG 控制日志等级，如：RUST_LOG=debug
    // 日志写到 stderr，避免与 JSON 输出混在一起
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(env_filter).with_writer(io::stderr).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 解析线程参数
fn parse_threads(s: &str) -> Option<usize> {
    if s.eq_ignore_ascii_case("auto") { return None; }
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threads_argument() {
        assert_eq!(parse_threads("auto"), None);
        assert_eq!(parse_threads("AUTO"), None);
        assert_eq!(parse_threads("4"), Some(4));
        assert_eq!(parse_threads("0"), None);
        assert_eq!(parse_threads("x"), None);
    }

    #[test]
    fn cli_parses_scan_flags() {
        let cli = Cli::parse_from([
            "snapscan", "scan", "a", "b", "--filter", r"!\.rs$", "--folder-filter", "target", "--max-depth", "2",
        ]);
        match cli.command {
            Commands::Scan { roots, filters, folder_filters, max_depth, .. } => {
                assert_eq!(roots, vec![PathBuf::from("a"), PathBuf::from("b")]);
                assert_eq!(filters, vec![r"!\.rs$".to_string()]);
                assert_eq!(folder_filters, vec!["target".to_string()]);
                assert_eq!(max_depth, Some(2));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn cli_parses_encoding_names() {
        let cli = Cli::parse_from(["snapscan", "convert", "in.txt", "--to", "utf-16le", "--from", "latin1", "--bom"]);
        match cli.command {
            Commands::Convert { to, from, bom, .. } => {
                assert_eq!(to, Encoding::Utf16Le);
                assert_eq!(from, Some(Encoding::Iso8859_1));
                assert!(bom);
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(Cli::try_parse_from(["snapscan", "convert", "in.txt", "--to", "EBCDIC"]).is_err());
    }

    #[test]
    fn describe_reports_fallback_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        std::fs::write(&path, b"caf\xE9").unwrap();
        let v = describe_file(&path, snapscan_core::DEFAULT_FALLBACK_ENCODINGS).unwrap();
        assert_eq!(v["encoding"], "ISO-8859-1");
        assert_eq!(v["binary"], false);
        assert!(v["bom"].is_null());
    }
}
