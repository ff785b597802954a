//! 打开与保存文件：探测编码 → 剥离 BOM → 解码（或走回退列表）
use std::path::Path;

use tracing::debug;

use crate::codec::{decode, decode_with_fallback, encode};
use crate::detect::detect;
use crate::encoding::Encoding;
use crate::error::{Error, Result};
use crate::fs::FileSystem;
use crate::types::OpenedText;

/// 读取并解码文件
/// - 读取失败对本次打开是致命的，直接返回 `Error::Io`
/// - 二进制文件原样返回字节
/// - 有 BOM 时按 BOM 对应编码解码；否则依次尝试 `fallback`
pub fn open_text<F: FileSystem + ?Sized>(fs: &F, path: &Path, fallback: &[Encoding]) -> Result<OpenedText> {
    let bytes = fs.read_all_bytes(path).map_err(|e| Error::io(path, e))?;
    let detected = detect(&bytes);
    if detected.is_binary() {
        debug!(path = %path.display(), "binary file, skipping decode");
        return Ok(OpenedText::Binary(bytes));
    }
    match (detected.encoding(), detected.bom()) {
        (Some(encoding), bom) => {
            let body = &bytes[bom.map_or(0, <[u8]>::len)..];
            let text = decode(body, encoding)?;
            Ok(OpenedText::Text { text, encoding, bom })
        }
        (None, _) => {
            let (encoding, text) = decode_with_fallback(&bytes, fallback)?;
            debug!(path = %path.display(), %encoding, "decoded via fallback list");
            Ok(OpenedText::Text { text, encoding, bom: None })
        }
    }
}

/// 把文本按原编码（及原 BOM）编码为待写盘字节
pub fn encode_for_save(text: &str, encoding: Encoding, bom: Option<&[u8]>) -> Result<Vec<u8>> {
    encode(text, encoding, bom.is_some())
}
