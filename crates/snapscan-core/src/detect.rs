//! 编码探测：BOM 嗅探 + NUL 字节二进制判定
use crate::encoding::{Encoding, BOM_UTF16BE, BOM_UTF16LE, BOM_UTF32BE, BOM_UTF32LE, BOM_UTF8};
use crate::types::EncodingResult;

/// 二进制判定最多检查的前缀字节数
pub const BINARY_SNIFF_LEN: usize = 64 * 1024; // 64 KiB

/// 探测原始字节的编码
/// 判定顺序固定（只看前 4 字节）：
/// 1) EF BB BF → UTF-8
/// 2) FE FF → UTF-16BE
/// 3) FF FE 且其后不是 00 00 → UTF-16LE
/// 4) 00 00 FE FF → UTF-32BE
/// 5) FF FE 00 00 → UTF-32LE
/// 6) 前 64KiB 内含 NUL → 二进制
/// 7) 否则无法判定，交给调用方的回退列表
pub fn detect(bytes: &[u8]) -> EncodingResult {
    if bytes.starts_with(BOM_UTF8) {
        return EncodingResult::with_bom(Encoding::Utf8, BOM_UTF8);
    }
    if bytes.starts_with(BOM_UTF16BE) {
        return EncodingResult::with_bom(Encoding::Utf16Be, BOM_UTF16BE);
    }
    if bytes.starts_with(BOM_UTF16LE) && !bytes.starts_with(BOM_UTF32LE) {
        return EncodingResult::with_bom(Encoding::Utf16Le, BOM_UTF16LE);
    }
    if bytes.starts_with(BOM_UTF32BE) {
        return EncodingResult::with_bom(Encoding::Utf32Be, BOM_UTF32BE);
    }
    if bytes.starts_with(BOM_UTF32LE) {
        return EncodingResult::with_bom(Encoding::Utf32Le, BOM_UTF32LE);
    }

    let sniff_len = bytes.len().min(BINARY_SNIFF_LEN);
    if bytes[..sniff_len].contains(&0) {
        return EncodingResult::binary();
    }
    EncodingResult::undetermined()
}
