//! 编解码：按指定编码解码/编码，以及无 BOM 时的回退尝试
use crate::encoding::{Encoding, MAC_ROMAN_HIGH};
use crate::error::{Error, Result};

/// 按指定编码把字节解码为 UTF-8 字符串（严格模式，遇到非法数据即报错）
/// 调用方负责事先剥离 BOM
pub fn decode(bytes: &[u8], encoding: Encoding) -> Result<String> {
    let fail = |offset: usize| Error::Decode { encoding, offset };
    match encoding {
        Encoding::Utf8 => match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s.to_string()),
            Err(e) => Err(fail(e.valid_up_to())),
        },
        Encoding::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
            Some(pos) => Err(fail(pos)),
            None => Ok(bytes.iter().map(|&b| b as char).collect()),
        },
        // 单字节全映射编码：任何输入都能解码
        Encoding::Iso8859_1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        Encoding::MacRoman => Ok(bytes
            .iter()
            .map(|&b| if b < 0x80 { b as char } else { MAC_ROMAN_HIGH[(b - 0x80) as usize] })
            .collect()),
        Encoding::Utf16Be | Encoding::Utf16Le => {
            if bytes.len() % 2 != 0 { return Err(fail(bytes.len() - 1)); }
            let units = bytes.chunks_exact(2).map(|c| {
                let pair = [c[0], c[1]];
                if encoding == Encoding::Utf16Be { u16::from_be_bytes(pair) } else { u16::from_le_bytes(pair) }
            });
            let mut out = String::with_capacity(bytes.len() / 2);
            let mut offset = 0usize;
            for r in char::decode_utf16(units) {
                let ch = r.map_err(|_| fail(offset))?;
                offset += ch.len_utf16() * 2;
                out.push(ch);
            }
            Ok(out)
        }
        Encoding::Utf32Be | Encoding::Utf32Le => {
            if bytes.len() % 4 != 0 { return Err(fail(bytes.len() - bytes.len() % 4)); }
            let mut out = String::with_capacity(bytes.len() / 4);
            for (i, c) in bytes.chunks_exact(4).enumerate() {
                let quad = [c[0], c[1], c[2], c[3]];
                let v = if encoding == Encoding::Utf32Be { u32::from_be_bytes(quad) } else { u32::from_le_bytes(quad) };
                out.push(char::from_u32(v).ok_or_else(|| fail(i * 4))?);
            }
            Ok(out)
        }
    }
}

/// 把 UTF-8 文本编码为目标编码的字节；`with_bom` 为真且该编码有 BOM 时在开头写入
pub fn encode(text: &str, encoding: Encoding, with_bom: bool) -> Result<Vec<u8>> {
    let mut out: Vec<u8> = Vec::with_capacity(text.len() + 4);
    if with_bom {
        if let Some(bom) = encoding.bom() { out.extend_from_slice(bom); }
    }
    let unrepresentable = |ch: char| Error::Unrepresentable { encoding, ch };
    match encoding {
        Encoding::Utf8 => out.extend_from_slice(text.as_bytes()),
        Encoding::Ascii => {
            for ch in text.chars() {
                if !ch.is_ascii() { return Err(unrepresentable(ch)); }
                out.push(ch as u8);
            }
        }
        Encoding::Iso8859_1 => {
            for ch in text.chars() {
                let b = u8::try_from(u32::from(ch)).map_err(|_| unrepresentable(ch))?;
                out.push(b);
            }
        }
        Encoding::MacRoman => {
            for ch in text.chars() {
                if ch.is_ascii() { out.push(ch as u8); continue; }
                let idx = MAC_ROMAN_HIGH.iter().position(|&c| c == ch).ok_or_else(|| unrepresentable(ch))?;
                out.push(0x80 + idx as u8);
            }
        }
        Encoding::Utf16Be => text.encode_utf16().for_each(|u| out.extend_from_slice(&u.to_be_bytes())),
        Encoding::Utf16Le => text.encode_utf16().for_each(|u| out.extend_from_slice(&u.to_le_bytes())),
        Encoding::Utf32Be => text.chars().for_each(|c| out.extend_from_slice(&u32::from(c).to_be_bytes())),
        Encoding::Utf32Le => text.chars().for_each(|c| out.extend_from_slice(&u32::from(c).to_le_bytes())),
    }
    Ok(out)
}

/// 在两种编码之间转换字节（解码后再编码，不写 BOM）
pub fn transcode(bytes: &[u8], from: Encoding, to: Encoding) -> Result<Vec<u8>> {
    let text = decode(bytes, from)?;
    encode(&text, to, false)
}

/// 依次尝试候选编码，返回第一个解码成功的结果
/// 全部失败（或列表为空）时返回 `EncodingConversionFailed`
pub fn decode_with_fallback(bytes: &[u8], candidates: &[Encoding]) -> Result<(Encoding, String)> {
    for &enc in candidates {
        match decode(bytes, enc) {
            Ok(text) => return Ok((enc, text)),
            Err(e) => tracing::trace!(encoding = %enc, error = %e, "fallback candidate rejected"),
        }
    }
    let tried = candidates.iter().map(|e| e.name()).collect::<Vec<_>>().join(", ");
    Err(Error::EncodingConversionFailed { tried })
}
