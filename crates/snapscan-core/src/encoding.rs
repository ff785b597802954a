//! 支持的文本编码与名称解析
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// 文本编码
/// - 名称解析大小写不敏感，并兼容常见别名（latin1、macintosh 等）
/// - 序列化为规范名称（如 "UTF-16LE"）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Encoding {
    Utf8,
    Ascii,
    Iso8859_1,
    MacRoman,
    Utf16Be,
    Utf16Le,
    Utf32Be,
    Utf32Le,
}

/// 文件无 BOM 时默认依次尝试的编码
pub const DEFAULT_FALLBACK_ENCODINGS: &[Encoding] =
    &[Encoding::Utf8, Encoding::Ascii, Encoding::Iso8859_1, Encoding::MacRoman];

pub(crate) const BOM_UTF8: &[u8] = &[0xEF, 0xBB, 0xBF];
pub(crate) const BOM_UTF16BE: &[u8] = &[0xFE, 0xFF];
pub(crate) const BOM_UTF16LE: &[u8] = &[0xFF, 0xFE];
pub(crate) const BOM_UTF32BE: &[u8] = &[0x00, 0x00, 0xFE, 0xFF];
pub(crate) const BOM_UTF32LE: &[u8] = &[0xFF, 0xFE, 0x00, 0x00];

impl Encoding {
    /// 规范名称
    pub fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Ascii => "ASCII",
            Self::Iso8859_1 => "ISO-8859-1",
            Self::MacRoman => "MacRoman",
            Self::Utf16Be => "UTF-16BE",
            Self::Utf16Le => "UTF-16LE",
            Self::Utf32Be => "UTF-32BE",
            Self::Utf32Le => "UTF-32LE",
        }
    }

    /// 该编码对应的 BOM；单字节编码没有 BOM
    pub fn bom(self) -> Option<&'static [u8]> {
        match self {
            Self::Utf8 => Some(BOM_UTF8),
            Self::Utf16Be => Some(BOM_UTF16BE),
            Self::Utf16Le => Some(BOM_UTF16LE),
            Self::Utf32Be => Some(BOM_UTF32BE),
            Self::Utf32Le => Some(BOM_UTF32LE),
            Self::Ascii | Self::Iso8859_1 | Self::MacRoman => None,
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Encoding> for &'static str {
    fn from(e: Encoding) -> Self { e.name() }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // 归一化：忽略大小写与分隔符（"utf_16le" == "UTF-16LE"）
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let enc = match key.as_str() {
            "utf8" => Self::Utf8,
            "ascii" | "usascii" => Self::Ascii,
            "iso88591" | "latin1" | "l1" => Self::Iso8859_1,
            "macroman" | "macintosh" | "mac" => Self::MacRoman,
            "utf16be" => Self::Utf16Be,
            "utf16le" => Self::Utf16Le,
            "utf32be" => Self::Utf32Be,
            "utf32le" => Self::Utf32Le,
            _ => return Err(Error::UnknownEncoding(s.to_string())),
        };
        Ok(enc)
    }
}

impl TryFrom<String> for Encoding {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> { s.parse() }
}

/// MacRoman 高半区（0x80..=0xFF）到 Unicode 的映射表
pub(crate) const MAC_ROMAN_HIGH: [char; 128] = [
    // 0x80
    '\u{00C4}', '\u{00C5}', '\u{00C7}', '\u{00C9}', '\u{00D1}', '\u{00D6}', '\u{00DC}', '\u{00E1}',
    '\u{00E0}', '\u{00E2}', '\u{00E4}', '\u{00E3}', '\u{00E5}', '\u{00E7}', '\u{00E9}', '\u{00E8}',
    // 0x90
    '\u{00EA}', '\u{00EB}', '\u{00ED}', '\u{00EC}', '\u{00EE}', '\u{00EF}', '\u{00F1}', '\u{00F3}',
    '\u{00F2}', '\u{00F4}', '\u{00F6}', '\u{00F5}', '\u{00FA}', '\u{00F9}', '\u{00FB}', '\u{00FC}',
    // 0xA0
    '\u{2020}', '\u{00B0}', '\u{00A2}', '\u{00A3}', '\u{00A7}', '\u{2022}', '\u{00B6}', '\u{00DF}',
    '\u{00AE}', '\u{00A9}', '\u{2122}', '\u{00B4}', '\u{00A8}', '\u{2260}', '\u{00C6}', '\u{00D8}',
    // 0xB0
    '\u{221E}', '\u{00B1}', '\u{2264}', '\u{2265}', '\u{00A5}', '\u{00B5}', '\u{2202}', '\u{2211}',
    '\u{220F}', '\u{03C0}', '\u{222B}', '\u{00AA}', '\u{00BA}', '\u{03A9}', '\u{00E6}', '\u{00F8}',
    // 0xC0
    '\u{00BF}', '\u{00A1}', '\u{00AC}', '\u{221A}', '\u{0192}', '\u{2248}', '\u{2206}', '\u{00AB}',
    '\u{00BB}', '\u{2026}', '\u{00A0}', '\u{00C0}', '\u{00C3}', '\u{00D5}', '\u{0152}', '\u{0153}',
    // 0xD0
    '\u{2013}', '\u{2014}', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}', '\u{00F7}', '\u{25CA}',
    '\u{00FF}', '\u{0178}', '\u{2044}', '\u{20AC}', '\u{2039}', '\u{203A}', '\u{FB01}', '\u{FB02}',
    // 0xE0
    '\u{2021}', '\u{00B7}', '\u{201A}', '\u{201E}', '\u{2030}', '\u{00C2}', '\u{00CA}', '\u{00C1}',
    '\u{00CB}', '\u{00C8}', '\u{00CD}', '\u{00CE}', '\u{00CF}', '\u{00CC}', '\u{00D3}', '\u{00D4}',
    // 0xF0（0xF0 为 Apple 徽标，位于私用区）
    '\u{F8FF}', '\u{00D2}', '\u{00DA}', '\u{00DB}', '\u{00D9}', '\u{0131}', '\u{02C6}', '\u{02DC}',
    '\u{00AF}', '\u{02D8}', '\u{02D9}', '\u{02DA}', '\u{00B8}', '\u{02DD}', '\u{02DB}', '\u{02C7}',
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("UTF-8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("utf8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("latin1".parse::<Encoding>().unwrap(), Encoding::Iso8859_1);
        assert_eq!("ISO-8859-1".parse::<Encoding>().unwrap(), Encoding::Iso8859_1);
        assert_eq!("macintosh".parse::<Encoding>().unwrap(), Encoding::MacRoman);
        assert_eq!("utf_16le".parse::<Encoding>().unwrap(), Encoding::Utf16Le);
        assert!(matches!("koi8-r".parse::<Encoding>(), Err(Error::UnknownEncoding(_))));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for e in [Encoding::MacRoman, Encoding::Utf32Be, Encoding::Ascii] {
            assert_eq!(e.to_string().parse::<Encoding>().unwrap(), e);
        }
    }

    #[test]
    fn single_byte_encodings_have_no_bom() {
        assert_eq!(Encoding::Iso8859_1.bom(), None);
        assert_eq!(Encoding::Utf16Le.bom(), Some(&[0xFF, 0xFE][..]));
    }

    #[test]
    fn serde_uses_canonical_names() {
        let json = serde_json::to_string(&Encoding::Utf16Be).unwrap();
        assert_eq!(json, "\"UTF-16BE\"");
        let back: Encoding = serde_json::from_str("\"mac-roman\"").unwrap();
        assert_eq!(back, Encoding::MacRoman);
    }
}
