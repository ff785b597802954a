//! 公共类型（对外暴露）
use serde::Serialize;
use std::path::PathBuf;

use crate::encoding::Encoding;

/// 编码探测结果
/// 不变量：`is_binary` 为真时 `encoding` 与 `bom` 必为 None（仅能经由构造函数创建）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EncodingResult {
    encoding: Option<Encoding>,
    bom: Option<&'static [u8]>,
    is_binary: bool,
}

impl EncodingResult {
    pub(crate) fn with_bom(encoding: Encoding, bom: &'static [u8]) -> Self {
        Self { encoding: Some(encoding), bom: Some(bom), is_binary: false }
    }

    pub(crate) fn binary() -> Self {
        Self { encoding: None, bom: None, is_binary: true }
    }

    /// 仅凭字节无法判定，需调用方走回退编码列表
    pub(crate) fn undetermined() -> Self {
        Self { encoding: None, bom: None, is_binary: false }
    }

    pub fn encoding(&self) -> Option<Encoding> { self.encoding }
    pub fn bom(&self) -> Option<&'static [u8]> { self.bom }
    pub fn is_binary(&self) -> bool { self.is_binary }
}

/// 扫描结果：按遍历顺序排列的文件路径；`truncated` 表示因达到上限而提前停止
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    pub files: Vec<PathBuf>,
    pub truncated: bool,
}

/// 打开文件后的内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenedText {
    /// 疑似二进制文件，不做任何解码
    Binary(Vec<u8>),
    /// 已解码文本（BOM 已剥离）；保存时用 `encoding` 与 `bom` 还原
    Text {
        text: String,
        encoding: Encoding,
        bom: Option<&'static [u8]>,
    },
}
