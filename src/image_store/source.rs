//! # 数据源与结果模型
//!
//! ## 设计思路
//!
//! 历史接口用一个字符串同时承载三种编码（URL / data URI / 二进制串），
//! 靠前缀嗅探区分。这里把它显式建模为 `ImageSource`：
//! - 调用方已知来源时直接构造对应分支
//! - 只有字符串时通过 `ImageSource::classify` 一次性分类

use std::path::PathBuf;

const REMOTE_PREFIXES: [&str; 3] = ["http://", "https://", "file://"];
const DATA_URI_PREFIX: &str = "data:image";

/// 图片输入来源。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// `http://`、`https://` 或 `file://` 地址。
    Url(String),
    /// `data:image/<subtype>;base64,<payload>` 形式的 data URI。
    DataUri(String),
    /// 已解码的原始字节。
    Binary(Vec<u8>),
}

impl ImageSource {
    /// 按前缀对原始字符串分类。
    ///
    /// 顺序：远程地址 → data URI → 其余一律视为 binary 编码的字节串
    /// （每个 UTF-16 码元取低 8 位）。
    ///
    /// # 示例
    /// ```rust
    /// use image_store::ImageSource;
    ///
    /// assert!(matches!(ImageSource::classify("https://a.com/x.png"), ImageSource::Url(_)));
    /// assert!(matches!(ImageSource::classify("data:image/png;base64,AA=="), ImageSource::DataUri(_)));
    /// assert_eq!(ImageSource::classify("\u{89}PNG"), ImageSource::Binary(vec![0x89, b'P', b'N', b'G']));
    /// ```
    pub fn classify(raw: &str) -> Self {
        if REMOTE_PREFIXES.iter().any(|prefix| raw.starts_with(prefix)) {
            Self::Url(raw.to_string())
        } else if raw.starts_with(DATA_URI_PREFIX) {
            Self::DataUri(raw.to_string())
        } else {
            Self::Binary(binary_string_to_bytes(raw))
        }
    }

    /// 分支名称（用于日志与诊断）。
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Url(url) if url.starts_with("file://") => "file",
            Self::Url(_) => "url",
            Self::DataUri(_) => "base64",
            Self::Binary(_) => "binary",
        }
    }
}

impl From<&str> for ImageSource {
    fn from(raw: &str) -> Self {
        Self::classify(raw)
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Binary(bytes)
    }
}

/// 单次保存请求：原始输入 + 目标文件名（不含扩展名）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub raw: String,
    pub target_name: String,
}

impl ImageRequest {
    pub fn new(raw: impl Into<String>, target_name: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            target_name: target_name.into(),
        }
    }

    pub fn source(&self) -> ImageSource {
        ImageSource::classify(&self.raw)
    }
}

/// 保存成功后的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// 磁盘上的实际文件路径。
    pub file_path: PathBuf,
    /// 对外暴露的逻辑资源路径，如 `/resource/image/audio/cover.png`。
    pub resource_path: String,
    pub extension: &'static str,
    pub bytes_written: u64,
}

/// binary（latin1）字符映射：每个 UTF-16 码元截断为低 8 位。
pub(crate) fn binary_string_to_bytes(raw: &str) -> Vec<u8> {
    raw.encode_utf16().map(|unit| unit as u8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn classify_routes_remote_schemes() {
        for raw in [
            "http://example.com/a.png",
            "https://example.com/a.png",
            "file:///tmp/a.png",
        ] {
            assert_eq!(ImageSource::classify(raw), ImageSource::Url(raw.to_string()));
        }
    }

    #[test]
    fn classify_routes_data_uri_by_prefix_only() {
        // 前缀命中即进入 base64 分支，格式校验由 writer 负责
        let raw = "data:image-not-really";
        assert_eq!(ImageSource::classify(raw), ImageSource::DataUri(raw.to_string()));
    }

    #[test]
    fn classify_is_case_sensitive_for_schemes() {
        assert!(matches!(ImageSource::classify("HTTP://example.com"), ImageSource::Binary(_)));
    }

    #[test]
    fn kind_distinguishes_file_urls() {
        assert_eq!(ImageSource::classify("file:///x.png").kind(), "file");
        assert_eq!(ImageSource::classify("https://x/x.png").kind(), "url");
        assert_eq!(ImageSource::from(vec![1, 2, 3]).kind(), "binary");
    }

    #[test]
    fn binary_mapping_truncates_wide_characters() {
        assert_eq!(binary_string_to_bytes("\u{00ff}\u{0100}A"), vec![0xff, 0x00, b'A']);
    }

    #[test]
    fn request_source_uses_classification() {
        let request = ImageRequest::new("https://example.com/x.jpg", "cover");

        assert_eq!(request.target_name, "cover");
        assert!(matches!(request.source(), ImageSource::Url(_)));
    }

    proptest! {
        #[test]
        fn latin1_strings_round_trip_to_bytes(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let raw: String = bytes.iter().map(|b| char::from(*b)).collect();
            prop_assume!(!raw.starts_with("http://")
                && !raw.starts_with("https://")
                && !raw.starts_with("file://")
                && !raw.starts_with("data:image"));

            prop_assert_eq!(ImageSource::classify(&raw), ImageSource::Binary(bytes));
        }
    }
}
