//! # 本地写入模块
//!
//! ## 设计思路
//!
//! 处理无需网络的两种来源：
//! - `DataUri`：校验 `data:image/<subtype>;base64,` 前缀后解码写入
//! - `Binary`：已解码字节直接写入
//!
//! 前缀不匹配时在创建目录之前失败，不留下任何状态；写入失败原样上抛。

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::fs;

use super::{mime_extension, ImageStore, StoreError, StoredImage};

/// 子类型仅允许字母与 `+`（如 `png`、`svg+xml`）。
static DATA_URI_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:image/([A-Za-z+]+);base64,").expect("data uri pattern"));

/// 标准字母表，填充可有可无。
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// URL 安全字母表（`-` / `_`），标准字母表解码失败时再试。
const LENIENT_BASE64_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const FALLBACK_EXTENSION: &str = "png";

impl ImageStore {
    /// `DataUri` 分支入口。
    pub(super) async fn save_data_uri(&self, data: &str, target_name: &str) -> Result<StoredImage, StoreError> {
        let (subtype, bytes) = decode_data_uri(data)?;
        log::debug!("📝 data URI 解码完成 - 子类型: {} {} bytes", subtype, bytes.len());

        let extension = self.output_extension(|| {
            mime_extension(&format!("image/{}", subtype)).unwrap_or(FALLBACK_EXTENSION)
        });

        self.write_bytes(&bytes, target_name, extension).await
    }

    /// `Binary` 分支入口。
    pub(super) async fn save_binary(&self, bytes: &[u8], target_name: &str) -> Result<StoredImage, StoreError> {
        let extension = self.output_extension(|| sniff_extension(bytes));
        self.write_bytes(bytes, target_name, extension).await
    }

    /// 确保目录存在后整体写入，同名文件直接覆盖。
    async fn write_bytes(
        &self,
        bytes: &[u8],
        target_name: &str,
        extension: &'static str,
    ) -> Result<StoredImage, StoreError> {
        self.dir.ensure().await?;

        let target = self.dir.file_path(target_name, extension);
        fs::write(&target, bytes).await.map_err(|e| {
            StoreError::FileSystem(format!("写入文件 '{}' 失败：{}", target.display(), e))
        })?;

        Ok(self.stored_image(target_name, extension, bytes.len() as u64))
    }
}

/// 解析 data URI，返回（子类型, 解码后字节）。
fn decode_data_uri(data: &str) -> Result<(&str, Vec<u8>), StoreError> {
    let captures = DATA_URI_PATTERN.captures(data).ok_or_else(|| {
        StoreError::InvalidFormat("不是合法的 data:image/<type>;base64, 数据".to_string())
    })?;

    let prefix_len = captures.get(0).map(|m| m.end()).unwrap_or(0);
    let subtype = captures.get(1).map(|m| m.as_str()).unwrap_or_default();

    let payload = strip_ascii_whitespace(&data[prefix_len..]);
    let bytes = LENIENT_BASE64
        .decode(&payload)
        .or_else(|_| LENIENT_BASE64_URL_SAFE.decode(&payload))
        .map_err(|e| StoreError::InvalidFormat(format!("Base64 解码失败：{}", e)))?;

    Ok((subtype, bytes))
}

/// 折行的 base64（MIME 每 76 列换行等）中的空白全部剔除。
fn strip_ascii_whitespace(payload: &str) -> Vec<u8> {
    payload
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect()
}

/// 通过文件签名（magic bytes）推断扩展名，无法识别时回退 png。
fn sniff_extension(bytes: &[u8]) -> &'static str {
    infer::get(bytes)
        .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
        .and_then(|kind| mime_extension(kind.mime_type()))
        .unwrap_or(FALLBACK_EXTENSION)
}
