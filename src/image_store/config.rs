//! # 配置模块
//!
//! ## 设计思路
//!
//! 图片目录、逻辑路径前缀、扩展名策略与网络超时统一收敛到 `StoreConfig`，
//! 通过构造参数注入，而不是依赖进程运行位置推导目录。
//!
//! ## 实现思路
//!
//! - `Default` 提供与历史行为一致的配置（`images` 目录、强制 png）。
//! - `#[serde(default)]` 允许配置文件只写需要覆盖的字段。
//! - `ExtensionPolicy` 负责策略字符串解析与反向输出。

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::StoreError;

/// 逻辑资源路径前缀，由外部资源服务消费。
pub const DEFAULT_RESOURCE_PREFIX: &str = "/resource/image/audio";

/// 输出文件扩展名策略。
///
/// - `ForcePng`：无论内容实际格式，一律标记为 `.png`（历史行为）
/// - `Detect`：按 Content-Type / URL / data URI 子类型 / 文件签名推断
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionPolicy {
    #[default]
    ForcePng,
    Detect,
}

impl ExtensionPolicy {
    /// 将策略输出为稳定字符串，供日志与配置文件使用。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ForcePng => "force_png",
            Self::Detect => "detect",
        }
    }
}

impl FromStr for ExtensionPolicy {
    type Err = StoreError;

    fn from_str(policy: &str) -> Result<Self, Self::Err> {
        match policy.trim().to_lowercase().as_str() {
            "force_png" | "png" => Ok(Self::ForcePng),
            "detect" => Ok(Self::Detect),
            other => Err(StoreError::InvalidConfig(format!(
                "未知扩展名策略：{}（可选：force_png / detect）",
                other
            ))),
        }
    }
}

/// 图片保存配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// 扁平图片目录，首次保存时惰性创建。
    pub images_dir: PathBuf,
    /// 返回给调用方的逻辑路径前缀，与 `images_dir` 无关。
    pub resource_prefix: String,
    pub extension_policy: ExtensionPolicy,
    /// 单次下载总超时（秒），0 表示不限制。
    pub download_timeout: u64,
    /// 建立连接超时（秒），0 表示不限制。
    pub connect_timeout: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from("images"),
            resource_prefix: DEFAULT_RESOURCE_PREFIX.to_string(),
            extension_policy: ExtensionPolicy::ForcePng,
            download_timeout: 30,
            connect_timeout: 8,
        }
    }
}

impl StoreConfig {
    /// 以默认参数创建指向指定目录的配置。
    ///
    /// # 示例
    /// ```rust
    /// use image_store::StoreConfig;
    ///
    /// let config = StoreConfig::with_images_dir("/var/lib/app/images");
    /// assert_eq!(config.resource_prefix, "/resource/image/audio");
    /// ```
    pub fn with_images_dir(images_dir: impl Into<PathBuf>) -> Self {
        Self {
            images_dir: images_dir.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.images_dir.as_os_str().is_empty() {
            return Err(StoreError::InvalidConfig("images_dir 不能为空".to_string()));
        }
        if !self.resource_prefix.starts_with('/') {
            return Err(StoreError::InvalidConfig(format!(
                "resource_prefix 必须以 / 开头：{:?}",
                self.resource_prefix
            )));
        }
        Ok(())
    }

    /// 拼接逻辑资源路径：`<prefix>/<file_name>`。
    pub(crate) fn resource_path(&self, file_name: &str) -> String {
        format!("{}/{}", self.resource_prefix.trim_end_matches('/'), file_name)
    }
}
