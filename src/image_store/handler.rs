//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `ImageStore` 只负责分派与结果整形，具体 I/O 交给 `fetcher` / `writer`。
//! 对外提供两套入口：
//! 1. `save`：类型化接口，任何失败都以 `Err(StoreError)` 返回
//! 2. `save_image`：兼容历史字符串接口，保留“远程分支吞错、本地写入抛错”的不对称语义
//!
//! ## 实现思路
//!
//! - HTTP 客户端在构造时创建并复用。
//! - 分派日志与失败日志集中在 `save`，各分支只返回错误不重复打印。
//! - 目标文件名在任何 I/O 之前校验，拒绝路径穿越。

use std::time::{Duration, Instant};

use super::{ExtensionPolicy, ImageRequest, ImageSource, StoreConfig, StoreError, StoredImage};
use crate::storage::{ImagesDir, StorageInfo};

/// 图片落盘器。
///
/// 封装了配置、图片目录与 HTTP 客户端。
pub struct ImageStore {
    pub(super) config: StoreConfig,
    pub(super) dir: ImagesDir,
    pub(super) client: reqwest::Client,
}

impl ImageStore {
    /// 根据配置创建落盘器。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use image_store::{ImageStore, StoreConfig};
    ///
    /// let store = ImageStore::new(StoreConfig::with_images_dir("/tmp/images"))?;
    /// # Ok::<(), image_store::StoreError>(())
    /// ```
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;
        let client = Self::build_http_client(&config)?;

        Ok(Self {
            dir: ImagesDir::new(config.images_dir.clone()),
            config,
            client,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn images_dir(&self) -> &ImagesDir {
        &self.dir
    }

    /// 保存主入口：按来源分派到对应分支。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use image_store::{ImageSource, ImageStore, StoreConfig};
    ///
    /// # async fn demo() -> Result<(), image_store::StoreError> {
    /// let store = ImageStore::new(StoreConfig::with_images_dir("/tmp/images"))?;
    /// let stored = store
    ///     .save(ImageSource::Url("https://example.com/a.jpg".into()), "cover")
    ///     .await?;
    /// assert_eq!(stored.resource_path, "/resource/image/audio/cover.png");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn save(&self, source: ImageSource, target_name: &str) -> Result<StoredImage, StoreError> {
        validate_target_name(target_name)?;

        let kind = source.kind();
        log::info!("📥 保存图片 - 分支: {} 名称: {}", kind, target_name);

        let start = Instant::now();
        let result = match source {
            ImageSource::Url(url) => self.download(&url, target_name).await,
            ImageSource::DataUri(data) => self.save_data_uri(&data, target_name).await,
            ImageSource::Binary(bytes) => self.save_binary(&bytes, target_name).await,
        };

        match &result {
            Ok(stored) => log::info!(
                "✅ 图片已保存 - {} ({} bytes, {}ms)",
                stored.resource_path,
                stored.bytes_written,
                start.elapsed().as_millis()
            ),
            Err(err) => log::error!("❌ 图片保存失败 - 分支: {} 名称: {}: {}", kind, target_name, err),
        }

        result
    }

    pub async fn save_request(&self, request: ImageRequest) -> Result<StoredImage, StoreError> {
        let source = request.source();
        self.save(source, &request.target_name).await
    }

    /// 兼容历史接口：返回逻辑路径或 `None`。
    ///
    /// 错误处理刻意保持不对称：
    /// - 远程分支（http/https/file）的任何失败 → `Ok(None)`
    /// - data URI 不匹配或无法解码 → `Ok(None)`，且不创建目录
    /// - data URI / 二进制分支的目录创建或写入失败 → `Err`
    /// - 文件名非法 → `Err`
    pub async fn save_image(&self, image_data: &str, file_name: &str) -> Result<Option<String>, StoreError> {
        validate_target_name(file_name)?;

        let source = ImageSource::classify(image_data);
        let remote = matches!(source, ImageSource::Url(_));

        match self.save(source, file_name).await {
            Ok(stored) => Ok(Some(stored.resource_path)),
            Err(_) if remote => Ok(None),
            Err(StoreError::InvalidFormat(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// 清空图片目录，返回删除的文件数；目录不存在时为空操作。
    pub async fn delete_images(&self) -> Result<usize, StoreError> {
        self.dir.clear().await
    }

    pub async fn dir_info(&self) -> Result<StorageInfo, StoreError> {
        self.dir.info().await
    }

    /// 按策略决定扩展名；`detect` 仅在 `Detect` 策略下求值。
    pub(super) fn output_extension<F>(&self, detect: F) -> &'static str
    where
        F: FnOnce() -> &'static str,
    {
        match self.config.extension_policy {
            ExtensionPolicy::ForcePng => "png",
            ExtensionPolicy::Detect => detect(),
        }
    }

    pub(super) fn stored_image(&self, target_name: &str, extension: &'static str, bytes_written: u64) -> StoredImage {
        StoredImage {
            file_path: self.dir.file_path(target_name, extension),
            resource_path: self
                .config
                .resource_path(&format!("{}.{}", target_name, extension)),
            extension,
            bytes_written,
        }
    }

    fn build_http_client(config: &StoreConfig) -> Result<reqwest::Client, StoreError> {
        let mut builder = reqwest::Client::builder();
        if config.download_timeout > 0 {
            builder = builder.timeout(Duration::from_secs(config.download_timeout));
        }
        if config.connect_timeout > 0 {
            builder = builder.connect_timeout(Duration::from_secs(config.connect_timeout));
        }

        builder
            .build()
            .map_err(|e| StoreError::Network(format!("无法创建 HTTP 客户端：{}", e)))
    }
}

/// 目标文件名必须是单个路径段，且不带目录成分。
fn validate_target_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty() {
        return Err(StoreError::InvalidName("文件名为空".to_string()));
    }
    if name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(StoreError::InvalidName(format!("文件名包含路径成分：{:?}", name)));
    }
    Ok(())
}
