//! # 远程获取模块
//!
//! ## 设计思路
//!
//! 处理 `Url` 来源的两种情形：
//! - `file://`：本地文件逐字节复制到图片目录
//! - `http(s)://`：单次 GET，响应体按块流式写入目标文件，不整体读入内存
//!
//! ## 实现思路
//!
//! - 进入分支前先确保目录存在（即使随后因文件不存在而失败）。
//! - 非 2xx 状态直接失败，错误信息带状态码与服务器给出的状态文本。
//! - 收到首个数据块后才创建目标文件，空响应体不会留下空文件。
//! - 流式写入中途失败时尽力删除残留文件。
//! - 不重试；超时由客户端配置约束。

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::{file_extension, ImageStore, StoreError, StoredImage};

impl ImageStore {
    /// `Url` 分支入口。
    pub(super) async fn download(&self, url: &str, target_name: &str) -> Result<StoredImage, StoreError> {
        self.dir.ensure().await?;

        if let Some(raw_path) = url.strip_prefix("file://") {
            return self.copy_local_file(raw_path, target_name).await;
        }

        self.fetch_http(url, target_name).await
    }

    /// 复制 `file://` 指向的本地文件，内容不做任何转换。
    async fn copy_local_file(&self, raw_path: &str, target_name: &str) -> Result<StoredImage, StoreError> {
        let source_path = local_path_from_file_url(raw_path);
        log::info!("📁 开始复制本地图片 - 路径: {}", source_path.display());

        if !fs::try_exists(&source_path).await.unwrap_or(false) {
            return Err(StoreError::NotFound(source_path.display().to_string()));
        }

        let extension = self.output_extension(|| file_extension(raw_path, None));
        let target = self.dir.file_path(target_name, extension);

        let bytes_written = fs::copy(&source_path, &target).await.map_err(|e| {
            StoreError::FileSystem(format!(
                "复制 '{}' 到 '{}' 失败：{}",
                source_path.display(),
                target.display(),
                e
            ))
        })?;

        Ok(self.stored_image(target_name, extension, bytes_written))
    }

    async fn fetch_http(&self, url: &str, target_name: &str) -> Result<StoredImage, StoreError> {
        log::info!("🌐 开始下载图片 - URL: {}", redact_url_for_log(url));

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e, url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Network(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status_text(&response)
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .map(str::to_string);
        let extension = self.output_extension(|| file_extension(url, content_type.as_deref()));
        let target = self.dir.file_path(target_name, extension);

        let bytes_written = self.stream_to_file(response, &target, url).await?;
        log::debug!("✅ 下载完成 - {} bytes", bytes_written);

        Ok(self.stored_image(target_name, extension, bytes_written))
    }

    /// 将响应体写入目标文件，返回写入字节数。
    async fn stream_to_file(
        &self,
        mut response: reqwest::Response,
        target: &Path,
        url: &str,
    ) -> Result<u64, StoreError> {
        let first = loop {
            match response.chunk().await.map_err(|e| self.map_reqwest_error(e, url))? {
                Some(chunk) if chunk.is_empty() => continue,
                other => break other,
            }
        };

        let Some(first) = first else {
            return Err(StoreError::MissingBody(format!(
                "{} 没有返回任何数据",
                redact_url_for_log(url)
            )));
        };

        let mut file = fs::File::create(target).await.map_err(|e| {
            StoreError::FileSystem(format!("创建文件 '{}' 失败：{}", target.display(), e))
        })?;

        let result = self
            .write_chunks(&mut file, &first, &mut response, target, url)
            .await;

        if result.is_err() {
            drop(file);
            if let Err(err) = fs::remove_file(target).await {
                log::warn!("⚠️ 清理未完成文件失败 '{}': {}", target.display(), err);
            }
        }

        result
    }

    async fn write_chunks(
        &self,
        file: &mut fs::File,
        first: &[u8],
        response: &mut reqwest::Response,
        target: &Path,
        url: &str,
    ) -> Result<u64, StoreError> {
        let write_err =
            |e: std::io::Error| StoreError::FileSystem(format!("写入文件 '{}' 失败：{}", target.display(), e));

        file.write_all(first).await.map_err(write_err)?;
        let mut total = first.len() as u64;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.map_reqwest_error(e, url))?
        {
            file.write_all(&chunk).await.map_err(write_err)?;
            total = total.saturating_add(chunk.len() as u64);
        }

        file.flush().await.map_err(write_err)?;
        Ok(total)
    }

    /// 统一映射 reqwest 错误到业务错误。
    fn map_reqwest_error(&self, e: reqwest::Error, url: &str) -> StoreError {
        let err_msg = sanitize_error_message_with_redacted_url(&e.to_string(), url);

        if e.is_timeout() {
            StoreError::Timeout(format!("下载超时（{}秒）", self.config.download_timeout))
        } else if e.is_connect() {
            StoreError::Network(format!("无法连接：{}", err_msg))
        } else {
            StoreError::Network(format!("请求失败：{}", err_msg))
        }
    }
}

/// 状态文本优先取服务器返回的原因短语，缺失或非 UTF-8 时回退标准短语。
fn status_text(response: &reqwest::Response) -> &str {
    response
        .extensions()
        .get::<hyper::ext::ReasonPhrase>()
        .and_then(|phrase| std::str::from_utf8(phrase.as_bytes()).ok())
        .or_else(|| response.status().canonical_reason())
        .unwrap_or("未知状态")
}

/// 去掉 `file://` 后得到本地路径；Windows 下 `/C:/x` 归一为 `C:/x`。
fn local_path_from_file_url(raw_path: &str) -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if raw_path.starts_with('/') && raw_path.chars().nth(2) == Some(':') {
            return PathBuf::from(raw_path.trim_start_matches('/'));
        }
    }

    PathBuf::from(raw_path)
}

/// 日志中只保留 scheme/host/port/path，去掉查询串与片段。
pub(super) fn redact_url_for_log(url: &str) -> String {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return "<invalid-url>".to_string();
    };

    let host = parsed.host_str().unwrap_or("<unknown-host>");
    let port = parsed.port().map(|p| format!(":{}", p)).unwrap_or_default();

    format!("{}://{}{}{}", parsed.scheme(), host, port, parsed.path())
}

fn sanitize_error_message_with_redacted_url(error_msg: &str, url: &str) -> String {
    error_msg.replace(url, &redact_url_for_log(url))
}
