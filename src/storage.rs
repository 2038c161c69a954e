//! 图片存储目录管理模块
//!
//! # 设计思路
//!
//! 统一管理图片的落盘目录：一个扁平文件夹，文件名为 `<name>.<ext>`，
//! 不建子目录、不写元数据旁路文件。
//!
//! # 实现思路
//!
//! - 目录不存在时由 `ensure` 惰性 `create_dir_all`，并发首次创建互不影响。
//! - `clear` 只删除目录内条目，不删除目录本身；目录不存在时为空操作。
//! - 所有可能失败的操作均返回 `Result`，不使用 `expect()` / `unwrap()`。

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs;

use crate::image_store::StoreError;

/// 存储目录信息
#[derive(Debug, Clone, Serialize)]
pub struct StorageInfo {
    pub path: String,
    pub total_size: u64,
    pub file_count: u64,
}

/// 扁平图片目录。
#[derive(Debug, Clone)]
pub struct ImagesDir {
    root: PathBuf,
}

impl ImagesDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// 目标文件的磁盘路径：`<root>/<name>.<ext>`。
    pub fn file_path(&self, name: &str, extension: &str) -> PathBuf {
        self.root.join(format!("{}.{}", name, extension))
    }

    /// 确保目录存在（递归创建，已存在时视为成功）。
    pub async fn ensure(&self) -> Result<(), StoreError> {
        if fs::metadata(&self.root).await.map(|m| m.is_dir()).unwrap_or(false) {
            return Ok(());
        }

        log::debug!("📂 创建图片目录: {}", self.root.display());
        fs::create_dir_all(&self.root).await.map_err(|e| {
            StoreError::FileSystem(format!("创建图片目录 '{}' 失败: {}", self.root.display(), e))
        })
    }

    /// 删除目录内的全部条目（非递归），返回删除数量。
    ///
    /// # 返回
    /// - `Ok(0)` — 目录不存在
    /// - `Ok(n)` — 已删除 n 个文件，目录保留
    /// - `Err(StoreError::FileSystem)` — 列目录或删除失败（含子目录条目）
    pub async fn clear(&self) -> Result<usize, StoreError> {
        if !fs::try_exists(&self.root).await.unwrap_or(false) {
            log::debug!("图片目录不存在，跳过清理: {}", self.root.display());
            return Ok(0);
        }

        let mut entries = fs::read_dir(&self.root).await.map_err(|e| {
            StoreError::FileSystem(format!("读取图片目录 '{}' 失败: {}", self.root.display(), e))
        })?;

        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::FileSystem(format!("遍历图片目录失败: {}", e)))?
        {
            let path = entry.path();
            fs::remove_file(&path).await.map_err(|e| {
                StoreError::FileSystem(format!("删除文件 '{}' 失败: {}", path.display(), e))
            })?;
            removed += 1;
        }

        log::info!("🧹 已清空图片目录 {} - 删除 {} 个文件", self.root.display(), removed);
        Ok(removed)
    }

    /// 获取目录信息（路径 + 占用大小 + 文件数），不会创建目录。
    pub async fn info(&self) -> Result<StorageInfo, StoreError> {
        let mut total_size: u64 = 0;
        let mut file_count: u64 = 0;

        if fs::try_exists(&self.root).await.unwrap_or(false) {
            let mut entries = fs::read_dir(&self.root).await.map_err(|e| {
                StoreError::FileSystem(format!("读取图片目录 '{}' 失败: {}", self.root.display(), e))
            })?;

            while let Ok(Some(entry)) = entries.next_entry().await {
                if let Ok(metadata) = entry.metadata().await {
                    if metadata.is_file() {
                        total_size += metadata.len();
                        file_count += 1;
                    }
                }
            }
        }

        Ok(StorageInfo {
            path: self.root.to_string_lossy().to_string(),
            total_size,
            file_count,
        })
    }
}
