//! # 图片落盘工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │            调用方（资源服务 / CLI / 业务代码）             │
//! │                                                          │
//! │   save_image(&str, &str)      save(ImageSource, &str)    │
//! │        (兼容接口)                 (类型化接口)            │
//! └───────┼──────────────────────────────┼───────────────────┘
//!         ↓                              ↓
//! ┌──────────────────────────────────────────────────────────┐
//! │                     image_store                          │
//! │                                                          │
//! │  source ──── ImageSource::classify（前缀分派）            │
//! │     ├─ fetcher    http(s) 流式下载 / file:// 本地复制     │
//! │     ├─ writer     data URI 解码写入 / 二进制直写          │
//! │     └─ extension  扩展名推断（Detect 策略下启用）         │
//! │                                                          │
//! │  storage ──── 扁平图片目录：惰性创建 / 清空 / 统计        │
//! │  settings ─── JSON 配置文件读写                          │
//! │  error ────── AppError（应用级统一错误）                  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 应用级统一错误类型 `AppError` |
//! | [`image_store`] | 输入分类、下载/解码/写入、返回逻辑资源路径 |
//! | [`storage`] | 图片目录的惰性创建、清空与占用统计 |
//! | [`settings`] | `StoreConfig` 的 JSON 持久化 |

pub mod error;
pub mod image_store;
pub mod settings;
pub mod storage;

pub use error::AppError;
pub use image_store::{
    file_extension, ExtensionPolicy, ImageRequest, ImageSource, ImageStore, StoreConfig,
    StoreError, StoredImage,
};
pub use storage::{ImagesDir, StorageInfo};
