//! # 图片落盘模块（image_store）
//!
//! ## 设计思路
//!
//! 将“输入识别 → 分支处理 → 写入目录 → 返回逻辑路径”按职责拆分为多个子模块：
//!
//! - `source`：输入模型与前缀分类（`ImageSource`）
//! - `handler`：`ImageStore` 本体，编排分派、兼容接口与目录清理
//! - `fetcher`：http(s) 流式下载与 `file://` 本地复制
//! - `writer`：data URI 解码写入与二进制直写
//! - `extension`：MIME / URL 到扩展名的推断
//! - `config/error`：配置与错误
//!
//! ## 新同事快速上手
//!
//! ```text
//! save_image(raw, name)            ← 兼容接口：远程失败吞掉为 None
//!    ↓
//! ImageSource::classify(raw)
//!    ↓
//! ImageStore::save(source, name)   ← 类型化接口：所有失败都是 Err
//!    ├─ Url      → fetcher.rs
//!    ├─ DataUri  → writer.rs
//!    └─ Binary   → writer.rs
//!    ↓
//! StoredImage { resource_path: "/resource/image/audio/<name>.png", .. }
//! ```

mod config;
mod error;
mod extension;
mod fetcher;
mod handler;
mod source;
mod writer;

pub use config::{DEFAULT_RESOURCE_PREFIX, ExtensionPolicy, StoreConfig};
pub use error::StoreError;
pub use extension::{file_extension, mime_extension};
pub use handler::ImageStore;
pub use source::{ImageRequest, ImageSource, StoredImage};
