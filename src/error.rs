//! 统一错误类型模块
//!
//! # 设计思路
//!
//! `image_store` 内部使用细粒度的 `StoreError`，而配置加载与命令行入口
//! 还会遇到 JSON 解析、文件读写等错误。这里定义应用级 `AppError`，
//! 让上层只需处理一种错误类型。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `StoreError` 与 `std::io::Error` 提供 `From` 转换，`?` 直接上抛。
//! - 实现 `Serialize`，便于以字符串形式返回给外部调用方。

use serde::Serialize;

use crate::image_store::StoreError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 图片保存链路错误（下载 / 解码 / 写入 / 清理）
    #[error("{0}")]
    Store(#[from] StoreError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 配置文件读写或解析失败
    #[error("配置错误: {0}")]
    Settings(String),
}

impl AppError {
    /// 稳定错误码，便于脚本或上层服务按类型分支。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Store(inner) => inner.code(),
            Self::Io(_) => "IO",
            Self::Settings(_) => "SETTINGS",
        }
    }
}

/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
