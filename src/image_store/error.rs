//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载保存链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。

/// 图片保存统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 输入形态不符合预期（data URI 前缀不匹配、Base64 无法解码）。
    #[error("格式错误：{0}")]
    InvalidFormat(String),

    /// `file://` 指向的本地文件不存在。
    #[error("文件不存在：{0}")]
    NotFound(String),

    /// 请求失败或响应状态码非 2xx。
    #[error("网络错误：{0}")]
    Network(String),

    /// 响应成功但没有任何数据。
    #[error("响应缺少数据：{0}")]
    MissingBody(String),

    #[error("超时错误：{0}")]
    Timeout(String),

    /// 创建目录、复制、写入、列目录或删除失败。
    #[error("文件错误：{0}")]
    FileSystem(String),

    /// 目标文件名为空或包含路径成分。
    #[error("文件名无效：{0}")]
    InvalidName(String),

    #[error("配置无效：{0}")]
    InvalidConfig(String),
}

impl StoreError {
    /// 稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFormat(_) => "INVALID_FORMAT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Network(_) => "NETWORK",
            Self::MissingBody(_) => "MISSING_BODY",
            Self::Timeout(_) => "TIMEOUT",
            Self::FileSystem(_) => "FILE_SYSTEM",
            Self::InvalidName(_) => "INVALID_NAME",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }
}

impl From<StoreError> for String {
    /// 兼容部分仍使用字符串错误的调用点。
    fn from(error: StoreError) -> Self {
        error.to_string()
    }
}
