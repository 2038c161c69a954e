//! `StoreConfig` 的 JSON 持久化。
//!
//! 配置文件不存在时回退默认值；字段缺省由 `#[serde(default)]` 补齐。

use std::fs;
use std::path::Path;

use crate::error::AppError;
use crate::image_store::StoreConfig;

pub fn load_config(path: &Path) -> Result<StoreConfig, AppError> {
    if !path.exists() {
        log::debug!("配置文件不存在，使用默认配置: {}", path.display());
        return Ok(StoreConfig::default());
    }

    let content = fs::read_to_string(path)?;
    let config = serde_json::from_str::<StoreConfig>(&content)
        .map_err(|e| AppError::Settings(format!("解析配置文件 '{}' 失败: {}", path.display(), e)))?;

    config.validate()?;
    Ok(config)
}

pub fn save_config(path: &Path, config: &StoreConfig) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| AppError::Settings(format!("序列化配置失败: {}", e)))?;

    fs::write(path, content)?;
    Ok(())
}
