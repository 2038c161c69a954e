//! # 扩展名推断
//!
//! 优先级：Content-Type → URL 路径末尾扩展名（白名单内）→ 默认 `jpg`。
//! 仅在 `ExtensionPolicy::Detect` 下参与落盘命名。

const DEFAULT_EXTENSION: &str = "jpg";

/// URL 路径允许直接采用的扩展名。
const KNOWN_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "gif", "webp", "svg", "bmp", "tiff"];

/// 已知图片 MIME 到扩展名的映射，忽略参数与大小写。
pub fn mime_extension(content_type: &str) -> Option<&'static str> {
    let base = content_type.split(';').next()?.trim().to_ascii_lowercase();

    match base.as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/svg+xml" => Some("svg"),
        "image/bmp" => Some("bmp"),
        "image/tiff" => Some("tiff"),
        _ => None,
    }
}

/// 根据 URL 与可选的 Content-Type 推断文件扩展名。
///
/// # 示例
/// ```rust
/// use image_store::file_extension;
///
/// assert_eq!(file_extension("https://a.com/x", Some("image/webp")), "webp");
/// assert_eq!(file_extension("https://a.com/photo.JPEG?w=200", None), "jpg");
/// assert_eq!(file_extension("https://a.com/download", None), "jpg");
/// ```
pub fn file_extension(url: &str, content_type: Option<&str>) -> &'static str {
    if let Some(ext) = content_type.and_then(mime_extension) {
        return ext;
    }

    url_extension(url).unwrap_or(DEFAULT_EXTENSION)
}

fn url_extension(url: &str) -> Option<&'static str> {
    let path = url.split(['?', '#']).next()?;
    let last_segment = path.rsplit('/').next()?;
    let (_, ext) = last_segment.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();

    if ext == "jpeg" {
        return Some("jpg");
    }

    KNOWN_EXTENSIONS.iter().copied().find(|known| *known == ext)
}
