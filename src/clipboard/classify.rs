//! 内容分类器
//!
//! # 设计思路
//!
//! 一次剪贴板读取可能同时提供多种表示，这里按固定优先级只取其一：
//!
//! ```text
//! Image > Link(URL) > Text > BinaryData(富文本等原始格式) > Unknown
//! ```
//!
//! 全部表示都不存在时返回 `AppError::NoSupportedRepresentation`，
//! 由调用方静默忽略。`Unknown` 与之不同：它表示存在一种无法识别的格式。
//!
//! # 实现思路
//!
//! - 纯函数，不做任何 I/O；预览与缩略图在此一次算好，之后不可变。
//! - 任何文本表示（包括纯空白）都记为 Text，预览去除首尾空白后可能为空。
//! - 链接负载保留剪贴板上的原始字符串，`Url` 只用于校验与生成预览。
//! - 链接预览取 URL 最后一个非空路径段（百分号解码），没有路径时显示整个 URL。

use url::Url;

use super::item::{ClipboardItem, ClipboardPayload, ImageBitmap, RawData};
use super::thumbnail::make_thumbnail;
use super::ClipboardRead;
use crate::error::AppError;
use crate::settings::AppSettings;

const IMAGE_PREVIEW: &str = "Image";
const UNKNOWN_PREVIEW: &str = "Unknown content";
const ELLIPSIS: &str = "...";

/// 分类参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyOptions {
    pub preview_chars: usize,
    pub thumbnail_size: u32,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            preview_chars: 50,
            thumbnail_size: 32,
        }
    }
}

impl From<&AppSettings> for ClassifyOptions {
    fn from(settings: &AppSettings) -> Self {
        Self {
            preview_chars: settings.preview_chars,
            thumbnail_size: settings.thumbnail_size,
        }
    }
}

/// 按优先级选出一种表示并构造条目
pub fn classify(read: ClipboardRead, options: &ClassifyOptions) -> Result<ClipboardItem, AppError> {
    let ClipboardRead {
        image,
        url,
        text,
        rich,
        other,
    } = read;

    if let Some(bitmap) = image.filter(ImageBitmap::is_well_formed) {
        let thumbnail = make_thumbnail(&bitmap, options.thumbnail_size);
        return Ok(ClipboardItem::new(
            ClipboardPayload::Image(bitmap),
            IMAGE_PREVIEW.to_string(),
            thumbnail,
        ));
    }

    if let Some((raw, link)) = url.as_deref().and_then(parse_link) {
        let preview = link_preview(&link);
        return Ok(ClipboardItem::new(
            ClipboardPayload::Link(raw),
            preview,
            None,
        ));
    }

    if let Some(text) = text {
        let preview = text_preview(&text, options.preview_chars);
        return Ok(ClipboardItem::new(ClipboardPayload::Text(text), preview, None));
    }

    if let Some(raw) = rich.filter(|r| !r.bytes.is_empty()) {
        let preview = binary_preview(&raw);
        return Ok(ClipboardItem::new(ClipboardPayload::Binary(raw), preview, None));
    }

    if let Some(raw) = other {
        return Ok(ClipboardItem::new(
            ClipboardPayload::Unknown(raw),
            UNKNOWN_PREVIEW.to_string(),
            None,
        ));
    }

    Err(AppError::NoSupportedRepresentation)
}

/// 截取前 `max_chars` 个字符并去除首尾空白，原文更长时追加省略号
pub(crate) fn text_preview(text: &str, max_chars: usize) -> String {
    let head: String = text.chars().take(max_chars).collect();
    let mut preview = head.trim().to_string();
    if text.chars().count() > max_chars {
        preview.push_str(ELLIPSIS);
    }
    preview
}

/// 校验链接；负载保留原始字符串，解析结果只用于预览
fn parse_link(raw: &str) -> Option<(String, Url)> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match Url::parse(trimmed) {
        Ok(url) => Some((trimmed.to_string(), url)),
        Err(e) => {
            log::debug!("URL 表示无法解析，忽略: {}", e);
            None
        }
    }
}

pub(crate) fn link_preview(url: &Url) -> String {
    let last_segment = url
        .path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()));

    match last_segment {
        Some(segment) => urlencoding::decode(segment)
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| segment.to_string()),
        None => url.to_string(),
    }
}

fn binary_preview(raw: &RawData) -> String {
    format!("Data ({} bytes)", raw.bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::item::ClipboardKind;

    fn bitmap() -> ImageBitmap {
        ImageBitmap::new(64, 64, vec![10_u8; 64 * 64 * 4])
    }

    #[test]
    fn image_wins_over_text() {
        let read = ClipboardRead {
            image: Some(bitmap()),
            text: Some("caption".into()),
            ..ClipboardRead::default()
        };
        let item = classify(read, &ClassifyOptions::default()).expect("classified");
        assert_eq!(item.kind(), ClipboardKind::Image);
        assert_eq!(item.preview(), "Image");
        let thumb = item.thumbnail().expect("thumbnail");
        assert!(thumb.width <= 32 && thumb.height <= 32);
    }

    #[test]
    fn link_wins_over_text() {
        let read = ClipboardRead {
            url: Some("https://example.com/docs/guide.html".into()),
            text: Some("https://example.com/docs/guide.html".into()),
            ..ClipboardRead::default()
        };
        let item = classify(read, &ClassifyOptions::default()).expect("classified");
        assert_eq!(item.kind(), ClipboardKind::Link);
        assert_eq!(item.preview(), "guide.html");
        assert!(item.thumbnail().is_none());
    }

    #[test]
    fn text_wins_over_rich_data() {
        let read = ClipboardRead {
            text: Some("plain".into()),
            rich: Some(RawData::new("text/rtf", b"{\\rtf1 plain}".to_vec())),
            ..ClipboardRead::default()
        };
        let item = classify(read, &ClassifyOptions::default()).expect("classified");
        assert_eq!(item.kind(), ClipboardKind::Text);
    }

    #[test]
    fn rich_only_is_binary_with_length() {
        let read = ClipboardRead {
            rich: Some(RawData::new("text/rtf", vec![0_u8; 12])),
            ..ClipboardRead::default()
        };
        let item = classify(read, &ClassifyOptions::default()).expect("classified");
        assert_eq!(item.kind(), ClipboardKind::BinaryData);
        assert_eq!(item.preview(), "Data (12 bytes)");
    }

    #[test]
    fn unrecognized_format_is_unknown() {
        let read = ClipboardRead {
            other: Some(RawData::new("com.vendor.blob", vec![1_u8])),
            ..ClipboardRead::default()
        };
        let item = classify(read, &ClassifyOptions::default()).expect("classified");
        assert_eq!(item.kind(), ClipboardKind::Unknown);
        assert_eq!(item.preview(), "Unknown content");
    }

    #[test]
    fn nothing_present_is_no_supported_representation() {
        let result = classify(ClipboardRead::default(), &ClassifyOptions::default());
        assert!(matches!(result, Err(AppError::NoSupportedRepresentation)));
    }

    #[test]
    fn blank_text_is_still_text() {
        let item = classify(ClipboardRead::text("  \n\t"), &ClassifyOptions::default())
            .expect("classified");
        assert_eq!(item.kind(), ClipboardKind::Text);
        assert_eq!(item.payload(), &ClipboardPayload::Text("  \n\t".into()));
        assert_eq!(item.preview(), "");
    }

    #[test]
    fn blank_text_wins_over_rich_data() {
        let read = ClipboardRead {
            text: Some(" ".into()),
            rich: Some(RawData::new("text/rtf", vec![1_u8, 2, 3])),
            ..ClipboardRead::default()
        };
        let item = classify(read, &ClassifyOptions::default()).expect("classified");
        assert_eq!(item.kind(), ClipboardKind::Text);
    }

    #[test]
    fn link_payload_keeps_original_spelling() {
        let read = ClipboardRead {
            url: Some("https://Example.com".into()),
            ..ClipboardRead::default()
        };
        let item = classify(read, &ClassifyOptions::default()).expect("classified");
        assert_eq!(item.payload(), &ClipboardPayload::Link("https://Example.com".into()));
        assert_eq!(item.preview(), "https://example.com/");
    }

    #[test]
    fn malformed_image_falls_through_to_text() {
        let read = ClipboardRead {
            image: Some(ImageBitmap::new(4, 4, vec![0_u8; 5])),
            text: Some("fallback".into()),
            ..ClipboardRead::default()
        };
        let item = classify(read, &ClassifyOptions::default()).expect("classified");
        assert_eq!(item.kind(), ClipboardKind::Text);
    }

    #[test]
    fn sixty_chars_truncate_with_ellipsis() {
        let text = "a".repeat(60);
        let preview = text_preview(&text, 50);
        assert_eq!(preview, format!("{}...", "a".repeat(50)));
    }

    #[test]
    fn forty_chars_are_kept_whole() {
        let text = "b".repeat(40);
        assert_eq!(text_preview(&text, 50), text);
    }

    #[test]
    fn preview_trims_and_counts_chars_not_bytes() {
        assert_eq!(text_preview("  你好，世界  ", 50), "你好，世界");
        assert_eq!(text_preview("你好你好你好", 4), "你好你好...");
    }

    #[test]
    fn link_preview_uses_last_segment_or_whole_url() {
        let with_path = Url::parse("https://example.com/a/b%20c/").expect("url");
        assert_eq!(link_preview(&with_path), "b c");

        let bare = Url::parse("https://example.com").expect("url");
        assert_eq!(link_preview(&bare), "https://example.com/");
    }

    #[test]
    fn garbage_url_representation_is_ignored() {
        let read = ClipboardRead {
            url: Some("not a url".into()),
            text: Some("not a url".into()),
            ..ClipboardRead::default()
        };
        let item = classify(read, &ClassifyOptions::default()).expect("classified");
        assert_eq!(item.kind(), ClipboardKind::Text);
    }
}
