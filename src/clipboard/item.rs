//! 剪贴板条目数据模型
//!
//! # 设计思路
//!
//! `ClipboardPayload` 是带标签的枚举，类型在分类时一次确定，之后所有代码对变体做穷尽匹配。
//! 条目的 `kind` 直接由 payload 变体推导，因此二者不可能不一致。
//! `preview` 与 `thumbnail` 在构造时计算一次，之后只读。
//!
//! 原始字节统一使用 `bytes::Bytes` 保存，快照复制只增加引用计数，不复制像素。

use std::sync::atomic::{AtomicU64, Ordering};

use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use chrono::{DateTime, Local};
use serde::Serialize;

static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);

/// 条目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ClipboardKind {
    Text,
    Image,
    Link,
    BinaryData,
    Unknown,
}

impl ClipboardKind {
    /// 列表中显示在预览前的图标字符
    pub fn glyph(self) -> &'static str {
        match self {
            ClipboardKind::Text => "📝",
            ClipboardKind::Image => "📸",
            ClipboardKind::Link => "🔗",
            ClipboardKind::BinaryData => "📁",
            ClipboardKind::Unknown => "❔",
        }
    }
}

/// RGBA 位图（`width * height * 4` 字节）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBitmap {
    pub width: usize,
    pub height: usize,
    pub rgba: Bytes,
}

impl ImageBitmap {
    pub fn new(width: usize, height: usize, rgba: impl Into<Bytes>) -> Self {
        Self {
            width,
            height,
            rgba: rgba.into(),
        }
    }

    /// 像素数据长度是否与宽高一致
    pub fn is_well_formed(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self
                .width
                .checked_mul(self.height)
                .and_then(|pixels| pixels.checked_mul(4))
                .is_some_and(|expected| expected == self.rgba.len())
    }
}

/// 带原始格式标签的字节数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawData {
    /// 平台格式名（如 `text/rtf`、`public.rtf`、`HTML Format`）
    pub format: String,
    pub bytes: Bytes,
}

impl RawData {
    pub fn new(format: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            format: format.into(),
            bytes: bytes.into(),
        }
    }
}

/// 条目负载，足以原样还原剪贴板内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardPayload {
    Text(String),
    Image(ImageBitmap),
    Link(String),
    Binary(RawData),
    Unknown(RawData),
}

impl ClipboardPayload {
    pub fn kind(&self) -> ClipboardKind {
        match self {
            ClipboardPayload::Text(_) => ClipboardKind::Text,
            ClipboardPayload::Image(_) => ClipboardKind::Image,
            ClipboardPayload::Link(_) => ClipboardKind::Link,
            ClipboardPayload::Binary(_) => ClipboardKind::BinaryData,
            ClipboardPayload::Unknown(_) => ClipboardKind::Unknown,
        }
    }
}

/// 缩略图（RGBA）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub rgba: Bytes,
}

impl Thumbnail {
    /// 编码为 `data:image/png;base64,...`，供 Web 类界面直接显示
    pub fn to_data_url(&self) -> Option<String> {
        let img = image::RgbaImage::from_raw(self.width, self.height, self.rgba.to_vec())?;

        let mut buf = std::io::Cursor::new(Vec::new());
        if let Err(e) = img.write_to(&mut buf, image::ImageFormat::Png) {
            log::warn!("缩略图 PNG 编码失败: {}", e);
            return None;
        }

        let b64 = general_purpose::STANDARD.encode(buf.into_inner());
        Some(format!("data:image/png;base64,{}", b64))
    }
}

/// 一条剪贴板历史记录
///
/// 只能通过分类器构造；字段对外只读。
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardItem {
    id: u64,
    payload: ClipboardPayload,
    preview: String,
    thumbnail: Option<Thumbnail>,
    created_at: DateTime<Local>,
}

impl ClipboardItem {
    pub(crate) fn new(
        payload: ClipboardPayload,
        preview: String,
        thumbnail: Option<Thumbnail>,
    ) -> Self {
        Self {
            id: NEXT_ITEM_ID.fetch_add(1, Ordering::Relaxed),
            payload,
            preview,
            thumbnail,
            created_at: Local::now(),
        }
    }

    /// 进程内单调递增的标识，兼作同一时刻捕获时的排序依据
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> ClipboardKind {
        self.payload.kind()
    }

    pub fn payload(&self) -> &ClipboardPayload {
        &self.payload
    }

    pub fn preview(&self) -> &str {
        &self.preview
    }

    pub fn thumbnail(&self) -> Option<&Thumbnail> {
        self.thumbnail.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    /// 去重键：只有文本条目参与去重
    pub(crate) fn equivalence_key(&self) -> Option<&str> {
        match &self.payload {
            ClipboardPayload::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// 转换为可序列化的展示模型
    pub fn to_view(&self) -> ItemView {
        ItemView {
            id: self.id,
            kind: self.kind(),
            glyph: self.kind().glyph(),
            preview: self.preview.clone(),
            thumbnail: self.thumbnail.as_ref().and_then(Thumbnail::to_data_url),
            created_at: self.created_at.to_rfc3339(),
        }
    }
}

/// 提供给界面协作方的只读展示模型
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: u64,
    pub kind: ClipboardKind,
    pub glyph: &'static str,
    pub preview: String,
    pub thumbnail: Option<String>,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_payload_variant() {
        let raw = RawData::new("text/rtf", vec![1_u8, 2, 3]);
        assert_eq!(ClipboardPayload::Text("a".into()).kind(), ClipboardKind::Text);
        assert_eq!(ClipboardPayload::Link("https://a".into()).kind(), ClipboardKind::Link);
        assert_eq!(ClipboardPayload::Binary(raw.clone()).kind(), ClipboardKind::BinaryData);
        assert_eq!(ClipboardPayload::Unknown(raw).kind(), ClipboardKind::Unknown);
    }

    #[test]
    fn ids_are_strictly_increasing() {
        let a = ClipboardItem::new(ClipboardPayload::Text("a".into()), "a".into(), None);
        let b = ClipboardItem::new(ClipboardPayload::Text("b".into()), "b".into(), None);
        assert!(b.id() > a.id());
    }

    #[test]
    fn only_text_has_equivalence_key() {
        let text = ClipboardItem::new(ClipboardPayload::Text("x".into()), "x".into(), None);
        let link = ClipboardItem::new(ClipboardPayload::Link("x".into()), "x".into(), None);
        assert_eq!(text.equivalence_key(), Some("x"));
        assert_eq!(link.equivalence_key(), None);
    }

    #[test]
    fn bitmap_shape_check() {
        assert!(ImageBitmap::new(2, 2, vec![0_u8; 16]).is_well_formed());
        assert!(!ImageBitmap::new(2, 2, vec![0_u8; 15]).is_well_formed());
        assert!(!ImageBitmap::new(0, 2, Vec::<u8>::new()).is_well_formed());
    }

    #[test]
    fn thumbnail_exports_png_data_url() {
        let thumb = Thumbnail {
            width: 2,
            height: 1,
            rgba: Bytes::from(vec![255_u8, 0, 0, 255, 0, 255, 0, 255]),
        };
        let url = thumb.to_data_url().expect("valid thumbnail");
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn view_serializes_in_camel_case() {
        let item = ClipboardItem::new(ClipboardPayload::Text("hi".into()), "hi".into(), None);
        let value = serde_json::to_value(item.to_view()).expect("serialize");
        assert_eq!(value["kind"], "text");
        assert_eq!(value["preview"], "hi");
        assert!(value.get("createdAt").is_some());
        assert!(value["thumbnail"].is_null());
    }
}
