//! 系统剪贴板适配器
//!
//! # 设计思路
//!
//! - **文本 / 图片**：沿用 `arboard`，每次操作新建 `Clipboard` 实例
//! - **富文本 / HTML / 其他格式**：`arboard` 不提供，改用 `clipboard-rs` 读取原始字节
//! - **链接**：macOS 直接读写 `NSPasteboard` 的 `public.url` / `NSURL`；
//!   其他平台没有独立的 URL 表示，单个绝对 URL 形式的文本视为链接
//! - **变化令牌**：
//!   - macOS：`NSPasteboard.changeCount`
//!   - Windows：`GetClipboardSequenceNumber`
//!   - 其他：没有系统计数器，对内容取指纹，指纹变化时本地计数加一
//!
//! # 实现思路
//!
//! 写入前先清空剪贴板，然后只设置一种原生表示；写入完成后重新读取令牌返回给调用方，
//! 供 `OwnWriteTracker` 识别自写入。

use std::borrow::Cow;

#[cfg(not(any(target_os = "macos", windows)))]
use std::sync::Mutex;

use bytes::Bytes;
use clipboard_rs::{Clipboard as _, ClipboardContext, ContentFormat};

use super::item::{ClipboardPayload, ImageBitmap, RawData};
use super::{ChangeToken, ClipboardBackend, ClipboardRead};
use crate::error::AppError;

const RTF_FORMAT: &str = "text/rtf";
const HTML_FORMAT: &str = "text/html";

/// 真实系统剪贴板
#[derive(Debug, Default)]
pub struct SystemClipboard {
    #[cfg(not(any(target_os = "macos", windows)))]
    fingerprint: Mutex<FingerprintCounter>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

fn open_arboard() -> Result<arboard::Clipboard, AppError> {
    arboard::Clipboard::new().map_err(|e| AppError::Clipboard(e.to_string()))
}

fn open_raw_context() -> Result<ClipboardContext, AppError> {
    ClipboardContext::new().map_err(|e| AppError::Clipboard(e.to_string()))
}

fn write_failed(err: impl std::fmt::Display) -> AppError {
    AppError::ClipboardWriteFailed(err.to_string())
}

impl ClipboardBackend for SystemClipboard {
    fn change_token(&self) -> Result<ChangeToken, AppError> {
        #[cfg(target_os = "macos")]
        {
            pasteboard::change_count()
                .map(|count| ChangeToken(count as u64))
                .ok_or_else(|| AppError::Clipboard("无法访问 NSPasteboard".to_string()))
        }

        #[cfg(windows)]
        {
            use windows::Win32::System::DataExchange::GetClipboardSequenceNumber;
            let sequence = unsafe { GetClipboardSequenceNumber() };
            Ok(ChangeToken(u64::from(sequence)))
        }

        #[cfg(not(any(target_os = "macos", windows)))]
        {
            let fingerprint = content_fingerprint()?;
            let mut counter = match self.fingerprint.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            Ok(ChangeToken(counter.observe(fingerprint)))
        }
    }

    fn read(&self) -> Result<ClipboardRead, AppError> {
        let mut clipboard = open_arboard()?;
        let mut read = ClipboardRead::default();

        if let Ok(image) = clipboard.get_image() {
            read.image = Some(ImageBitmap::new(
                image.width,
                image.height,
                Bytes::from(image.bytes.into_owned()),
            ));
        }

        read.text = clipboard.get_text().ok();
        read.url = read_url(read.text.as_deref());

        if read.image.is_some() || read.url.is_some() || read.text.is_some() {
            return Ok(read);
        }

        let ctx = open_raw_context()?;
        if ctx.has(ContentFormat::Rtf) {
            if let Ok(rtf) = ctx.get_rich_text() {
                read.rich = Some(RawData::new(RTF_FORMAT, rtf.into_bytes()));
            }
        } else if ctx.has(ContentFormat::Html) {
            if let Ok(html) = ctx.get_html() {
                read.rich = Some(RawData::new(HTML_FORMAT, html.into_bytes()));
            }
        }

        if read.rich.is_none() {
            read.other = read_first_raw_format(&ctx);
        }

        Ok(read)
    }

    fn write(&self, payload: &ClipboardPayload) -> Result<ChangeToken, AppError> {
        match payload {
            ClipboardPayload::Text(text) => {
                let mut clipboard = open_arboard().map_err(write_failed)?;
                clipboard.clear().map_err(write_failed)?;
                clipboard.set_text(text.clone()).map_err(write_failed)?;
            }
            ClipboardPayload::Image(bitmap) => {
                let mut clipboard = open_arboard().map_err(write_failed)?;
                clipboard.clear().map_err(write_failed)?;
                clipboard
                    .set_image(arboard::ImageData {
                        width: bitmap.width,
                        height: bitmap.height,
                        bytes: Cow::Owned(bitmap.rgba.to_vec()),
                    })
                    .map_err(write_failed)?;
            }
            ClipboardPayload::Link(url) => write_url(url)?,
            ClipboardPayload::Binary(raw) | ClipboardPayload::Unknown(raw) => write_raw(raw)?,
        }

        log::debug!("📋 已回写剪贴板 ({:?})", payload.kind());
        self.change_token()
    }
}

fn read_first_raw_format(ctx: &ClipboardContext) -> Option<RawData> {
    let formats = ctx.available_formats().ok()?;
    formats.into_iter().find_map(|format| match ctx.get_buffer(&format) {
        Ok(buffer) if !buffer.is_empty() => Some(RawData::new(format, buffer)),
        _ => None,
    })
}

fn write_raw(raw: &RawData) -> Result<(), AppError> {
    let ctx = open_raw_context().map_err(write_failed)?;
    ctx.clear().map_err(write_failed)?;

    let as_utf8 = std::str::from_utf8(&raw.bytes).ok().map(str::to_string);
    match (raw.format.as_str(), as_utf8) {
        (RTF_FORMAT, Some(rtf)) => ctx.set_rich_text(rtf).map_err(write_failed),
        (HTML_FORMAT, Some(html)) => ctx.set_html(html).map_err(write_failed),
        _ => ctx
            .set_buffer(&raw.format, raw.bytes.to_vec())
            .map_err(write_failed),
    }
}

// ============================================================================
// 链接表示
// ============================================================================

#[cfg(target_os = "macos")]
fn read_url(_text: Option<&str>) -> Option<String> {
    pasteboard::read_url()
}

#[cfg(not(target_os = "macos"))]
fn read_url(text: Option<&str>) -> Option<String> {
    let candidate = text?.trim();
    if candidate.is_empty() || candidate.contains(char::is_whitespace) {
        return None;
    }
    let parsed = url::Url::parse(candidate).ok()?;
    matches!(parsed.scheme(), "http" | "https" | "ftp" | "file").then(|| candidate.to_string())
}

#[cfg(target_os = "macos")]
fn write_url(url: &str) -> Result<(), AppError> {
    if pasteboard::write_url(url) {
        Ok(())
    } else {
        Err(AppError::ClipboardWriteFailed(format!("无法写入 NSURL: {}", url)))
    }
}

#[cfg(not(target_os = "macos"))]
fn write_url(url: &str) -> Result<(), AppError> {
    let mut clipboard = open_arboard().map_err(write_failed)?;
    clipboard.clear().map_err(write_failed)?;
    clipboard.set_text(url.to_string()).map_err(write_failed)
}

#[cfg(target_os = "macos")]
mod pasteboard {
    use std::ffi::CStr;

    use cocoa::appkit::NSPasteboard;
    use cocoa::base::{id, nil, BOOL, YES};
    use cocoa::foundation::{NSArray, NSInteger, NSString};
    use objc::{class, msg_send, sel, sel_impl};

    const URL_PASTEBOARD_TYPE: &str = "public.url";

    fn general() -> Option<id> {
        let pasteboard: id = unsafe { NSPasteboard::generalPasteboard(nil) };
        (!pasteboard.is_null()).then_some(pasteboard)
    }

    pub(super) fn change_count() -> Option<i64> {
        let pasteboard = general()?;
        let count: NSInteger = unsafe { msg_send![pasteboard, changeCount] };
        Some(count as i64)
    }

    pub(super) fn read_url() -> Option<String> {
        let pasteboard = general()?;
        unsafe {
            let pasteboard_type = NSString::alloc(nil).init_str(URL_PASTEBOARD_TYPE);
            let value: id = msg_send![pasteboard, stringForType: pasteboard_type];
            let _: () = msg_send![pasteboard_type, release];
            if value.is_null() {
                return None;
            }
            let ptr = value.UTF8String();
            if ptr.is_null() {
                return None;
            }
            Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
        }
    }

    pub(super) fn write_url(url: &str) -> bool {
        let Some(pasteboard) = general() else {
            return false;
        };
        unsafe {
            let string = NSString::alloc(nil).init_str(url);
            let nsurl: id = msg_send![class!(NSURL), URLWithString: string];
            let _: () = msg_send![string, release];
            if nsurl.is_null() {
                return false;
            }
            let objects = NSArray::arrayWithObject(nil, nsurl);
            let _: NSInteger = msg_send![pasteboard, clearContents];
            let ok: BOOL = msg_send![pasteboard, writeObjects: objects];
            ok == YES
        }
    }
}

// ============================================================================
// 内容指纹（无系统计数器的平台）
// ============================================================================

#[cfg(not(any(target_os = "macos", windows)))]
#[derive(Debug, Default)]
struct FingerprintCounter {
    last: Option<u64>,
    counter: u64,
}

#[cfg(not(any(target_os = "macos", windows)))]
impl FingerprintCounter {
    fn observe(&mut self, fingerprint: u64) -> u64 {
        if self.last != Some(fingerprint) {
            self.last = Some(fingerprint);
            self.counter += 1;
        }
        self.counter
    }
}

#[cfg(not(any(target_os = "macos", windows)))]
fn content_fingerprint() -> Result<u64, AppError> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    let mut clipboard = open_arboard()?;

    clipboard.get_text().ok().hash(&mut hasher);
    if let Ok(image) = clipboard.get_image() {
        (image.width, image.height).hash(&mut hasher);
        image.bytes.hash(&mut hasher);
    }
    if let Ok(ctx) = open_raw_context() {
        ctx.available_formats().unwrap_or_default().hash(&mut hasher);
    }

    Ok(hasher.finish())
}
