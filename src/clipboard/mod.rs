//! 剪贴板管理模块
//!
//! # 设计思路
//!
//! 统一管理剪贴板相关的核心能力：
//! - **端口**：`ClipboardBackend` 抽象系统剪贴板的"变化令牌 / 读取 / 写入"三个操作，
//!   真实实现位于 `system`，内存实现位于 `memory`
//! - **分类**：`classify` 按 Image > Link > Text > BinaryData 的优先级生成条目
//! - **历史**：`history` 维护有界、去重的历史列表并推送快照
//! - **轮询**：`watcher` 比较变化令牌，发现外部变化后交给分类器与历史
//! - **自写入识别**：`OwnWriteTracker` 记录本应用回写剪贴板后的令牌，
//!   轮询器据此跳过自身造成的变化
//!
//! # 实现思路
//!
//! - `ChangeToken` 只做相等比较，不解释其数值。
//! - `OwnWriteTracker` 使用 `AtomicBool` + `AtomicU64`，通过 `Arc` 在选择控制器与轮询器之间共享。
//! - 读取结果 `ClipboardRead` 同时携带所有可用表示，由分类器决定取哪一个。

pub mod classify;
pub mod history;
pub mod item;
pub mod memory;
pub mod system;
pub mod thumbnail;
pub mod watcher;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::error::AppError;

pub use classify::{classify, ClassifyOptions};
pub use history::{HistoryStore, DEFAULT_HISTORY_CAPACITY};
pub use item::{
    ClipboardItem, ClipboardKind, ClipboardPayload, ImageBitmap, ItemView, RawData, Thumbnail,
};
pub use memory::MemoryClipboard;
pub use system::SystemClipboard;
pub use watcher::{ClipboardWatcher, TickOutcome};

/// 系统剪贴板的变化令牌
///
/// 内容每变化一次令牌就会改变；只用于相等比较。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChangeToken(pub u64);

/// 一次剪贴板读取的全部表示
///
/// 各字段相互独立，同一次复制可能同时提供多种表示（如浏览器复制图片时附带 URL）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardRead {
    pub image: Option<ImageBitmap>,
    pub url: Option<String>,
    pub text: Option<String>,
    /// 富文本等可识别的原始格式
    pub rich: Option<RawData>,
    /// 其余无法识别的格式
    pub other: Option<RawData>,
}

impl ClipboardRead {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_none()
            && self.url.is_none()
            && self.text.is_none()
            && self.rich.is_none()
            && self.other.is_none()
    }
}

/// 系统剪贴板端口
pub trait ClipboardBackend {
    /// 读取当前变化令牌
    fn change_token(&self) -> Result<ChangeToken, AppError>;

    /// 读取当前内容的全部表示
    fn read(&self) -> Result<ClipboardRead, AppError>;

    /// 清空剪贴板后写入一种原生表示，返回写入后的变化令牌
    fn write(&self, payload: &ClipboardPayload) -> Result<ChangeToken, AppError>;
}

impl<B: ClipboardBackend + ?Sized> ClipboardBackend for std::sync::Arc<B> {
    fn change_token(&self) -> Result<ChangeToken, AppError> {
        (**self).change_token()
    }

    fn read(&self) -> Result<ClipboardRead, AppError> {
        (**self).read()
    }

    fn write(&self, payload: &ClipboardPayload) -> Result<ChangeToken, AppError> {
        (**self).write(payload)
    }
}

// ============================================================================
// 自写入识别
// ============================================================================

/// 记录本应用最近一次回写剪贴板后的令牌
///
/// 回写成功后调用 `record`；轮询器发现令牌变化时调用 `consume`，
/// 若令牌与记录一致则说明是自身写入，应当跳过。
/// 记录只生效一次：无论是否匹配，`consume` 都会清除它。
#[derive(Debug, Default)]
pub struct OwnWriteTracker {
    armed: AtomicBool,
    token: AtomicU64,
}

impl OwnWriteTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, token: ChangeToken) {
        self.token.store(token.0, Ordering::SeqCst);
        self.armed.store(true, Ordering::SeqCst);
        log::debug!("🚫 已记录自写入令牌 {:?}，下一次对应变化将被忽略", token);
    }

    /// 观察到的令牌是否为自身写入
    pub fn consume(&self, observed: ChangeToken) -> bool {
        if !self.armed.swap(false, Ordering::SeqCst) {
            return false;
        }
        self.token.load(Ordering::SeqCst) == observed.0
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_matches_recorded_token_once() {
        let tracker = OwnWriteTracker::new();
        tracker.record(ChangeToken(7));
        assert!(tracker.consume(ChangeToken(7)));
        assert!(!tracker.consume(ChangeToken(7)));
    }

    #[test]
    fn tracker_disarms_on_foreign_token() {
        let tracker = OwnWriteTracker::new();
        tracker.record(ChangeToken(7));
        assert!(!tracker.consume(ChangeToken(8)));
        assert!(!tracker.is_armed());
    }

    #[test]
    fn unarmed_tracker_never_matches() {
        let tracker = OwnWriteTracker::new();
        assert!(!tracker.consume(ChangeToken(0)));
    }

    #[test]
    fn read_emptiness() {
        assert!(ClipboardRead::default().is_empty());
        assert!(!ClipboardRead::text("a").is_empty());
    }
}
