//! 剪贴板轮询器
//!
//! # 设计思路
//!
//! 以固定间隔（默认 500ms）比较剪贴板变化令牌，而不是依赖系统变化通知：
//!
//! ```text
//! Idle ──tick──▶ Checking ──令牌未变──▶ Idle
//!                    │
//!                    └─令牌变化─▶ 先记录新令牌 ─▶ Extracting ──有内容──▶ 插入历史 ─▶ Idle
//!                                                     └──无可识别内容 / 读取失败──▶ Idle
//! ```
//!
//! - 先更新令牌再读取，读取失败也不会在下一次 tick 重复处理同一次变化。
//! - 令牌与 `OwnWriteTracker` 记录一致时跳过，避免把自己回写的内容当作新条目。
//! - 启动时没有基准令牌，首次 tick 会把当前剪贴板内容收入历史。
//!
//! # 实现思路
//!
//! `tick` 是同步的单步函数，由持有 UI 的事件循环用 `tokio::time::interval` 驱动；
//! 每一步返回 `TickOutcome`，便于测试与日志。禁用后 tick 直接返回，
//! 正在执行的 tick 会完整结束。

use std::sync::Arc;

use super::classify::{classify, ClassifyOptions};
use super::history::HistoryStore;
use super::item::{ClipboardItem, ClipboardKind};
use super::{ChangeToken, ClipboardBackend, OwnWriteTracker};
use crate::error::AppError;

/// 单次 tick 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// 轮询器已禁用
    Disabled,
    /// 令牌未变化
    Unchanged,
    /// 本应用自身的回写
    OwnWrite,
    /// 捕获了新条目
    Captured(ClipboardKind),
    /// 有变化但没有产生条目
    Ignored,
}

pub struct ClipboardWatcher<B: ClipboardBackend> {
    backend: B,
    own_writes: Arc<OwnWriteTracker>,
    options: ClassifyOptions,
    last_token: Option<ChangeToken>,
    enabled: bool,
}

impl<B: ClipboardBackend> ClipboardWatcher<B> {
    pub fn new(backend: B, own_writes: Arc<OwnWriteTracker>, options: ClassifyOptions) -> Self {
        Self {
            backend,
            own_writes,
            options,
            last_token: None,
            enabled: true,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            log::info!("📋 剪贴板轮询已{}", if enabled { "启用" } else { "停用" });
        }
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn last_token(&self) -> Option<ChangeToken> {
        self.last_token
    }

    /// 执行一次轮询
    pub fn tick(&mut self, history: &HistoryStore) -> TickOutcome {
        if !self.enabled {
            return TickOutcome::Disabled;
        }

        let token = match self.backend.change_token() {
            Ok(token) => token,
            Err(err) => {
                log::debug!("读取剪贴板变化令牌失败: {}", err);
                return TickOutcome::Unchanged;
            }
        };

        if self.last_token == Some(token) {
            return TickOutcome::Unchanged;
        }
        self.last_token = Some(token);

        if self.own_writes.consume(token) {
            log::debug!("⏭️  忽略本应用回写造成的剪贴板变化 {:?}", token);
            return TickOutcome::OwnWrite;
        }

        match self.extract() {
            Ok(item) => {
                let kind = item.kind();
                log::debug!("📋 捕获剪贴板条目 #{} ({:?})", item.id(), kind);
                history.insert(item);
                TickOutcome::Captured(kind)
            }
            Err(err) if err.is_silent() => {
                log::debug!("剪贴板变化 {:?} 中没有可识别内容", token);
                TickOutcome::Ignored
            }
            Err(err) => {
                log::warn!("读取剪贴板内容失败: {}", err);
                TickOutcome::Ignored
            }
        }
    }

    fn extract(&self) -> Result<ClipboardItem, AppError> {
        let read = self.backend.read()?;
        classify(read, &self.options)
    }
}
