//! 内存剪贴板
//!
//! 不依赖任何系统接口的 `ClipboardBackend` 实现，用于无图形环境运行与测试。
//! 每次写入（包括模拟的外部复制）都会让变化令牌加一。

use std::sync::{Mutex, MutexGuard};

use super::item::ClipboardPayload;
use super::{ChangeToken, ClipboardBackend, ClipboardRead};
use crate::error::AppError;

#[derive(Debug, Default)]
struct MemoryState {
    token: u64,
    content: ClipboardRead,
    writes: Vec<ClipboardPayload>,
    fail_writes: bool,
}

#[derive(Debug, Default)]
pub struct MemoryClipboard {
    state: Mutex<MemoryState>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// 模拟其他应用复制了内容
    pub fn set_external(&self, read: ClipboardRead) {
        let mut state = self.lock();
        state.content = read;
        state.token += 1;
    }

    pub fn set_external_text(&self, text: &str) {
        self.set_external(ClipboardRead::text(text));
    }

    /// 当前内容
    pub fn content(&self) -> ClipboardRead {
        self.lock().content.clone()
    }

    /// 本应用写入过的全部负载
    pub fn writes(&self) -> Vec<ClipboardPayload> {
        self.lock().writes.clone()
    }

    /// 让后续写入失败，用于验证回写失败路径
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }
}

impl ClipboardBackend for MemoryClipboard {
    fn change_token(&self) -> Result<ChangeToken, AppError> {
        Ok(ChangeToken(self.lock().token))
    }

    fn read(&self) -> Result<ClipboardRead, AppError> {
        Ok(self.lock().content.clone())
    }

    fn write(&self, payload: &ClipboardPayload) -> Result<ChangeToken, AppError> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(AppError::ClipboardWriteFailed("剪贴板被占用".to_string()));
        }

        let mut content = ClipboardRead::default();
        match payload {
            ClipboardPayload::Text(text) => content.text = Some(text.clone()),
            ClipboardPayload::Image(bitmap) => content.image = Some(bitmap.clone()),
            ClipboardPayload::Link(url) => content.url = Some(url.clone()),
            ClipboardPayload::Binary(raw) => content.rich = Some(raw.clone()),
            ClipboardPayload::Unknown(raw) => content.other = Some(raw.clone()),
        }

        state.content = content;
        state.writes.push(payload.clone());
        state.token += 1;
        Ok(ChangeToken(state.token))
    }
}
