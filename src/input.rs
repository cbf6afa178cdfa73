//! 回贴模块（分层门面）
//!
//! - `services`：回贴编排与平台无关逻辑（先直接粘贴，再模拟快捷键）
//! - `platform`：平台相关实现（NSWorkspace / Win32 / enigo）

#[path = "input/services.rs"]
mod services;
#[path = "input/platform.rs"]
mod platform;

use crate::error::AppError;

pub use services::{deliver_paste, PasteRoute};

/// 之前持有焦点的应用或窗口
///
/// macOS 为进程 pid，Windows 为顶层窗口句柄。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusTarget {
    pub id: i64,
}

/// 回贴驱动端口
pub trait PasteBackDriver {
    /// 记录当前前台应用
    fn capture_focus(&self) -> Option<FocusTarget>;

    /// 把焦点还给之前的应用
    fn restore_focus(&self, target: &FocusTarget) -> Result<(), AppError>;

    /// 直接对当前可寻址的输入控件调用"粘贴"；没有可寻址控件时返回 `Ok(false)`
    fn invoke_paste(&self) -> Result<bool, AppError>;

    /// 向全局输入流注入系统粘贴快捷键
    fn synthesize_paste_chord(&self) -> Result<(), AppError>;
}

/// 真实系统实现
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPasteBack;

impl PasteBackDriver for SystemPasteBack {
    fn capture_focus(&self) -> Option<FocusTarget> {
        platform::frontmost_target().map(|id| FocusTarget { id })
    }

    fn restore_focus(&self, target: &FocusTarget) -> Result<(), AppError> {
        platform::activate_target(target.id)
    }

    fn invoke_paste(&self) -> Result<bool, AppError> {
        platform::send_paste_action()
    }

    fn synthesize_paste_chord(&self) -> Result<(), AppError> {
        platform::post_paste_chord()
    }
}
