//! 快捷键组合与拦截决策
//!
//! `HotkeyFilter::decide` 运行在系统事件回调线程上：只做匹配，
//! 命中时通过无界通道发出激活信号后立即返回"吞掉"，其余工作交给持有 UI 的线程。

use std::sync::atomic::{AtomicU64, Ordering};

use bitflags::bitflags;
use tokio::sync::mpsc::UnboundedSender;

bitflags! {
    /// 修饰键集合
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// macOS Option / 其他平台 Alt
        const OPTION = 1 << 0;
        /// macOS Command / 其他平台 Win(Super)
        const COMMAND = 1 << 1;
        const SHIFT = 1 << 2;
        const CONTROL = 1 << 3;
    }
}

/// 平台虚拟键码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u32);

impl KeyCode {
    #[cfg(target_os = "macos")]
    pub const V: KeyCode = KeyCode(0x09);
    #[cfg(target_os = "macos")]
    pub const A: KeyCode = KeyCode(0x00);

    #[cfg(windows)]
    pub const V: KeyCode = KeyCode(0x56);
    #[cfg(windows)]
    pub const A: KeyCode = KeyCode(0x41);

    #[cfg(not(any(target_os = "macos", windows)))]
    pub const V: KeyCode = KeyCode(0x76);
    #[cfg(not(any(target_os = "macos", windows)))]
    pub const A: KeyCode = KeyCode(0x61);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    KeyDown,
    FlagsChanged,
}

/// 拦截层观察到的键盘事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub kind: KeyEventKind,
    pub key: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn key_down(key: KeyCode, modifiers: Modifiers) -> Self {
        Self {
            kind: KeyEventKind::KeyDown,
            key,
            modifiers,
        }
    }

    pub fn flags_changed(modifiers: Modifiers) -> Self {
        Self {
            kind: KeyEventKind::FlagsChanged,
            key: KeyCode(u32::MAX),
            modifiers,
        }
    }
}

/// 快捷键组合：必须包含 `required`，且不得包含 `forbidden` 中任何一个
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyChord {
    pub key: KeyCode,
    pub required: Modifiers,
    pub forbidden: Modifiers,
}

impl Default for HotkeyChord {
    fn default() -> Self {
        Self::option_v()
    }
}

impl HotkeyChord {
    /// Option + V
    pub fn option_v() -> Self {
        Self {
            key: KeyCode::V,
            required: Modifiers::OPTION,
            forbidden: Modifiers::COMMAND | Modifiers::SHIFT | Modifiers::CONTROL,
        }
    }

    pub fn matches(&self, key: KeyCode, modifiers: Modifiers) -> bool {
        key == self.key && modifiers.contains(self.required) && !modifiers.intersects(self.forbidden)
    }
}

/// 拦截回调的同步决策
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    /// 吞掉事件，不再转发给其他应用
    Consume,
    /// 原样转发
    Forward,
}

/// 激活信号（零负载）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyActivation;

/// 运行在拦截回调上下文中的过滤器
#[derive(Debug)]
pub struct HotkeyFilter {
    chord: HotkeyChord,
    tx: UnboundedSender<HotkeyActivation>,
    consumed: AtomicU64,
}

impl HotkeyFilter {
    pub fn new(chord: HotkeyChord, tx: UnboundedSender<HotkeyActivation>) -> Self {
        Self {
            chord,
            tx,
            consumed: AtomicU64::new(0),
        }
    }

    pub fn chord(&self) -> HotkeyChord {
        self.chord
    }

    pub fn decide(&self, event: &KeyEvent) -> FilterDecision {
        if event.kind != KeyEventKind::KeyDown || !self.chord.matches(event.key, event.modifiers) {
            return FilterDecision::Forward;
        }

        self.consumed.fetch_add(1, Ordering::Relaxed);
        if self.tx.send(HotkeyActivation).is_err() {
            log::trace!("激活信号接收端已关闭");
        }
        FilterDecision::Consume
    }

    /// 已吞掉的事件数
    pub fn consumed_count(&self) -> u64 {
        self.consumed.load(Ordering::Relaxed)
    }
}
