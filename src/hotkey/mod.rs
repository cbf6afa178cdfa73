//! 全局快捷键模块
//!
//! # 设计思路
//!
//! `HotkeyListener` 把三件事组合在一起：
//! - **权限**：每次 `enable` 都重新询问 `PermissionGate`，未授权时引导用户并返回
//!   `PermissionDenied`，此时不安装任何系统钩子
//! - **拦截**：授权后通过 `EventInterceptor` 安装进程级键盘过滤器
//! - **决策**：过滤器只做 Option+V 匹配与吞掉决策，激活信号经通道交给 UI 线程
//!
//! 状态：
//!
//! ```text
//! Disabled ──enable(已授权)──▶ Enabled ──disable──▶ Disabled
//!    │                      └─安装失败─▶ Failed（本次会话不再自动重试）
//!    └──enable(未授权)──▶ Disabled（返回 PermissionDenied）
//! ```
//!
//! # 实现思路
//!
//! - `disable` 与 `Drop` 同步卸载钩子，返回时系统资源已释放。
//! - `Failed` 是粘滞状态：再次 `enable` 直接返回上次的失败原因，不重复安装。

pub mod chord;
pub mod permission;
pub mod platform;

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::error::AppError;

pub use chord::{
    FilterDecision, HotkeyActivation, HotkeyChord, HotkeyFilter, KeyCode, KeyEvent, KeyEventKind,
    Modifiers,
};
pub use permission::{PermissionGate, SystemPermissionGate};
pub use platform::{system_interceptor, EventInterceptor, UnsupportedInterceptor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerState {
    Disabled,
    Enabled,
    /// 拦截安装失败，记录原因
    Failed(String),
}

pub struct HotkeyListener {
    gate: Box<dyn PermissionGate>,
    interceptor: Box<dyn EventInterceptor>,
    filter: Arc<HotkeyFilter>,
    state: ListenerState,
}

impl HotkeyListener {
    pub fn new(
        chord: HotkeyChord,
        gate: Box<dyn PermissionGate>,
        interceptor: Box<dyn EventInterceptor>,
        activations: UnboundedSender<HotkeyActivation>,
    ) -> Self {
        Self {
            gate,
            interceptor,
            filter: Arc::new(HotkeyFilter::new(chord, activations)),
            state: ListenerState::Disabled,
        }
    }

    pub fn state(&self) -> &ListenerState {
        &self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state == ListenerState::Enabled
    }

    /// 过滤器引用（用于查询已吞掉的事件数）
    pub fn filter(&self) -> &Arc<HotkeyFilter> {
        &self.filter
    }

    /// 启用全局快捷键
    pub fn enable(&mut self) -> Result<(), AppError> {
        match &self.state {
            ListenerState::Enabled => return Ok(()),
            ListenerState::Failed(reason) => {
                log::debug!("全局快捷键本次会话已禁用: {}", reason);
                return Err(AppError::InterceptionInstallFailed(reason.clone()));
            }
            ListenerState::Disabled => {}
        }

        if !self.gate.is_trusted() {
            log::warn!("⚠️ 未获得输入监控权限，全局快捷键未启用");
            self.gate.request_access();
            return Err(AppError::PermissionDenied);
        }

        match self.interceptor.install(Arc::clone(&self.filter)) {
            Ok(()) => {
                self.state = ListenerState::Enabled;
                log::info!("⌨️ 全局快捷键已启用");
                Ok(())
            }
            Err(err) => {
                log::error!("❌ {}", err);
                let reason = match &err {
                    AppError::InterceptionInstallFailed(reason) => reason.clone(),
                    other => other.to_string(),
                };
                self.state = ListenerState::Failed(reason.clone());
                Err(AppError::InterceptionInstallFailed(reason))
            }
        }
    }

    /// 同步停用并释放系统钩子
    pub fn disable(&mut self) {
        if self.interceptor.is_installed() {
            self.interceptor.uninstall();
            log::info!("⌨️ 全局快捷键已停用");
        }
        if self.state == ListenerState::Enabled {
            self.state = ListenerState::Disabled;
        }
    }
}

impl Drop for HotkeyListener {
    fn drop(&mut self) {
        self.disable();
    }
}
