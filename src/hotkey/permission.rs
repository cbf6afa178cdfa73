//! 输入监控权限
//!
//! macOS 上全局键盘拦截需要"辅助功能"授权：
//! - `is_trusted`：`AXIsProcessTrusted`，每次启用前都重新检查
//! - `request_access`：`AXIsProcessTrustedWithOptions(prompt = true)` 弹出系统提示，
//!   并打开系统设置中的辅助功能页面
//!
//! Windows 的低级键盘钩子不需要额外授权；X11 没有等价的权限模型。

/// 权限检查端口
pub trait PermissionGate: Send + Sync {
    fn is_trusted(&self) -> bool;

    /// 引导用户授权；不等待结果
    fn request_access(&self);
}

#[cfg(target_os = "macos")]
const ACCESSIBILITY_SETTINGS_URL: &str =
    "x-apple.systempreferences:com.apple.preference.security?Privacy_Accessibility";

/// 操作系统权限检查
#[derive(Debug, Clone)]
pub struct SystemPermissionGate {
    prompt: bool,
}

impl SystemPermissionGate {
    /// `prompt` 为 false 时 `request_access` 只记录日志，不弹出任何系统界面
    pub fn new(prompt: bool) -> Self {
        Self { prompt }
    }
}

#[cfg(target_os = "macos")]
mod ax {
    use core_foundation::base::TCFType;
    use core_foundation::boolean::CFBoolean;
    use core_foundation::dictionary::{CFDictionary, CFDictionaryRef};
    use core_foundation::string::CFString;

    #[link(name = "ApplicationServices", kind = "framework")]
    unsafe extern "C" {
        fn AXIsProcessTrusted() -> bool;
        fn AXIsProcessTrustedWithOptions(options: CFDictionaryRef) -> bool;
    }

    pub(super) fn is_trusted() -> bool {
        unsafe { AXIsProcessTrusted() }
    }

    pub(super) fn prompt() -> bool {
        let key = CFString::from_static_string("AXTrustedCheckOptionPrompt");
        let value = CFBoolean::true_value();
        let options = CFDictionary::from_CFType_pairs(&[(key.as_CFType(), value.as_CFType())]);
        unsafe { AXIsProcessTrustedWithOptions(options.as_concrete_TypeRef()) }
    }
}

impl PermissionGate for SystemPermissionGate {
    #[cfg(target_os = "macos")]
    fn is_trusted(&self) -> bool {
        ax::is_trusted()
    }

    #[cfg(not(target_os = "macos"))]
    fn is_trusted(&self) -> bool {
        true
    }

    #[cfg(target_os = "macos")]
    fn request_access(&self) {
        if !self.prompt {
            log::warn!("⚠️ 缺少辅助功能权限（已关闭自动提示）");
            return;
        }

        if ax::prompt() {
            return;
        }

        log::warn!("⚠️ 缺少辅助功能权限，正在打开系统设置");
        if let Err(e) = std::process::Command::new("open")
            .arg(ACCESSIBILITY_SETTINGS_URL)
            .spawn()
        {
            log::warn!("打开系统设置失败: {}", e);
        }
    }

    #[cfg(not(target_os = "macos"))]
    fn request_access(&self) {
        log::debug!("当前平台无需输入监控授权 (prompt={})", self.prompt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn non_macos_is_always_trusted() {
        let gate = SystemPermissionGate::new(false);
        assert!(gate.is_trusted());
        gate.request_access();
    }

    #[test]
    fn gate_is_object_safe() {
        let gate: Box<dyn PermissionGate> = Box::new(SystemPermissionGate::new(false));
        let _ = gate;
    }
}
