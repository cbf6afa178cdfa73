//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，覆盖剪贴板历史、全局快捷键与回贴三条链路。
//! 错误按"是否需要打扰用户"分级：
//! - **静默**：`NoSupportedRepresentation`，仅 debug 日志
//! - **可恢复**：`PermissionDenied` / `ClipboardWriteFailed` / `InjectionUnavailable`
//! - **会话级禁用**：`InterceptionInstallFailed`，本次会话不再自动重试
//!
//! 没有任何错误会导致进程退出。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 实现 `Serialize` 将错误序列化为字符串，供外部 UI 协作方直接展示。

use serde::Serialize;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 未获得输入监控（辅助功能）权限
    #[error("未获得输入监控权限，请在系统设置中授权后重试")]
    PermissionDenied,

    /// 系统拒绝安装全局键盘事件过滤器
    #[error("安装全局键盘拦截失败: {0}")]
    InterceptionInstallFailed(String),

    /// 剪贴板变化中没有可识别的内容
    #[error("剪贴板中没有受支持的内容")]
    NoSupportedRepresentation,

    /// 回写剪贴板失败
    #[error("写入剪贴板失败: {0}")]
    ClipboardWriteFailed(String),

    /// 无法把粘贴动作送达目标应用
    #[error("无法自动粘贴: {0}")]
    InjectionUnavailable(String),

    /// 剪贴板读取操作失败
    #[error("剪贴板操作失败: {0}")]
    Clipboard(String),

    /// 设置文件读写或解析失败
    #[error("设置错误: {0}")]
    Settings(String),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// 该错误是否属于"预期内、无需上报"的情况
    pub fn is_silent(&self) -> bool {
        matches!(self, AppError::NoSupportedRepresentation)
    }
}

/// 外部 UI 协作方要求错误可序列化，这里统一输出人类可读字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;

    #[test]
    fn only_missing_representation_is_silent() {
        assert!(AppError::NoSupportedRepresentation.is_silent());
        assert!(!AppError::PermissionDenied.is_silent());
        assert!(!AppError::ClipboardWriteFailed("busy".into()).is_silent());
    }

    #[test]
    fn serializes_as_display_string() {
        let value = serde_json::to_value(AppError::InjectionUnavailable("no target".into()))
            .expect("error should serialize");
        assert_eq!(value, serde_json::json!("无法自动粘贴: no target"));
    }
}
