use enigo::{
    Direction::{Click, Press, Release},
    Enigo, Key, Keyboard, Settings,
};

use crate::error::AppError;

// ============================================================================
// 模拟粘贴快捷键（所有平台统一走 enigo）
// ============================================================================

#[cfg(target_os = "macos")]
const PASTE_MODIFIER: Key = Key::Meta;
#[cfg(not(target_os = "macos"))]
const PASTE_MODIFIER: Key = Key::Control;

/// 合成前需要松开的修饰键
///
/// 用户可能仍按着召回快捷键里的 Option，不松开的话目标应用收到的是 Cmd+Opt+V。
fn stray_modifiers() -> Vec<Key> {
    [Key::Alt, Key::Shift, Key::Control, Key::Meta]
        .into_iter()
        .filter(|key| *key != PASTE_MODIFIER)
        .collect()
}

pub fn post_paste_chord() -> Result<(), AppError> {
    let mut enigo = Enigo::new(&Settings::default())
        .map_err(|e| AppError::InjectionUnavailable(format!("初始化输入模拟失败: {}", e)))?;

    for key in stray_modifiers() {
        if let Err(e) = enigo.key(key, Release) {
            log::debug!("松开修饰键 {:?} 失败: {}", key, e);
        }
    }

    enigo
        .key(PASTE_MODIFIER, Press)
        .and_then(|_| enigo.key(Key::Unicode('v'), Click))
        .and_then(|_| enigo.key(PASTE_MODIFIER, Release))
        .map_err(|e| AppError::InjectionUnavailable(format!("模拟粘贴按键失败: {}", e)))?;

    log::debug!("已模拟粘贴快捷键");
    Ok(())
}

// ============================================================================
// macOS
// ============================================================================

#[cfg(target_os = "macos")]
pub fn frontmost_target() -> Option<i64> {
    use cocoa::base::{id, nil};
    use objc::{class, msg_send, sel, sel_impl};

    unsafe {
        let workspace: id = msg_send![class!(NSWorkspace), sharedWorkspace];
        let front_app: id = msg_send![workspace, frontmostApplication];
        if front_app == nil {
            return None;
        }
        let pid: i32 = msg_send![front_app, processIdentifier];
        Some(i64::from(pid))
    }
}

#[cfg(target_os = "macos")]
pub fn activate_target(target: i64) -> Result<(), AppError> {
    use cocoa::base::{id, nil, BOOL, NO};
    use cocoa::foundation::NSUInteger;
    use objc::{class, msg_send, sel, sel_impl};

    // NSApplicationActivateIgnoringOtherApps
    const ACTIVATE_IGNORING_OTHER_APPS: NSUInteger = 1 << 1;

    let pid = i32::try_from(target)
        .map_err(|_| AppError::InjectionUnavailable(format!("无效的进程号: {}", target)))?;

    unsafe {
        let app: id = msg_send![
            class!(NSRunningApplication),
            runningApplicationWithProcessIdentifier: pid
        ];
        if app == nil {
            return Err(AppError::InjectionUnavailable(format!(
                "原应用已退出 (pid={})",
                pid
            )));
        }
        let activated: BOOL = msg_send![app, activateWithOptions: ACTIVATE_IGNORING_OTHER_APPS];
        if activated == NO {
            log::debug!("activateWithOptions 未生效 (pid={})", pid);
        }
    }
    Ok(())
}

/// 通过响应链发送 `paste:`；只有本进程内存在可寻址的文本控件时才会被处理
#[cfg(target_os = "macos")]
pub fn send_paste_action() -> Result<bool, AppError> {
    use cocoa::appkit::NSApp;
    use cocoa::base::{id, nil, BOOL, YES};
    use objc::{msg_send, sel, sel_impl};

    unsafe {
        let app: id = NSApp();
        if app == nil {
            return Ok(false);
        }
        let key_window: id = msg_send![app, keyWindow];
        if key_window == nil {
            return Ok(false);
        }
        let handled: BOOL = msg_send![app, sendAction: sel!(paste:) to: nil from: nil];
        Ok(handled == YES)
    }
}

// ============================================================================
// Windows
// ============================================================================

#[cfg(target_os = "windows")]
pub fn frontmost_target() -> Option<i64> {
    use windows::Win32::UI::WindowsAndMessaging::GetForegroundWindow;

    let hwnd = unsafe { GetForegroundWindow() };
    if hwnd.0.is_null() {
        None
    } else {
        Some(hwnd.0 as isize as i64)
    }
}

#[cfg(target_os = "windows")]
pub fn activate_target(target: i64) -> Result<(), AppError> {
    use windows::Win32::Foundation::HWND;
    use windows::Win32::UI::WindowsAndMessaging::SetForegroundWindow;

    let hwnd = HWND(target as isize as *mut core::ffi::c_void);
    let ok = unsafe { SetForegroundWindow(hwnd) };
    if !ok.as_bool() {
        log::debug!("SetForegroundWindow 未生效 (hwnd={:#x})", target);
    }
    Ok(())
}

/// 焦点控件是标准编辑框时直接发送 `WM_PASTE`
#[cfg(target_os = "windows")]
pub fn send_paste_action() -> Result<bool, AppError> {
    use windows::Win32::Foundation::{LPARAM, WPARAM};
    use windows::Win32::UI::WindowsAndMessaging::{
        GetClassNameW, GetGUIThreadInfo, SendMessageW, GUITHREADINFO, WM_PASTE,
    };

    let mut info = GUITHREADINFO {
        cbSize: std::mem::size_of::<GUITHREADINFO>() as u32,
        ..Default::default()
    };
    if unsafe { GetGUIThreadInfo(0, &mut info) }.is_err() || info.hwndFocus.0.is_null() {
        return Ok(false);
    }

    let mut class_name = [0_u16; 64];
    let len = unsafe { GetClassNameW(info.hwndFocus, &mut class_name) };
    if len <= 0 {
        return Ok(false);
    }
    let class_name = String::from_utf16_lossy(&class_name[..len as usize]);
    if !is_standard_edit_class(&class_name) {
        return Ok(false);
    }

    unsafe {
        SendMessageW(info.hwndFocus, WM_PASTE, Some(WPARAM(0)), Some(LPARAM(0)));
    }
    Ok(true)
}

#[cfg(target_os = "windows")]
fn is_standard_edit_class(class_name: &str) -> bool {
    let lower = class_name.to_ascii_lowercase();
    lower == "edit" || lower.starts_with("richedit")
}

// ============================================================================
// 其他平台
// ============================================================================

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub fn frontmost_target() -> Option<i64> {
    None
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub fn activate_target(_target: i64) -> Result<(), AppError> {
    Ok(())
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub fn send_paste_action() -> Result<bool, AppError> {
    Ok(false)
}
