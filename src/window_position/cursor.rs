//! 指针位置模块（跨平台）
//!
//! # 设计思路
//!
//! - 平台差异下沉：按平台分别实现单次读取，对上层暴露统一的左上角原点坐标。
//! - macOS 额外尝试读取焦点输入控件的位置（辅助功能 API），让面板出现在正在输入的地方。
//!
//! # 坐标系统处理
//!
//! - **Windows / Linux**：左上角原点，Y 轴向下增大
//! - **macOS**：`NSEvent.mouseLocation` 为左下角原点，需要换算：
//!   `y_top_left = screen_height - y_bottom_left`；辅助功能 API 返回的已是左上角原点

use super::ScreenPoint;

/// 读取指针位置（Windows）
#[cfg(target_os = "windows")]
pub fn pointer_position() -> Result<ScreenPoint, String> {
    use windows::Win32::Foundation::POINT;
    use windows::Win32::UI::WindowsAndMessaging::GetCursorPos;

    let mut point = POINT { x: 0, y: 0 };
    unsafe { GetCursorPos(&mut point) }.map_err(|e| format!("GetCursorPos 失败: {:?}", e))?;
    Ok(ScreenPoint::new(f64::from(point.x), f64::from(point.y)))
}

/// 读取指针位置（macOS，含坐标系转换）
#[cfg(target_os = "macos")]
pub fn pointer_position() -> Result<ScreenPoint, String> {
    use cocoa::appkit::{NSEvent, NSScreen};
    use cocoa::base::nil;
    use cocoa::foundation::NSPoint;

    unsafe {
        let location: NSPoint = NSEvent::mouseLocation(nil);

        let main_screen = NSScreen::mainScreen(nil);
        if main_screen == nil {
            return Err("无法获取主屏幕，无法换算坐标".to_string());
        }
        let screen_height = NSScreen::frame(main_screen).size.height;

        Ok(ScreenPoint::new(location.x, screen_height - location.y))
    }
}

/// 读取指针位置（Linux X11）
#[cfg(target_os = "linux")]
pub fn pointer_position() -> Result<ScreenPoint, String> {
    use std::ptr;
    use x11::xlib::{XCloseDisplay, XDefaultRootWindow, XOpenDisplay, XQueryPointer};

    unsafe {
        let display = XOpenDisplay(ptr::null());
        if display.is_null() {
            return Err("无法打开 X11 display".to_string());
        }

        let root = XDefaultRootWindow(display);

        let mut root_return = 0;
        let mut child_return = 0;
        let mut root_x = 0;
        let mut root_y = 0;
        let mut win_x = 0;
        let mut win_y = 0;
        let mut mask_return = 0;

        let result = XQueryPointer(
            display,
            root,
            &mut root_return,
            &mut child_return,
            &mut root_x,
            &mut root_y,
            &mut win_x,
            &mut win_y,
            &mut mask_return,
        );

        XCloseDisplay(display);

        if result == 0 {
            return Err("XQueryPointer 未返回指针位置".to_string());
        }

        Ok(ScreenPoint::new(f64::from(root_x), f64::from(root_y)))
    }
}

#[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
pub fn pointer_position() -> Result<ScreenPoint, String> {
    Err("当前平台无法读取指针位置".to_string())
}

// ============================================================================
// 焦点输入控件位置
// ============================================================================

/// 焦点输入控件的左下角（面板紧贴控件下方弹出）
#[cfg(target_os = "macos")]
pub fn focused_input_position() -> Option<ScreenPoint> {
    ax::focused_element_bottom_left()
}

/// 焦点窗口中插入符的位置
#[cfg(target_os = "windows")]
pub fn focused_input_position() -> Option<ScreenPoint> {
    use windows::Win32::Foundation::POINT;
    use windows::Win32::Graphics::Gdi::ClientToScreen;
    use windows::Win32::UI::WindowsAndMessaging::{GetGUIThreadInfo, GUITHREADINFO};

    let mut info = GUITHREADINFO {
        cbSize: std::mem::size_of::<GUITHREADINFO>() as u32,
        ..Default::default()
    };
    if unsafe { GetGUIThreadInfo(0, &mut info) }.is_err() || info.hwndCaret.0.is_null() {
        return None;
    }

    let mut point = POINT {
        x: info.rcCaret.left,
        y: info.rcCaret.bottom,
    };
    if !unsafe { ClientToScreen(info.hwndCaret, &mut point) }.as_bool() {
        return None;
    }
    Some(ScreenPoint::new(f64::from(point.x), f64::from(point.y)))
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub fn focused_input_position() -> Option<ScreenPoint> {
    None
}

#[cfg(target_os = "macos")]
mod ax {
    use std::ffi::c_void;

    use core_foundation::base::TCFType;
    use core_foundation::string::CFString;
    use core_foundation_sys::base::{CFRelease, CFTypeRef};
    use core_foundation_sys::string::CFStringRef;
    use core_graphics::geometry::{CGPoint, CGSize};

    use super::ScreenPoint;

    type AXUIElementRef = *const c_void;
    type AXError = i32;

    const AX_SUCCESS: AXError = 0;
    const AX_VALUE_CG_POINT: u32 = 1;
    const AX_VALUE_CG_SIZE: u32 = 2;

    #[link(name = "ApplicationServices", kind = "framework")]
    unsafe extern "C" {
        fn AXUIElementCreateSystemWide() -> AXUIElementRef;
        fn AXUIElementCopyAttributeValue(
            element: AXUIElementRef,
            attribute: CFStringRef,
            value: *mut CFTypeRef,
        ) -> AXError;
        fn AXValueGetValue(value: CFTypeRef, the_type: u32, value_ptr: *mut c_void) -> u8;
    }

    /// 读取属性；返回值需要调用方 `CFRelease`
    unsafe fn copy_attribute(element: AXUIElementRef, name: &'static str) -> Option<CFTypeRef> {
        let attribute = CFString::from_static_string(name);
        let mut value: CFTypeRef = std::ptr::null();
        let err = unsafe {
            AXUIElementCopyAttributeValue(element, attribute.as_concrete_TypeRef(), &mut value)
        };
        if err != AX_SUCCESS || value.is_null() {
            None
        } else {
            Some(value)
        }
    }

    unsafe fn value_as<T: Default>(value: CFTypeRef, kind: u32) -> Option<T> {
        let mut out = T::default();
        let ok = unsafe { AXValueGetValue(value, kind, &mut out as *mut T as *mut c_void) };
        unsafe { CFRelease(value) };
        (ok != 0).then_some(out)
    }

    pub fn focused_element_bottom_left() -> Option<ScreenPoint> {
        unsafe {
            let system = AXUIElementCreateSystemWide();
            if system.is_null() {
                return None;
            }
            let focused = copy_attribute(system, "AXFocusedUIElement");
            CFRelease(system);
            let focused = focused?;

            let position = copy_attribute(focused, "AXPosition")
                .and_then(|value| value_as::<CGPoint>(value, AX_VALUE_CG_POINT));
            let size = copy_attribute(focused, "AXSize")
                .and_then(|value| value_as::<CGSize>(value, AX_VALUE_CG_SIZE));
            CFRelease(focused);

            let position = position?;
            let height = size.map(|s| s.height).unwrap_or(0.0);
            Some(ScreenPoint::new(position.x, position.y + height))
        }
    }
}
