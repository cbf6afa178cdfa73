//! 多显示器支持模块
//!
//! 判断锚点位于哪块屏幕，并返回该屏幕的可见区域（扣除菜单栏 / 任务栏 / Dock）。
//!
//! # 实现思路
//!
//! - 纯函数层（`find_screen_index` / `frame_containing`）只处理 `ScreenFrame` 列表，可直接单元测试。
//! - 采用左闭右开区间判断边界，避免双屏交界点重复命中。
//! - 平台层 `screen_frame_at` 负责从系统读取可见区域，统一为左上角原点坐标。

use super::{ScreenFrame, ScreenPoint};

/// 在一组屏幕区域中查找包含该点的索引
pub fn find_screen_index(point: ScreenPoint, frames: &[ScreenFrame]) -> Option<usize> {
    frames.iter().position(|frame| frame.contains(point))
}

/// 返回包含该点的屏幕；都未命中时回退到第一块（主屏）
pub fn frame_containing(point: ScreenPoint, frames: &[ScreenFrame]) -> Option<ScreenFrame> {
    find_screen_index(point, frames)
        .and_then(|index| frames.get(index))
        .or_else(|| frames.first())
        .copied()
}

/// 读取锚点所在屏幕的可见区域（macOS）
#[cfg(target_os = "macos")]
pub fn screen_frame_at(point: ScreenPoint) -> Option<ScreenFrame> {
    use cocoa::base::{id, nil};
    use cocoa::foundation::{NSRect, NSUInteger};
    use objc::{class, msg_send, sel, sel_impl};

    let mut frames = Vec::new();
    unsafe {
        let screens: id = msg_send![class!(NSScreen), screens];
        if screens == nil {
            return None;
        }
        let count: NSUInteger = msg_send![screens, count];
        if count == 0 {
            return None;
        }

        // 第一块屏幕的高度决定左下角原点到左上角原点的换算
        let primary: id = msg_send![screens, objectAtIndex: 0 as NSUInteger];
        let primary_frame: NSRect = msg_send![primary, frame];
        let primary_height = primary_frame.size.height;

        for index in 0..count {
            let screen: id = msg_send![screens, objectAtIndex: index];
            let visible: NSRect = msg_send![screen, visibleFrame];
            frames.push(ScreenFrame::new(
                visible.origin.x,
                primary_height - (visible.origin.y + visible.size.height),
                visible.size.width,
                visible.size.height,
            ));
        }
    }
    frame_containing(point, &frames)
}

/// 读取锚点所在屏幕的工作区（Windows）
#[cfg(target_os = "windows")]
pub fn screen_frame_at(point: ScreenPoint) -> Option<ScreenFrame> {
    use windows::Win32::Foundation::POINT;
    use windows::Win32::Graphics::Gdi::{
        GetMonitorInfoW, MonitorFromPoint, MONITORINFO, MONITOR_DEFAULTTONEAREST,
    };

    let pt = POINT {
        x: point.x.round() as i32,
        y: point.y.round() as i32,
    };
    let mut info = MONITORINFO {
        cbSize: std::mem::size_of::<MONITORINFO>() as u32,
        ..Default::default()
    };
    unsafe {
        let monitor = MonitorFromPoint(pt, MONITOR_DEFAULTTONEAREST);
        if monitor.is_invalid() || !GetMonitorInfoW(monitor, &mut info).as_bool() {
            return None;
        }
    }
    let work = info.rcWork;
    Some(ScreenFrame::new(
        f64::from(work.left),
        f64::from(work.top),
        f64::from(work.right - work.left),
        f64::from(work.bottom - work.top),
    ))
}

/// 读取默认屏幕尺寸（X11 不区分工作区）
#[cfg(target_os = "linux")]
pub fn screen_frame_at(point: ScreenPoint) -> Option<ScreenFrame> {
    use std::ptr;
    use x11::xlib::{XCloseDisplay, XDefaultScreen, XDisplayHeight, XDisplayWidth, XOpenDisplay};

    let frame = unsafe {
        let display = XOpenDisplay(ptr::null());
        if display.is_null() {
            log::debug!("无法打开 X11 display");
            return None;
        }
        let screen = XDefaultScreen(display);
        let width = XDisplayWidth(display, screen);
        let height = XDisplayHeight(display, screen);
        XCloseDisplay(display);
        ScreenFrame::new(0.0, 0.0, f64::from(width), f64::from(height))
    };
    frame_containing(point, &[frame])
}

#[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
pub fn screen_frame_at(_point: ScreenPoint) -> Option<ScreenFrame> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dual_horizontal() -> Vec<ScreenFrame> {
        vec![
            ScreenFrame::new(0.0, 0.0, 1920.0, 1080.0),
            ScreenFrame::new(1920.0, 0.0, 2560.0, 1440.0),
        ]
    }

    #[test]
    fn test_point_inside_single_screen() {
        let frames = [ScreenFrame::new(0.0, 0.0, 1920.0, 1080.0)];
        assert_eq!(find_screen_index(ScreenPoint::new(960.0, 540.0), &frames), Some(0));
    }

    #[test]
    fn test_boundary_goes_to_second_screen() {
        let frames = dual_horizontal();
        assert_eq!(find_screen_index(ScreenPoint::new(1920.0, 100.0), &frames), Some(1));
        assert_eq!(find_screen_index(ScreenPoint::new(1919.0, 100.0), &frames), Some(0));
    }

    #[test]
    fn test_point_outside_all_screens() {
        let frames = dual_horizontal();
        assert_eq!(find_screen_index(ScreenPoint::new(-5.0, 100.0), &frames), None);
    }

    #[test]
    fn test_frame_containing_falls_back_to_primary() {
        let frames = dual_horizontal();
        assert_eq!(
            frame_containing(ScreenPoint::new(-5.0, -5.0), &frames),
            Some(frames[0])
        );
        assert_eq!(
            frame_containing(ScreenPoint::new(2000.0, 1200.0), &frames),
            Some(frames[1])
        );
    }

    #[test]
    fn test_frame_containing_empty_list() {
        assert_eq!(frame_containing(ScreenPoint::new(0.0, 0.0), &[]), None);
    }
}
