//! 全局键盘拦截的平台实现
//!
//! - macOS：`CGEventTapCreate` 创建会话级事件 tap，运行在独立线程的 CFRunLoop 上；
//!   回调返回空指针即吞掉事件。tap 因超时被系统禁用时在回调内重新启用。
//! - Windows：`WH_KEYBOARD_LL` 低级键盘钩子，运行在独立线程的消息循环上；
//!   钩子返回非零值即吞掉事件。
//! - Linux（X11）：`XGrabKey` 在根窗口上抓取 Alt+V（含 CapsLock / NumLock 组合），
//!   独立线程持有自己的 Display 连接并轮询事件。被抓取的按键不会再到达焦点窗口，
//!   也无法逐个放行，因此只抓取激活组合本身；带其他修饰键的 V 不受影响。
//! - 其他平台：安装直接失败（`InterceptionInstallFailed`）。
//!
//! `install` 会等待后台线程报告安装结果后再返回；`uninstall` 会停止后台线程并等待其退出，
//! 返回时系统钩子已经释放。

use std::sync::Arc;

use super::chord::HotkeyFilter;
use crate::error::AppError;

/// 全局键盘拦截端口
pub trait EventInterceptor: Send {
    /// 安装过滤器；已安装时先卸载旧的
    fn install(&mut self, filter: Arc<HotkeyFilter>) -> Result<(), AppError>;

    /// 同步卸载并释放系统资源；未安装时为空操作
    fn uninstall(&mut self);

    fn is_installed(&self) -> bool;
}

/// 当前平台的默认实现
pub fn system_interceptor() -> Box<dyn EventInterceptor> {
    #[cfg(target_os = "macos")]
    {
        Box::new(macos::EventTapInterceptor::default())
    }

    #[cfg(target_os = "windows")]
    {
        Box::new(windows_hook::LowLevelHookInterceptor::default())
    }

    #[cfg(target_os = "linux")]
    {
        Box::new(x11_grab::KeyGrabInterceptor::default())
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        Box::new(UnsupportedInterceptor)
    }
}

/// 不支持全局拦截的平台
#[derive(Debug, Default)]
pub struct UnsupportedInterceptor;

impl EventInterceptor for UnsupportedInterceptor {
    fn install(&mut self, _filter: Arc<HotkeyFilter>) -> Result<(), AppError> {
        Err(AppError::InterceptionInstallFailed(
            "当前平台不支持全局键盘拦截".to_string(),
        ))
    }

    fn uninstall(&mut self) {}

    fn is_installed(&self) -> bool {
        false
    }
}

// ============================================================================
// macOS：CGEventTap
// ============================================================================

#[cfg(target_os = "macos")]
mod macos {
    use std::ffi::c_void;
    use std::ptr::null_mut;
    use std::sync::atomic::{AtomicBool, AtomicPtr, Ordering};
    use std::sync::{mpsc, Arc};
    use std::thread::{self, JoinHandle};

    use core_foundation_sys::base::{CFRelease, CFTypeRef};
    use core_foundation_sys::mach_port::{CFMachPortCreateRunLoopSource, CFMachPortInvalidate, CFMachPortRef};
    use core_foundation_sys::runloop::{
        kCFRunLoopDefaultMode, CFRunLoopAddSource, CFRunLoopGetCurrent, CFRunLoopRemoveSource,
        CFRunLoopRunInMode,
    };

    use super::EventInterceptor;
    use crate::error::AppError;
    use crate::hotkey::chord::{FilterDecision, HotkeyFilter, KeyCode, KeyEvent, KeyEventKind, Modifiers};

    type TapCallback = unsafe extern "C" fn(*mut c_void, u32, *mut c_void, *mut c_void) -> *mut c_void;

    #[link(name = "CoreGraphics", kind = "framework")]
    unsafe extern "C" {
        fn CGEventTapCreate(
            tap: u32,
            place: u32,
            options: u32,
            events_of_interest: u64,
            callback: TapCallback,
            user_info: *mut c_void,
        ) -> CFMachPortRef;
        fn CGEventTapEnable(tap: CFMachPortRef, enable: bool);
        fn CGEventGetFlags(event: *mut c_void) -> u64;
        fn CGEventGetIntegerValueField(event: *mut c_void, field: u32) -> i64;
    }

    const ANNOTATED_SESSION_EVENT_TAP: u32 = 2;
    const HEAD_INSERT_EVENT_TAP: u32 = 0;
    const TAP_OPTION_DEFAULT: u32 = 0;

    const EVENT_KEY_DOWN: u32 = 10;
    const EVENT_FLAGS_CHANGED: u32 = 12;
    const EVENT_TAP_DISABLED_BY_TIMEOUT: u32 = 0xFFFF_FFFE;
    const EVENT_TAP_DISABLED_BY_USER_INPUT: u32 = 0xFFFF_FFFF;

    const KEYBOARD_EVENT_KEYCODE_FIELD: u32 = 9;

    const FLAG_MASK_SHIFT: u64 = 0x0002_0000;
    const FLAG_MASK_CONTROL: u64 = 0x0004_0000;
    const FLAG_MASK_ALTERNATE: u64 = 0x0008_0000;
    const FLAG_MASK_COMMAND: u64 = 0x0010_0000;

    const RUN_LOOP_SLICE_SECS: f64 = 0.25;

    fn modifiers_from_flags(flags: u64) -> Modifiers {
        let mut modifiers = Modifiers::empty();
        modifiers.set(Modifiers::OPTION, flags & FLAG_MASK_ALTERNATE != 0);
        modifiers.set(Modifiers::COMMAND, flags & FLAG_MASK_COMMAND != 0);
        modifiers.set(Modifiers::SHIFT, flags & FLAG_MASK_SHIFT != 0);
        modifiers.set(Modifiers::CONTROL, flags & FLAG_MASK_CONTROL != 0);
        modifiers
    }

    /// 回调通过 `user_info` 拿到的上下文，生命周期由 tap 线程持有
    struct TapContext {
        filter: Arc<HotkeyFilter>,
        tap: AtomicPtr<c_void>,
    }

    unsafe extern "C" fn tap_callback(
        _proxy: *mut c_void,
        event_type: u32,
        event: *mut c_void,
        user_info: *mut c_void,
    ) -> *mut c_void {
        if user_info.is_null() {
            return event;
        }
        let context = unsafe { &*(user_info as *const TapContext) };

        if event_type == EVENT_TAP_DISABLED_BY_TIMEOUT || event_type == EVENT_TAP_DISABLED_BY_USER_INPUT {
            let tap = context.tap.load(Ordering::Acquire);
            if !tap.is_null() {
                log::trace!("事件 tap 被系统禁用，重新启用");
                unsafe { CGEventTapEnable(tap as CFMachPortRef, true) };
            }
            return event;
        }

        let kind = match event_type {
            EVENT_KEY_DOWN => KeyEventKind::KeyDown,
            EVENT_FLAGS_CHANGED => KeyEventKind::FlagsChanged,
            _ => return event,
        };

        let flags = unsafe { CGEventGetFlags(event) };
        let keycode = unsafe { CGEventGetIntegerValueField(event, KEYBOARD_EVENT_KEYCODE_FIELD) };
        let key_event = KeyEvent {
            kind,
            key: KeyCode(keycode as u32),
            modifiers: modifiers_from_flags(flags),
        };

        match context.filter.decide(&key_event) {
            FilterDecision::Consume => null_mut(),
            FilterDecision::Forward => event,
        }
    }

    struct RunningTap {
        stop: Arc<AtomicBool>,
        thread: JoinHandle<()>,
    }

    #[derive(Default)]
    pub(super) struct EventTapInterceptor {
        running: Option<RunningTap>,
    }

    impl EventInterceptor for EventTapInterceptor {
        fn install(&mut self, filter: Arc<HotkeyFilter>) -> Result<(), AppError> {
            self.uninstall();

            let stop = Arc::new(AtomicBool::new(false));
            let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();
            let thread_stop = Arc::clone(&stop);

            let thread = thread::Builder::new()
                .name("hotkey-event-tap".to_string())
                .spawn(move || run_tap(filter, thread_stop, ready_tx))
                .map_err(|e| AppError::InterceptionInstallFailed(e.to_string()))?;

            match ready_rx.recv() {
                Ok(Ok(())) => {
                    self.running = Some(RunningTap { stop, thread });
                    Ok(())
                }
                Ok(Err(reason)) => {
                    let _ = thread.join();
                    Err(AppError::InterceptionInstallFailed(reason))
                }
                Err(_) => {
                    let _ = thread.join();
                    Err(AppError::InterceptionInstallFailed(
                        "事件 tap 线程意外退出".to_string(),
                    ))
                }
            }
        }

        fn uninstall(&mut self) {
            if let Some(running) = self.running.take() {
                running.stop.store(true, Ordering::SeqCst);
                if running.thread.join().is_err() {
                    log::warn!("事件 tap 线程异常退出");
                }
                log::debug!("⌨️ 事件 tap 已释放");
            }
        }

        fn is_installed(&self) -> bool {
            self.running.is_some()
        }
    }

    fn run_tap(filter: Arc<HotkeyFilter>, stop: Arc<AtomicBool>, ready: mpsc::Sender<Result<(), String>>) {
        let context = Box::new(TapContext {
            filter,
            tap: AtomicPtr::new(null_mut()),
        });
        let context_ptr = &*context as *const TapContext as *mut c_void;

        let mask = (1_u64 << EVENT_KEY_DOWN) | (1_u64 << EVENT_FLAGS_CHANGED);
        let tap = unsafe {
            CGEventTapCreate(
                ANNOTATED_SESSION_EVENT_TAP,
                HEAD_INSERT_EVENT_TAP,
                TAP_OPTION_DEFAULT,
                mask,
                tap_callback,
                context_ptr,
            )
        };
        if tap.is_null() {
            let _ = ready.send(Err("CGEventTapCreate 返回空（可能缺少辅助功能权限）".to_string()));
            return;
        }
        context.tap.store(tap as *mut c_void, Ordering::Release);

        let source = unsafe { CFMachPortCreateRunLoopSource(std::ptr::null(), tap, 0) };
        if source.is_null() {
            unsafe {
                CFMachPortInvalidate(tap);
                CFRelease(tap as CFTypeRef);
            }
            let _ = ready.send(Err("CFMachPortCreateRunLoopSource 失败".to_string()));
            return;
        }

        unsafe {
            let run_loop = CFRunLoopGetCurrent();
            CFRunLoopAddSource(run_loop, source, kCFRunLoopDefaultMode);
            CGEventTapEnable(tap, true);
        }
        let _ = ready.send(Ok(()));

        while !stop.load(Ordering::SeqCst) {
            unsafe {
                CFRunLoopRunInMode(kCFRunLoopDefaultMode, RUN_LOOP_SLICE_SECS, 0);
            }
        }

        unsafe {
            CGEventTapEnable(tap, false);
            CFRunLoopRemoveSource(CFRunLoopGetCurrent(), source, kCFRunLoopDefaultMode);
            CFMachPortInvalidate(tap);
            CFRelease(source as CFTypeRef);
            CFRelease(tap as CFTypeRef);
        }
        context.tap.store(null_mut(), Ordering::Release);
        drop(context);
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn flags_map_to_modifiers() {
            assert_eq!(modifiers_from_flags(FLAG_MASK_ALTERNATE), Modifiers::OPTION);
            assert_eq!(
                modifiers_from_flags(FLAG_MASK_ALTERNATE | FLAG_MASK_COMMAND | 0x100),
                Modifiers::OPTION | Modifiers::COMMAND
            );
            assert_eq!(modifiers_from_flags(0), Modifiers::empty());
        }
    }
}

// ============================================================================
// Windows：WH_KEYBOARD_LL
// ============================================================================

#[cfg(target_os = "windows")]
mod windows_hook {
    use std::sync::{mpsc, Arc, RwLock};
    use std::thread::{self, JoinHandle};

    use once_cell::sync::Lazy;
    use windows::core::PCWSTR;
    use windows::Win32::Foundation::{HINSTANCE, LPARAM, LRESULT, WPARAM};
    use windows::Win32::System::LibraryLoader::GetModuleHandleW;
    use windows::Win32::System::Threading::GetCurrentThreadId;
    use windows::Win32::UI::Input::KeyboardAndMouse::{
        GetAsyncKeyState, VIRTUAL_KEY, VK_CONTROL, VK_LWIN, VK_MENU, VK_RWIN, VK_SHIFT,
    };
    use windows::Win32::UI::WindowsAndMessaging::{
        CallNextHookEx, DispatchMessageW, GetMessageW, PostThreadMessageW, SetWindowsHookExW,
        TranslateMessage, UnhookWindowsHookEx, HC_ACTION, KBDLLHOOKSTRUCT, MSG, WH_KEYBOARD_LL,
        WM_KEYDOWN, WM_QUIT, WM_SYSKEYDOWN,
    };

    use super::EventInterceptor;
    use crate::error::AppError;
    use crate::hotkey::chord::{FilterDecision, HotkeyFilter, KeyCode, KeyEvent, KeyEventKind, Modifiers};

    /// 钩子回调无法携带上下文，过滤器放在进程级槽位中
    static ACTIVE_FILTER: Lazy<RwLock<Option<Arc<HotkeyFilter>>>> = Lazy::new(|| RwLock::new(None));

    fn set_active_filter(filter: Option<Arc<HotkeyFilter>>) {
        let mut slot = match ACTIVE_FILTER.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = filter;
    }

    fn active_filter() -> Option<Arc<HotkeyFilter>> {
        match ACTIVE_FILTER.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn is_down(key: VIRTUAL_KEY) -> bool {
        unsafe { GetAsyncKeyState(i32::from(key.0)) < 0 }
    }

    fn current_modifiers() -> Modifiers {
        let mut modifiers = Modifiers::empty();
        modifiers.set(Modifiers::OPTION, is_down(VK_MENU));
        modifiers.set(Modifiers::COMMAND, is_down(VK_LWIN) || is_down(VK_RWIN));
        modifiers.set(Modifiers::SHIFT, is_down(VK_SHIFT));
        modifiers.set(Modifiers::CONTROL, is_down(VK_CONTROL));
        modifiers
    }

    fn is_modifier_key(vk: u32) -> bool {
        matches!(vk, 0x10..=0x12 | 0x5B | 0x5C | 0xA0..=0xA5)
    }

    unsafe extern "system" fn keyboard_hook_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
        if code == HC_ACTION as i32 {
            let message = wparam.0 as u32;
            if message == WM_KEYDOWN || message == WM_SYSKEYDOWN {
                let info = unsafe { &*(lparam.0 as *const KBDLLHOOKSTRUCT) };
                let kind = if is_modifier_key(info.vkCode) {
                    KeyEventKind::FlagsChanged
                } else {
                    KeyEventKind::KeyDown
                };
                let event = KeyEvent {
                    kind,
                    key: KeyCode(info.vkCode),
                    modifiers: current_modifiers(),
                };

                if let Some(filter) = active_filter() {
                    if filter.decide(&event) == FilterDecision::Consume {
                        return LRESULT(1);
                    }
                }
            }
        }

        unsafe { CallNextHookEx(None, code, wparam, lparam) }
    }

    struct RunningHook {
        thread_id: u32,
        thread: JoinHandle<()>,
    }

    #[derive(Default)]
    pub(super) struct LowLevelHookInterceptor {
        running: Option<RunningHook>,
    }

    impl EventInterceptor for LowLevelHookInterceptor {
        fn install(&mut self, filter: Arc<HotkeyFilter>) -> Result<(), AppError> {
            self.uninstall();
            set_active_filter(Some(filter));

            let (ready_tx, ready_rx) = mpsc::channel::<Result<u32, String>>();
            let thread = thread::Builder::new()
                .name("hotkey-keyboard-hook".to_string())
                .spawn(move || run_hook(ready_tx))
                .map_err(|e| {
                    set_active_filter(None);
                    AppError::InterceptionInstallFailed(e.to_string())
                })?;

            match ready_rx.recv() {
                Ok(Ok(thread_id)) => {
                    self.running = Some(RunningHook { thread_id, thread });
                    Ok(())
                }
                Ok(Err(reason)) => {
                    let _ = thread.join();
                    set_active_filter(None);
                    Err(AppError::InterceptionInstallFailed(reason))
                }
                Err(_) => {
                    let _ = thread.join();
                    set_active_filter(None);
                    Err(AppError::InterceptionInstallFailed(
                        "键盘钩子线程意外退出".to_string(),
                    ))
                }
            }
        }

        fn uninstall(&mut self) {
            if let Some(running) = self.running.take() {
                if let Err(e) =
                    unsafe { PostThreadMessageW(running.thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) }
                {
                    log::warn!("通知键盘钩子线程退出失败: {}", e);
                }
                if running.thread.join().is_err() {
                    log::warn!("键盘钩子线程异常退出");
                }
                log::debug!("⌨️ 键盘钩子已释放");
            }
            set_active_filter(None);
        }

        fn is_installed(&self) -> bool {
            self.running.is_some()
        }
    }

    fn run_hook(ready: mpsc::Sender<Result<u32, String>>) {
        let module = match unsafe { GetModuleHandleW(PCWSTR::null()) } {
            Ok(module) => module,
            Err(e) => {
                let _ = ready.send(Err(format!("GetModuleHandleW 失败: {}", e)));
                return;
            }
        };

        let hook = match unsafe {
            SetWindowsHookExW(
                WH_KEYBOARD_LL,
                Some(keyboard_hook_proc),
                Some(HINSTANCE(module.0)),
                0,
            )
        } {
            Ok(hook) => hook,
            Err(e) => {
                let _ = ready.send(Err(format!("SetWindowsHookExW 失败: {}", e)));
                return;
            }
        };

        let thread_id = unsafe { GetCurrentThreadId() };
        let _ = ready.send(Ok(thread_id));

        let mut msg = MSG::default();
        loop {
            let result = unsafe { GetMessageW(&mut msg, None, 0, 0) };
            if result.0 <= 0 {
                break;
            }
            unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }

        if let Err(e) = unsafe { UnhookWindowsHookEx(hook) } {
            log::warn!("UnhookWindowsHookEx 失败: {}", e);
        }
    }

}

// ============================================================================
// Linux：X11 XGrabKey
// ============================================================================

#[cfg(target_os = "linux")]
mod x11_grab {
    use std::os::raw::{c_int, c_uint};
    use std::ptr;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{mpsc, Arc};
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    use x11::keysym::XK_v;
    use x11::xlib::{
        BadAccess, ControlMask, Display, False, GrabModeAsync, KeyPress, KeySym, LockMask,
        Mod1Mask, Mod2Mask, Mod4Mask, ShiftMask, Window, XCloseDisplay, XDefaultRootWindow,
        XErrorEvent, XEvent, XGrabKey, XKeysymToKeycode, XLookupKeysym, XNextEvent, XOpenDisplay,
        XPending, XSetErrorHandler, XSync, XUngrabKey,
    };

    use super::EventInterceptor;
    use crate::error::AppError;
    use crate::hotkey::chord::{HotkeyFilter, KeyCode, KeyEvent, Modifiers};

    const IDLE_WAIT: Duration = Duration::from_millis(20);

    /// CapsLock / NumLock 会出现在 state 里，每种组合都要单独抓取
    const LOCK_VARIANTS: [c_uint; 4] = [0, LockMask, Mod2Mask, LockMask | Mod2Mask];

    /// 错误回调无法携带上下文，抓取冲突记录在进程级标志中
    static GRAB_REFUSED: AtomicBool = AtomicBool::new(false);

    unsafe extern "C" fn record_grab_error(_display: *mut Display, event: *mut XErrorEvent) -> c_int {
        let code = unsafe { (*event).error_code };
        if c_int::from(code) == c_int::from(BadAccess) {
            GRAB_REFUSED.store(true, Ordering::SeqCst);
        }
        0
    }

    /// X11 修饰键状态 → 统一修饰键（Alt 视为 Option，Super 视为 Command）
    pub(super) fn modifiers_from_state(state: c_uint) -> Modifiers {
        let mut modifiers = Modifiers::empty();
        modifiers.set(Modifiers::OPTION, state & Mod1Mask != 0);
        modifiers.set(Modifiers::COMMAND, state & Mod4Mask != 0);
        modifiers.set(Modifiers::SHIFT, state & ShiftMask != 0);
        modifiers.set(Modifiers::CONTROL, state & ControlMask != 0);
        modifiers
    }

    struct RunningGrab {
        stop: Arc<AtomicBool>,
        thread: JoinHandle<()>,
    }

    #[derive(Default)]
    pub(super) struct KeyGrabInterceptor {
        running: Option<RunningGrab>,
    }

    impl EventInterceptor for KeyGrabInterceptor {
        fn install(&mut self, filter: Arc<HotkeyFilter>) -> Result<(), AppError> {
            self.uninstall();

            let stop = Arc::new(AtomicBool::new(false));
            let thread_stop = Arc::clone(&stop);
            let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();
            let thread = thread::Builder::new()
                .name("hotkey-x11-grab".to_string())
                .spawn(move || run_grab(filter, thread_stop, ready_tx))
                .map_err(|e| AppError::InterceptionInstallFailed(e.to_string()))?;

            match ready_rx.recv() {
                Ok(Ok(())) => {
                    self.running = Some(RunningGrab { stop, thread });
                    Ok(())
                }
                Ok(Err(reason)) => {
                    let _ = thread.join();
                    Err(AppError::InterceptionInstallFailed(reason))
                }
                Err(_) => {
                    let _ = thread.join();
                    Err(AppError::InterceptionInstallFailed(
                        "按键抓取线程意外退出".to_string(),
                    ))
                }
            }
        }

        fn uninstall(&mut self) {
            if let Some(running) = self.running.take() {
                running.stop.store(true, Ordering::SeqCst);
                if running.thread.join().is_err() {
                    log::warn!("按键抓取线程异常退出");
                }
                log::debug!("⌨️ X11 按键抓取已释放");
            }
        }

        fn is_installed(&self) -> bool {
            self.running.is_some()
        }
    }

    fn release(display: *mut Display, keycode: c_int, root: Window) {
        unsafe {
            for extra in LOCK_VARIANTS {
                XUngrabKey(display, keycode, Mod1Mask | extra, root);
            }
            XCloseDisplay(display);
        }
    }

    fn run_grab(filter: Arc<HotkeyFilter>, stop: Arc<AtomicBool>, ready: mpsc::Sender<Result<(), String>>) {
        let display = unsafe { XOpenDisplay(ptr::null()) };
        if display.is_null() {
            let _ = ready.send(Err("无法打开 X11 display".to_string()));
            return;
        }
        let root = unsafe { XDefaultRootWindow(display) };
        let keycode = c_int::from(unsafe { XKeysymToKeycode(display, KeySym::from(XK_v)) });
        if keycode == 0 {
            unsafe { XCloseDisplay(display) };
            let _ = ready.send(Err("当前键盘映射中没有 V 键".to_string()));
            return;
        }

        GRAB_REFUSED.store(false, Ordering::SeqCst);
        unsafe {
            let previous = XSetErrorHandler(Some(record_grab_error));
            for extra in LOCK_VARIANTS {
                XGrabKey(display, keycode, Mod1Mask | extra, root, False, GrabModeAsync, GrabModeAsync);
            }
            XSync(display, False);
            XSetErrorHandler(previous);
        }
        if GRAB_REFUSED.load(Ordering::SeqCst) {
            release(display, keycode, root);
            let _ = ready.send(Err("Alt+V 已被其他程序抓取".to_string()));
            return;
        }
        let _ = ready.send(Ok(()));

        while !stop.load(Ordering::SeqCst) {
            if unsafe { XPending(display) } == 0 {
                thread::sleep(IDLE_WAIT);
                continue;
            }
            let mut event: XEvent = unsafe { std::mem::zeroed() };
            unsafe { XNextEvent(display, &mut event) };
            if event.get_type() != KeyPress {
                continue;
            }
            let mut key = unsafe { event.key };
            let sym = unsafe { XLookupKeysym(&mut key, 0) };
            let key_event = KeyEvent::key_down(KeyCode(sym as u32), modifiers_from_state(key.state));
            // 抓取到的按键已被截下，放行的结果无处可投
            let _ = filter.decide(&key_event);
        }

        release(display, keycode, root);
    }

}
