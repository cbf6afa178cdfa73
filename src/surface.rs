//! 召回面板模块
//!
//! # 设计思路
//!
//! 面板是外部 UI 协作方：它只负责展示条目序列，并在用户操作后回报
//! "选中了某个条目" 或 "取消"。本模块定义这个端口，并提供一个
//! 基于终端的实现，使二进制在没有图形前端时也能使用。
//!
//! # 实现思路
//!
//! - 所有方法都在 UI 线程上调用；用户操作通过 `AppEvent` 通道异步回报。
//! - `ConsoleSurface` 的输入线程只做行解析与消息投递，不触碰任何共享状态以外的数据。

use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use tokio::sync::mpsc::UnboundedSender;

use crate::app::AppEvent;
use crate::clipboard::ClipboardItem;
use crate::error::AppError;
use crate::window_position::{PanelSize, ScreenPoint, DEFAULT_PANEL_SIZE};

/// 召回面板端口
pub trait RecallSurface {
    /// 在指定位置展示条目（最新在前）
    fn show(&mut self, items: &[ClipboardItem], origin: ScreenPoint);

    /// 展示期间历史发生变化时刷新内容
    fn update(&mut self, items: &[ClipboardItem]);

    /// 关闭面板，把键盘焦点还给之前的应用
    fn close(&mut self);

    /// 以非打扰方式提示错误（面板保持可用）
    fn report(&mut self, error: &AppError);

    fn panel_size(&self) -> PanelSize {
        DEFAULT_PANEL_SIZE
    }
}

// ============================================================================
// 终端实现
// ============================================================================

#[derive(Debug, Default)]
struct ConsoleState {
    visible: bool,
    ids: Vec<u64>,
}

/// 终端面板
///
/// 输入约定：
/// - 数字：选中对应序号的条目
/// - 空行 / `q`：取消
/// - `s`：在指针处打开面板
/// - `c`：清空历史
/// - `h`：授权后重新启用全局快捷键
/// - `p` / `r`：暂停 / 恢复剪贴板轮询
/// - `x`：退出
pub struct ConsoleSurface {
    state: Arc<Mutex<ConsoleState>>,
}

impl ConsoleSurface {
    /// 创建面板并启动输入线程
    pub fn spawn(events: UnboundedSender<AppEvent>) -> Result<Self, AppError> {
        let state = Arc::new(Mutex::new(ConsoleState::default()));
        let reader_state = Arc::clone(&state);

        thread::Builder::new()
            .name("console-surface".into())
            .spawn(move || {
                let stdin = io::stdin();
                for line in stdin.lock().lines() {
                    let Ok(line) = line else { break };
                    let snapshot = {
                        let guard = lock_state(&reader_state);
                        (guard.visible, guard.ids.clone())
                    };
                    let Some(event) = parse_command(&line, snapshot.0, &snapshot.1) else {
                        continue;
                    };
                    let quitting = matches!(event, AppEvent::Shutdown);
                    if events.send(event).is_err() || quitting {
                        break;
                    }
                }
                log::debug!("终端输入线程退出");
            })?;

        Ok(Self { state })
    }
}

fn lock_state(state: &Mutex<ConsoleState>) -> MutexGuard<'_, ConsoleState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("⚠️ 终端面板状态锁中毒，继续使用内部数据");
            poisoned.into_inner()
        }
    }
}

/// 把一行输入翻译为应用事件
fn parse_command(line: &str, visible: bool, ids: &[u64]) -> Option<AppEvent> {
    let input = line.trim();
    match input {
        "x" => return Some(AppEvent::Shutdown),
        "c" => return Some(AppEvent::ClearHistory),
        "h" => return Some(AppEvent::EnableHotkey),
        "p" => return Some(AppEvent::SetWatcherEnabled(false)),
        "r" => return Some(AppEvent::SetWatcherEnabled(true)),
        "s" if !visible => return Some(AppEvent::ShowRequested { anchor: None }),
        _ => {}
    }
    if !visible {
        return None;
    }
    if input.is_empty() || input == "q" {
        return Some(AppEvent::Cancelled);
    }
    input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| ids.get(index))
        .map(|id| AppEvent::ItemPicked(*id))
}

fn render(items: &[ClipboardItem]) {
    let mut out = io::stdout().lock();
    let _ = writeln!(out, "──────── 剪贴板历史 ────────");
    if items.is_empty() {
        let _ = writeln!(out, "  （空）");
    }
    for (index, item) in items.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {} {}", index + 1, item.kind().glyph(), item.preview());
    }
    let _ = writeln!(out, "输入序号粘贴，回车取消");
    let _ = out.flush();
}

impl RecallSurface for ConsoleSurface {
    fn show(&mut self, items: &[ClipboardItem], origin: ScreenPoint) {
        {
            let mut state = lock_state(&self.state);
            state.visible = true;
            state.ids = items.iter().map(ClipboardItem::id).collect();
        }
        log::debug!("终端面板打开于 ({:.0}, {:.0})", origin.x, origin.y);
        render(items);
    }

    fn update(&mut self, items: &[ClipboardItem]) {
        lock_state(&self.state).ids = items.iter().map(ClipboardItem::id).collect();
        render(items);
    }

    fn close(&mut self) {
        let mut state = lock_state(&self.state);
        state.visible = false;
        state.ids.clear();
    }

    fn report(&mut self, error: &AppError) {
        let _ = writeln!(io::stdout().lock(), "⚠️ {}", error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_pick_by_position() {
        let ids = [41, 42, 43];
        assert!(matches!(parse_command("2", true, &ids), Some(AppEvent::ItemPicked(42))));
        assert!(parse_command("4", true, &ids).is_none());
        assert!(parse_command("0", true, &ids).is_none());
    }

    #[test]
    fn empty_line_and_q_cancel() {
        assert!(matches!(parse_command("", true, &[1]), Some(AppEvent::Cancelled)));
        assert!(matches!(parse_command(" q ", true, &[1]), Some(AppEvent::Cancelled)));
    }

    #[test]
    fn hidden_panel_ignores_picks() {
        assert!(parse_command("1", false, &[1]).is_none());
        assert!(parse_command("", false, &[1]).is_none());
        assert!(matches!(
            parse_command("s", false, &[]),
            Some(AppEvent::ShowRequested { anchor: None })
        ));
    }

    #[test]
    fn global_commands_work_in_any_state() {
        assert!(matches!(parse_command("x", true, &[]), Some(AppEvent::Shutdown)));
        assert!(matches!(parse_command("c", false, &[]), Some(AppEvent::ClearHistory)));
        assert_eq!(parse_command("h", true, &[1]), Some(AppEvent::EnableHotkey));
    }

    #[test]
    fn pause_and_resume_toggle_the_watcher() {
        assert_eq!(parse_command("p", false, &[]), Some(AppEvent::SetWatcherEnabled(false)));
        assert_eq!(parse_command(" r", true, &[7]), Some(AppEvent::SetWatcherEnabled(true)));
    }
}
