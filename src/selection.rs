//! 选择与回贴控制器
//!
//! # 设计思路
//!
//! ```text
//! Hidden ──activate──▶ Showing ──select──▶ Committing ──写入成功──▶ RestoringFocus
//!   ▲                    │  ▲                 │                        │
//!   │                    │  └──写入失败───────┘                        │ 延迟后 inject
//!   └──────cancel────────┘                                             ▼
//!   └───────────────────────────────────────────────────────────── Injecting
//! ```
//!
//! - 选择只读取面板打开时的快照，从不修改历史。
//! - `Committing` 只写一次剪贴板（先清空再写入条目的原生表示），
//!   写入后记录变化令牌，轮询器据此忽略这次自写入。
//! - 面板必须先关闭、焦点交还给原应用，之后再经过固定延迟注入粘贴。
//!
//! # 实现思路
//!
//! - 延迟不在这里等待：`select` 返回 `CommitOutcome::PasteScheduled(delay)`，
//!   由事件循环调度一个非阻塞的续体，到点后调用 `inject`。
//! - 写入失败时回到 `Showing`，面板保持可用，用户可以重新选择。
//! - 注入失败不回滚：条目已经在剪贴板上，用户可以手动粘贴。

use std::sync::Arc;
use std::time::Duration;

use crate::clipboard::{ClipboardBackend, ClipboardItem, OwnWriteTracker};
use crate::error::AppError;
use crate::input::{deliver_paste, FocusTarget, PasteBackDriver, PasteRoute};
use crate::surface::RecallSurface;
use crate::window_position::{PanelSize, ScreenPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Hidden,
    Showing,
    Committing,
    RestoringFocus,
    Injecting,
}

/// 提交成功后的下一步
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// 经过给定延迟后调用 `inject`
    PasteScheduled(Duration),
    /// 自动粘贴已关闭，条目只留在剪贴板上
    CopiedOnly,
}

pub struct SelectionController {
    clipboard: Arc<dyn ClipboardBackend>,
    own_writes: Arc<OwnWriteTracker>,
    driver: Box<dyn PasteBackDriver>,
    surface: Box<dyn RecallSurface>,
    paste_delay: Duration,
    auto_paste: bool,
    state: SelectionState,
    focus: Option<FocusTarget>,
    shown: Vec<ClipboardItem>,
}

impl SelectionController {
    pub fn new(
        clipboard: Arc<dyn ClipboardBackend>,
        own_writes: Arc<OwnWriteTracker>,
        driver: Box<dyn PasteBackDriver>,
        surface: Box<dyn RecallSurface>,
        paste_delay: Duration,
        auto_paste: bool,
    ) -> Self {
        Self {
            clipboard,
            own_writes,
            driver,
            surface,
            paste_delay,
            auto_paste,
            state: SelectionState::Hidden,
            focus: None,
            shown: Vec::new(),
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn is_hidden(&self) -> bool {
        self.state == SelectionState::Hidden
    }

    pub fn panel_size(&self) -> PanelSize {
        self.surface.panel_size()
    }

    /// 面板当前展示的条目
    pub fn shown_items(&self) -> &[ClipboardItem] {
        &self.shown
    }

    /// 打开面板；已在流程中时忽略并返回 `false`
    pub fn activate(&mut self, snapshot: Vec<ClipboardItem>, origin: ScreenPoint) -> bool {
        if self.state != SelectionState::Hidden {
            log::debug!("面板已处于 {:?}，忽略激活", self.state);
            return false;
        }

        // 面板出现前记录前台应用，关闭后把焦点还给它
        self.focus = self.driver.capture_focus();
        self.shown = snapshot;
        self.surface.show(&self.shown, origin);
        self.state = SelectionState::Showing;
        log::info!("📋 打开剪贴板历史面板（{} 条）", self.shown.len());
        true
    }

    /// 展示期间用新的快照刷新面板
    pub fn refresh(&mut self, snapshot: Vec<ClipboardItem>) {
        if self.state != SelectionState::Showing {
            return;
        }
        self.shown = snapshot;
        self.surface.update(&self.shown);
    }

    /// 不提交直接关闭
    pub fn cancel(&mut self) {
        if self.state != SelectionState::Showing {
            return;
        }
        self.surface.close();
        self.reset();
        log::debug!("面板已取消");
    }

    /// 提交用户选中的条目
    pub fn select(&mut self, id: u64) -> Result<CommitOutcome, AppError> {
        if self.state != SelectionState::Showing {
            log::debug!("面板未展示，忽略选择 {}", id);
            return Err(AppError::Clipboard(format!("面板未展示，无法选择条目 {}", id)));
        }
        let Some(item) = self.shown.iter().find(|item| item.id() == id).cloned() else {
            log::warn!("⚠️ 选中的条目 {} 不在当前列表中", id);
            return Err(AppError::Clipboard(format!("条目 {} 不存在", id)));
        };

        self.state = SelectionState::Committing;
        match self.clipboard.write(item.payload()) {
            Ok(token) => self.own_writes.record(token),
            Err(err) => {
                let err = match err {
                    AppError::ClipboardWriteFailed(_) => err,
                    other => AppError::ClipboardWriteFailed(other.to_string()),
                };
                log::warn!("⚠️ {}", err);
                self.state = SelectionState::Showing;
                self.surface.report(&err);
                return Err(err);
            }
        }
        log::info!("✅ 已写回剪贴板: {} {}", item.kind().glyph(), item.preview());

        self.state = SelectionState::RestoringFocus;
        self.surface.close();
        self.shown.clear();
        if let Some(target) = self.focus.take()
            && let Err(e) = self.driver.restore_focus(&target)
        {
            log::warn!("⚠️ 恢复焦点失败: {}", e);
        }

        if !self.auto_paste {
            self.state = SelectionState::Hidden;
            return Ok(CommitOutcome::CopiedOnly);
        }
        Ok(CommitOutcome::PasteScheduled(self.paste_delay))
    }

    /// 延迟到期后注入粘贴，无论结果如何最终回到 `Hidden`
    pub fn inject(&mut self) -> Result<PasteRoute, AppError> {
        if self.state != SelectionState::RestoringFocus {
            log::debug!("没有待注入的粘贴 (state={:?})", self.state);
            return Err(AppError::InjectionUnavailable("没有待粘贴的条目".to_string()));
        }

        self.state = SelectionState::Injecting;
        let result = deliver_paste(self.driver.as_ref());
        self.reset();
        match &result {
            Ok(route) => log::info!("📋 已粘贴到原应用 ({:?})", route),
            Err(e) => log::warn!("⚠️ {}，内容仍在剪贴板上，可手动粘贴", e),
        }
        result
    }

    fn reset(&mut self) {
        self.state = SelectionState::Hidden;
        self.focus = None;
        self.shown.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::clipboard::{classify, ClassifyOptions, ClipboardPayload, ClipboardRead, MemoryClipboard};

    #[derive(Default)]
    struct Probe {
        shows: Cell<u32>,
        updates: Cell<u32>,
        closes: Cell<u32>,
        reports: Cell<u32>,
        restored: RefCell<Vec<FocusTarget>>,
        chords: Cell<u32>,
        direct: Cell<bool>,
    }

    struct FakeSurface(Rc<Probe>);

    impl RecallSurface for FakeSurface {
        fn show(&mut self, _items: &[ClipboardItem], _origin: ScreenPoint) {
            self.0.shows.set(self.0.shows.get() + 1);
        }

        fn update(&mut self, _items: &[ClipboardItem]) {
            self.0.updates.set(self.0.updates.get() + 1);
        }

        fn close(&mut self) {
            self.0.closes.set(self.0.closes.get() + 1);
        }

        fn report(&mut self, _error: &AppError) {
            self.0.reports.set(self.0.reports.get() + 1);
        }
    }

    struct FakeDriver(Rc<Probe>);

    impl PasteBackDriver for FakeDriver {
        fn capture_focus(&self) -> Option<FocusTarget> {
            Some(FocusTarget { id: 7 })
        }

        fn restore_focus(&self, target: &FocusTarget) -> Result<(), AppError> {
            self.0.restored.borrow_mut().push(*target);
            Ok(())
        }

        fn invoke_paste(&self) -> Result<bool, AppError> {
            Ok(self.0.direct.get())
        }

        fn synthesize_paste_chord(&self) -> Result<(), AppError> {
            self.0.chords.set(self.0.chords.get() + 1);
            Ok(())
        }
    }

    fn items(texts: &[&str]) -> Vec<ClipboardItem> {
        texts
            .iter()
            .map(|t| classify(ClipboardRead::text(*t), &ClassifyOptions::default()).expect("text"))
            .collect()
    }

    fn controller(auto_paste: bool) -> (SelectionController, Arc<MemoryClipboard>, Arc<OwnWriteTracker>, Rc<Probe>) {
        let clipboard = Arc::new(MemoryClipboard::new());
        let tracker = Arc::new(OwnWriteTracker::new());
        let probe = Rc::new(Probe::default());
        let controller = SelectionController::new(
            clipboard.clone(),
            Arc::clone(&tracker),
            Box::new(FakeDriver(Rc::clone(&probe))),
            Box::new(FakeSurface(Rc::clone(&probe))),
            Duration::from_millis(100),
            auto_paste,
        );
        (controller, clipboard, tracker, probe)
    }

    #[test]
    fn full_commit_path_reaches_hidden() {
        let (mut c, clipboard, tracker, probe) = controller(true);
        let shown = items(&["three", "two", "one"]);
        let picked = shown[1].id();

        assert!(c.activate(shown, ScreenPoint::default()));
        assert_eq!(c.state(), SelectionState::Showing);

        let outcome = c.select(picked).expect("commit");
        assert_eq!(outcome, CommitOutcome::PasteScheduled(Duration::from_millis(100)));
        assert_eq!(c.state(), SelectionState::RestoringFocus);
        assert_eq!(probe.closes.get(), 1);
        assert_eq!(probe.restored.borrow().as_slice(), &[FocusTarget { id: 7 }]);
        assert_eq!(clipboard.writes(), vec![ClipboardPayload::Text("two".into())]);
        assert!(tracker.is_armed());

        assert_eq!(c.inject().expect("inject"), PasteRoute::SynthesizedChord);
        assert_eq!(c.state(), SelectionState::Hidden);
        assert_eq!(probe.chords.get(), 1);
    }

    #[test]
    fn direct_paste_is_preferred() {
        let (mut c, _clipboard, _tracker, probe) = controller(true);
        probe.direct.set(true);
        let shown = items(&["a"]);
        let id = shown[0].id();
        c.activate(shown, ScreenPoint::default());
        c.select(id).expect("commit");
        assert_eq!(c.inject().expect("inject"), PasteRoute::DirectInvocation);
        assert_eq!(probe.chords.get(), 0);
    }

    #[test]
    fn cancel_goes_straight_to_hidden_without_writing() {
        let (mut c, clipboard, tracker, probe) = controller(true);
        c.activate(items(&["a", "b"]), ScreenPoint::default());
        c.cancel();
        assert_eq!(c.state(), SelectionState::Hidden);
        assert!(clipboard.writes().is_empty());
        assert!(!tracker.is_armed());
        assert_eq!(probe.closes.get(), 1);
        assert!(probe.restored.borrow().is_empty());
    }

    #[test]
    fn write_failure_keeps_surface_showing() {
        let (mut c, clipboard, tracker, probe) = controller(true);
        let shown = items(&["a"]);
        let id = shown[0].id();
        c.activate(shown, ScreenPoint::default());
        clipboard.set_fail_writes(true);

        assert!(matches!(c.select(id), Err(AppError::ClipboardWriteFailed(_))));
        assert_eq!(c.state(), SelectionState::Showing);
        assert_eq!(probe.closes.get(), 0);
        assert_eq!(probe.reports.get(), 1);
        assert!(!tracker.is_armed());

        clipboard.set_fail_writes(false);
        assert!(c.select(id).is_ok());
    }

    #[test]
    fn auto_paste_off_stops_after_commit() {
        let (mut c, clipboard, _tracker, probe) = controller(false);
        let shown = items(&["a"]);
        let id = shown[0].id();
        c.activate(shown, ScreenPoint::default());
        assert_eq!(c.select(id).expect("commit"), CommitOutcome::CopiedOnly);
        assert_eq!(c.state(), SelectionState::Hidden);
        assert_eq!(clipboard.writes().len(), 1);
        assert!(c.inject().is_err());
        assert_eq!(probe.chords.get(), 0);
    }

    #[test]
    fn second_activation_is_ignored_while_showing() {
        let (mut c, _clipboard, _tracker, probe) = controller(true);
        assert!(c.activate(items(&["a"]), ScreenPoint::default()));
        assert!(!c.activate(items(&["b"]), ScreenPoint::default()));
        assert_eq!(probe.shows.get(), 1);
    }

    #[test]
    fn refresh_only_applies_while_showing() {
        let (mut c, _clipboard, _tracker, probe) = controller(true);
        c.refresh(items(&["a"]));
        assert_eq!(probe.updates.get(), 0);
        c.activate(items(&["a"]), ScreenPoint::default());
        c.refresh(items(&["b", "a"]));
        assert_eq!(probe.updates.get(), 1);
        assert_eq!(c.shown_items().len(), 2);
    }

    #[test]
    fn unknown_id_is_rejected_without_writing() {
        let (mut c, clipboard, _tracker, _probe) = controller(true);
        c.activate(items(&["a"]), ScreenPoint::default());
        assert!(c.select(u64::MAX).is_err());
        assert_eq!(c.state(), SelectionState::Showing);
        assert!(clipboard.writes().is_empty());
    }
}
