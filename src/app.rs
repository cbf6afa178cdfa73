//! 应用事件循环
//!
//! # 设计思路
//!
//! 所有状态修改都在同一个 UI 所有者任务上完成：
//! - 定时器驱动剪贴板轮询
//! - 键盘拦截回调只投递零负载的 `HotkeyActivation`
//! - 面板的用户操作、延迟粘贴等以 `AppEvent` 形式投递
//! - 历史变化通过订阅通道推送，面板展示期间据此刷新
//!
//! 事件源只负责发消息，真正的处理全部在 `App::run` 的 `select!` 循环里串行执行，
//! 因此历史与面板状态天然只有一个写者。
//!
//! # 实现思路
//!
//! - 粘贴前的固定延迟用 `tokio::spawn` + `sleep` 实现，到点后回投 `InjectPaste`，不阻塞循环。
//! - 轮询使用 `MissedTickBehavior::Skip`，循环忙时不会补发积压的 tick。
//! - 快捷键因未授权处于 Disabled 时，`EnableHotkey` 与每次打开面板都会重新检查权限，
//!   用户授权后无需重启即可生效。

use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::time::MissedTickBehavior;

use crate::clipboard::{
    ClassifyOptions, ClipboardBackend, ClipboardItem, ClipboardWatcher, HistoryStore,
    OwnWriteTracker,
};
use crate::error::AppError;
use crate::hotkey::{
    EventInterceptor, HotkeyActivation, HotkeyChord, HotkeyListener, ListenerState, PermissionGate,
};
use crate::input::PasteBackDriver;
use crate::selection::{CommitOutcome, SelectionController};
use crate::settings::AppSettings;
use crate::surface::RecallSurface;
use crate::window_position::{place_panel, resolve_anchor, Anchor, AnchorProvider, ScreenPoint};

/// 投递给 UI 所有者任务的消息
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// 用户直接要求打开面板（如点击状态栏图标）；`None` 时按焦点 / 指针定位
    ShowRequested { anchor: Option<ScreenPoint> },
    /// 用户在面板中选中了条目
    ItemPicked(u64),
    /// 用户关闭面板
    Cancelled,
    ClearHistory,
    /// 粘贴延迟到期
    InjectPaste,
    /// 重新尝试启用全局快捷键（例如用户刚授权）
    EnableHotkey,
    /// 暂停 / 恢复剪贴板轮询
    SetWatcherEnabled(bool),
    Shutdown,
}

pub fn event_channel() -> (UnboundedSender<AppEvent>, UnboundedReceiver<AppEvent>) {
    unbounded_channel()
}

/// 平台相关的协作方
pub struct AppComponents {
    pub clipboard: Arc<dyn ClipboardBackend>,
    pub paste_driver: Box<dyn PasteBackDriver>,
    pub surface: Box<dyn RecallSurface>,
    pub anchors: Box<dyn AnchorProvider>,
    pub permission: Box<dyn PermissionGate>,
    pub interceptor: Box<dyn EventInterceptor>,
}

pub struct App {
    settings: AppSettings,
    history: Arc<HistoryStore>,
    watcher: ClipboardWatcher<Arc<dyn ClipboardBackend>>,
    selection: SelectionController,
    hotkey: HotkeyListener,
    anchors: Box<dyn AnchorProvider>,
    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
    activations_rx: UnboundedReceiver<HotkeyActivation>,
    history_rx: UnboundedReceiver<Vec<ClipboardItem>>,
}

impl App {
    pub fn new(
        settings: AppSettings,
        components: AppComponents,
        events_tx: UnboundedSender<AppEvent>,
        events_rx: UnboundedReceiver<AppEvent>,
    ) -> Self {
        let settings = settings.normalized();
        let history = Arc::new(HistoryStore::new(settings.history_capacity));
        let history_rx = history.subscribe();
        let own_writes = Arc::new(OwnWriteTracker::new());

        let watcher = ClipboardWatcher::new(
            Arc::clone(&components.clipboard),
            Arc::clone(&own_writes),
            ClassifyOptions::from(&settings),
        );
        let selection = SelectionController::new(
            components.clipboard,
            own_writes,
            components.paste_driver,
            components.surface,
            settings.paste_delay(),
            settings.auto_paste,
        );

        let (activations_tx, activations_rx) = unbounded_channel();
        let hotkey = HotkeyListener::new(
            HotkeyChord::option_v(),
            components.permission,
            components.interceptor,
            activations_tx,
        );

        Self {
            settings,
            history,
            watcher,
            selection,
            hotkey,
            anchors: components.anchors,
            events_tx,
            events_rx,
            activations_rx,
            history_rx,
        }
    }

    pub fn history(&self) -> Arc<HistoryStore> {
        Arc::clone(&self.history)
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn hotkey_state(&self) -> &ListenerState {
        self.hotkey.state()
    }

    /// 运行到收到 `Shutdown` 或所有事件发送端关闭为止
    pub async fn run(mut self) {
        log::info!(
            "🚀 剪贴板监听已启动（轮询间隔 {}ms，容量 {}）",
            self.settings.poll_interval_ms,
            self.history.capacity()
        );
        self.enable_hotkey();

        let mut ticker = tokio::time::interval(self.settings.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let outcome = self.watcher.tick(&self.history);
                    log::trace!("轮询结果: {:?}", outcome);
                }
                Some(HotkeyActivation) = self.activations_rx.recv() => {
                    self.show(None).await;
                }
                Some(snapshot) = self.history_rx.recv() => {
                    self.selection.refresh(snapshot);
                }
                event = self.events_rx.recv() => {
                    let Some(event) = event else { break };
                    if self.handle(event).await.is_break() {
                        break;
                    }
                }
            }
        }

        self.shutdown();
    }

    async fn handle(&mut self, event: AppEvent) -> ControlFlow<()> {
        log::debug!("处理事件: {:?}", event);
        match event {
            AppEvent::ShowRequested { anchor } => self.show(anchor).await,
            AppEvent::ItemPicked(id) => self.commit(id),
            AppEvent::Cancelled => self.selection.cancel(),
            AppEvent::ClearHistory => self.history.clear(),
            AppEvent::InjectPaste => {
                // 结果已在控制器内记录；失败时条目仍在剪贴板上
                let _ = self.selection.inject();
            }
            AppEvent::EnableHotkey => self.enable_hotkey(),
            AppEvent::SetWatcherEnabled(enabled) => self.watcher.set_enabled(enabled),
            AppEvent::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    async fn show(&mut self, explicit: Option<ScreenPoint>) {
        // 用户可能在上次检查后才授权
        if self.hotkey.state() == &ListenerState::Disabled {
            self.enable_hotkey();
        }
        if !self.selection.is_hidden() {
            log::debug!("面板已在流程中，忽略打开请求");
            return;
        }

        let anchor = match explicit {
            Some(point) => Anchor::explicit(point),
            None => resolve_anchor(self.anchors.as_ref()).await,
        };
        let origin = place_panel(self.anchors.as_ref(), anchor.point, self.selection.panel_size());
        log::debug!("面板锚点 {:?} → 原点 ({:.0}, {:.0})", anchor.source, origin.x, origin.y);
        self.selection.activate(self.history.snapshot(), origin);
    }

    fn commit(&mut self, id: u64) {
        match self.selection.select(id) {
            Ok(CommitOutcome::PasteScheduled(delay)) => {
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(AppEvent::InjectPaste);
                });
            }
            Ok(CommitOutcome::CopiedOnly) => {}
            Err(e) => log::debug!("选择未提交: {}", e),
        }
    }

    fn enable_hotkey(&mut self) {
        match self.hotkey.enable() {
            Ok(()) => {}
            Err(AppError::PermissionDenied) => {
                log::info!("💡 授权后再次打开面板（或发送 EnableHotkey）即可启用全局快捷键");
            }
            Err(e) => log::debug!("全局快捷键不可用: {}", e),
        }
    }

    fn shutdown(&mut self) {
        self.selection.cancel();
        self.hotkey.disable();
        self.watcher.set_enabled(false);
        self.history.shutdown();
        log::info!("👋 剪贴板监听已停止");
    }
}
