//! 历史记录存储
//!
//! # 设计思路
//!
//! 历史是一个有界、按"最近优先"排序的序列，所有修改都经过本模块：
//! - `insert`：移除等价条目 → 插入队首 → 超出容量时从队尾淘汰一条 → 推送快照
//! - `clear`：清空并推送空快照
//! - `snapshot`：返回只读副本，从不修改状态
//!
//! 只有文本条目参与去重（完全相等的文本会被移到队首）；图片、链接等从不去重。
//!
//! # 实现思路
//!
//! - 状态放在 `RwLock` 中：写锁内完成"修改 + 推送"，保证插入与通知整体原子；
//!   读者拿到的永远是完整序列。
//! - 订阅者是 `tokio::sync::mpsc::UnboundedSender`，发送不阻塞；
//!   接收端被丢弃后在下一次推送时自动移除。
//! - 锁中毒时沿用恢复数据继续运行，不让一次 panic 拖垮整个历史。
//! - `shutdown` 之后 `insert` 变为空操作。

use std::collections::VecDeque;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use super::item::ClipboardItem;

/// 默认容量
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

#[derive(Debug, Default)]
struct HistoryState {
    items: VecDeque<ClipboardItem>,
    subscribers: Vec<UnboundedSender<Vec<ClipboardItem>>>,
    shut_down: bool,
}

impl HistoryState {
    fn snapshot(&self) -> Vec<ClipboardItem> {
        self.items.iter().cloned().collect()
    }

    fn notify(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        self.subscribers
            .retain(|subscriber| subscriber.send(snapshot.clone()).is_ok());
    }
}

/// 有界、去重的剪贴板历史
#[derive(Debug)]
pub struct HistoryStore {
    capacity: usize,
    state: RwLock<HistoryState>,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryStore {
    /// 创建空历史；容量至少为 1
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: RwLock::new(HistoryState::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn read_state(&self) -> RwLockReadGuard<'_, HistoryState> {
        match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("历史记录读锁中毒，继续使用恢复数据");
                poisoned.into_inner()
            }
        }
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, HistoryState> {
        match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("历史记录写锁中毒，继续使用恢复数据");
                poisoned.into_inner()
            }
        }
    }

    /// 插入条目到队首
    pub fn insert(&self, item: ClipboardItem) {
        let mut state = self.write_state();
        if state.shut_down {
            log::debug!("历史记录已关闭，忽略插入");
            return;
        }

        if let Some(key) = item.equivalence_key() {
            let before = state.items.len();
            state
                .items
                .retain(|existing| existing.equivalence_key() != Some(key));
            if state.items.len() != before {
                log::debug!("♻️ 重复文本移到最前");
            }
        }

        state.items.push_front(item);

        if state.items.len() > self.capacity {
            if let Some(evicted) = state.items.pop_back() {
                log::debug!("🗑️ 超出容量 {}，淘汰最旧条目 #{}", self.capacity, evicted.id());
            }
        }

        state.notify();
    }

    /// 当前历史的只读副本（最近优先）
    pub fn snapshot(&self) -> Vec<ClipboardItem> {
        self.read_state().snapshot()
    }

    pub fn len(&self) -> usize {
        self.read_state().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 清空历史并推送空快照
    pub fn clear(&self) {
        let mut state = self.write_state();
        state.items.clear();
        state.notify();
        log::info!("🧹 剪贴板历史已清空");
    }

    /// 订阅历史变化；每次插入或清空后收到完整快照
    pub fn subscribe(&self) -> UnboundedReceiver<Vec<ClipboardItem>> {
        let (tx, rx) = unbounded_channel();
        self.write_state().subscribers.push(tx);
        rx
    }

    /// 停止接受新条目并断开所有订阅者
    pub fn shutdown(&self) {
        let mut state = self.write_state();
        state.shut_down = true;
        state.subscribers.clear();
    }
}
