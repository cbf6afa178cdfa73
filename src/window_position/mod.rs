//! 面板定位模块
//!
//! # 设计思路
//!
//! 召回面板出现的位置按以下优先级决定：
//! 1. 状态栏图标等显式位置（由调用方直接给出）
//! 2. 焦点输入控件的位置
//! 3. 指针位置（短重试 + 指数退避）
//! 4. 屏幕中心 / 原点兜底
//!
//! 得到锚点后再用 `calculation::clamp_panel_origin` 收进屏幕可见区域。
//!
//! # 实现思路
//!
//! - 系统读取抽象为 `AnchorProvider`，测试使用假实现。
//! - 所有坐标统一为左上角原点的全局逻辑坐标。

pub mod calculation;
pub mod cursor;
pub mod monitor;

use std::time::Duration;

use serde::Serialize;

pub use calculation::{clamp_panel_origin, EDGE_MARGIN};

/// 全局屏幕坐标（左上角原点）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PanelSize {
    pub width: f64,
    pub height: f64,
}

/// 召回面板的默认尺寸
pub const DEFAULT_PANEL_SIZE: PanelSize = PanelSize {
    width: 300.0,
    height: 400.0,
};

/// 屏幕可见区域
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreenFrame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenFrame {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// 左闭右开：相邻屏幕交界处只归属右 / 下方屏幕
    pub fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= self.x && point.x < self.max_x() && point.y >= self.y && point.y < self.max_y()
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// 锚点来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorSource {
    Explicit,
    FocusedInput,
    Pointer,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub point: ScreenPoint,
    pub source: AnchorSource,
}

impl Anchor {
    pub fn explicit(point: ScreenPoint) -> Self {
        Self {
            point,
            source: AnchorSource::Explicit,
        }
    }
}

/// 系统位置读取端口
pub trait AnchorProvider: Send + Sync {
    fn focused_input(&self) -> Option<ScreenPoint>;

    fn pointer(&self) -> Result<ScreenPoint, String>;

    fn screen_frame_at(&self, point: ScreenPoint) -> Option<ScreenFrame>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAnchorProvider;

impl AnchorProvider for SystemAnchorProvider {
    fn focused_input(&self) -> Option<ScreenPoint> {
        cursor::focused_input_position()
    }

    fn pointer(&self) -> Result<ScreenPoint, String> {
        cursor::pointer_position()
    }

    fn screen_frame_at(&self, point: ScreenPoint) -> Option<ScreenFrame> {
        monitor::screen_frame_at(point)
    }
}

/// 解析快捷键触发时的锚点
///
/// # 重试策略
/// - 指针最多读取 3 次，间隔 10ms、20ms（指数退避）
/// - 全部失败后回退到主屏中心，仍不可得时使用 `(0, 0)`
pub async fn resolve_anchor(provider: &dyn AnchorProvider) -> Anchor {
    const MAX_RETRIES: u32 = 3;
    const INITIAL_DELAY_MS: u64 = 10;

    if let Some(point) = provider.focused_input() {
        log::debug!("使用焦点输入控件位置 ({:.0}, {:.0})", point.x, point.y);
        return Anchor {
            point,
            source: AnchorSource::FocusedInput,
        };
    }

    let mut delay_ms = INITIAL_DELAY_MS;
    for attempt in 0..MAX_RETRIES {
        match provider.pointer() {
            Ok(point) => {
                if attempt > 0 {
                    log::debug!("第 {} 次尝试读取指针位置成功", attempt + 1);
                }
                return Anchor {
                    point,
                    source: AnchorSource::Pointer,
                };
            }
            Err(e) => {
                log::warn!("读取指针位置失败 (第 {} 次): {}", attempt + 1, e);
                if attempt < MAX_RETRIES - 1 {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    delay_ms *= 2;
                }
            }
        }
    }

    log::warn!("所有读取指针位置的尝试均失败，回退到屏幕中心");
    let point = provider
        .screen_frame_at(ScreenPoint::default())
        .map(|frame| frame.center())
        .unwrap_or_default();
    Anchor {
        point,
        source: AnchorSource::Fallback,
    }
}

/// 计算面板最终位置；读取不到屏幕信息时直接使用锚点
pub fn place_panel(provider: &dyn AnchorProvider, anchor: ScreenPoint, panel: PanelSize) -> ScreenPoint {
    match provider.screen_frame_at(anchor) {
        Some(frame) => clamp_panel_origin(anchor, panel, frame, EDGE_MARGIN),
        None => anchor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FakeProvider {
        focused: Option<ScreenPoint>,
        pointer_failures: u32,
        attempts: AtomicU32,
        frame: Option<ScreenFrame>,
    }

    impl FakeProvider {
        fn new(focused: Option<ScreenPoint>, pointer_failures: u32) -> Self {
            Self {
                focused,
                pointer_failures,
                attempts: AtomicU32::new(0),
                frame: Some(ScreenFrame::new(0.0, 0.0, 1440.0, 900.0)),
            }
        }
    }

    impl AnchorProvider for FakeProvider {
        fn focused_input(&self) -> Option<ScreenPoint> {
            self.focused
        }

        fn pointer(&self) -> Result<ScreenPoint, String> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if attempt < self.pointer_failures {
                Err("busy".into())
            } else {
                Ok(ScreenPoint::new(700.0, 450.0))
            }
        }

        fn screen_frame_at(&self, _point: ScreenPoint) -> Option<ScreenFrame> {
            self.frame
        }
    }

    #[tokio::test]
    async fn test_focused_input_wins_over_pointer() {
        let provider = FakeProvider::new(Some(ScreenPoint::new(120.0, 80.0)), 0);
        let anchor = resolve_anchor(&provider).await;
        assert_eq!(anchor.source, AnchorSource::FocusedInput);
        assert_eq!(anchor.point, ScreenPoint::new(120.0, 80.0));
        assert_eq!(provider.attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pointer_retry_recovers() {
        let provider = FakeProvider::new(None, 2);
        let anchor = resolve_anchor(&provider).await;
        assert_eq!(anchor.source, AnchorSource::Pointer);
        assert_eq!(provider.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_failures_fall_back_to_screen_center() {
        let provider = FakeProvider::new(None, u32::MAX);
        let anchor = resolve_anchor(&provider).await;
        assert_eq!(anchor.source, AnchorSource::Fallback);
        assert_eq!(anchor.point, ScreenPoint::new(720.0, 450.0));
    }

    #[test]
    fn test_place_panel_clamps_into_frame() {
        let provider = FakeProvider::new(None, 0);
        let origin = place_panel(&provider, ScreenPoint::new(1400.0, 880.0), DEFAULT_PANEL_SIZE);
        assert_eq!(origin, ScreenPoint::new(1440.0 - 316.0, 900.0 - 416.0));
    }

    #[test]
    fn test_place_panel_without_frame_uses_anchor() {
        let mut provider = FakeProvider::new(None, 0);
        provider.frame = None;
        let origin = place_panel(&provider, ScreenPoint::new(5.0, 5.0), DEFAULT_PANEL_SIZE);
        assert_eq!(origin, ScreenPoint::new(5.0, 5.0));
    }
}
