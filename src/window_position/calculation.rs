//! 面板位置计算模块
//!
//! # 设计思路
//!
//! 面板以锚点为左上角弹出；若超出目标屏幕的可见区域，则整体收回并保留固定边距。
//! 计算是纯函数，不依赖任何系统 API，便于单元测试。
//!
//! # 实现思路
//!
//! 每个轴独立处理，先检查远端再检查近端：
//!
//! ```text
//! x + width  > max_x  →  x = max_x - width  - margin
//! x          < min_x  →  x = min_x + margin
//! ```
//!
//! 先收远端后收近端，面板比屏幕还大时以近端为准，保证左上角始终可见。

use super::{PanelSize, ScreenFrame, ScreenPoint};

/// 面板与屏幕边缘的最小距离
pub const EDGE_MARGIN: f64 = 16.0;

/// 把面板原点收进屏幕可见区域
pub fn clamp_panel_origin(
    anchor: ScreenPoint,
    panel: PanelSize,
    frame: ScreenFrame,
    margin: f64,
) -> ScreenPoint {
    ScreenPoint {
        x: clamp_axis(anchor.x, panel.width, frame.x, frame.max_x(), margin),
        y: clamp_axis(anchor.y, panel.height, frame.y, frame.max_y(), margin),
    }
}

fn clamp_axis(origin: f64, extent: f64, min: f64, max: f64, margin: f64) -> f64 {
    let mut value = origin;
    if value + extent > max {
        value = max - extent - margin;
    }
    if value < min {
        value = min + margin;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    const PANEL: PanelSize = PanelSize {
        width: 300.0,
        height: 400.0,
    };

    fn screen() -> ScreenFrame {
        ScreenFrame::new(0.0, 0.0, 1920.0, 1080.0)
    }

    #[test]
    fn test_anchor_inside_screen_is_kept() {
        let origin = clamp_panel_origin(ScreenPoint::new(500.0, 300.0), PANEL, screen(), EDGE_MARGIN);
        assert_eq!(origin, ScreenPoint::new(500.0, 300.0));
    }

    #[test]
    fn test_right_edge_pulls_panel_back_with_margin() {
        let origin = clamp_panel_origin(ScreenPoint::new(1800.0, 300.0), PANEL, screen(), EDGE_MARGIN);
        assert_eq!(origin.x, 1920.0 - 300.0 - 16.0);
        assert_eq!(origin.y, 300.0);
    }

    #[test]
    fn test_bottom_edge_pulls_panel_up() {
        let origin = clamp_panel_origin(ScreenPoint::new(100.0, 900.0), PANEL, screen(), EDGE_MARGIN);
        assert_eq!(origin.y, 1080.0 - 400.0 - 16.0);
    }

    #[test]
    fn test_negative_anchor_snaps_to_near_edge() {
        let origin = clamp_panel_origin(ScreenPoint::new(-40.0, -10.0), PANEL, screen(), EDGE_MARGIN);
        assert_eq!(origin, ScreenPoint::new(16.0, 16.0));
    }

    #[test]
    fn test_panel_larger_than_screen_keeps_near_edge_visible() {
        let tiny = ScreenFrame::new(0.0, 0.0, 200.0, 200.0);
        let origin = clamp_panel_origin(ScreenPoint::new(50.0, 50.0), PANEL, tiny, EDGE_MARGIN);
        assert_eq!(origin, ScreenPoint::new(16.0, 16.0));
    }

    #[test]
    fn test_secondary_screen_offsets_are_respected() {
        let right = ScreenFrame::new(1920.0, 0.0, 1280.0, 1024.0);
        let origin = clamp_panel_origin(ScreenPoint::new(3150.0, 20.0), PANEL, right, EDGE_MARGIN);
        assert_eq!(origin.x, 1920.0 + 1280.0 - 300.0 - 16.0);
        assert_eq!(origin.y, 20.0);
    }
}
