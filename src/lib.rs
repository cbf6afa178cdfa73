//! # 剪贴板历史召回 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │           召回面板（外部 UI 协作方 / 终端实现）            │
//! │        展示条目 ── 回报 "选中某条" 或 "取消"               │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ AppEvent / RecallSurface
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕        app（UI 所有者任务，串行处理所有状态）       │
//! │                                                          │
//! │  ├─ clipboard ── 轮询 → 分类 → 历史（有界、文本去重）       │
//! │  ├─ hotkey ───── 权限检查 + 系统键盘拦截 → Option+V 激活    │
//! │  ├─ selection ── Showing → Committing → 恢复焦点 → 注入     │
//! │  ├─ input ────── 焦点记录 / 直接粘贴 / 模拟快捷键           │
//! │  └─ window_position  焦点控件 / 指针定位，屏幕内收边        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`settings`] | JSON 设置文件与数值钳制 |
//! | [`clipboard`] | 剪贴板端口、内容分类、历史存储、轮询器、自写入识别 |
//! | [`hotkey`] | 全局快捷键匹配、权限检查、系统拦截安装与卸载 |
//! | [`input`] | 回贴：焦点恢复、直接粘贴、模拟粘贴快捷键 |
//! | [`window_position`] | 面板锚点解析与屏幕边缘收边 |
//! | [`surface`] | 召回面板端口与终端实现 |
//! | [`selection`] | 选择 / 回贴状态机 |
//! | [`app`] | 事件循环与消息投递 |

pub mod app;
pub mod clipboard;
pub mod error;
pub mod hotkey;
pub mod input;
pub mod selection;
pub mod settings;
pub mod surface;
pub mod window_position;
