//! # 剪贴板历史召回 — 应用入口
//!
//! 本文件仅负责日志、设置与系统协作方的装配。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use clip_recall::app::{event_channel, App, AppComponents};
use clip_recall::clipboard::SystemClipboard;
use clip_recall::hotkey::{system_interceptor, SystemPermissionGate};
use clip_recall::input::SystemPasteBack;
use clip_recall::settings::{settings_file_path, AppSettings};
use clip_recall::surface::ConsoleSurface;
use clip_recall::window_position::SystemAnchorProvider;

fn load_settings() -> AppSettings {
    match AppSettings::load() {
        Ok(settings) => {
            // 首次运行时写出默认设置，方便用户修改
            if let Ok(path) = settings_file_path()
                && !path.exists()
                && let Err(err) = settings.save()
            {
                log::warn!("写入默认设置失败: {err}");
            }
            settings
        }
        Err(err) => {
            log::warn!("⚠️ 读取设置失败，使用默认设置: {err}");
            AppSettings::default()
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = load_settings();
    log::info!("setup: settings loaded {:?}", settings);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            log::error!("❌ 创建异步运行时失败: {err}");
            std::process::exit(1);
        }
    };

    runtime.block_on(async move {
        let (events_tx, events_rx) = event_channel();

        let surface = match ConsoleSurface::spawn(events_tx.clone()) {
            Ok(surface) => surface,
            Err(err) => {
                log::error!("❌ 启动终端面板失败: {err}");
                return;
            }
        };

        let components = AppComponents {
            clipboard: std::sync::Arc::new(SystemClipboard::default()),
            paste_driver: Box::new(SystemPasteBack),
            surface: Box::new(surface),
            anchors: Box::new(SystemAnchorProvider),
            permission: Box::new(SystemPermissionGate::new(settings.prompt_for_permission)),
            interceptor: system_interceptor(),
        };

        App::new(settings, components, events_tx, events_rx).run().await;
    });
}
