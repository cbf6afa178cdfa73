//! 应用设置
//!
//! 设置以 JSON 文件保存在 `<config_dir>/clip-recall/settings.json`。
//! 文件不存在时使用默认值；越界的数值会被钳制到合法区间，而不是报错。

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

const APP_DIR_NAME: &str = "clip-recall";
const SETTINGS_FILE_NAME: &str = "settings.json";

const HISTORY_CAPACITY_DEFAULT: usize = 20;
const HISTORY_CAPACITY_MIN: usize = 1;
const HISTORY_CAPACITY_MAX: usize = 500;

const POLL_INTERVAL_DEFAULT_MS: u64 = 500;
const POLL_INTERVAL_MIN_MS: u64 = 50;
const POLL_INTERVAL_MAX_MS: u64 = 5_000;

const PASTE_DELAY_DEFAULT_MS: u64 = 100;
const PASTE_DELAY_MAX_MS: u64 = 2_000;

const THUMBNAIL_SIZE_DEFAULT: u32 = 32;
const THUMBNAIL_SIZE_MIN: u32 = 8;
const THUMBNAIL_SIZE_MAX: u32 = 256;

const PREVIEW_CHARS_DEFAULT: usize = 50;
const PREVIEW_CHARS_MIN: usize = 8;
const PREVIEW_CHARS_MAX: usize = 500;

/// 运行时设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// 历史记录容量上限
    pub history_capacity: usize,
    /// 剪贴板轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 关闭面板到发送粘贴之间的等待（毫秒）
    pub paste_delay_ms: u64,
    /// 图片缩略图边长（像素）
    pub thumbnail_size: u32,
    /// 文本预览截取的字符数
    pub preview_chars: usize,
    /// 选中条目后是否自动粘贴到原应用
    pub auto_paste: bool,
    /// 缺少权限时是否弹出系统授权提示
    pub prompt_for_permission: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            history_capacity: HISTORY_CAPACITY_DEFAULT,
            poll_interval_ms: POLL_INTERVAL_DEFAULT_MS,
            paste_delay_ms: PASTE_DELAY_DEFAULT_MS,
            thumbnail_size: THUMBNAIL_SIZE_DEFAULT,
            preview_chars: PREVIEW_CHARS_DEFAULT,
            auto_paste: true,
            prompt_for_permission: true,
        }
    }
}

impl AppSettings {
    /// 将所有数值钳制到合法区间
    pub fn normalized(mut self) -> Self {
        self.history_capacity = self
            .history_capacity
            .clamp(HISTORY_CAPACITY_MIN, HISTORY_CAPACITY_MAX);
        self.poll_interval_ms = self
            .poll_interval_ms
            .clamp(POLL_INTERVAL_MIN_MS, POLL_INTERVAL_MAX_MS);
        self.paste_delay_ms = self.paste_delay_ms.min(PASTE_DELAY_MAX_MS);
        self.thumbnail_size = self
            .thumbnail_size
            .clamp(THUMBNAIL_SIZE_MIN, THUMBNAIL_SIZE_MAX);
        self.preview_chars = self
            .preview_chars
            .clamp(PREVIEW_CHARS_MIN, PREVIEW_CHARS_MAX);
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn paste_delay(&self) -> Duration {
        Duration::from_millis(self.paste_delay_ms)
    }

    /// 从默认位置加载设置
    pub fn load() -> Result<Self, AppError> {
        Self::load_from(&settings_file_path()?)
    }

    /// 从指定文件加载设置；文件不存在时返回默认值
    pub fn load_from(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            log::debug!("设置文件不存在，使用默认设置: {}", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let parsed = serde_json::from_str::<AppSettings>(&content)
            .map_err(|e| AppError::Settings(format!("解析设置文件失败: {}", e)))?;

        Ok(parsed.normalized())
    }

    /// 保存到默认位置
    pub fn save(&self) -> Result<(), AppError> {
        self.save_to(&settings_file_path()?)
    }

    /// 保存到指定文件（父目录不存在时自动创建）
    pub fn save_to(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Settings(format!("序列化设置失败: {}", e)))?;

        fs::write(path, content)?;
        Ok(())
    }
}

/// 设置文件的默认路径
pub fn settings_file_path() -> Result<PathBuf, AppError> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| AppError::Settings("无法定位用户配置目录".to_string()))?;

    Ok(config_dir.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_cadence() {
        let settings = AppSettings::default();
        assert_eq!(settings.history_capacity, 20);
        assert_eq!(settings.poll_interval(), Duration::from_millis(500));
        assert_eq!(settings.thumbnail_size, 32);
        assert_eq!(settings.preview_chars, 50);
    }

    #[test]
    fn normalized_clamps_bounds() {
        let settings = AppSettings {
            history_capacity: 0,
            poll_interval_ms: 5,
            paste_delay_ms: 60_000,
            thumbnail_size: 4_096,
            preview_chars: 1,
            ..AppSettings::default()
        }
        .normalized();

        assert_eq!(settings.history_capacity, 1);
        assert_eq!(settings.poll_interval_ms, 50);
        assert_eq!(settings.paste_delay_ms, 2_000);
        assert_eq!(settings.thumbnail_size, 256);
        assert_eq!(settings.preview_chars, 8);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded = AppSettings::load_from(&dir.path().join("nope.json")).expect("load");
        assert_eq!(loaded, AppSettings::default());
    }

    #[test]
    fn partial_camel_case_file_fills_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "historyCapacity": 5, "pasteDelayMs": 250 }"#).expect("write");

        let loaded = AppSettings::load_from(&path).expect("load");
        assert_eq!(loaded.history_capacity, 5);
        assert_eq!(loaded.paste_delay_ms, 250);
        assert_eq!(loaded.poll_interval_ms, 500);
        assert!(loaded.auto_paste);
    }

    #[test]
    fn malformed_file_is_settings_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").expect("write");

        assert!(matches!(
            AppSettings::load_from(&path),
            Err(AppError::Settings(_))
        ));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("settings.json");
        let settings = AppSettings {
            history_capacity: 42,
            auto_paste: false,
            ..AppSettings::default()
        };

        settings.save_to(&path).expect("save");
        assert_eq!(AppSettings::load_from(&path).expect("load"), settings);
    }
}
