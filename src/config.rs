use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub spin: SpinConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// FileStorage 的数据目录
    #[serde(default = "default_storage_dir")]
    pub dir: String,
    #[serde(default = "default_options_key")]
    pub options_key: String,
    #[serde(default = "default_history_key")]
    pub history_key: String,
}

/// 指针对齐方式
/// - uniform: 按选项个数均分（与转盘原始行为一致）
/// - weighted: 对齐到按数量加权的扇区中点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Uniform,
    Weighted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpinConfig {
    /// 动画时长，结束后才公布结果
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    /// 每次额外转的整圈数
    #[serde(default = "default_full_turns")]
    pub full_turns: u32,
    #[serde(default)]
    pub alignment: Alignment,
}

fn default_storage_dir() -> String {
    "data".to_string()
}

fn default_options_key() -> String {
    "luckyWheelOptions".to_string()
}

fn default_history_key() -> String {
    "luckyWheelHistory".to_string()
}

fn default_duration_ms() -> u64 {
    5000
}

fn default_full_turns() -> u32 {
    4
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            dir: default_storage_dir(),
            options_key: default_options_key(),
            history_key: default_history_key(),
        }
    }
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_duration_ms(),
            full_turns: default_full_turns(),
            alignment: Alignment::default(),
        }
    }
}

impl StorageBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Some(StorageBackend::File),
            "memory" => Some(StorageBackend::Memory),
            _ => None,
        }
    }
}

impl Alignment {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "uniform" => Some(Alignment::Uniform),
            "weighted" => Some(Alignment::Weighted),
            _ => None,
        }
    }
}

impl Config {
    pub fn from_toml() -> AppResult<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 配置文件不存在时完全依赖环境变量与默认值
        let mut config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::parse(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("{config_path} not found, using defaults and environment");
                Config::default()
            }
            Err(e) => {
                return Err(AppError::ConfigError(format!(
                    "无法读取配置文件 {config_path}: {e}"
                )));
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn parse(config_str: &str) -> AppResult<Self> {
        toml::from_str(config_str)
            .map_err(|e| AppError::ConfigError(format!("解析配置文件失败: {e}")))
    }

    /// 环境变量覆盖（即便文件存在时也覆盖）
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("WHEEL_STORAGE_BACKEND") {
            match StorageBackend::parse(&v) {
                Some(backend) => self.storage.backend = backend,
                None => log::warn!("Ignoring unknown WHEEL_STORAGE_BACKEND: {v}"),
            }
        }
        if let Ok(v) = env::var("WHEEL_STORAGE_DIR") {
            self.storage.dir = v;
        }
        if let Ok(v) = env::var("WHEEL_OPTIONS_KEY") {
            self.storage.options_key = v;
        }
        if let Ok(v) = env::var("WHEEL_HISTORY_KEY") {
            self.storage.history_key = v;
        }
        if let Ok(v) = env::var("WHEEL_SPIN_DURATION_MS")
            && let Ok(ms) = v.parse()
        {
            self.spin.duration_ms = ms;
        }
        if let Ok(v) = env::var("WHEEL_FULL_TURNS")
            && let Ok(n) = v.parse()
        {
            self.spin.full_turns = n;
        }
        if let Ok(v) = env::var("WHEEL_ALIGNMENT") {
            match Alignment::parse(&v) {
                Some(alignment) => self.spin.alignment = alignment,
                None => log::warn!("Ignoring unknown WHEEL_ALIGNMENT: {v}"),
            }
        }
    }
}
