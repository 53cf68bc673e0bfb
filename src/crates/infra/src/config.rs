use application::query::config::ViewConfig;
use config::{Config, Environment, File};
use dotenvy::dotenv;
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawConfig {
    /// 读视图配置
    engagement: RawEngagementConfig,
    /// 日志配置
    log: RawLogConfig,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            engagement: RawEngagementConfig::default(),
            log: RawLogConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawEngagementConfig {
    /// 排行榜默认长度
    top_size: usize,
    /// 随机推荐默认数量
    sample_size: usize,
    /// 随机数种子，不设置时使用系统熵
    sample_seed: Option<u64>,
}

impl Default for RawEngagementConfig {
    fn default() -> Self {
        Self {
            top_size: 10,
            sample_size: 10,
            sample_seed: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawLogConfig {
    level: String,
    file: String,
}

impl Default for RawLogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: "app.log".to_string(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 日志级别，RUST_LOG 环境变量优先
    pub level: String,
    /// 日志文件路径
    pub file: String,
}

#[derive(Debug, Clone)]
pub struct AppConfigImpl {
    pub top_size: Arc<AtomicUsize>,
    pub sample_size: Arc<AtomicUsize>,
    pub sample_seed: Arc<RwLock<Option<u64>>>,
    pub log: Arc<RwLock<LogConfig>>,
}

impl AppConfigImpl {
    fn new(data: RawConfig) -> Self {
        let log_config = LogConfig {
            level: data.log.level,
            file: data.log.file,
        };
        AppConfigImpl {
            top_size: Arc::new(AtomicUsize::new(data.engagement.top_size)),
            sample_size: Arc::new(AtomicUsize::new(data.engagement.sample_size)),
            sample_seed: Arc::new(RwLock::new(data.engagement.sample_seed)),
            log: Arc::new(RwLock::new(log_config)),
        }
    }

    fn validate(data: &RawConfig) -> Result<(), ConfigError> {
        if data.engagement.top_size == 0 {
            return Err(ConfigError::Invalid(
                "engagement.top_size must be greater than 0".to_string(),
            ));
        }
        if data.engagement.sample_size == 0 {
            return Err(ConfigError::Invalid(
                "engagement.sample_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// 从 .env、config 文件和 APP__ 前缀的环境变量加载配置
    pub fn load() -> Result<AppConfigImpl, ConfigError> {
        dotenv().ok();
        Self::load_from("config")
    }

    /// 从指定的配置文件（不存在也可以）和环境变量加载配置
    pub fn load_from(file_name: &str) -> Result<AppConfigImpl, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(file_name).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        let raw: RawConfig = config.try_deserialize()?; // serde 自动填充默认值
        Self::validate(&raw)?;
        Ok(AppConfigImpl::new(raw))
    }

    pub fn log(&self) -> LogConfig {
        match self.log.read() {
            Ok(cfg_val) => cfg_val.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Default for AppConfigImpl {
    fn default() -> Self {
        AppConfigImpl::new(RawConfig::default())
    }
}

impl ViewConfig for AppConfigImpl {
    fn default_top_size(&self) -> usize {
        self.top_size.load(Ordering::SeqCst)
    }

    fn default_sample_size(&self) -> usize {
        self.sample_size.load(Ordering::SeqCst)
    }

    fn sample_seed(&self) -> Option<u64> {
        match self.sample_seed.read() {
            Ok(seed) => *seed,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
