use infra::LogConfig;
use log::LevelFilter;
use log4rs::{
    append::{console::ConsoleAppender, file::FileAppender},
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};
use thiserror::Error;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {m}{n}";

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to open log file {0}: {1}")]
    File(String, std::io::Error),
    #[error("Invalid logging config: {0}")]
    Config(#[from] log4rs::config::runtime::ConfigErrors),
    #[error("Logger already initialized: {0}")]
    AlreadyInitialized(#[from] log::SetLoggerError),
}

/// 日志级别：RUST_LOG 优先，其次是配置文件，无法解析时使用 info
pub fn resolve_level(cfg: &LogConfig) -> LevelFilter {
    level_from(std::env::var("RUST_LOG").ok(), cfg)
}

fn level_from(env_level: Option<String>, cfg: &LogConfig) -> LevelFilter {
    env_level
        .unwrap_or_else(|| cfg.level.clone())
        .parse()
        .unwrap_or(LevelFilter::Info)
}

/// 配置日志同时输出到控制台和文件
pub fn init_logging(cfg: &LogConfig) -> Result<(), LoggingError> {
    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(&cfg.file)
        .map_err(|e| LoggingError::File(cfg.file.clone(), e))?;

    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        .appender(Appender::builder().build(
            "stdout",
            Box::new(
                ConsoleAppender::builder()
                    .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
                    .build(),
            ),
        ))
        .build(
            Root::builder()
                .appender("file")
                .appender("stdout")
                .build(resolve_level(cfg)),
        )?;

    log4rs::init_config(config)?;
    Ok(())
}
