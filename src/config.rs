//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `WINDIA__*` 覆盖（双下划线表示嵌套，如 `WINDIA__BOT__PREFIX='!'`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub bot: BotSection,
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub queue: QueueSection,
}

/// [bot] 段：命令前缀、指定机器人频道
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotSection {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// 指定机器人频道 ID；未配置时任何频道都可触发 FAQ
    pub channel: Option<u64>,
}

fn default_prefix() -> String {
    "$".to_string()
}

impl Default for BotSection {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            channel: None,
        }
    }
}

/// [store] 段：FAQ 存储的数据库文件路径
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("windia.db")
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// [queue] 段：调度队列排水节拍
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueSection {
    /// 排水节拍（毫秒）；吞吐/延迟权衡，历史取值在 100~500 之间
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

fn default_tick_ms() -> u64 {
    250
}

impl Default for QueueSection {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bot: BotSection::default(),
            store: StoreSection::default(),
            queue: QueueSection::default(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 WINDIA__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 WINDIA__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("WINDIA")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
