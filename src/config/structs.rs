use serde::{Deserialize, Serialize};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 部署平台沿用的环境变量名（优先级高于 config.toml 和 IPGEO__ 前缀变量）
pub mod env_keys {
    pub const TRUST_PROXY_CIDRS: &str = "TRUST_PROXY_CIDRS";
    pub const TRUST_PROXY_HEADERS: &str = "TRUST_PROXY_HEADERS";
    pub const PLATFORM_FLAG: &str = "RENDER";
    pub const PLATFORM_EXTERNAL_URL: &str = "RENDER_EXTERNAL_URL";
    pub const GEOIP_DB_PATH: &str = "GEOIP_DB_PATH";
}

/// 静态配置（启动时加载一次，之后只读）
///
/// 包含：
/// - server: 监听地址、端口、worker 数量
/// - geoip: GeoLite2 数据库路径
/// - proxy: 可信代理原始配置（字符串形式，由 `build_trust_config` 解析）
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub geoip: GeoIpConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：平台环境变量 > IPGEO__ 前缀变量 > 配置文件 > 默认值
    /// 示例：IPGEO__SERVER__PORT=9999
    pub fn load(path: Option<&str>) -> Self {
        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

        match Self::try_load(path) {
            Ok(config) => {
                if std::path::Path::new(path).exists() {
                    eprintln!("[INFO] Configuration loaded from: {}", path);
                }
                config
            }
            Err(e) => {
                eprintln!("[ERROR] Failed to load config: {}", e);
                Self::default()
            }
        }
    }

    fn try_load(path: &str) -> Result<Self, config::ConfigError> {
        use config::{Config, Environment, File, FileFormat};

        let env = |key: &str| std::env::var(key).ok();

        Config::builder()
            // 1. 配置文件（可选）
            .add_source(File::new(path, FileFormat::Toml).required(false))
            // 2. IPGEO__ 前缀的环境变量
            .add_source(
                Environment::with_prefix("IPGEO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            // 3. 平台环境变量
            .set_override_option("proxy.trusted_cidrs", env(env_keys::TRUST_PROXY_CIDRS))?
            .set_override_option("proxy.trust_headers", env(env_keys::TRUST_PROXY_HEADERS))?
            .set_override_option("proxy.platform_flag", env(env_keys::PLATFORM_FLAG))?
            .set_override_option(
                "proxy.platform_external_url",
                env(env_keys::PLATFORM_EXTERNAL_URL),
            )?
            .set_override_option("geoip.database_path", env(env_keys::GEOIP_DB_PATH))?
            .build()?
            .try_deserialize::<StaticConfig>()
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> crate::errors::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::errors::IpGeoError::serialization(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

/// GeoIP 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoIpConfig {
    /// MaxMind GeoLite2-City.mmdb 文件路径
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

/// 可信代理配置
///
/// 保持原始字符串，解析逻辑集中在 `services::trust::build_trust_config`。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProxyConfig {
    /// 逗号分隔的 CIDR 列表，例如 "10.0.0.0/8, 172.16.0.0/12"
    #[serde(default)]
    pub trusted_cidrs: String,
    /// 无条件信任转发头（"1" / "true" / "yes" / "on"）
    #[serde(default)]
    pub trust_headers: String,
    /// 托管平台标记（Render 的 RENDER 变量）
    #[serde(default)]
    pub platform_flag: String,
    /// 托管平台分配的外部 URL（Render 的 RENDER_EXTERNAL_URL 变量）
    #[serde(default)]
    pub platform_external_url: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8000
}

fn default_workers() -> usize {
    num_cpus::get().min(32)
}

fn default_database_path() -> String {
    "GeoLite2-City.mmdb".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            workers: default_workers(),
        }
    }
}

impl Default for GeoIpConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
