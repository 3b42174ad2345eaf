use std::fmt;

#[derive(Debug, Clone)]
pub enum IpGeoError {
    Configuration(String),
    DatabaseUnavailable(String),
    InvalidAddress(String),
    AddressNotFound(String),
    Lookup(String),
    FileOperation(String),
    Serialization(String),
}

impl IpGeoError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            IpGeoError::Configuration(_) => "E001",
            IpGeoError::DatabaseUnavailable(_) => "E002",
            IpGeoError::InvalidAddress(_) => "E003",
            IpGeoError::AddressNotFound(_) => "E004",
            IpGeoError::Lookup(_) => "E005",
            IpGeoError::FileOperation(_) => "E006",
            IpGeoError::Serialization(_) => "E007",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            IpGeoError::Configuration(_) => "Configuration Error",
            IpGeoError::DatabaseUnavailable(_) => "GeoIP Database Unavailable",
            IpGeoError::InvalidAddress(_) => "Invalid IP Address",
            IpGeoError::AddressNotFound(_) => "Address Not Found",
            IpGeoError::Lookup(_) => "GeoIP Lookup Error",
            IpGeoError::FileOperation(_) => "File Operation Error",
            IpGeoError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            IpGeoError::Configuration(msg)
            | IpGeoError::DatabaseUnavailable(msg)
            | IpGeoError::InvalidAddress(msg)
            | IpGeoError::AddressNotFound(msg)
            | IpGeoError::Lookup(msg)
            | IpGeoError::FileOperation(msg)
            | IpGeoError::Serialization(msg) => msg,
        }
    }

    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            IpGeoError::InvalidAddress(_) => 400,
            IpGeoError::AddressNotFound(_) => 404,
            _ => 500,
        }
    }

    /// 返回给客户端的错误信息
    ///
    /// 内部细节（路径、底层错误）只写日志，不会出现在响应里。
    pub fn client_message(&self) -> &'static str {
        match self {
            IpGeoError::DatabaseUnavailable(_) => "GeoIP database is not available on the server.",
            IpGeoError::InvalidAddress(_) => "Invalid or missing IP address.",
            IpGeoError::AddressNotFound(_) => "IP address not found in GeoIP database.",
            _ => "Internal server error.",
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    #[cfg(feature = "server")]
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for IpGeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for IpGeoError {}

// 便捷的构造函数
impl IpGeoError {
    pub fn configuration<T: Into<String>>(msg: T) -> Self {
        IpGeoError::Configuration(msg.into())
    }

    pub fn database_unavailable<T: Into<String>>(msg: T) -> Self {
        IpGeoError::DatabaseUnavailable(msg.into())
    }

    pub fn invalid_address<T: Into<String>>(msg: T) -> Self {
        IpGeoError::InvalidAddress(msg.into())
    }

    pub fn address_not_found<T: Into<String>>(msg: T) -> Self {
        IpGeoError::AddressNotFound(msg.into())
    }

    pub fn lookup<T: Into<String>>(msg: T) -> Self {
        IpGeoError::Lookup(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        IpGeoError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        IpGeoError::Serialization(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<std::io::Error> for IpGeoError {
    fn from(err: std::io::Error) -> Self {
        IpGeoError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for IpGeoError {
    fn from(err: serde_json::Error) -> Self {
        IpGeoError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for IpGeoError {
    fn from(err: config::ConfigError) -> Self {
        IpGeoError::Configuration(err.to_string())
    }
}

impl From<maxminddb::MaxMindDbError> for IpGeoError {
    fn from(err: maxminddb::MaxMindDbError) -> Self {
        IpGeoError::Lookup(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IpGeoError>;
