use thiserror::Error;

/// Main error type for OptionLens
#[derive(Error, Debug)]
pub enum OlError {
    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OlError {
    /// The analytics error kind, if this error came from the analytics core.
    pub fn as_analytics(&self) -> Option<&AnalyticsError> {
        match self {
            OlError::Analytics(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_insufficient_data(&self) -> bool {
        matches!(
            self,
            OlError::Analytics(AnalyticsError::InsufficientData { .. })
        )
    }
}

/// Recoverable conditions raised by the analytics functions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Invalid contract: {message}")]
    InvalidContract { message: String },

    #[error("Insufficient data: need {required} observations, got {available} ({message})")]
    InsufficientData {
        required: usize,
        available: usize,
        message: String,
    },

    #[error("Invalid parameter {parameter}: {message}")]
    InvalidParameter { parameter: String, message: String },
}

/// Errors surfaced by a market data gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("No data available for {symbol} in {range}")]
    NoData { symbol: String, range: String },

    #[error("Data parsing error: {message}")]
    ParseError { message: String },

    #[error("Gateway unavailable: {message}")]
    Unavailable { message: String },
}

/// Result type alias for OptionLens operations
pub type OlResult<T> = Result<T, OlError>;

/// Macro for creating invalid-parameter errors
#[macro_export]
macro_rules! invalid_parameter {
    ($param:expr, $($arg:tt)*) => {
        $crate::OlError::Analytics($crate::AnalyticsError::InvalidParameter {
            parameter: $param.to_string(),
            message: format!($($arg)*),
        })
    };
}

/// Macro for creating invalid-contract errors
#[macro_export]
macro_rules! invalid_contract {
    ($($arg:tt)*) => {
        $crate::OlError::Analytics($crate::AnalyticsError::InvalidContract {
            message: format!($($arg)*),
        })
    };
}

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::OlError::Config(format!($($arg)*))
    };
}
