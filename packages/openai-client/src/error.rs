use thiserror::Error;

pub type Result<T> = std::result::Result<T, OpenAIError>;

#[derive(Debug, Error)]
pub enum OpenAIError {
    /// The HTTP client could not be built
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection failed or the request timed out
    #[error("Network error: {0}")]
    Network(String),

    #[error("OpenAI returned {status}: {message}")]
    Api { status: u16, message: String },

    /// 2xx reply without a usable message
    #[error("Empty reply: {0}")]
    EmptyReply(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
