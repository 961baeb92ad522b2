use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpecError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Unrecognized date '{value}' for {format} parser")]
    UnrecognizedDate { format: &'static str, value: String },

    #[error("Malformed URL suffix '{0}', expected resYYYYqQ/...")]
    MalformedUrlSuffix(String),

    #[error("Failed to parse {field} from '{value}'")]
    Parse { field: &'static str, value: String },

    #[error("No raw datasets found for {0}; run harvest first")]
    NoRawData(String),

    #[error("Page structure error at {url}: {message}")]
    Page { url: String, message: String },
}

impl SpecError {
    pub fn parse(field: &'static str, value: impl Into<String>) -> Self {
        SpecError::Parse {
            field,
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SpecError>;
