#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),
}

#[derive(thiserror::Error, Debug)]
pub enum AudioError {
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Decoded audio contains no frames")]
    EmptyAudio,

    #[error("Decode task failed: {0}")]
    DecodeTask(String),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Decoding error: {0}")]
    Decoding(String),

    #[error("Unsupported sample format: {0}")]
    UnsupportedSampleFormat(String),

    #[error("Invalid data: {0}")]
    InvalidData(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Configuration parsing error: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Failed to read audio file {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Audio source is empty")]
    Empty,
}

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("Surface has no drawable area ({width}x{height})")]
    EmptySurface { width: u32, height: u32 },

    #[error("Drawing backend error: {0}")]
    Backend(String),

    #[error("PNG encoding error: {0}")]
    Png(#[from] png::EncodingError),
}

#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("Server initialization error: {0}")]
    Init(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<CodecError> for Error {
    fn from(err: CodecError) -> Self {
        Error::Audio(AudioError::Codec(err))
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(ConfigError::Parse(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
