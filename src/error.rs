use thiserror::Error;

#[derive(Debug, Error)]
pub enum VizError {
    #[error("failed to decode audio: {0}")]
    Decode(#[from] symphonia::core::errors::Error),

    #[error("no decodable audio track in {0}")]
    NoTrack(String),

    #[error("no output device available")]
    NoOutputDevice,

    #[error("output device doesn't support {0} samples")]
    UnsupportedFormat(String),

    #[error("audio stream error: {0}")]
    Stream(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, VizError>;
