// Error type shared by the terminal front end, config loader and audio player

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuizError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("config file {path} is malformed: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("no audio output device is available")]
    AudioDevice(#[from] rodio::StreamError),
    #[error("sound asset could not be decoded")]
    AudioDecode(#[from] rodio::decoder::DecoderError),
    #[error("audio playback failed")]
    AudioPlay(#[from] rodio::PlayError),
}

pub type Result<T> = std::result::Result<T, QuizError>;
