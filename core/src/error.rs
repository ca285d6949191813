use thiserror::Error;

pub type Result<T> = std::result::Result<T, UiErr>;

#[derive(Error, Debug)]
pub enum UiErr {
    /// Transport-level failure: connection refused, timeout, body that is not
    /// the expected JSON shape.
    #[error("request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to parse config.toml: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config override `{0}`: expected key=value")]
    InvalidOverride(String),

    #[error("unknown config key `{0}`")]
    UnknownConfigKey(String),

    #[error("could not determine home directory; set EDU_HOME")]
    NoHomeDir,

    /// The controller task has stopped and no longer accepts operations.
    #[error("ui controller stopped")]
    ControllerStopped,
}
