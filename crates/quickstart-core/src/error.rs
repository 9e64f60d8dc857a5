use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuickstartError {
    // Environment errors
    #[error(
        "Docker is not installed or not running.\n\
         Please install Docker and start it before running quickstart.\n\
         Get Docker from: https://www.docker.com/get-started"
    )]
    RuntimeUnavailable,

    // Step errors
    #[error("Step {step} failed: {detail}")]
    StepExecution { step: String, detail: String },

    #[error("Interrupted by user")]
    Interrupted,

    // Process errors
    #[error("Failed to launch {command}: {message}")]
    Spawn { command: String, message: String },

    // Config errors
    #[error("Config error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, QuickstartError>;
