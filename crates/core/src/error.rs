use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No options to select from.")]
    Empty,

    #[error("Selection cancelled.")]
    Quit,

    #[error("The host runner exited with code {}.", _0)]
    SubProcessExit(i32),

    #[error("Error with sub process: {}", _0)]
    SubProcess(#[from] std::io::Error),

    #[error("Missing environment variable `{}`. Is this running under the host runner?", _0)]
    MissingEnv(&'static str),

    #[error("Error parsing dumped arguments: {}", _0)]
    Json(#[from] serde_json::Error),

    #[error("Shell `{}` does not support commandline injection.", _0)]
    UnsupportedShell(String),

    #[error("IO error with {} file at `{}`: {}", .file_description, .path, .original)]
    Io {
        file_description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("Misc error: {}", _0)]
    Misc(String),
}

impl Error {
    pub fn io_error(file_description: String, path: String, original: std::io::Error) -> Self {
        Self::Io {
            file_description,
            path,
            original,
        }
    }

    /// True for the two ways a selector interaction ends without a
    /// choice; the binaries treat both as a clean exit.
    #[must_use]
    pub fn is_selection_end(&self) -> bool {
        matches!(self, Error::Empty | Error::Quit)
    }
}
