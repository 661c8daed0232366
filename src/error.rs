//! Application error type.
//!
//! Every fallible path in the crate returns `AppError`, which pairs a
//! human-readable message with the process exit code `main` should use:
//!
//! - `2`: input/configuration problems (missing file, bad schema, bad flag)
//! - `3`: the dataset has no usable rows
//! - `4`: runtime failures (rendering, terminal, sockets, writes)

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Input or configuration error (exit code 2).
    pub fn input(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    /// No usable data after loading (exit code 3).
    pub fn no_data(message: impl Into<String>) -> Self {
        Self::new(3, message)
    }

    /// Runtime failure while rendering, serving or writing (exit code 4).
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(4, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
