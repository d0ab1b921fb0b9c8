use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Nothing to spin")]
    NothingToSpin,

    #[error("Spin already in progress")]
    SpinInProgress,

    #[error("Storage error: {0}")]
    StorageError(#[from] std::io::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    /// 稳定的错误码（供展示层映射提示文案）
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::NothingToSpin => "NOTHING_TO_SPIN",
            AppError::SpinInProgress => "SPIN_IN_PROGRESS",
            AppError::StorageError(_) => "STORAGE_ERROR",
            AppError::SerdeJsonError(_) => "SERIALIZATION_ERROR",
            AppError::ConfigError(_) => "CONFIG_ERROR",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// 用户可触发的错误（校验 / 无法抽奖）记 warn，其余记 error
    pub fn log(&self) {
        match self {
            AppError::ValidationError(msg) => log::warn!("Validation error: {msg}"),
            AppError::NotFound(msg) => log::warn!("Not found: {msg}"),
            AppError::NothingToSpin | AppError::SpinInProgress => {
                log::warn!("Spin rejected: {self}")
            }
            AppError::StorageError(err) => log::error!("Storage error: {err}"),
            _ => log::error!("Internal error: {self}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::NothingToSpin.code(), "NOTHING_TO_SPIN");
        assert_eq!(AppError::SpinInProgress.code(), "SPIN_IN_PROGRESS");
        assert_eq!(
            AppError::ValidationError("empty".into()).code(),
            "VALIDATION_ERROR"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AppError = io.into();
        assert_eq!(err.code(), "STORAGE_ERROR");
        assert!(err.to_string().contains("denied"));
    }
}
