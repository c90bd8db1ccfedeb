use crate::error::AppError;

// Unknown paths are still behind the gate; only authenticated callers see this 404.
pub async fn not_found() -> AppError {
    AppError::NotFound
}
