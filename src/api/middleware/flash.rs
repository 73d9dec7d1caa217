use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::error::AppError;

/// Session key holding the queued flash messages
pub const SESSION_KEY_FLASH: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    /// CSS class the templates style notices with.
    pub fn css_class(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

/// Queue a notice for the next rendered page.
pub async fn push_flash(
    session: &Session,
    level: FlashLevel,
    message: impl Into<String>,
) -> Result<(), AppError> {
    let mut flashes: Vec<FlashMessage> = session
        .get(SESSION_KEY_FLASH)
        .await
        .map_err(|e| AppError::Session(e.to_string()))?
        .unwrap_or_default();

    flashes.push(FlashMessage {
        level,
        message: message.into(),
    });

    session
        .insert(SESSION_KEY_FLASH, flashes)
        .await
        .map_err(|e| AppError::Session(e.to_string()))
}

/// Drain the queued notices; each message is shown exactly once.
pub async fn take_flashes(session: &Session) -> Result<Vec<FlashMessage>, AppError> {
    let flashes = session
        .remove(SESSION_KEY_FLASH)
        .await
        .map_err(|e| AppError::Session(e.to_string()))?
        .unwrap_or_default();

    Ok(flashes)
}
