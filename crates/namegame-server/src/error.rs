use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use namegame_core::GameError;

use crate::resolver::ResolveError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("too many subscribers")]
    Unavailable,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Game(e) => game_status(e),
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(_) | Self::Resolve(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }
}

fn game_status(error: &GameError) -> StatusCode {
    match error {
        GameError::NoActiveGame => StatusCode::NOT_FOUND,
        GameError::GameAlreadyRunning | GameError::VoteInProgress => StatusCode::CONFLICT,
        GameError::RestrictedChannel | GameError::NotPlaying => StatusCode::FORBIDDEN,
        GameError::NotYourTurn
        | GameError::AlreadyPicked(_)
        | GameError::TeamNotFound(_)
        | GameError::BadTeamContinuity { .. }
        | GameError::UnsupportedMode(_)
        | GameError::AlreadyInGame(_)
        | GameError::AlreadyEliminated(_)
        | GameError::BotNotAllowed(_) => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_errors_map_to_client_statuses() {
        assert_eq!(
            AppError::from(GameError::NoActiveGame).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(GameError::GameAlreadyRunning).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(GameError::TeamNotFound(1)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(GameError::RestrictedChannel).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn message_is_user_facing() {
        let err = AppError::from(GameError::AlreadyPicked(254));
        assert_eq!(
            err.to_string(),
            "Team 254 has already been picked! You have been skipped and given a strike."
        );
    }
}
