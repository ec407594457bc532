use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::did_auth::ErrorBody;

/// Campaign operation failures.
#[derive(Debug, Error)]
pub enum CampaignError {
    #[error("invalid campaign request: {0}")]
    Validation(String),
    #[error("campaign not found")]
    NotFound,
    #[error("access denied")]
    Forbidden,
    #[error("campaign storage failure: {0}")]
    Storage(String),
}

impl CampaignError {
    pub fn code(&self) -> i32 {
        match self {
            Self::Validation(_) => 4005,
            Self::Forbidden => 4030,
            Self::NotFound => 4040,
            Self::Storage(_) => 5000,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::Forbidden => "ACCESS_DENIED",
            Self::NotFound => "CAMPAIGN_NOT_FOUND",
            Self::Storage(_) => "INTERNAL_ERROR",
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for CampaignError {
    fn from(e: validator::ValidationErrors) -> Self {
        Self::Validation(e.to_string())
    }
}

impl IntoResponse for CampaignError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Storage(detail) => {
                tracing::error!(error = %detail, "campaign storage failure");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        let body = ErrorBody {
            code: self.code(),
            error: self.name().to_string(),
            message,
        };
        (self.http_status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(CampaignError::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(CampaignError::Forbidden.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(
            CampaignError::Validation("x".into()).http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            CampaignError::Storage("disk".into()).http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_storage_detail_hidden() {
        let resp = CampaignError::Storage("secret path".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
