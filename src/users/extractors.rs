use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use tracing::warn;

use super::dto::RawUserInput;
use super::validation::FieldError;
use crate::error::AppError;

/// JSON user body with body-level failures mapped onto [`AppError`].
///
/// Well-formed JSON of the wrong shape is a validation failure (422);
/// anything that is not JSON at all is a bad request (400).
pub struct UserPayload(pub RawUserInput);

#[async_trait]
impl<S> FromRequest<S> for UserPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<RawUserInput>::from_request(req, state).await {
            Ok(Json(raw)) => Ok(UserPayload(raw)),
            Err(JsonRejection::JsonDataError(e)) => {
                warn!(error = %e.body_text(), "user body has wrong shape");
                Err(AppError::Validation(vec![FieldError {
                    field: "body",
                    rule: "type",
                    message: e.body_text(),
                }]))
            }
            Err(e) => {
                warn!(error = %e.body_text(), "unreadable user body");
                Err(AppError::BadRequest(e.body_text()))
            }
        }
    }
}
