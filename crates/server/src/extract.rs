use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::header,
    Form, Json,
};
use serde::de::DeserializeOwned;

use crate::errors::ApiError;

/// Create-endpoint body: JSON by default, or an urlencoded form when the
/// request says so. `J` and `F` are the shapes for each encoding.
#[derive(Debug)]
pub enum JsonOrForm<J, F> {
    Json(J),
    Form(F),
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

#[async_trait]
impl<S, J, F> FromRequest<S> for JsonOrForm<J, F>
where
    S: Send + Sync,
    J: DeserializeOwned,
    F: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(form) = Form::<F>::from_request(req, state).await?;
            Ok(Self::Form(form))
        } else {
            let Json(body) = Json::<J>::from_request(req, state).await?;
            Ok(Self::Json(body))
        }
    }
}
