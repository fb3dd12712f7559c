use axum::extract::{FromRequest, FromRequestParts};

use crate::api::models::ApiError;

// Same as the axum extractors, but rejections come back as `ApiError`
// so malformed input still gets the `{message}` body.

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct AppPath<T>(pub T);
