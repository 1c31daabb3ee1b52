//! Extractors whose rejections render as the failure envelope instead of
//! axum's plain-text bodies.

use axum::extract::{FromRequest, FromRequestParts};

use crate::ServerError;

/// JSON request body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub struct Payload<T>(pub T);

/// Query string. Non-numeric values for numeric filters are rejected here.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ServerError))]
pub struct Params<T>(pub T);

/// Path parameters, usually a numeric id.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ServerError))]
pub struct Id<T>(pub T);
