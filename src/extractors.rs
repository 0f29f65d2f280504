//! Extractors whose rejections render through [`Error`], so malformed bodies
//! and query strings get the same `{error, message}` shape as every other
//! failure instead of axum's plain-text 400/415/422 responses.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::Error;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct ApiQuery<T>(pub T);
