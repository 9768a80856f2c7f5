//! Sender identity extractor
//!
//! The transport reports who sent a command in the `x-nexus-sender` header.
//! A missing or unparseable header yields no identity, which no authority
//! check accepts. Extraction itself never fails.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use nexus_common::SenderId;
use std::convert::Infallible;
use tracing::debug;

/// Header carrying the transport-attributed sender id
pub const SENDER_HEADER: &str = "x-nexus-sender";

/// Sender of the current request, if the transport named one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSender(pub Option<SenderId>);

#[async_trait]
impl<S> FromRequestParts<S> for CommandSender
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let sender = parts
            .headers
            .get(SENDER_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| match raw.parse::<SenderId>() {
                Ok(id) => Some(id),
                Err(e) => {
                    debug!("Ignoring {} header: {}", SENDER_HEADER, e);
                    None
                }
            });
        Ok(CommandSender(sender))
    }
}
