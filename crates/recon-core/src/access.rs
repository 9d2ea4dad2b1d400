//! Match visibility checks.
//!
//! Authorization is a small collaborator handed to whatever needs it. It is
//! not a mixin. Implementations answer one question: may this viewer see
//! this match?

use std::{convert::Infallible, future::Future};

use crate::event::{MatchId, SteamId};

pub trait MatchAccess: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn can_view<'a>(
    &'a self,
    viewer: &'a SteamId,
    match_id: MatchId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}

/// Grants every viewer access to every match; for admin tooling and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl MatchAccess for AllowAll {
  type Error = Infallible;

  async fn can_view(
    &self,
    _viewer: &SteamId,
    _match_id: MatchId,
  ) -> Result<bool, Infallible> {
    Ok(true)
  }
}
