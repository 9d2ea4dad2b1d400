//! [`ParticipantAccess`]: a viewer may see the matches they played in.

use std::sync::Arc;

use recon_core::{
  access::MatchAccess,
  event::{MatchId, SteamId},
  store::MatchStore,
};

#[derive(Clone)]
pub struct ParticipantAccess<S> {
  store: Arc<S>,
}

impl<S> ParticipantAccess<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }
}

impl<S: MatchStore> MatchAccess for ParticipantAccess<S> {
  type Error = S::Error;

  async fn can_view(
    &self,
    viewer: &SteamId,
    match_id: MatchId,
  ) -> Result<bool, S::Error> {
    let participants = self.store.participants(match_id).await?;
    Ok(participants.iter().any(|p| &p.steam_id == viewer))
  }
}
