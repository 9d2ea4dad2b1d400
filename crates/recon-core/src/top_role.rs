//! Best player per role within a single match.
//!
//! Ties go to the first participant in input order. Participant lists come
//! from the store in a stable order, so the result is deterministic.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::{
  event::{Participant, PlayerMatchEvent, SteamId},
  role::{Role, RoleScores},
};

/// The holder of one role slot. The empty slot is `{null, null, 0}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopRoleEntry {
  pub name:     Option<String>,
  pub steam_id: Option<SteamId>,
  pub score:    u8,
}

impl TopRoleEntry {
  pub fn is_empty(&self) -> bool { self.steam_id.is_none() }
}

/// Best player for each role in a match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopRoles {
  pub opener:  TopRoleEntry,
  pub closer:  TopRoleEntry,
  pub support: TopRoleEntry,
  pub fragger: TopRoleEntry,
}

impl TopRoles {
  pub fn get(&self, role: Role) -> &TopRoleEntry {
    match role {
      Role::Opener => &self.opener,
      Role::Closer => &self.closer,
      Role::Support => &self.support,
      Role::Fragger => &self.fragger,
    }
  }

  fn slot_mut(&mut self, role: Role) -> &mut TopRoleEntry {
    match role {
      Role::Opener => &mut self.opener,
      Role::Closer => &mut self.closer,
      Role::Support => &mut self.support,
      Role::Fragger => &mut self.fragger,
    }
  }

  pub fn is_empty(&self) -> bool {
    Role::iter().all(|role| self.get(role).is_empty())
  }
}

/// Join participants to their event rows in participant order.
///
/// Events are indexed once, so the join is linear in the input sizes.
pub fn pair_participants<'a>(
  participants: &'a [Participant],
  events: &'a [PlayerMatchEvent],
) -> Vec<(&'a Participant, Option<&'a PlayerMatchEvent>)> {
  let by_player: HashMap<&SteamId, &PlayerMatchEvent> =
    events.iter().map(|e| (&e.steam_id, e)).collect();

  participants
    .iter()
    .map(|p| (p, by_player.get(&p.steam_id).copied()))
    .collect()
}

/// Pick the highest-scoring participant per role.
///
/// Participants without an event row have no computable score and are
/// skipped. The first scored participant fills an empty slot even at 0;
/// after that only a strictly higher score takes the slot.
pub fn select_top<'a, I>(candidates: I) -> TopRoles
where
  I: IntoIterator<Item = (&'a Participant, Option<&'a PlayerMatchEvent>)>,
{
  let mut top = TopRoles::default();

  for (participant, event) in candidates {
    let Some(event) = event else { continue };
    let scores = RoleScores::from_event(event);

    for (role, score) in scores.iter() {
      let slot = top.slot_mut(role);
      if slot.is_empty() || score > slot.score {
        *slot = TopRoleEntry {
          name: Some(participant.name.clone()),
          steam_id: Some(participant.steam_id.clone()),
          score,
        };
      }
    }
  }

  top
}
