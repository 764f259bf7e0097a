//! The `Agent` concept: identity, ownership bookkeeping, and the small
//! amount of shared state every concrete agent (nucleus, legacy
//! boundary-point cell, ...) carries regardless of its geometry
//! representation.

use crate::geometry::Geometry;
use crate::interaction::Interaction;
use crate::mechanics::Mechanics;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Globally unique, monotonically assigned by the Director.
pub type AgentId = i64;

/// Debug-rendering colour tag, carried by every agent purely for visual
/// inspection (`original_source/src/Agents/AbstractAgent.h`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebugColour {
    White,
    Red,
    Green,
    Blue,
    Cyan,
    Magenta,
    Yellow,
}

/// A short-lived edge in the agent ownership graph: agents reference each
/// other by id, never by pointer, and the reference expires after a given
/// amount of simulated time (§9 "Agent ownership graph").
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Friendship {
    pub friend_id: AgentId,
    /// simulated-time minute at which this friendship is no longer valid
    pub expires_at: f64,
}

/// Bookkeeping shared by every concrete agent type, independent of its
/// geometry or cycle state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentIdentity {
    pub id: AgentId,
    pub agent_type: String,
    pub agent_type_hash: u64,
    pub colour: DebugColour,
    pub friends: Vec<Friendship>,
    pub current_time: f64,
    pub time_step: f64,
    pub should_die: bool,
}

impl AgentIdentity {
    pub fn new(id: AgentId, agent_type: impl Into<String>, time_step: f64) -> Self {
        let agent_type = agent_type.into();
        let agent_type_hash = hash_agent_type(&agent_type);
        AgentIdentity {
            id,
            agent_type,
            agent_type_hash,
            colour: DebugColour::White,
            friends: Vec::new(),
            current_time: 0.0,
            time_step,
            should_die: false,
        }
    }

    /// Drops friendships whose expiry has passed `self.current_time`.
    pub fn prune_expired_friends(&mut self) {
        let now = self.current_time;
        self.friends.retain(|f| f.expires_at > now);
    }

    pub fn befriend(&mut self, friend_id: AgentId, expires_at: f64) {
        if let Some(existing) = self.friends.iter_mut().find(|f| f.friend_id == friend_id) {
            existing.expires_at = existing.expires_at.max(expires_at);
        } else {
            self.friends.push(Friendship {
                friend_id,
                expires_at,
            });
        }
    }
}

/// Rust's std-string hasher in place of `std::hash<std::string>` — both
/// are "a 64-bit hash of a string", and the wire contract (§6) only
/// requires FOs sharing a build to agree, which a fixed hasher guarantees.
pub fn hash_agent_type(s: &str) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    s.hash(&mut hasher);
    hasher.finish()
}

/// Maps `agentId -> owning FrontOfficer id`, maintained by the Director
/// and mirrored, for locally-relevant entries, by every FrontOfficer.
pub type OwnerMap = HashMap<AgentId, i64>;

/// Composition trait an agent must satisfy to be scheduled by a
/// `FrontOfficer`: carries geometry (for neighbour queries), drives its
/// own mechanics, and is (de)serializable for on-demand shadow-copy
/// requests. Mirrors the teacher's blanket `Agent<Pos,Vel,For,Inf,Float>`
/// trait composing `Cycle + Interaction + Mechanics`.
pub trait Agent: Mechanics + Interaction + Send + Sync + Clone + Serialize + for<'a> Deserialize<'a> {
    fn identity(&self) -> &AgentIdentity;
    fn identity_mut(&mut self) -> &mut AgentIdentity;

    fn id(&self) -> AgentId {
        self.identity().id
    }

    fn should_die(&self) -> bool {
        self.identity().should_die
    }

    fn exposed_geometry_ref(&self) -> &Geometry {
        Interaction::exposed_geometry(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_friendships_are_pruned() {
        let mut id = AgentIdentity::new(1, "nucleus", 0.1);
        id.befriend(2, 5.0);
        id.befriend(3, 15.0);
        id.current_time = 10.0;
        id.prune_expired_friends();
        assert_eq!(id.friends.len(), 1);
        assert_eq!(id.friends[0].friend_id, 3);
    }

    #[test]
    fn same_type_string_hashes_equal() {
        assert_eq!(hash_agent_type("nucleus"), hash_agent_type("nucleus"));
    }
}
