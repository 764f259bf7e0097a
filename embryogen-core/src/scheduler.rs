//! The Director/FrontOfficer scheduler (§4.5), grounded in
//! `Director.h`/`Communication/DirectorSMP.cpp`: one Director and P
//! FrontOfficers run as OS threads in one process, talking over
//! `crossbeam-channel`s and synchronising each round on a
//! `hurdles::Barrier`. The round-robin AABB token is an explicit state
//! variable (`current_turn_fo`), never itself a thread — only the FO
//! *processes* are real OS threads.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crossbeam_channel::{unbounded, Receiver, Sender};
use hurdles::Barrier;
use tracing::{debug, warn};

use embryogen_concepts::aabb::NamedAxisAlignedBoundingBox;
use embryogen_concepts::agent::{Agent, AgentId, OwnerMap};
use embryogen_concepts::errors::{ConsistencyError, SimulationError};

use crate::lineage::LineageRecorder;
use crate::strings::StringsDictionary;

/// The closed tag set of §6's "every inter-process message carries a tag
/// drawn from a closed enumeration".
#[derive(Debug, Clone)]
pub enum Message {
    RequestNextAgentId,
    AgentIdResponse(AgentId),
    StartNewAgent {
        agent_id: AgentId,
        owner_fo: usize,
        track_for_ctc: bool,
    },
    CloseAgent {
        agent_id: AgentId,
        owner_fo: usize,
    },
    StartNewDaughterAgent {
        child_id: AgentId,
        parent_id: AgentId,
    },
    AabbPayload(NamedAxisAlignedBoundingBox),
    AabbCount(usize),
    NewTypeHash {
        hash: u64,
        name: String,
    },
    Token,
    RenderRequest,
    Ack,
    Exception(String),
}

/// The shared, director-owned bookkeeping a running simulation needs
/// between rounds: the agent-id allocator, the owner map, the lineage
/// recorder, and the process-wide synced strings dictionary.
pub struct DirectorState {
    pub last_used_agent_id: AgentId,
    pub owners: OwnerMap,
    pub lineage: LineageRecorder,
    pub strings: StringsDictionary,
    pub current_frame: i64,
}

impl DirectorState {
    pub fn new() -> Self {
        DirectorState {
            last_used_agent_id: 0,
            owners: HashMap::new(),
            lineage: LineageRecorder::new(),
            strings: StringsDictionary::new(),
            current_frame: 0,
        }
    }

    pub fn next_agent_id(&mut self) -> AgentId {
        self.last_used_agent_id += 1;
        self.last_used_agent_id
    }
}

impl Default for DirectorState {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic static partition rule (§4.5): agent `id` belongs to
/// `((id - 1) mod P) + 1`, one-indexed the same way the original FO ids
/// are.
pub fn owner_of(agent_id: AgentId, fo_count: usize) -> usize {
    (((agent_id - 1).rem_euclid(fo_count as i64)) + 1) as usize
}

/// One endpoint of the Director's star topology to a single FO: a
/// channel to send messages to that FO, and the Director's shared
/// receiver for messages coming back from every FO.
pub struct FoHandle {
    pub to_fo: Sender<Message>,
}

/// Runs the round-robin AABB broadcast (§4.5 steps 1-4): each FO, in id
/// order starting from `first_fo`, pushes its own published AABBs
/// (and its pending new agent-type strings) into the shared registry,
/// then every other FO observes them. This directly models the
/// original's token-passing broadcast without needing a literal token
/// message, since all FOs run in one process and share the map under a
/// mutex; the explicit turn counter below still enforces the same
/// strictly-ordered visitation the wire protocol requires.
pub fn round_robin_aabb_exchange(
    fo_count: usize,
    first_fo: usize,
    publish: impl Fn(usize) -> Vec<NamedAxisAlignedBoundingBox>,
    mut on_published: impl FnMut(usize, &[NamedAxisAlignedBoundingBox]),
) {
    let mut current_turn_fo = first_fo;
    for _ in 0..fo_count {
        let published = publish(current_turn_fo);
        on_published(current_turn_fo, &published);
        current_turn_fo = (current_turn_fo % fo_count) + 1;
    }
}

/// Runs `fo_count` FrontOfficer round-functions as OS threads,
/// synchronised by a barrier per round, for `rounds` rounds. Each
/// `round_fn(fo_id, round_idx)` performs that FO's entire internal
/// pipeline (§4.2) plus both AABB exchanges for the round; the barrier
/// only enforces that no FO starts round `k+1` before every FO finished
/// round `k`, mirroring the Director acting as "barrier and
/// coordinator".
pub fn run_rounds<F>(fo_count: usize, rounds: usize, round_fn: F) -> Result<(), SimulationError>
where
    F: Fn(usize, usize) -> Result<(), SimulationError> + Send + Sync + 'static,
{
    let round_fn = Arc::new(round_fn);
    let mut barrier = Barrier::new(fo_count);
    let failure: Arc<Mutex<Option<SimulationError>>> = Arc::new(Mutex::new(None));

    std::thread::scope(|scope| {
        for fo_id in 1..=fo_count {
            let round_fn = Arc::clone(&round_fn);
            let mut barrier = barrier.clone();
            let failure = Arc::clone(&failure);
            scope.spawn(move || {
                for round_idx in 0..rounds {
                    if failure.lock().unwrap().is_some() {
                        return;
                    }
                    if let Err(e) = round_fn(fo_id, round_idx) {
                        warn!(fo = fo_id, round = round_idx, error = %e, "FO round failed, broadcasting exception");
                        *failure.lock().unwrap() = Some(e);
                    }
                    barrier.wait();
                }
            });
        }
    });
    // touch barrier so unused_mut doesn't fire on the outer Barrier if
    // fo_count is ever 0 (loop above never runs)
    let _ = &mut barrier;

    let mut guard = failure.lock().unwrap();
    match guard.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Processes a batch of incoming `AabbPayload`/`NewTypeHash` messages on
/// the receiving end: records `(agentId -> ownerFO)`, and enlists any
/// new type hash string. Unknown-type AABBs are held in `pending`
/// (§7's "Missing new agent type at receiver").
pub fn apply_incoming_broadcast(
    owners: &mut OwnerMap,
    strings: &mut StringsDictionary,
    pending: &mut Vec<NamedAxisAlignedBoundingBox>,
    owner_fo: usize,
    messages: &[Message],
) -> Result<(), ConsistencyError> {
    for m in messages {
        match m {
            Message::AabbPayload(named) => {
                owners.insert(named.id, owner_fo);
                if strings.translate_id_to_string(named.name_id).is_err() {
                    pending.push(*named);
                } else {
                    debug!(agent = named.id, "AABB applied");
                }
            }
            Message::NewTypeHash { hash, name } => {
                strings
                    .enlist_the_incoming_item(*hash, name)
                    .map_err(|e| ConsistencyError::new(e.message))?;

                pending.retain(|named| {
                    if named.name_id == *hash {
                        owners.insert(named.id, owner_fo);
                        debug!(agent = named.id, "pending AABB resolved");
                        false
                    } else {
                        true
                    }
                });
            }
            _ => {}
        }
    }
    Ok(())
}

/// §7: "A pending entry still outstanding at end-of-round is a fatal
/// consistency error."
pub fn check_no_pending_aabbs(pending: &[NamedAxisAlignedBoundingBox]) -> Result<(), ConsistencyError> {
    if pending.is_empty() {
        Ok(())
    } else {
        Err(ConsistencyError::new(format!(
            "{} AABB(s) still pending an unresolved agent-type hash at end of round",
            pending.len()
        )))
    }
}

/// A minimal in-process FrontOfficer: owns a fixed set of agents (by the
/// static partition rule) and exposes the hooks `run_rounds` drives.
pub struct FrontOfficer<A: Agent> {
    pub id: usize,
    pub agents: Vec<A>,
    pub local_owners: OwnerMap,
    pub local_strings: StringsDictionary,
}

impl<A: Agent> FrontOfficer<A> {
    pub fn new(id: usize) -> Self {
        FrontOfficer {
            id,
            agents: Vec::new(),
            local_owners: HashMap::new(),
            local_strings: StringsDictionary::new(),
        }
    }

    pub fn owns(&self, agent_id: AgentId, fo_count: usize) -> bool {
        owner_of(agent_id, fo_count) == self.id
    }

    /// Publishes this FO's agents' current AABBs plus any pending
    /// agent-type strings, as §4.5 step 1 describes.
    pub fn publish_aabbs(&self) -> Vec<NamedAxisAlignedBoundingBox>
    where
        A: embryogen_concepts::interaction::Interaction,
    {
        self.agents
            .iter()
            .map(|a| {
                let geom = a.exposed_geometry_ref();
                NamedAxisAlignedBoundingBox::new(*geom.aabb(), a.id(), a.identity().agent_type_hash)
            })
            .collect()
    }

    /// Drops every agent flagged `should_die`, closing its track at the
    /// previous frame (§7: "processed on the next round boundary").
    pub fn reap_dead_agents(&mut self, lineage: &mut LineageRecorder, current_frame: i64) -> Vec<AgentId> {
        let mut reaped = Vec::new();
        self.agents.retain(|a| {
            if a.should_die() {
                lineage.close_track(a.id(), current_frame - 1);
                reaped.push(a.id());
                false
            } else {
                true
            }
        });
        reaped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_of_partitions_round_robin() {
        assert_eq!(owner_of(1, 3), 1);
        assert_eq!(owner_of(2, 3), 2);
        assert_eq!(owner_of(3, 3), 3);
        assert_eq!(owner_of(4, 3), 1);
    }

    #[test]
    fn round_robin_visits_every_fo_once_starting_from_first() {
        let mut visited = Vec::new();
        round_robin_aabb_exchange(4, 3, |_fo| Vec::new(), |fo, _| visited.push(fo));
        assert_eq!(visited, vec![3, 4, 1, 2]);
    }

    #[test]
    fn pending_aabb_becomes_resolved_once_type_hash_arrives() {
        let mut owners = HashMap::new();
        let mut strings = StringsDictionary::new();
        let mut pending = Vec::new();

        let named = NamedAxisAlignedBoundingBox::new(Default::default(), 5, 42);
        apply_incoming_broadcast(&mut owners, &mut strings, &mut pending, 2, &[Message::AabbPayload(named)]).unwrap();
        assert_eq!(pending.len(), 1);
        assert!(check_no_pending_aabbs(&pending).is_err());

        apply_incoming_broadcast(
            &mut owners,
            &mut strings,
            &mut pending,
            2,
            &[Message::NewTypeHash {
                hash: 42,
                name: "NucleusAgent".to_string(),
            }],
        )
        .unwrap();
        assert!(pending.is_empty());
        assert_eq!(owners.get(&5), Some(&2));
        assert!(check_no_pending_aabbs(&pending).is_ok());
    }

    #[test]
    fn run_rounds_propagates_fo_failure() {
        let result = run_rounds(2, 3, |fo_id, round_idx| {
            if fo_id == 2 && round_idx == 1 {
                Err(SimulationError::Consistency(ConsistencyError::new("boom")))
            } else {
                Ok(())
            }
        });
        assert!(result.is_err());
    }
}
