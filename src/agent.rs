//! Agent identifiers, groups and membership-vector conversion.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use crate::{Error, Result};

/// Marker trait for anything usable as an agent identifier.
///
/// Implemented for every type that is cheap to compare and hash, which covers
/// the synthetic `"ID_00{n}"` names as well as integer ids read from
/// ground-truth files.
pub trait AgentId: Clone + Eq + Hash + fmt::Debug {}

impl<T: Clone + Eq + Hash + fmt::Debug> AgentId for T {}

/// A set of agents judged to move together.
///
/// Members keep their insertion order and are never duplicated. Groups of
/// size <= 1 are valid values but are skipped by the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group<A> {
    members: Vec<A>,
}

impl<A: AgentId> Group<A> {
    /// Create a group, dropping repeated members (first occurrence wins).
    pub fn new<I: IntoIterator<Item = A>>(members: I) -> Self {
        let mut seen = HashSet::new();
        let members = members
            .into_iter()
            .filter(|m| seen.insert(m.clone()))
            .collect();
        Self { members }
    }

    /// Members in insertion order.
    pub fn members(&self) -> &[A] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, agent: &A) -> bool {
        self.members.contains(agent)
    }

    /// Whether the group takes part in correctness counting (size > 1).
    pub fn is_countable(&self) -> bool {
        self.members.len() > 1
    }

    /// Number of members of `self` that also belong to `other`.
    pub fn overlap(&self, other: &Group<A>) -> usize {
        self.members.iter().filter(|m| other.contains(m)).count()
    }

    /// Same members regardless of order.
    pub fn same_members(&self, other: &Group<A>) -> bool {
        self.len() == other.len() && self.overlap(other) == self.len()
    }

    pub fn into_members(self) -> Vec<A> {
        self.members
    }
}

impl<A: AgentId> FromIterator<A> for Group<A> {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<A: AgentId> From<Vec<A>> for Group<A> {
    fn from(members: Vec<A>) -> Self {
        Self::new(members)
    }
}

/// One boolean per agent slot of a scene; `true` marks a member.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MembershipVector(pub Vec<bool>);

impl MembershipVector {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Indices of the slots set to `true`.
    pub fn slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, &member)| member.then_some(i))
    }
}

impl From<Vec<bool>> for MembershipVector {
    fn from(slots: Vec<bool>) -> Self {
        Self(slots)
    }
}

/// Strategy turning a slot index into an agent identifier.
pub trait SlotResolver<A> {
    fn resolve(&self, slot: usize) -> Result<A>;
}

/// Sequential synthetic naming: slot `i` becomes `"ID_00{i + 1}"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticNames;

impl SyntheticNames {
    pub fn name(slot: usize) -> String {
        format!("ID_00{}", slot + 1)
    }
}

impl SlotResolver<String> for SyntheticNames {
    fn resolve(&self, slot: usize) -> Result<String> {
        Ok(Self::name(slot))
    }
}

/// Externally supplied slot-to-agent map, indexed by slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotMap<A> {
    agents: Vec<A>,
}

impl<A> SlotMap<A> {
    pub fn new(agents: Vec<A>) -> Self {
        Self { agents }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl<A: Clone> SlotResolver<A> for SlotMap<A> {
    fn resolve(&self, slot: usize) -> Result<A> {
        self.agents
            .get(slot)
            .cloned()
            .ok_or(Error::UnknownAgentSlot(slot))
    }
}

/// Convert membership vectors into groups of agent identifiers.
///
/// Every vector must have exactly `n_agents` slots.
pub fn groups_from_membership<A, R>(
    vectors: &[MembershipVector],
    n_agents: usize,
    resolver: &R,
) -> Result<Vec<Group<A>>>
where
    A: AgentId,
    R: SlotResolver<A> + ?Sized,
{
    vectors
        .iter()
        .map(|vector| {
            if vector.len() != n_agents {
                return Err(Error::InvalidMembership {
                    expected: n_agents,
                    got: vector.len(),
                });
            }
            vector
                .slots()
                .map(|slot| resolver.resolve(slot))
                .collect::<Result<Group<A>>>()
        })
        .collect()
}
