//! Merging of raw group listings into a partition of agents.
//!
//! Ground-truth annotations sometimes list an agent in more than one group.
//! The evaluation needs disjoint groups, so every group sharing an agent
//! with another is merged, transitively, into a single group.

use std::collections::HashMap;

use crate::agent::{AgentId, Group};

/// Disjoint-set forest over group indices.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}

/// Agents listed in more than one group, in order of first appearance
/// across the concatenated listing.
pub fn duplicated_agents<A: AgentId>(groups: &[Group<A>]) -> Vec<A> {
    let mut counts: HashMap<&A, usize> = HashMap::new();
    let mut order: Vec<&A> = Vec::new();
    for agent in groups.iter().flat_map(|g| g.members()) {
        let count = counts.entry(agent).or_insert(0);
        if *count == 0 {
            order.push(agent);
        }
        *count += 1;
    }
    order
        .into_iter()
        .filter(|agent| counts[agent] > 1)
        .cloned()
        .collect()
}

/// Resolve a raw group listing so that no agent belongs to two groups.
///
/// Groups without a shared agent are returned first, in their original
/// order. They are followed by one merged group per connected component of
/// the remaining groups. Merged groups are ordered by the last duplicated
/// agent (in first-appearance order) that touches them, which is the order
/// an agent-by-agent merge over the working list would append them in.
///
/// A listing that is already a partition is returned unchanged.
pub fn merge_groups<A: AgentId>(groups: Vec<Group<A>>) -> Vec<Group<A>> {
    let duplicated = duplicated_agents(&groups);
    if duplicated.is_empty() {
        return groups;
    }

    let (clean, conflicted): (Vec<_>, Vec<_>) = groups
        .into_iter()
        .partition(|g| !duplicated.iter().any(|agent| g.contains(agent)));

    let mut forest = UnionFind::new(conflicted.len());
    let holders: Vec<Vec<usize>> = duplicated
        .iter()
        .map(|agent| {
            conflicted
                .iter()
                .enumerate()
                .filter(|(_, g)| g.contains(agent))
                .map(|(i, _)| i)
                .collect()
        })
        .collect();

    for indices in &holders {
        for pair in indices.windows(2) {
            forest.union(pair[0], pair[1]);
        }
    }

    // Rank of the last duplicated agent reaching each component.
    let mut last_touch: HashMap<usize, usize> = HashMap::new();
    for (rank, indices) in holders.iter().enumerate() {
        if let Some(&first) = indices.first() {
            last_touch.insert(forest.find(first), rank);
        }
    }

    let mut components: Vec<(usize, Vec<usize>)> = Vec::new();
    let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
    for i in 0..conflicted.len() {
        let root = forest.find(i);
        let slot = *slot_of_root.entry(root).or_insert_with(|| {
            components.push((last_touch[&root], Vec::new()));
            components.len() - 1
        });
        components[slot].1.push(i);
    }
    components.sort_by_key(|(rank, _)| *rank);

    log::warn!(
        "merged {} groups sharing {} agents into {} groups",
        conflicted.len(),
        duplicated.len(),
        components.len()
    );

    let merged = components.into_iter().map(|(_, members)| {
        members
            .into_iter()
            .flat_map(|i| conflicted[i].members().iter().cloned())
            .collect::<Group<A>>()
    });

    clean.into_iter().chain(merged).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn groups(raw: &[&[i64]]) -> Vec<Group<i64>> {
        raw.iter().map(|g| Group::new(g.iter().copied())).collect()
    }

    fn as_set(group: &Group<i64>) -> HashSet<i64> {
        group.members().iter().copied().collect()
    }

    #[test]
    fn test_merge_shared_agent() {
        let merged = merge_groups(groups(&[&[1, 2], &[2, 3], &[4, 5]]));

        assert_eq!(merged.len(), 2);
        assert_eq!(as_set(&merged[0]), HashSet::from([4, 5]));
        assert_eq!(as_set(&merged[1]), HashSet::from([1, 2, 3]));
    }

    #[test]
    fn test_partition_unchanged() {
        let input = groups(&[&[1, 2], &[3], &[4, 5, 6]]);
        assert_eq!(merge_groups(input.clone()), input);
    }

    #[test]
    fn test_empty_listing() {
        assert!(merge_groups(Vec::<Group<i64>>::new()).is_empty());
    }

    #[test]
    fn test_chain_merges_transitively() {
        // 1 links the first two groups, 3 links the second and third.
        let merged = merge_groups(groups(&[&[1, 2], &[1, 3], &[3, 4], &[9, 10]]));

        assert_eq!(merged.len(), 2);
        assert_eq!(as_set(&merged[0]), HashSet::from([9, 10]));
        assert_eq!(as_set(&merged[1]), HashSet::from([1, 2, 3, 4]));
    }

    #[test]
    fn test_chain_linked_by_later_agent() {
        // 5 is seen last but closes the loop through the first group.
        let merged = merge_groups(groups(&[&[1, 2], &[2, 3], &[4, 5], &[5, 1]]));
        assert_eq!(merged.len(), 1);
        assert_eq!(as_set(&merged[0]), HashSet::from([1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_merged_groups_follow_merge_order() {
        let merged = merge_groups(groups(&[&[1, 2], &[1, 3], &[4, 5], &[4, 6], &[2, 7], &[8]]));

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].members(), &[8]);
        assert_eq!(as_set(&merged[1]), HashSet::from([1, 2, 3, 7]));
        assert_eq!(as_set(&merged[2]), HashSet::from([4, 5, 6]));
    }

    #[test]
    fn test_merged_members_keep_listing_order() {
        let merged = merge_groups(groups(&[&[3, 1], &[1, 2]]));
        assert_eq!(merged[0].members(), &[3, 1, 2]);
    }

    #[test]
    fn test_duplicated_agents_first_appearance_order() {
        let dups = duplicated_agents(&groups(&[&[7, 2], &[5, 7], &[2, 5], &[9]]));
        assert_eq!(dups, vec![7, 2, 5]);
    }

    #[test]
    fn test_idempotent() {
        let once = merge_groups(groups(&[&[1, 2], &[2, 3], &[4, 5], &[5, 6], &[7, 8]]));
        let twice = merge_groups(once.clone());
        assert_eq!(once, twice);
    }

    proptest! {
        #[test]
        fn merge_yields_partition(
            raw in prop::collection::vec(prop::collection::vec(0i64..20, 0..5), 0..8)
        ) {
            let input: Vec<Group<i64>> = raw.into_iter().map(Group::new).collect();
            let all_agents: HashSet<i64> =
                input.iter().flat_map(|g| g.members().iter().copied()).collect();

            let merged = merge_groups(input);

            let mut seen = HashSet::new();
            for group in &merged {
                for agent in group.members() {
                    prop_assert!(seen.insert(*agent), "agent {} in two groups", agent);
                }
            }
            prop_assert_eq!(seen, all_agents);
        }

        #[test]
        fn merge_is_fixed_point(
            raw in prop::collection::vec(prop::collection::vec(0i64..20, 0..5), 0..8)
        ) {
            let once = merge_groups(raw.into_iter().map(Group::new).collect::<Vec<_>>());
            let twice = merge_groups(once.clone());
            prop_assert_eq!(once, twice);
        }
    }
}
