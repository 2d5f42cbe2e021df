//! Ancestor and descendant traversal over parent/child links.
//!
//! All traversals are iterative with an explicit queue or stack and a
//! visited set, so cost is bounded by the number of distinct individuals
//! reached and deep lineages cannot exhaust the call stack.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use progenitor_types::{PersonId, Sex, Tick};

use crate::registry::Registries;

fn parents_of(reg: &Registries, id: PersonId) -> Vec<PersonId> {
    reg.person(id)
        .map(|p| [p.father, p.mother].into_iter().flatten().collect())
        .unwrap_or_default()
}

fn children_of(reg: &Registries, id: PersonId) -> &[PersonId] {
    reg.person(id).map_or(&[][..], |p| p.children.as_slice())
}

/// Descendants of `id`, nearest generation first.
pub fn descendants(reg: &Registries, id: PersonId) -> Vec<PersonId> {
    let mut found = Vec::new();
    let mut visited = BTreeSet::new();
    let mut queue: VecDeque<PersonId> = children_of(reg, id).iter().copied().collect();
    while let Some(descendant) = queue.pop_front() {
        if !visited.insert(descendant) {
            continue;
        }
        found.push(descendant);
        queue.extend(children_of(reg, descendant).iter().copied());
    }
    found
}

/// Memoized number of generations of known ancestry above each individual.
#[derive(Debug, Clone, Default)]
pub struct DepthMemo {
    depths: BTreeMap<PersonId, u32>,
}

impl DepthMemo {
    /// Empty memo.
    pub fn new() -> Self {
        Self::default()
    }

    /// Longest chain of known ancestors above `id` (0 for a founder).
    pub fn ancestry_depth(&mut self, reg: &Registries, id: PersonId) -> u32 {
        let mut in_progress = BTreeSet::new();
        let mut stack = vec![(id, false)];
        while let Some((current, expanded)) = stack.pop() {
            if self.depths.contains_key(&current) {
                continue;
            }
            let parents = parents_of(reg, current);
            if expanded {
                let depth = parents
                    .iter()
                    .map(|p| self.depths.get(p).copied().unwrap_or(0).saturating_add(1))
                    .max()
                    .unwrap_or(0);
                self.depths.insert(current, depth);
            } else if in_progress.insert(current) {
                stack.push((current, true));
                for parent in parents {
                    if !self.depths.contains_key(&parent) {
                        stack.push((parent, false));
                    }
                }
            }
        }
        self.depths.get(&id).copied().unwrap_or(0)
    }

    /// Number of memoized entries.
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    /// Whether nothing has been memoized.
    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Flattened tree
// ---------------------------------------------------------------------------

/// One individual in a [`GenealogyTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenealogyNode {
    /// Handle.
    pub id: PersonId,
    /// Full name.
    pub name: String,
    /// Sex.
    pub sex: Sex,
    /// Whether alive.
    pub alive: bool,
    /// Birth tick.
    pub birth_tick: Tick,
    /// Death tick.
    pub death_tick: Option<Tick>,
    /// Generation number.
    pub generation: u32,
    /// Distance from the nearest root.
    pub depth: u32,
    /// Father.
    pub father: Option<PersonId>,
    /// Mother.
    pub mother: Option<PersonId>,
    /// Spouse.
    pub spouse: Option<PersonId>,
    /// Number of children.
    pub child_count: usize,
}

/// A breadth-first flattened family tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenealogyTree {
    /// Nodes in breadth-first order from the roots.
    pub nodes: Vec<GenealogyNode>,
    /// Whether the depth or node limit cut the tree short.
    pub truncated: bool,
}

/// Flatten the tree below `roots`, visiting at most `max_nodes`
/// individuals no deeper than `max_depth`.
pub fn build_tree(
    reg: &Registries,
    roots: &[PersonId],
    max_depth: u32,
    max_nodes: usize,
) -> GenealogyTree {
    let mut tree = GenealogyTree::default();
    let mut visited = BTreeSet::new();
    let mut queue: VecDeque<(PersonId, u32)> = roots.iter().map(|r| (*r, 0)).collect();
    while let Some((id, depth)) = queue.pop_front() {
        if !visited.insert(id) {
            continue;
        }
        let Some(person) = reg.person(id) else {
            continue;
        };
        if tree.nodes.len() >= max_nodes {
            tree.truncated = true;
            break;
        }
        tree.nodes.push(GenealogyNode {
            id,
            name: person.full_name(),
            sex: person.sex,
            alive: person.alive,
            birth_tick: person.birth_tick,
            death_tick: person.death_tick,
            generation: person.generation,
            depth,
            father: person.father,
            mother: person.mother,
            spouse: person.spouse,
            child_count: person.children.len(),
        });
        if depth >= max_depth {
            if !person.children.is_empty() {
                tree.truncated = true;
            }
            continue;
        }
        let next = depth.saturating_add(1);
        queue.extend(person.children.iter().map(|c| (*c, next)));
    }
    tree
}
