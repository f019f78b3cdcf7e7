//! Proximity grouping: connected components of the "is close to" graph.
//!
//! Every input index lands in exactly one group. Results only depend on the
//! input order:
//! - members of a group are listed in ascending input order, so
//!   [`ProximityGroup::first`] is the first-seen member
//! - groups are emitted in discovery order, which is ascending order of their
//!   first member

/// A set of indices into the grouped input. Only lives for one pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProximityGroup {
    members: Vec<usize>,
}

impl ProximityGroup {
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Lowest input index in the group.
    pub fn first(&self) -> usize {
        self.members[0]
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }
}

/// Group `items` whose pairwise `distance` is at most `threshold`.
pub fn group<T, F>(items: &[T], threshold: f64, distance: F) -> Vec<ProximityGroup>
where
    F: Fn(&T, &T) -> f64,
{
    group_by(items.len(), |i, j| distance(&items[i], &items[j]) <= threshold)
}

/// Group `len` items by comparing every pair once.
pub fn group_by<F>(len: usize, is_close: F) -> Vec<ProximityGroup>
where
    F: Fn(usize, usize) -> bool,
{
    let mut adjacency = vec![Vec::new(); len];

    for i in 0..len {
        for j in (i + 1)..len {
            if is_close(i, j) {
                adjacency[i].push(j);
                adjacency[j].push(i);
            }
        }
    }

    components(adjacency)
}

/// Group `len` items, only testing the pairs proposed by `candidates`.
///
/// Gives the same groups as [`group_by`] as long as `candidates(i)` includes
/// every `j` for which `is_close(i, j)` holds. Self matches and duplicates
/// are ignored.
pub fn group_with_candidates<C, F>(len: usize, candidates: C, is_close: F) -> Vec<ProximityGroup>
where
    C: Fn(usize) -> Vec<usize>,
    F: Fn(usize, usize) -> bool,
{
    let mut adjacency = vec![Vec::new(); len];

    for i in 0..len {
        for j in candidates(i) {
            // Each unordered pair is tested once, from its lower index
            if j > i && j < len && is_close(i, j) {
                adjacency[i].push(j);
                adjacency[j].push(i);
            }
        }
    }

    for neighbours in adjacency.iter_mut() {
        neighbours.sort_unstable();
        neighbours.dedup();
    }

    components(adjacency)
}

/// Connected components by depth-first traversal, seeded in input order.
fn components(adjacency: Vec<Vec<usize>>) -> Vec<ProximityGroup> {
    let mut visited = vec![false; adjacency.len()];
    let mut groups = Vec::new();

    for seed in 0..adjacency.len() {
        if visited[seed] {
            continue;
        }

        let mut members = Vec::new();
        let mut stack = vec![seed];
        visited[seed] = true;

        while let Some(node) = stack.pop() {
            members.push(node);
            for &next in adjacency[node].iter().rev() {
                if !visited[next] {
                    visited[next] = true;
                    stack.push(next);
                }
            }
        }

        members.sort_unstable();
        groups.push(ProximityGroup { members });
    }

    log::debug!(
        "Grouped {} items into {} groups",
        adjacency.len(),
        groups.len()
    );

    groups
}
