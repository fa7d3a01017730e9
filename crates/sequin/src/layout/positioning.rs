//! Position pass: resolves separations into one X coordinate per agent.
//!
//! Two sweeps over the agents in index order:
//!
//! 1. Left to right, each agent is placed as far left as its constraints to
//!    lower-index agents allow.
//! 2. Right to left, agents marked `anchor_right` are pulled right towards
//!    their higher-index neighbours, as far as their constraints allow.
//!
//! Agents that are never visible at the same time have no separation
//! between them, so the first sweep lets them share horizontal space.

use indexmap::IndexMap;
use log::debug;

use sequin_core::identifier::Id;

use super::separation::Separations;

/// Resolved agent X coordinates and the horizontal extent they need.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentPositions {
    x: IndexMap<Id, f32>,
    min_x: f32,
    max_x: f32,
}

impl AgentPositions {
    /// Resolved X of `agent`.
    pub fn x(&self, agent: Id) -> Option<f32> {
        self.x.get(&agent).copied()
    }

    /// Leftmost extent: the minimum of `x - left padding`, and never above zero.
    pub fn min_x(&self) -> f32 {
        self.min_x
    }

    /// Rightmost extent: the maximum of `x + right padding`, and never below zero.
    pub fn max_x(&self) -> f32 {
        self.max_x
    }

    /// Agents and their X in index order.
    pub fn iter(&self) -> impl Iterator<Item = (Id, f32)> + '_ {
        self.x.iter().map(|(id, x)| (*id, *x))
    }
}

/// Computes agent positions from a separation table.
///
/// ```
/// # use sequin::layout::{Separations, position_agents};
/// # use sequin::semantic::Agent;
/// # use sequin::identifier::Id;
/// let (a, b) = (Id::new("A"), Id::new("B"));
/// let mut separations = Separations::new(&[Agent::new(a), Agent::new(b)]);
/// separations.add_separation(a, b, 40.0);
///
/// let positions = position_agents(&separations);
/// assert_eq!(positions.x(a), Some(0.0));
/// assert_eq!(positions.x(b), Some(40.0));
/// ```
pub fn position_agents(separations: &Separations) -> AgentPositions {
    let ordered = separations.ordered();
    let mut x: IndexMap<Id, f32> = IndexMap::with_capacity(ordered.len());

    for (id, info) in &ordered {
        let current = info
            .separations()
            .filter_map(|(other, dist)| {
                let other_info = separations.get(other)?;
                if other_info.index() < info.index() {
                    x.get(&other).map(|other_x| other_x + dist)
                } else {
                    None
                }
            })
            .fold(0.0f32, f32::max);
        x.insert(*id, current);
    }

    let mut previous_x = 0.0;
    for (id, info) in ordered.iter().rev() {
        let mut current = previous_x;
        previous_x = x.get(id).copied().unwrap_or_default();
        if !info.anchor_right() {
            continue;
        }

        for (other, dist) in info.separations() {
            let is_right_of = separations
                .get(other)
                .is_some_and(|other_info| other_info.index() > info.index());
            if let (true, Some(other_x)) = (is_right_of, x.get(&other)) {
                current = current.min(other_x - dist);
            }
        }
        x.insert(*id, current);
        previous_x = current;
    }

    let mut min_x: f32 = 0.0;
    let mut max_x: f32 = 0.0;
    for (id, info) in &ordered {
        let agent_x = x.get(id).copied().unwrap_or_default();
        min_x = min_x.min(agent_x - info.max_left_pad());
        max_x = max_x.max(agent_x + info.max_right_pad());
    }

    debug!(agents = x.len(), min_x = min_x, max_x = max_x; "Agents positioned");
    AgentPositions { x, min_x, max_x }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use sequin_core::semantic::Agent;

    use super::*;

    fn separations(names: &[&str]) -> (Vec<Id>, Separations) {
        let ids: Vec<Id> = names.iter().map(|name| Id::new(name)).collect();
        let agents: Vec<Agent> = names
            .iter()
            .zip(&ids)
            .map(|(name, id)| Agent::new(*id).with_anchor_right(name.ends_with('[')))
            .collect();
        (ids, Separations::new(&agents))
    }

    #[test]
    fn test_chain_is_strictly_increasing() {
        let (ids, mut seps) = separations(&["[", "A", "B", "C", "]"]);
        for pair in ids.windows(2) {
            seps.add_separation(pair[0], pair[1], 10.0);
        }
        let positions = position_agents(&seps);
        let xs: Vec<f32> = ids.iter().map(|id| positions.x(*id).unwrap()).collect();
        assert_eq!(xs, [0.0, 10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_unconstrained_agents_share_space() {
        let (ids, mut seps) = separations(&["A", "B", "C"]);
        seps.add_separation(ids[0], ids[1], 30.0);
        seps.add_separation(ids[0], ids[2], 50.0);
        let positions = position_agents(&seps);
        assert_eq!(positions.x(ids[1]), Some(30.0));
        assert_eq!(positions.x(ids[2]), Some(50.0));
    }

    #[test]
    fn test_anchor_right_pulls_towards_next_agent() {
        let (ids, mut seps) = separations(&["A", "B", "blk[", "C"]);
        seps.add_separation(ids[0], ids[1], 100.0);
        seps.add_separation(ids[0], ids[2], 10.0);
        seps.add_separation(ids[2], ids[3], 20.0);
        seps.add_separation(ids[1], ids[3], 10.0);

        let positions = position_agents(&seps);
        // First sweep: C = max(B + 10, blk + 20) = 110; blk is pulled to C - 20.
        assert_approx_eq!(f32, positions.x(ids[3]).unwrap(), 110.0);
        assert_approx_eq!(f32, positions.x(ids[2]).unwrap(), 90.0);
    }

    #[test]
    fn test_bounds_include_padding() {
        let (ids, seps) = separations(&["A"]);
        let positions = position_agents(&seps);
        assert_eq!(positions.x(ids[0]), Some(0.0));
        assert_eq!(positions.min_x(), 0.0);
        assert_eq!(positions.max_x(), 0.0);
    }

    #[test]
    fn test_missing_agent() {
        let (_, seps) = separations(&["A"]);
        assert_eq!(position_agents(&seps).x(Id::new("nobody")), None);
    }
}
