//! Collapses reship lineage chains into `ShipGroup`s.
//!
//! A ship may name the ship it was reshipped from. Following those links from
//! every root gives one chain per project; each chain becomes a group with
//! summed hours and payouts. Resolution happens in two passes so the result
//! does not depend on the order the records arrive in.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::Ship;

/// Payout multiplier for groups whose latest ship is in the YSWS base.
pub const YSWS_BONUS_MULTIPLIER: f64 = 1.1;

/// What to do with a ship whose parent is not among the input ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanPolicy {
    /// Leave it out of every group.
    #[default]
    Drop,
    /// Start a new group with it as the root.
    Promote,
}

/// Aggregate over one lineage chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ShipGroup {
    pub title: String,
    /// Creation time of the root ship.
    pub created: DateTime<Utc>,
    pub total_doubloons: f64,
    pub total_hours: f64,
    pub is_in_ysws_base: bool,
    pub ships: Vec<Ship>,
}

impl ShipGroup {
    fn seed(root: Ship) -> Self {
        ShipGroup {
            title: root.title_or_default().to_string(),
            created: root.created_time,
            total_doubloons: root.doubloon_payout,
            total_hours: root.credited_hours,
            is_in_ysws_base: root.is_in_ysws_base,
            ships: vec![root],
        }
    }

    fn absorb(&mut self, ship: Ship) {
        self.total_hours += ship.credited_hours;
        self.total_doubloons += ship.doubloon_payout;
        self.title = ship.title_or_default().to_string();
        self.is_in_ysws_base = ship.is_in_ysws_base;
        self.ships.push(ship);
    }

    fn with_bonus(self) -> Self {
        if self.is_in_ysws_base {
            ShipGroup {
                total_doubloons: self.total_doubloons * YSWS_BONUS_MULTIPLIER,
                ..self
            }
        } else {
            self
        }
    }
}

/// Group `ships` into lineage chains, newest root first.
pub fn group_ships(ships: Vec<Ship>, policy: OrphanPolicy) -> Vec<ShipGroup> {
    let chains = resolve_chains(&ships, policy);

    let mut slots: Vec<Option<Ship>> = ships.into_iter().map(Some).collect();
    let mut groups: Vec<ShipGroup> = chains
        .into_iter()
        .filter_map(|chain| {
            let mut members = chain.into_iter().filter_map(|i| slots[i].take());
            let mut group = ShipGroup::seed(members.next()?);
            for ship in members {
                group.absorb(ship);
            }
            Some(group)
        })
        .map(ShipGroup::with_bonus)
        .collect();

    groups.sort_by(|a, b| b.created.cmp(&a.created));
    groups
}

/// Index positions of each chain, root first then descendants by creation time.
fn resolve_chains(ships: &[Ship], policy: OrphanPolicy) -> Vec<Vec<usize>> {
    // Pass 1: index every ship and its children, in input order
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(ships.len());
    for (i, ship) in ships.iter().enumerate() {
        index.entry(ship.id.as_str()).or_insert(i);
    }

    let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();
    for (i, ship) in ships.iter().enumerate() {
        match ship.reshipped_from_id.as_deref() {
            None => roots.push(i),
            Some(parent) => match index.get(parent) {
                Some(&p) => children.entry(p).or_default().push(i),
                None if policy == OrphanPolicy::Promote => roots.push(i),
                None => {}
            },
        }
    }

    // Pass 2: walk each root's descendants
    let mut visited = vec![false; ships.len()];
    let mut chains: Vec<Vec<usize>> = Vec::with_capacity(roots.len());
    for &root in &roots {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        let mut descendants = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            for &child in children.get(&node).map(Vec::as_slice).unwrap_or(&[]) {
                if !visited[child] {
                    visited[child] = true;
                    descendants.push(child);
                    stack.push(child);
                }
            }
        }
        descendants.sort_by(|&a, &b| {
            ships[a]
                .created_time
                .cmp(&ships[b].created_time)
                .then(a.cmp(&b))
        });

        let mut chain = Vec::with_capacity(descendants.len() + 1);
        chain.push(root);
        chain.extend(descendants);
        chains.push(chain);
    }

    for (i, ship) in ships.iter().enumerate() {
        if visited[i] {
            continue;
        }
        let parent = ship.reshipped_from_id.as_deref().unwrap_or_default();
        if index.contains_key(parent) {
            warn!(ship_id = %ship.id, parent_id = parent, "Ship lineage forms a cycle, dropping");
        } else {
            debug!(
                ship_id = %ship.id,
                parent_id = parent,
                "Parent ship not found, dropping orphan"
            );
        }
    }

    chains
}
