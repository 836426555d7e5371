//! Owning storage for every live organism.

use crate::organism::Organism;
use eco_core::OrganismId;
use slotmap::SlotMap;

/// Stale order entries tolerated before `remove` compacts on its own
const COMPACT_SLACK: usize = 64;

/// Generational arena of organisms that remembers insertion order.
///
/// Grid tiles refer to organisms only through [`OrganismId`]; a stale handle
/// simply stops resolving once its organism is removed. Removed handles stay
/// in the order index until the next [`Population::compact`].
#[derive(Debug, Default)]
pub struct Population {
    organisms: SlotMap<OrganismId, Organism>,
    order: Vec<OrganismId>,
}

impl Population {
    pub fn new() -> Self {
        Self {
            organisms: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.organisms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.organisms.is_empty()
    }

    pub fn contains(&self, id: OrganismId) -> bool {
        self.organisms.contains_key(id)
    }

    pub fn get(&self, id: OrganismId) -> Option<&Organism> {
        self.organisms.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: OrganismId) -> Option<&mut Organism> {
        self.organisms.get_mut(id)
    }

    pub(crate) fn insert(&mut self, organism: Organism) -> OrganismId {
        let id = self.organisms.insert(organism);
        self.order.push(id);
        id
    }

    pub(crate) fn remove(&mut self, id: OrganismId) -> Option<Organism> {
        let organism = self.organisms.remove(id)?;
        if self.order.len() > 2 * self.organisms.len() + COMPACT_SLACK {
            self.compact();
        }
        Some(organism)
    }

    /// Drop removed handles from the order index.
    pub(crate) fn compact(&mut self) {
        let organisms = &self.organisms;
        self.order.retain(|&id| organisms.contains_key(id));
    }

    /// Handles in insertion order
    pub fn ids(&self) -> impl Iterator<Item = OrganismId> + '_ {
        self.order
            .iter()
            .copied()
            .filter(move |&id| self.organisms.contains_key(id))
    }

    /// Organisms in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (OrganismId, &Organism)> + '_ {
        self.order
            .iter()
            .filter_map(move |&id| self.organisms.get(id).map(|organism| (id, organism)))
    }
}
