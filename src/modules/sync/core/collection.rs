// Client-side mirror of one table for one view.
//
// Invariants
// - Records are unique by id.
// - Order is the order of the last fetch, or of the last local re-sort.

use crate::shared::core::entity::Entity;
use crate::shared::core::predicate::OrderBy;
use crate::shared::core::row::RecordId;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct EntityCollection<E> {
    items: Vec<E>,
}

impl<E> Default for EntityCollection<E> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<E: Entity> EntityCollection<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection keeping the first position and the last value of each id.
    pub fn from_items(items: Vec<E>) -> Self {
        let mut positions: HashMap<RecordId, usize> = HashMap::with_capacity(items.len());
        let mut unique: Vec<E> = Vec::with_capacity(items.len());
        for item in items {
            match positions.get(item.id()) {
                Some(&index) => unique[index] = item,
                None => {
                    positions.insert(item.id().clone(), unique.len());
                    unique.push(item);
                }
            }
        }
        Self { items: unique }
    }

    pub fn replace_all(&mut self, items: Vec<E>) {
        *self = Self::from_items(items);
    }

    /// Replaces the record with the same id, or appends it. Returns true when appended.
    pub fn upsert(&mut self, entity: E) -> bool {
        match self.position(entity.id()) {
            Some(index) => {
                self.items[index] = entity;
                false
            }
            None => {
                self.items.push(entity);
                true
            }
        }
    }

    /// Removing an id that is not present is a no-op.
    pub fn remove(&mut self, id: &RecordId) -> Option<E> {
        self.position(id).map(|index| self.items.remove(index))
    }

    pub fn get(&self, id: &RecordId) -> Option<&E> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.position(id).is_some()
    }

    pub fn sort_by(&mut self, order_by: &OrderBy) {
        let mut keyed: Vec<(Value, E)> = self
            .items
            .drain(..)
            .map(|item| (item.field(&order_by.field).unwrap_or(Value::Null), item))
            .collect();
        keyed.sort_by(|(left, _), (right, _)| order_by.compare_values(left, right));
        self.items = keyed.into_iter().map(|(_, item)| item).collect();
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<E> {
        self.items
    }

    fn position(&self, id: &RecordId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }
}
