use std::any::Any;
use std::collections::BTreeMap;
use std::marker::PhantomData;

use crate::{BtError, NodeId, Result};

/// Typed handle to a blackboard entry.
///
/// The name is the actual storage key; the type parameter only guards the
/// accessors. Two keys with the same name but different types refer to the
/// same slot, and reading through the wrong one is a `TypeMismatch`.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BbKey<T: 'static> {
    name: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: 'static> Copy for BbKey<T> {}

impl<T: 'static> Clone for BbKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> BbKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _phantom: PhantomData,
        }
    }

    pub fn name(self) -> &'static str {
        self.name
    }
}

/// A deferred boolean condition, evaluated by the root before every tick.
pub type Check = Box<dyn FnMut() -> bool>;

/// Shared store owned by a tree's root.
///
/// Besides application values it carries the deferred-check registry and the
/// worklist of checks that fired during the current pass and still have to be
/// unregistered.
#[derive(Default)]
pub struct Blackboard {
    values: BTreeMap<&'static str, Box<dyn Any>>,
    checks: BTreeMap<NodeId, Check>,
    delete: Vec<NodeId>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every application value. Checks are left untouched.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn contains<T: 'static>(&self, key: BbKey<T>) -> bool {
        self.values.contains_key(key.name)
    }

    pub fn set_value<T: 'static>(&mut self, key: BbKey<T>, value: T) {
        self.values.insert(key.name, Box::new(value));
    }

    pub fn get_value<T: 'static>(&self, key: BbKey<T>) -> Result<&T> {
        let value = self
            .values
            .get(key.name)
            .ok_or(BtError::MissingKey { key: key.name })?;
        value
            .downcast_ref::<T>()
            .ok_or(BtError::TypeMismatch { key: key.name })
    }

    pub fn get_value_mut<T: 'static>(&mut self, key: BbKey<T>) -> Result<&mut T> {
        let value = self
            .values
            .get_mut(key.name)
            .ok_or(BtError::MissingKey { key: key.name })?;
        value
            .downcast_mut::<T>()
            .ok_or(BtError::TypeMismatch { key: key.name })
    }

    /// Like [`get_value`](Self::get_value) but a missing key is `None`.
    pub fn try_get<T: 'static>(&self, key: BbKey<T>) -> Result<Option<&T>> {
        match self.values.get(key.name) {
            None => Ok(None),
            Some(value) => value
                .downcast_ref::<T>()
                .map(Some)
                .ok_or(BtError::TypeMismatch { key: key.name }),
        }
    }

    pub fn remove_value<T: 'static>(&mut self, key: BbKey<T>) -> Result<T> {
        let value = self
            .values
            .remove(key.name)
            .ok_or(BtError::MissingKey { key: key.name })?;
        match value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => {
                // put it back, the caller only asked through the wrong type
                self.values.insert(key.name, value);
                Err(BtError::TypeMismatch { key: key.name })
            }
        }
    }

    /// Pushes onto the named stack, creating it when the key is unset.
    ///
    /// Fails with `KeyConflict` if the key already holds something that is not
    /// a `Vec<T>`.
    pub fn push_stack<T: 'static>(&mut self, key: BbKey<Vec<T>>, value: T) -> Result<()> {
        match self.values.get_mut(key.name) {
            None => {
                self.values.insert(key.name, Box::new(vec![value]));
                Ok(())
            }
            Some(slot) => {
                let stack = slot
                    .downcast_mut::<Vec<T>>()
                    .ok_or(BtError::KeyConflict { key: key.name })?;
                stack.push(value);
                Ok(())
            }
        }
    }

    /// Pops the most recently pushed value; `None` when the stack is unset or
    /// empty.
    pub fn pop_stack<T: 'static>(&mut self, key: BbKey<Vec<T>>) -> Result<Option<T>> {
        match self.values.get_mut(key.name) {
            None => Ok(None),
            Some(slot) => {
                let stack = slot
                    .downcast_mut::<Vec<T>>()
                    .ok_or(BtError::KeyConflict { key: key.name })?;
                Ok(stack.pop())
            }
        }
    }

    /// Removes the named stack. Returns whether it held anything.
    pub fn flush_stack<T: 'static>(&mut self, key: BbKey<Vec<T>>) -> Result<bool> {
        let had_items = match self.values.get(key.name) {
            None => return Ok(false),
            Some(slot) => !slot
                .downcast_ref::<Vec<T>>()
                .ok_or(BtError::KeyConflict { key: key.name })?
                .is_empty(),
        };
        self.values.remove(key.name);
        Ok(had_items)
    }

    /// Registers `check` for `node`, replacing any previous one.
    pub fn add_check(&mut self, node: NodeId, check: Check) {
        self.checks.insert(node, check);
    }

    pub fn del_check(&mut self, node: NodeId) {
        self.checks.remove(&node);
    }

    pub fn has_check(&self, node: NodeId) -> bool {
        self.checks.contains_key(&node)
    }

    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    /// Node ids with a registered check, in evaluation order.
    pub fn check_ids(&self) -> Vec<NodeId> {
        self.checks.keys().copied().collect()
    }

    /// Evaluates the check registered for `node`.
    ///
    /// Returns `false` if no check is registered, e.g. because an earlier node
    /// in the same pass removed it.
    pub fn poll_check(&mut self, node: NodeId) -> bool {
        match self.checks.get_mut(&node) {
            Some(check) => check(),
            None => false,
        }
    }

    /// Queues `node`'s check for removal at the end of the current pass.
    pub fn schedule_check_removal(&mut self, node: NodeId) {
        self.delete.push(node);
    }

    #[cfg(test)]
    fn pending_removals(&self) -> &[NodeId] {
        &self.delete
    }

    /// Applies every queued removal and empties the worklist.
    pub fn remove_scheduled_checks(&mut self) {
        for node in self.delete.drain(..) {
            self.checks.remove(&node);
        }
    }

    pub fn clear_checks(&mut self) {
        self.checks.clear();
        self.delete.clear();
    }
}
