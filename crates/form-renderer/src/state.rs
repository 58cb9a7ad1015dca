use std::collections::BTreeMap;
use std::fmt;

use crate::values::{FieldValue, ValueSet};

/// A value transition observed by a watcher.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange<'a> {
    pub field: &'a str,
    pub previous: Option<&'a FieldValue>,
    pub current: Option<&'a FieldValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Watcher = Box<dyn FnMut(&FieldChange<'_>)>;

/// Source of truth for one form's values. Watchers subscribe to a single
/// field and only hear about that field's changes.
#[derive(Default)]
pub struct FormState {
    values: ValueSet,
    watchers: BTreeMap<String, Vec<(SubscriptionId, Watcher)>>,
    next_id: u64,
}

impl fmt::Debug for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormState")
            .field("values", &self.values)
            .field("watchers", &self.watcher_count())
            .finish()
    }
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: ValueSet) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    pub fn values(&self) -> &ValueSet {
        &self.values
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Stores `value` and notifies the field's watchers. Returns `false`, and
    /// notifies nobody, when the value is unchanged.
    pub fn set(&mut self, field: &str, value: FieldValue) -> bool {
        if self.values.get(field) == Some(&value) {
            return false;
        }
        let previous = self.values.insert(field, value);
        self.notify(field, previous.as_ref());
        true
    }

    /// Unsets a field. Returns `false` when it was already unset.
    pub fn clear(&mut self, field: &str) -> bool {
        match self.values.remove(field) {
            Some(previous) => {
                self.notify(field, Some(&previous));
                true
            }
            None => false,
        }
    }

    pub fn watch(
        &mut self,
        field: impl Into<String>,
        watcher: impl FnMut(&FieldChange<'_>) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.watchers
            .entry(field.into())
            .or_default()
            .push((id, Box::new(watcher)));
        id
    }

    pub fn unwatch(&mut self, id: SubscriptionId) -> bool {
        let mut removed = false;
        self.watchers.retain(|_, list| {
            let before = list.len();
            list.retain(|(existing, _)| *existing != id);
            removed |= list.len() != before;
            !list.is_empty()
        });
        removed
    }

    pub fn watcher_count(&self) -> usize {
        self.watchers.values().map(Vec::len).sum()
    }

    fn notify(&mut self, field: &str, previous: Option<&FieldValue>) {
        let Some(list) = self.watchers.get_mut(field) else {
            return;
        };
        let change = FieldChange {
            field,
            previous,
            current: self.values.get(field),
        };
        for (_, watcher) in list.iter_mut() {
            watcher(&change);
        }
    }
}
