//! A section tree that can be shared between threads.
//!
//! Every node carries its own `RwLock`. Lookups lock one node at a time while
//! walking a path, so a multi-level read is not atomic against concurrent
//! writers. Mutations hold a node's write lock only for the local map update
//! and release it before descending. Check-then-insert happens inside a single
//! write-locked critical section, so racing inserts of the same name create
//! it exactly once.
//!
//! File I/O is outside these locks: take a [`SharedSection::snapshot`] and
//! save it through an [`crate::Xcl`] owned by one thread.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::ast::Value;
use crate::resolver;
use crate::section::Section;
use crate::XclError;

pub struct SharedSection {
    name: String,
    node: RwLock<Node>,
}

struct Node {
    attributes: IndexMap<String, Value>,
    sections: IndexMap<String, Arc<SharedSection>>,
    dirty: bool,
}

impl SharedSection {
    pub fn root() -> Arc<Self> {
        Self::named("")
    }

    fn named(name: &str) -> Arc<Self> {
        Arc::new(SharedSection {
            name: name.to_string(),
            node: RwLock::new(Node {
                attributes: IndexMap::new(),
                sections: IndexMap::new(),
                dirty: true,
            }),
        })
    }

    /// Copy a plain tree into a shared one, keeping its dirty markers.
    pub fn from_section(section: &Section) -> Arc<Self> {
        let sections = section
            .sections()
            .iter()
            .map(|(name, child)| (name.clone(), Self::from_section(child)))
            .collect();

        Arc::new(SharedSection {
            name: section.name().to_string(),
            node: RwLock::new(Node {
                attributes: section.attributes().clone(),
                sections,
                dirty: section.is_dirty(),
            }),
        })
    }

    /// Copy this subtree into a plain [`Section`], node by node.
    pub fn snapshot(&self) -> Section {
        let (attributes, children, dirty) = {
            let node = self.read();
            let children: Vec<Arc<SharedSection>> = node.sections.values().cloned().collect();
            (node.attributes.clone(), children, node.dirty)
        };

        let sections = children
            .iter()
            .map(|child| (child.name.clone(), child.snapshot()))
            .collect();

        Section::from_parts(self.name.clone(), attributes, sections, dirty)
    }

    // The maps stay structurally valid if a holder panicked, so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, Node> {
        self.node.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Node> {
        self.node.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_dirty(&self) -> bool {
        self.read().dirty
    }

    pub fn needs_write(&self) -> bool {
        let children: Vec<Arc<SharedSection>> = {
            let node = self.read();
            if node.dirty {
                return true;
            }
            node.sections.values().cloned().collect()
        };
        children.iter().any(|child| child.needs_write())
    }

    pub fn mark_clean(&self) {
        let children: Vec<Arc<SharedSection>> = {
            let mut node = self.write();
            node.dirty = false;
            node.sections.values().cloned().collect()
        };
        for child in children {
            child.mark_clean();
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.read().attributes.keys().cloned().collect()
    }

    pub fn find(&self, path: &str) -> Option<Arc<SharedSection>> {
        let (head, rest) = resolver::split_first(path);
        let child = self.read().sections.get(head).cloned()?;
        match rest {
            Some(rest) => child.find(rest),
            None => Some(child),
        }
    }

    pub fn find_value(&self, path: &str) -> Option<Value> {
        let (container, key) = resolver::split_last(path);
        match container {
            Some(container) => self.find(container)?.attribute(key),
            None => self.attribute(key),
        }
    }

    fn attribute(&self, key: &str) -> Option<Value> {
        self.read().attributes.get(key).cloned()
    }

    pub fn get<T>(&self, path: &str) -> Result<T, XclError>
    where
        T: TryFrom<Value, Error = XclError>,
    {
        self.get_optional(path)?
            .ok_or_else(|| XclError::not_found(path))
    }

    pub fn get_optional<T>(&self, path: &str) -> Result<Option<T>, XclError>
    where
        T: TryFrom<Value, Error = XclError>,
    {
        match self.find_value(path) {
            Some(value) => T::try_from(value).map(Some).map_err(|e| e.at_path(path)),
            None => Ok(None),
        }
    }

    /// Walk `path`, creating missing sections; see [`Section::try_insert`].
    pub fn try_insert(&self, path: &str) -> Result<(Arc<SharedSection>, bool), XclError> {
        resolver::validate_section_path(path)?;
        Ok(self.insert_path(path))
    }

    fn insert_path(&self, path: &str) -> (Arc<SharedSection>, bool) {
        let (head, rest) = resolver::split_first(path);

        let (child, inserted) = {
            let mut guard = self.write();
            let node = &mut *guard;
            match node.sections.entry(head.to_string()) {
                Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
                Entry::Vacant(entry) => {
                    let child = Self::named(head);
                    entry.insert(Arc::clone(&child));
                    node.dirty = true;
                    (child, true)
                }
            }
        };

        match rest {
            Some(rest) => child.insert_path(rest),
            None => (child, inserted),
        }
    }

    fn with_container<R>(&self, container: Option<&str>, f: impl FnOnce(&SharedSection) -> R) -> R {
        match container {
            Some(path) => f(&self.insert_path(path).0),
            None => f(self),
        }
    }

    /// Insert unless present; see [`Section::try_insert_value`].
    pub fn try_insert_value<T>(&self, path: &str, value: T) -> Result<(T, bool), XclError>
    where
        T: Into<Value> + TryFrom<Value, Error = XclError> + Clone,
    {
        self.try_insert_with(path, || value)
    }

    /// Insert unless present, building the value only on insertion.
    ///
    /// `make` runs while the owning section is write-locked and must not
    /// touch this tree.
    pub fn try_insert_with<T, F>(&self, path: &str, make: F) -> Result<(T, bool), XclError>
    where
        T: Into<Value> + TryFrom<Value, Error = XclError> + Clone,
        F: FnOnce() -> T,
    {
        let (container, key) = resolver::validate_value_path(path)?;

        self.with_container(container, |section| {
            let mut guard = section.write();
            let node = &mut *guard;
            match node.attributes.entry(key.to_string()) {
                Entry::Occupied(entry) => {
                    let existing = T::try_from(entry.get().clone()).map_err(|e| e.at_path(path))?;
                    Ok((existing, false))
                }
                Entry::Vacant(entry) => {
                    let value = make();
                    entry.insert(value.clone().into());
                    node.dirty = true;
                    Ok((value, true))
                }
            }
        })
    }

    pub fn insert_or_assign(
        &self,
        path: &str,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, XclError> {
        let (container, key) = resolver::validate_value_path(path)?;
        let value = value.into();

        Ok(self.with_container(container, |section| {
            let mut node = section.write();
            node.dirty = true;
            node.attributes.insert(key.to_string(), value)
        }))
    }

    pub fn remove_value(&self, path: &str) -> Option<Value> {
        let (container, key) = resolver::split_last(path);
        let remove = |section: &SharedSection| {
            let mut node = section.write();
            let removed = node.attributes.shift_remove(key)?;
            node.dirty = true;
            Some(removed)
        };
        match container {
            Some(container) => remove(&*self.find(container)?),
            None => remove(self),
        }
    }

    pub fn remove_section(&self, path: &str) -> Option<Arc<SharedSection>> {
        let (container, name) = resolver::split_last(path);
        let remove = |section: &SharedSection| {
            let mut node = section.write();
            let removed = node.sections.shift_remove(name)?;
            node.dirty = true;
            Some(removed)
        };
        match container {
            Some(container) => remove(&*self.find(container)?),
            None => remove(self),
        }
    }

    pub fn clear(&self) {
        let mut node = self.write();
        if node.attributes.is_empty() && node.sections.is_empty() {
            return;
        }
        node.attributes.clear();
        node.sections.clear();
        node.dirty = true;
    }
}
