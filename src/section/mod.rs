// Author: Dustin Pilgrim
// License: MIT

use std::str::FromStr;

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ast::Value;
use crate::resolver;
use crate::{parser, XclError};

mod access;
mod conversion;

/// A named node holding typed attributes and named child sections.
///
/// Paths are component names joined by [`resolver::DELIMITER`]. A section only
/// stores its own name; full paths are derived while walking the tree, so they
/// always match a node's position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "conversion::SectionRepr")]
pub struct Section {
    #[serde(skip)]
    name: String,
    attributes: IndexMap<String, Value>,
    sections: IndexMap<String, Section>,
    #[serde(skip)]
    dirty: bool,
}

impl PartialEq for Section {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.attributes == other.attributes
            && self.sections == other.sections
    }
}

impl Default for Section {
    fn default() -> Self {
        Self::root()
    }
}

impl FromStr for Section {
    type Err = XclError;

    /// Parse a complete XCL document into a fresh root section.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        parser::parse_str(input)
    }
}

impl Section {
    /// An empty, unnamed root.
    pub fn root() -> Self {
        Self::named("")
    }

    pub(crate) fn named(name: &str) -> Self {
        Section {
            name: name.to_string(),
            attributes: IndexMap::new(),
            sections: IndexMap::new(),
            dirty: true,
        }
    }

    pub(crate) fn from_parts(
        name: String,
        attributes: IndexMap<String, Value>,
        sections: IndexMap<String, Section>,
        dirty: bool,
    ) -> Self {
        Section { name, attributes, sections, dirty }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &IndexMap<String, Value> {
        &self.attributes
    }

    pub fn sections(&self) -> &IndexMap<String, Section> {
        &self.sections
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.sections.is_empty()
    }

    /// Whether this node itself changed since the last full write.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether this node or any descendant changed since the last full write.
    pub fn needs_write(&self) -> bool {
        self.dirty || self.sections.values().any(Section::needs_write)
    }

    /// Clear every marker in the subtree. Only called after a successful write.
    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
        for child in self.sections.values_mut() {
            child.mark_clean();
        }
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut IndexMap<String, Value> {
        &mut self.attributes
    }

    /// Get or create the direct child `name`, marking `self` dirty on creation.
    pub(crate) fn child_or_insert(&mut self, name: &str) -> &mut Section {
        self.child_entry(name).0
    }

    fn child_entry(&mut self, name: &str) -> (&mut Section, bool) {
        match self.sections.entry(name.to_string()) {
            Entry::Occupied(entry) => (entry.into_mut(), false),
            Entry::Vacant(entry) => {
                self.dirty = true;
                (entry.insert(Section::named(name)), true)
            }
        }
    }

    /// Find a section by exact path. Missing components mean `None`.
    pub fn find(&self, path: &str) -> Option<&Section> {
        let (head, rest) = resolver::split_first(path);
        let child = self.sections.get(head)?;
        match rest {
            Some(rest) => child.find(rest),
            None => Some(child),
        }
    }

    pub fn find_mut(&mut self, path: &str) -> Option<&mut Section> {
        let (head, rest) = resolver::split_first(path);
        let child = self.sections.get_mut(head)?;
        match rest {
            Some(rest) => child.find_mut(rest),
            None => Some(child),
        }
    }

    /// Walk `path` level by level, creating each missing section.
    ///
    /// Returns the deepest section and whether its own level was created by
    /// this call. Each created child marks its immediate parent dirty.
    ///
    /// # Examples
    /// ```
    /// # use xcl::Section;
    /// let mut root = Section::root();
    /// let (_, inserted) = root.try_insert("a'b")?;
    /// assert!(inserted);
    /// assert!(root.find("a").is_some());
    /// let (_, inserted) = root.try_insert("a'b")?;
    /// assert!(!inserted);
    /// # Ok::<(), xcl::XclError>(())
    /// ```
    pub fn try_insert(&mut self, path: &str) -> Result<(&mut Section, bool), XclError> {
        resolver::validate_section_path(path)?;
        Ok(self.insert_path(path))
    }

    fn insert_path(&mut self, path: &str) -> (&mut Section, bool) {
        let (head, rest) = resolver::split_first(path);
        let (child, inserted) = self.child_entry(head);
        match rest {
            Some(rest) => child.insert_path(rest),
            None => (child, inserted),
        }
    }

    fn container_or_insert(&mut self, container: Option<&str>) -> &mut Section {
        match container {
            Some(path) => self.insert_path(path).0,
            None => self,
        }
    }

    /// Insert `value` under `path` unless the key already exists.
    ///
    /// Intermediate sections are created as needed. Returns the stored value
    /// and whether it was inserted; an existing value of another type is a
    /// [`XclError::TypeMismatch`].
    pub fn try_insert_value<T>(&mut self, path: &str, value: T) -> Result<(T, bool), XclError>
    where
        T: Into<Value> + TryFrom<Value, Error = XclError> + Clone,
    {
        self.try_insert_with(path, || value)
    }

    /// Like [`Section::try_insert_value`], building the value only on insertion.
    pub fn try_insert_with<T, F>(&mut self, path: &str, make: F) -> Result<(T, bool), XclError>
    where
        T: Into<Value> + TryFrom<Value, Error = XclError> + Clone,
        F: FnOnce() -> T,
    {
        let (container, key) = resolver::validate_value_path(path)?;
        let section = self.container_or_insert(container);

        match section.attributes.entry(key.to_string()) {
            Entry::Occupied(entry) => {
                let existing = T::try_from(entry.get().clone()).map_err(|e| e.at_path(path))?;
                Ok((existing, false))
            }
            Entry::Vacant(entry) => {
                let value = make();
                entry.insert(value.clone().into());
                section.dirty = true;
                Ok((value, true))
            }
        }
    }

    /// Create or overwrite the value under `path`, returning the previous one.
    pub fn insert_or_assign(
        &mut self,
        path: &str,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, XclError> {
        let (container, key) = resolver::validate_value_path(path)?;
        let section = self.container_or_insert(container);
        section.dirty = true;
        Ok(section.attributes.insert(key.to_string(), value.into()))
    }

    pub fn remove_value(&mut self, path: &str) -> Option<Value> {
        let (container, key) = resolver::split_last(path);
        let section = match container {
            Some(container) => self.find_mut(container)?,
            None => self,
        };
        let removed = section.attributes.shift_remove(key)?;
        section.dirty = true;
        Some(removed)
    }

    /// Detach the section at `path` together with its subtree.
    pub fn remove_section(&mut self, path: &str) -> Option<Section> {
        let (container, name) = resolver::split_last(path);
        let parent = match container {
            Some(container) => self.find_mut(container)?,
            None => self,
        };
        let removed = parent.sections.shift_remove(name)?;
        parent.dirty = true;
        Some(removed)
    }

    /// Drop every attribute and child. An already empty section stays clean.
    pub fn clear(&mut self) {
        if self.is_empty() {
            return;
        }
        self.attributes.clear();
        self.sections.clear();
        self.dirty = true;
    }
}
