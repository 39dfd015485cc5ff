use std::mem;

use avogadro_plugin_sdk::{Color, Extension, Tool};

use crate::loader::Hosted;

/// A list that is filled at most once until it is taken.
pub(crate) struct CachedList<T> {
    loaded: bool,
    items: Vec<T>,
}

impl<T> Default for CachedList<T> {
    fn default() -> Self {
        Self {
            loaded: false,
            items: Vec::new(),
        }
    }
}

impl<T> CachedList<T> {
    pub(crate) fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub(crate) fn items(&self) -> &[T] {
        &self.items
    }

    pub(crate) fn fill(&mut self, items: Vec<T>) {
        self.items = items;
        self.loaded = true;
    }

    /// Hand the items over and mark the list unloaded.
    pub(crate) fn take(&mut self) -> Vec<T> {
        self.loaded = false;
        mem::take(&mut self.items)
    }
}

/// Instances created by the bulk accessors. Engines are never cached.
#[derive(Default)]
pub(crate) struct InstanceCache {
    pub(crate) tools: CachedList<Hosted<dyn Tool>>,
    pub(crate) extensions: CachedList<Hosted<dyn Extension>>,
    pub(crate) colors: CachedList<Hosted<dyn Color>>,
}

impl InstanceCache {
    pub(crate) fn is_empty(&self) -> bool {
        !self.tools.is_loaded()
            && !self.extensions.is_loaded()
            && !self.colors.is_loaded()
            && self.tools.items().is_empty()
            && self.extensions.items().is_empty()
            && self.colors.items().is_empty()
    }
}
