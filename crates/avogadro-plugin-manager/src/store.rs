use std::path::PathBuf;

use avogadro_plugin_sdk::{CapabilityFactory, Category};

use crate::descriptor::{FactoryId, PluginDescriptor};
use crate::loader::LoadedModule;

#[derive(Default)]
struct CategorySlot {
    modules: Vec<LoadedModule>,
    enabled: Vec<usize>,
    disabled: Vec<usize>,
    descriptors: Vec<PluginDescriptor>,
}

/// Factories and descriptors for one epoch, one slot per category.
///
/// Every module sits in exactly one of its slot's `enabled` or `disabled`
/// lists, and a descriptor's `enabled` flag always names that list.
#[derive(Default)]
pub struct FactoryStore {
    slots: [CategorySlot; Category::COUNT],
}

impl FactoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a host-linked factory. It is always enabled and has no
    /// descriptor.
    pub fn insert_builtin(&mut self, module: LoadedModule) -> FactoryId {
        let category = module.factory().category();
        let slot = &mut self.slots[category.index()];
        let index = slot.modules.len();
        slot.modules.push(module);
        slot.enabled.push(index);
        FactoryId {
            category,
            slot: index,
        }
    }

    /// Register a factory found on disk along with its descriptor.
    pub fn insert_discovered(
        &mut self,
        module: LoadedModule,
        file_name: impl Into<String>,
        absolute_path: impl Into<PathBuf>,
        enabled: bool,
    ) -> FactoryId {
        let category = module.factory().category();
        let slot = &mut self.slots[category.index()];
        let index = slot.modules.len();
        let id = FactoryId {
            category,
            slot: index,
        };
        let descriptor = PluginDescriptor::new(
            module.factory().name(),
            module.factory().description(),
            file_name,
            absolute_path,
            id,
            enabled,
        );
        slot.modules.push(module);
        if enabled {
            slot.enabled.push(index);
        } else {
            slot.disabled.push(index);
        }
        slot.descriptors.push(descriptor);
        id
    }

    pub fn module(&self, id: FactoryId) -> Option<&LoadedModule> {
        self.slots[id.category.index()].modules.get(id.slot)
    }

    pub fn factory(&self, id: FactoryId) -> Option<&dyn CapabilityFactory> {
        self.module(id).map(LoadedModule::factory)
    }

    /// Enabled modules in registration order.
    pub fn enabled_modules(&self, category: Category) -> impl Iterator<Item = &LoadedModule> {
        let slot = &self.slots[category.index()];
        slot.enabled.iter().map(move |index| &slot.modules[*index])
    }

    pub fn enabled(&self, category: Category) -> Vec<&dyn CapabilityFactory> {
        self.enabled_modules(category)
            .map(LoadedModule::factory)
            .collect()
    }

    pub fn disabled(&self, category: Category) -> Vec<&dyn CapabilityFactory> {
        let slot = &self.slots[category.index()];
        slot.disabled
            .iter()
            .map(|index| slot.modules[*index].factory())
            .collect()
    }

    /// First enabled module whose factory carries `name`.
    pub fn find_enabled(&self, category: Category, name: &str) -> Option<&LoadedModule> {
        self.enabled_modules(category)
            .find(|module| module.factory().name() == name)
    }

    pub fn descriptors(&self, category: Category) -> &[PluginDescriptor] {
        &self.slots[category.index()].descriptors
    }

    pub fn all_descriptors(&self) -> impl Iterator<Item = &PluginDescriptor> {
        self.slots.iter().flat_map(|slot| slot.descriptors.iter())
    }

    /// Flip the first descriptor named `name` and move its factory to the
    /// matching list. Returns `false` when no descriptor has that name.
    pub fn set_enabled(&mut self, category: Category, name: &str, enabled: bool) -> bool {
        let slot = &mut self.slots[category.index()];
        let Some(descriptor) = slot
            .descriptors
            .iter_mut()
            .find(|descriptor| descriptor.name() == name)
        else {
            return false;
        };
        if descriptor.is_enabled() == enabled {
            return true;
        }
        descriptor.set_enabled(enabled);
        let index = descriptor.factory().slot;
        let (from, to) = if enabled {
            (&mut slot.disabled, &mut slot.enabled)
        } else {
            (&mut slot.enabled, &mut slot.disabled)
        };
        from.retain(|candidate| *candidate != index);
        // Slot indices follow registration order.
        let at = to.partition_point(|candidate| *candidate < index);
        to.insert(at, index);
        true
    }

    pub fn len(&self, category: Category) -> usize {
        self.slots[category.index()].modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| slot.modules.is_empty())
    }

    pub fn clear_descriptors(&mut self) {
        for slot in &mut self.slots {
            slot.descriptors.clear();
        }
    }

    /// Drop every factory, enabled ones before disabled ones.
    pub fn clear_factories(&mut self) {
        for slot in &mut self.slots {
            let mut modules: Vec<Option<LoadedModule>> =
                slot.modules.drain(..).map(Some).collect();
            for index in slot.enabled.drain(..).chain(slot.disabled.drain(..)) {
                drop(modules[index].take());
            }
        }
    }
}
