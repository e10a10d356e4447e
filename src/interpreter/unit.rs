//! Compilation units
//!
//! A unit owns the per-unit caches builtins consult through the caller
//! frame: frozen template objects keyed by template id, and the CommonJS
//! module table used by `requireFast`. Everything a unit caches is a
//! persistent heap root until the unit is unloaded.

use rustc_hash::FxHashMap;

use crate::value::JsObjectRef;

use super::Runtime;

/// Identifier of a loaded compilation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u32);

impl UnitId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// A module registered in a unit
#[derive(Debug, Clone, Copy)]
struct ModuleSlot {
    factory: JsObjectRef,
    /// The `module` object, once the factory has been entered
    module: Option<JsObjectRef>,
}

/// Per-unit state
#[derive(Debug, Default)]
pub struct CompilationUnit {
    template_objects: FxHashMap<u32, JsObjectRef>,
    modules: Vec<ModuleSlot>,
}

impl CompilationUnit {
    pub fn template_count(&self) -> usize {
        self.template_objects.len()
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    fn roots(&self) -> impl Iterator<Item = JsObjectRef> + '_ {
        self.template_objects.values().copied().chain(
            self.modules
                .iter()
                .flat_map(|slot| std::iter::once(slot.factory).chain(slot.module)),
        )
    }
}

impl Runtime {
    /// Register a new, empty compilation unit
    pub fn load_unit(&mut self) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        self.units.insert(id, CompilationUnit::default());
        tracing::debug!(unit = id.0, "unit loaded");
        id
    }

    /// Drop a unit, releasing every object it cached. Returns false if the
    /// unit was not loaded.
    pub fn unload_unit(&mut self, id: UnitId) -> bool {
        let Some(unit) = self.units.remove(&id) else {
            return false;
        };
        let mut released = 0usize;
        for root in unit.roots() {
            self.heap.remove_root(root);
            released += 1;
        }
        tracing::debug!(unit = id.0, released, "unit unloaded");
        true
    }

    pub fn unit(&self, id: UnitId) -> Option<&CompilationUnit> {
        self.units.get(&id)
    }

    /// Template object previously cached for `(unit, template_id)`
    pub fn cached_template_object(&self, unit: UnitId, template_id: u32) -> Option<JsObjectRef> {
        self.units
            .get(&unit)
            .and_then(|u| u.template_objects.get(&template_id))
            .copied()
    }

    /// Cache a template object. Entries are never replaced; returns the
    /// object that ends up cached.
    pub fn cache_template_object(
        &mut self,
        unit: UnitId,
        template_id: u32,
        template: JsObjectRef,
    ) -> Option<JsObjectRef> {
        let entry = self.units.get_mut(&unit)?;
        if let Some(existing) = entry.template_objects.get(&template_id) {
            return Some(*existing);
        }
        entry.template_objects.insert(template_id, template);
        self.heap.add_root(template);
        Some(template)
    }

    /// Register a module factory, returning its module index
    pub fn register_module(&mut self, unit: UnitId, factory: JsObjectRef) -> Option<u32> {
        let entry = self.units.get_mut(&unit)?;
        let index = entry.modules.len() as u32;
        entry.modules.push(ModuleSlot {
            factory,
            module: None,
        });
        self.heap.add_root(factory);
        Some(index)
    }

    pub(crate) fn module_factory(&self, unit: UnitId, index: u32) -> Option<JsObjectRef> {
        self.module_slot(unit, index).map(|slot| slot.factory)
    }

    pub(crate) fn cached_module(&self, unit: UnitId, index: u32) -> Option<JsObjectRef> {
        self.module_slot(unit, index).and_then(|slot| slot.module)
    }

    /// Replace the cached `module` object of a module slot
    pub(crate) fn set_cached_module(
        &mut self,
        unit: UnitId,
        index: u32,
        module: Option<JsObjectRef>,
    ) {
        let Some(slot) = self
            .units
            .get_mut(&unit)
            .and_then(|u| u.modules.get_mut(index as usize))
        else {
            return;
        };
        let previous = std::mem::replace(&mut slot.module, module);
        if let Some(module) = module {
            self.heap.add_root(module);
        }
        if let Some(previous) = previous {
            self.heap.remove_root(previous);
        }
    }

    fn module_slot(&self, unit: UnitId, index: u32) -> Option<&ModuleSlot> {
        self.units
            .get(&unit)
            .and_then(|u| u.modules.get(index as usize))
    }
}
