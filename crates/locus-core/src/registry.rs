use crate::config::SelectorConfig;
use crate::definition::SelectorDefinition;
use crate::error::SelectorError;
use crate::format::Format;
use crate::locator::{Locator, locator_valid};
use crate::selector::Selector;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

static GLOBAL: LazyLock<SelectorRegistry> = LazyLock::new(SelectorRegistry::new);

/// Process-wide registry. Starts empty; call [`crate::builtin::install`] to
/// add the built-in catalogue.
pub fn global() -> &'static SelectorRegistry {
    &GLOBAL
}

#[derive(Default)]
struct Entries {
    definitions: HashMap<String, Arc<SelectorDefinition>>,
    /// Registration order, used by locator-shape lookup and listing.
    order: Vec<String>,
}

/// Registry of selector kinds by name.
///
/// Lookups hand out `Arc` snapshots, so a definition stays usable for a whole
/// compilation even if it is updated or removed meanwhile.
#[derive(Default)]
pub struct SelectorRegistry {
    entries: RwLock<Entries>,
}

impl SelectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in selector kinds.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        crate::builtin::install(&registry);
        registry
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or overwrite the definition for its name.
    /// An overwritten name keeps its registration position.
    pub fn register(&self, definition: SelectorDefinition) {
        let name = definition.name().to_string();
        tracing::debug!(selector = %name, "registering selector");
        if definition.formats().is_empty() {
            tracing::warn!(selector = %name, "selector registered without an expression block");
        }

        let mut entries = self.write();
        if entries
            .definitions
            .insert(name.clone(), Arc::new(definition))
            .is_none()
        {
            entries.order.push(name);
        }
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<SelectorDefinition>, SelectorError> {
        self.read()
            .definitions
            .get(name)
            .cloned()
            .ok_or_else(|| SelectorError::UnknownSelectorKind(name.to_string()))
    }

    /// Mutate the definition registered as `name` in place.
    pub fn update<F>(&self, name: &str, mutation: F) -> Result<(), SelectorError>
    where
        F: FnOnce(&mut SelectorDefinition),
    {
        let mut entries = self.write();
        let definition = entries
            .definitions
            .get_mut(name)
            .ok_or_else(|| SelectorError::UnknownSelectorKind(name.to_string()))?;
        mutation(Arc::make_mut(definition));
        tracing::debug!(selector = name, "updated selector");
        Ok(())
    }

    /// Remove `name`. Returns true if it was registered.
    pub fn unregister(&self, name: &str) -> bool {
        let mut entries = self.write();
        if entries.definitions.remove(name).is_some() {
            entries.order.retain(|n| n != name);
            tracing::debug!(selector = name, "unregistered selector");
            true
        } else {
            false
        }
    }

    /// First definition, in registration order, whose declared locator types
    /// accept `locator`. Definitions without declared types never match.
    pub fn find_by_locator_shape(&self, locator: &Locator) -> Option<Arc<SelectorDefinition>> {
        let entries = self.read();
        entries
            .order
            .iter()
            .filter_map(|name| entries.definitions.get(name))
            .find(|def| {
                def.locator_types()
                    .is_some_and(|types| locator_valid(Some(types), Some(locator)))
            })
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().definitions.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.read().order.clone()
    }

    pub fn len(&self) -> usize {
        self.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bind `name` to a new selector instance.
    pub fn selector(
        &self,
        name: &str,
        config: SelectorConfig,
        format: Option<Format>,
    ) -> Result<Selector<'_>, SelectorError> {
        let definition = self.lookup(name)?;
        Ok(Selector::new(self, definition, config, format))
    }
}
