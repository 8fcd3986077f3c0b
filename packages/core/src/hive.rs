//! The Hive registry.
//!
//! A [`Hive`] owns a fixed set of named containers. Names are fixed when the
//! hive is built; each container is attached to the hive (a non-owning
//! back-reference) and gets exactly one [`Hook`], cached for the hive's
//! lifetime.

use std::any::{type_name, Any};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::HiveError;
use crate::honeycomb::AsHoneycomb;
use crate::hook::Hook;

/// Object-safe view of a registered container.
///
/// Blanket-implemented for every [`AsHoneycomb`] type.
pub trait Comb: 'static {
    /// Inject the back-reference to the owning hive.
    fn attach(&self, hive: Weak<Hive>);

    /// Build the hook bound to this container, type-erased.
    fn make_hook(&self) -> Rc<dyn Any>;

    /// Type name of the container, for diagnostics.
    fn type_name(&self) -> &'static str;

    fn subscriber_count(&self) -> usize;
}

impl<C: AsHoneycomb> Comb for C {
    fn attach(&self, hive: Weak<Hive>) {
        self.honeycomb().set_hive(hive);
    }

    fn make_hook(&self) -> Rc<dyn Any> {
        Rc::new(Hook::new(self.honeycomb().clone()))
    }

    fn type_name(&self) -> &'static str {
        type_name::<C>()
    }

    fn subscriber_count(&self) -> usize {
        self.honeycomb().subscriber_count()
    }
}

struct Entry {
    comb: Rc<dyn Comb>,
    any: Rc<dyn Any>,
    hook: Rc<dyn Any>,
}

/// Registry of named containers and their hooks.
pub struct Hive {
    entries: BTreeMap<String, Entry>,
}

impl fmt::Debug for Hive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, entry) in &self.entries {
            map.entry(name, &entry.comb.type_name());
        }
        map.finish()
    }
}

impl Hive {
    /// Start building a hive.
    pub fn builder() -> HiveBuilder {
        HiveBuilder::default()
    }

    fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    /// The container registered under `name`, as its concrete type.
    pub fn get<C: AsHoneycomb>(&self, name: &str) -> Result<Rc<C>, HiveError> {
        let entry = self.entry(name).ok_or_else(|| HiveError::NotFound {
            name: name.to_string(),
        })?;
        Rc::clone(&entry.any)
            .downcast::<C>()
            .map_err(|_| HiveError::TypeMismatch {
                name: name.to_string(),
                expected: type_name::<C>(),
            })
    }

    /// The hook bound to the container registered under `name`.
    ///
    /// `T` is the container's state type.
    pub fn hook<T: 'static>(&self, name: &str) -> Result<Rc<Hook<T>>, HiveError> {
        let entry = self.entry(name).ok_or_else(|| HiveError::HookNotFound {
            name: name.to_string(),
        })?;
        Rc::clone(&entry.hook)
            .downcast::<Hook<T>>()
            .map_err(|_| HiveError::TypeMismatch {
                name: name.to_string(),
                expected: type_name::<Hook<T>>(),
            })
    }

    /// Every registered container.
    pub fn all(&self) -> Vec<Rc<dyn Comb>> {
        self.entries
            .values()
            .map(|entry| Rc::clone(&entry.comb))
            .collect()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of registered containers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collects containers, then builds the [`Hive`].
#[derive(Default)]
pub struct HiveBuilder {
    entries: Vec<(String, Rc<dyn Comb>, Rc<dyn Any>)>,
    error: Option<HiveError>,
}

impl HiveBuilder {
    /// Register `comb` under `name`.
    pub fn register<C: AsHoneycomb>(self, name: impl Into<String>, comb: C) -> Self {
        self.register_rc(name, Rc::new(comb))
    }

    /// Register an already shared container.
    pub fn register_rc<C: AsHoneycomb>(mut self, name: impl Into<String>, comb: Rc<C>) -> Self {
        let name = name.into();
        if self.error.is_none() && self.entries.iter().any(|(n, _, _)| *n == name) {
            self.error = Some(HiveError::Duplicate { name });
            return self;
        }
        let erased: Rc<dyn Comb> = comb.clone();
        let any: Rc<dyn Any> = comb;
        self.entries.push((name, erased, any));
        self
    }

    /// Attach every container and build its hook.
    pub fn build(self) -> Result<Rc<Hive>, HiveError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let hive = Rc::new_cyclic(|weak: &Weak<Hive>| {
            let mut entries = BTreeMap::new();
            for (name, comb, any) in self.entries {
                comb.attach(weak.clone());
                let hook = comb.make_hook();
                log::trace!("registered '{}' ({})", name, comb.type_name());
                entries.insert(name, Entry { comb, any, hook });
            }
            Hive { entries }
        });
        Ok(hive)
    }
}
