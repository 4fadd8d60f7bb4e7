use std::any::Any;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use kot_core::{json_type_name, ProviderError, Value};
use serde::de::DeserializeOwned;

/// A resolved input handed to a provider.
#[derive(Clone)]
pub enum Injected {
    /// Plain value produced by a fact, a fixture or a parameter binding.
    Value(Value),
    /// Opaque resource produced by a fixture.
    Handle(Rc<dyn Any>),
}

impl Injected {
    /// The plain value, or `None` for a fixture handle.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Injected::Value(value) => Some(value),
            Injected::Handle(_) => None,
        }
    }
}

impl fmt::Debug for Injected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Injected::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Injected::Handle(_) => f.write_str("Handle(..)"),
        }
    }
}

/// Named inputs for one provider invocation, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    entries: IndexMap<String, Injected>,
}

impl Inputs {
    /// Empty input set.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, injected: Injected) {
        self.entries.insert(name.into(), injected);
    }

    /// Borrows a value input. Fails for unknown names and for fixture handles.
    pub fn value(&self, name: &str) -> Result<&Value, ProviderError> {
        match self.entries.get(name) {
            Some(Injected::Value(value)) => Ok(value),
            Some(Injected::Handle(_)) => Err(ProviderError::new(
                "TypeError",
                format!("input '{name}' is a fixture handle, not a value"),
            )),
            None => Err(missing(name)),
        }
    }

    /// Deserializes a value input into `T`.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T, ProviderError> {
        let value = self.value(name)?;
        serde_json::from_value(value.clone()).map_err(|err| {
            ProviderError::new(
                "TypeError",
                format!(
                    "input '{name}' ({}) does not decode: {err}",
                    json_type_name(value)
                ),
            )
        })
    }

    /// Downcasts a fixture handle to its concrete type.
    pub fn handle<T: Any>(&self, name: &str) -> Result<Rc<T>, ProviderError> {
        match self.entries.get(name) {
            Some(Injected::Handle(handle)) => Rc::clone(handle).downcast::<T>().map_err(|_| {
                ProviderError::new(
                    "TypeError",
                    format!(
                        "input '{name}' is not a {}",
                        std::any::type_name::<T>()
                    ),
                )
            }),
            Some(Injected::Value(_)) => Err(ProviderError::new(
                "TypeError",
                format!("input '{name}' is a value, not a fixture handle"),
            )),
            None => Err(missing(name)),
        }
    }

    /// Whether `name` was injected.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Injected names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of injected inputs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was injected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn missing(name: &str) -> ProviderError {
    ProviderError::new("KeyError", format!("input '{name}' was not declared"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn typed_access() {
        let mut inputs = Inputs::new();
        inputs.insert("threshold", Injected::Value(json!(80)));
        inputs.insert("conn", Injected::Handle(Rc::new(String::from("db"))));

        assert_eq!(inputs.get::<u32>("threshold").unwrap(), 80);
        assert_eq!(inputs.handle::<String>("conn").unwrap().as_str(), "db");
        assert_eq!(inputs.get::<String>("threshold").unwrap_err().kind, "TypeError");
        assert_eq!(inputs.handle::<u8>("conn").unwrap_err().kind, "TypeError");
        assert_eq!(inputs.value("other").unwrap_err().kind, "KeyError");
        assert_eq!(inputs.names().collect::<Vec<_>>(), vec!["threshold", "conn"]);
    }
}
