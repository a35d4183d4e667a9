use crate::value::Value;
use std::collections::HashMap;

/// One call's variable bindings. Calls work on a full copy of the caller's
/// environment, so nothing here is shared and there is no enclosing scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    values: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds or rebinds `name`. Assignment and declaration both land here;
    /// assigning an unbound name creates it.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// The copy a function call starts from.
    pub fn snapshot(&self) -> Environment {
        self.clone()
    }
}
