//! Payload: the `{name, args}` record that travels through a queue.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::errors::CodecError;
use super::names::EventName;

/// Argument list of an event.
///
/// Arguments are kept as JSON values so any serializable value can be passed
/// through any queue backend. Handlers read them back either one at a time
/// (`get`) or all at once into a tuple/struct (`decode`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Args(Vec<serde_json::Value>);

impl Args {
    pub fn new(values: Vec<serde_json::Value>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[serde_json::Value] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<serde_json::Value> {
        self.0
    }

    /// Deserialize the argument at `index`.
    pub fn get<T: DeserializeOwned>(&self, index: usize) -> Result<T, CodecError> {
        let value = self.0.get(index).ok_or(CodecError::MissingArgument {
            index,
            len: self.0.len(),
        })?;
        Ok(T::deserialize(value)?)
    }

    /// Deserialize the whole list, typically into a tuple: `args.decode::<(String, u32)>()`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, CodecError> {
        let value = serde_json::Value::Array(self.0.clone());
        Ok(serde_json::from_value(value)?)
    }
}

impl From<Vec<serde_json::Value>> for Args {
    fn from(values: Vec<serde_json::Value>) -> Self {
        Self(values)
    }
}

impl IntoIterator for Args {
    type Item = serde_json::Value;
    type IntoIter = std::vec::IntoIter<serde_json::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Event name + arguments. Exists only between trigger and handler invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    name: EventName,
    #[serde(default)]
    args: Args,
}

impl Payload {
    pub fn new(name: EventName, args: Args) -> Self {
        Self { name, args }
    }

    pub fn name(&self) -> &EventName {
        &self.name
    }

    pub fn args(&self) -> &Args {
        &self.args
    }

    pub fn into_parts(self) -> (EventName, Args) {
        (self.name, self.args)
    }
}
