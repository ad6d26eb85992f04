use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered periodic callback.
///
/// Callbacks run on the engine task and must be quick and non-blocking; slow
/// work belongs on a task of its own, triggered from here.
pub type Callback = Box<dyn FnMut() + Send + 'static>;

/// Opaque registration handle.
///
/// Closures carry no usable identity, so every registration mints a fresh id
/// and removal takes the id back. Holding an id does not keep the callback
/// alive; the engine owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallbackId(Uuid);

impl CallbackId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
