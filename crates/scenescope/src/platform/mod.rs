/*!
Toolkit abstraction layer.

- `traits.rs` - the [`Toolkit`] contract and notification types
- `dispatcher.rs` - UI-thread affinity
- `memory/` - retained in-memory toolkit implementation
*/

mod dispatcher;
pub mod memory;
mod traits;

pub use dispatcher::Dispatcher;
pub use memory::{MemoryToolkit, NodeKind};
pub use traits::*;
