mod memory;
mod traits;

pub use memory::{MemorySurface, NodeKey};
pub use traits::{Anchor, ListenerId, NativeEvent, Surface};
