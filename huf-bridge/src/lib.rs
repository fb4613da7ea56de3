pub mod attrs;
pub mod bridge;
pub mod command;
pub mod config;
pub mod error;
pub mod events;
pub mod registry;
pub mod stylesheet;
pub mod surface;
pub mod visibility;

// Re-export key types
pub use attrs::{AttrValue, StyleDescriptor};
pub use bridge::{Bridge, WidgetSpec};
pub use command::{Command, Status};
pub use config::BridgeConfig;
pub use error::{BridgeError, SurfaceError};
pub use events::{ArgSpec, ArgValue, HostCall, HostLink, RecordingHost};
pub use registry::WidgetKind;
pub use surface::{MemorySurface, NativeEvent, Surface};
pub use visibility::TreeOutcome;
