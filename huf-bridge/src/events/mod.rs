mod binding;
mod host;
mod table;

pub use binding::{ArgSpec, ArgValue, EventBinding, EventSnapshot, resolve_args};
pub use host::{HostCall, HostLink, RecordingHost};
pub use table::EventTable;
