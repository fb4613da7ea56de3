use super::binding::ArgValue;
use serde::Serialize;

/// A remote call to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostCall {
    pub remote_id: String,
    pub binding_name: String,
    pub args: Vec<ArgValue>,
}

/// Fire-and-forget channel back to the host process.
pub trait HostLink {
    fn notify(&mut self, call: HostCall);
}

impl<F: FnMut(HostCall)> HostLink for F {
    fn notify(&mut self, call: HostCall) {
        self(call)
    }
}

/// Host link that keeps every call, for tests and replay tooling.
#[derive(Debug, Default)]
pub struct RecordingHost {
    calls: Vec<HostCall>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }
}

impl HostLink for RecordingHost {
    fn notify(&mut self, call: HostCall) {
        self.calls.push(call);
    }
}
