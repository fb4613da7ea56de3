use crate::queue::{Courier, Outbox};
use huf_bridge::{HostCall, HostLink};
use std::rc::Rc;
use tracing::warn;
use wasm_bindgen::JsValue;

/// Queues remote calls for a JavaScript callback.
///
/// Calls are held until the bridge is released, so the callback may issue further commands.
pub struct JsHost {
    callback: js_sys::Function,
    pending: Vec<HostCall>,
}

impl JsHost {
    pub fn new(callback: js_sys::Function) -> Self {
        Self {
            callback,
            pending: Vec::new(),
        }
    }
}

impl HostLink for JsHost {
    fn notify(&mut self, call: HostCall) {
        self.pending.push(call);
    }
}

impl Outbox for JsHost {
    fn take_pending(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.pending)
    }

    fn courier(&self) -> Courier {
        let callback = self.callback.clone();
        Rc::new(move |call: &HostCall| deliver(&callback, call))
    }
}

/// Invoke `callback` with `call` as a plain `{ remoteId, bindingName, args }` object.
pub fn deliver(callback: &js_sys::Function, call: &HostCall) {
    let payload = match serde_json::to_string(call) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, binding = %call.binding_name, "host call not serializable");
            return;
        }
    };
    let value = js_sys::JSON::parse(&payload).unwrap_or_else(|_| JsValue::from_str(&payload));
    if let Err(e) = callback.call1(&JsValue::NULL, &value) {
        warn!(error = ?e, binding = %call.binding_name, "host callback threw");
    }
}
