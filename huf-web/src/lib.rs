use huf_bridge::{Bridge, BridgeConfig, NativeEvent, Status};
use std::rc::{Rc, Weak};
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Element;

pub mod host;
pub mod queue;
pub mod surface;

pub use host::JsHost;
pub use queue::{Courier, EventQueue, Outbox};
pub use surface::{DomSurface, EventSink};

type SharedQueue = Rc<EventQueue<DomSurface, JsHost>>;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Browser entry point: executes JSON commands against the page DOM.
///
/// # Arguments
/// * `on_notify` - called with `{ remoteId, bindingName, args }` for every bound event
/// * `config_json` - optional bridge configuration, defaults apply when omitted
#[wasm_bindgen]
pub struct WebBridge {
    queue: SharedQueue,
}

#[wasm_bindgen]
impl WebBridge {
    #[wasm_bindgen(constructor)]
    pub fn new(on_notify: js_sys::Function, config_json: Option<String>) -> Result<WebBridge, JsValue> {
        let config = match config_json {
            Some(text) => {
                BridgeConfig::from_json(&text).map_err(|e| JsValue::from_str(&e.to_string()))?
            }
            None => BridgeConfig::default(),
        };
        let document = web_sys::window()
            .ok_or("no window")?
            .document()
            .ok_or("no document")?;

        let surface = DomSurface::new(document, &config.root_container_id);
        let queue = Rc::new(EventQueue::new(Bridge::with_config(
            config,
            surface,
            JsHost::new(on_notify),
        )));
        let sink = event_sink(Rc::downgrade(&queue));
        queue.bridge().borrow_mut().surface_mut().set_event_sink(sink);

        Ok(WebBridge { queue })
    }

    /// Run one JSON command and return the JSON reply.
    pub fn dispatch(&self, command_json: &str) -> String {
        let reply = match self.queue.bridge().try_borrow_mut() {
            Ok(mut bridge) => bridge.dispatch_json(command_json),
            Err(_) => {
                warn!("command issued while another is running");
                let status = Status::Fail {
                    message: "bridge is busy".to_string(),
                };
                serde_json::to_string(&status).unwrap_or_default()
            }
        };
        // Events the command raised on the DOM were queued behind it.
        self.queue.drain();
        reply
    }

    #[wasm_bindgen(js_name = widgetCount)]
    pub fn widget_count(&self) -> usize {
        self.queue
            .bridge()
            .try_borrow()
            .map(|bridge| bridge.widget_count())
            .unwrap_or(0)
    }
}

fn event_sink(queue: Weak<EventQueue<DomSurface, JsHost>>) -> EventSink {
    Rc::new(move |listener, event: web_sys::Event| {
        let Some(queue) = queue.upgrade() else {
            return;
        };
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        let native = NativeEvent::new(event.type_(), target).with_detail(serde_json::json!({
            "type": event.type_(),
            "timeStamp": event.time_stamp(),
        }));
        queue.push(listener, native);
    })
}
