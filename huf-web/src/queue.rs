use huf_bridge::surface::{ListenerId, Surface};
use huf_bridge::{Bridge, HostCall, HostLink, NativeEvent};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tracing::debug;

/// Sends one host call once the bridge is released.
pub type Courier = Rc<dyn Fn(&HostCall)>;

/// Host link that holds calls until the bridge can be released.
pub trait Outbox: HostLink {
    fn take_pending(&mut self) -> Vec<HostCall>;
    fn courier(&self) -> Courier;
}

/// A bridge plus the native events waiting for it.
///
/// Events raised while a command holds the bridge (a `blur` from removing a focused node,
/// for instance) are queued and handled in order once it is released.
pub struct EventQueue<S: Surface, H: Outbox> {
    bridge: RefCell<Bridge<S, H>>,
    deferred: RefCell<VecDeque<(ListenerId, NativeEvent<S::Node>)>>,
}

impl<S: Surface, H: Outbox> EventQueue<S, H> {
    pub fn new(bridge: Bridge<S, H>) -> Self {
        Self {
            bridge: RefCell::new(bridge),
            deferred: RefCell::new(VecDeque::new()),
        }
    }

    pub fn bridge(&self) -> &RefCell<Bridge<S, H>> {
        &self.bridge
    }

    /// Events still waiting for the bridge.
    pub fn pending(&self) -> usize {
        self.deferred.borrow().len()
    }

    pub fn push(&self, listener: ListenerId, event: NativeEvent<S::Node>) {
        if self.bridge.try_borrow().is_err() {
            debug!(event = %event.name, "bridge busy, event deferred");
        }
        self.deferred.borrow_mut().push_back((listener, event));
        self.drain();
    }

    /// Handle queued events until the queue is empty or the bridge is busy.
    pub fn drain(&self) {
        loop {
            let Ok(mut bridge) = self.bridge.try_borrow_mut() else {
                return;
            };
            let Some((listener, event)) = self.deferred.borrow_mut().pop_front() else {
                return;
            };
            bridge.handle_event(listener, &event);

            let calls = bridge.host_mut().take_pending();
            let courier = bridge.host().courier();
            drop(bridge);
            // The courier may re-enter with new commands, so it runs with the bridge released.
            for call in &calls {
                courier(call);
            }
        }
    }
}
