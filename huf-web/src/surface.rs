use huf_bridge::surface::{Anchor, ListenerId, Surface};
use huf_bridge::SurfaceError;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlElement, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement,
};

/// Receives every native event fired on a bound element.
pub type EventSink = Rc<dyn Fn(ListenerId, web_sys::Event)>;

type Listener = Closure<dyn FnMut(web_sys::Event)>;

/// [`Surface`] over the browser DOM.
pub struct DomSurface {
    document: Document,
    root_container_id: String,
    /// Closures must outlive their registration, so they are owned here until removed.
    listeners: HashMap<ListenerId, Listener>,
    sink: Option<EventSink>,
}

impl DomSurface {
    pub fn new(document: Document, root_container_id: &str) -> Self {
        Self {
            document,
            root_container_id: root_container_id.to_string(),
            listeners: HashMap::new(),
            sink: None,
        }
    }

    /// Must be installed before any listener is added; earlier listeners stay silent.
    pub fn set_event_sink(&mut self, sink: EventSink) {
        self.sink = Some(sink);
    }

    fn style_element(&self, id: &str) -> Option<Element> {
        let sheets = self.document.get_elements_by_tag_name("style");
        (0..sheets.length())
            .filter_map(|i| sheets.item(i))
            .find(|sheet| sheet.id() == id)
    }
}

fn dom_error(err: JsValue) -> SurfaceError {
    SurfaceError::Backend(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

fn log_failure(result: Result<(), JsValue>, action: &str) {
    if let Err(e) = result {
        warn!(error = ?e, action, "dom call failed");
    }
}

impl Surface for DomSurface {
    type Node = Element;

    fn create_element(&mut self, tag: &str) -> Result<Element, SurfaceError> {
        self.document.create_element(tag).map_err(dom_error)
    }

    fn anchor(&self, anchor: Anchor) -> Option<Element> {
        match anchor {
            Anchor::Root => self.document.get_element_by_id(&self.root_container_id),
            Anchor::Body => self.document.body().map(Element::from),
        }
    }

    fn class_name(&self, node: &Element) -> String {
        node.class_name()
    }

    fn set_class_name(&mut self, node: &Element, class_name: &str) {
        node.set_class_name(class_name);
    }

    fn text(&self, node: &Element) -> String {
        match node.dyn_ref::<HtmlElement>() {
            Some(html) => html.inner_text(),
            None => node.text_content().unwrap_or_default(),
        }
    }

    fn set_text(&mut self, node: &Element, text: &str) {
        match node.dyn_ref::<HtmlElement>() {
            Some(html) => html.set_inner_text(text),
            None => node.set_text_content(Some(text)),
        }
    }

    fn value(&self, node: &Element) -> String {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(area) = node.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
            select.value()
        } else {
            node.get_attribute("value").unwrap_or_default()
        }
    }

    fn set_value(&mut self, node: &Element, value: &str) {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(area) = node.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value(value);
        } else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
        } else {
            log_failure(node.set_attribute("value", value), "set value");
        }
    }

    fn checked(&self, node: &Element) -> bool {
        node.dyn_ref::<HtmlInputElement>()
            .map(HtmlInputElement::checked)
            .unwrap_or(false)
    }

    fn set_checked(&mut self, node: &Element, checked: bool) {
        match node.dyn_ref::<HtmlInputElement>() {
            Some(input) => input.set_checked(checked),
            None => warn!(tag = %node.tag_name(), "checked set on a non-input element"),
        }
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&mut self, node: &Element, name: &str, value: &str) {
        log_failure(node.set_attribute(name, value), "set attribute");
    }

    fn remove_attribute(&mut self, node: &Element, name: &str) {
        log_failure(node.remove_attribute(name), "remove attribute");
    }

    fn has_attribute(&self, node: &Element, name: &str) -> bool {
        node.has_attribute(name)
    }

    fn style_property(&self, node: &Element, property: &str) -> String {
        node.dyn_ref::<HtmlElement>()
            .and_then(|html| html.style().get_property_value(property).ok())
            .unwrap_or_default()
    }

    fn set_style_property(&mut self, node: &Element, property: &str, value: &str) {
        let Some(html) = node.dyn_ref::<HtmlElement>() else {
            return;
        };
        let style = html.style();
        if value.is_empty() {
            log_failure(style.remove_property(property).map(|_| ()), "remove style");
        } else {
            log_failure(style.set_property(property, value), "set style");
        }
    }

    fn client_size(&self, node: &Element) -> (u32, u32) {
        let width = u32::try_from(node.client_width()).unwrap_or(0);
        let height = u32::try_from(node.client_height()).unwrap_or(0);
        (width, height)
    }

    fn children(&self, parent: &Element) -> Vec<Element> {
        let children = parent.children();
        (0..children.length())
            .filter_map(|i| children.item(i))
            .collect()
    }

    fn append_child(&mut self, parent: &Element, child: &Element) -> Result<(), SurfaceError> {
        parent.append_child(child).map(|_| ()).map_err(dom_error)
    }

    fn insert_before(
        &mut self,
        parent: &Element,
        child: &Element,
        reference: &Element,
    ) -> Result<(), SurfaceError> {
        parent
            .insert_before(child, Some(reference))
            .map(|_| ())
            .map_err(dom_error)
    }

    fn remove_child(&mut self, parent: &Element, child: &Element) -> Result<(), SurfaceError> {
        if child.parent_element().as_ref() != Some(parent) {
            return Err(SurfaceError::NotAChild);
        }
        parent.remove_child(child).map(|_| ()).map_err(dom_error)
    }

    fn remove(&mut self, node: &Element) {
        node.remove();
    }

    fn add_listener(&mut self, node: &Element, event: &str, listener: ListenerId) {
        let sink = self.sink.clone();
        let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
            if let Some(sink) = &sink {
                sink(listener, event);
            }
        }) as Box<dyn FnMut(_)>);

        match node.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
            Ok(()) => {
                self.listeners.insert(listener, closure);
            }
            Err(e) => warn!(error = ?e, event, "listener not installed"),
        }
    }

    fn remove_listener(&mut self, node: &Element, event: &str, listener: ListenerId) {
        if let Some(closure) = self.listeners.remove(&listener) {
            log_failure(
                node.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref()),
                "remove listener",
            );
        }
    }

    fn upsert_style_sheet(&mut self, id: &str, css: &str) {
        if let Some(existing) = self.style_element(id) {
            existing.remove();
        }
        let Some(head) = self.document.head() else {
            warn!(sheet = %id, "document has no head");
            return;
        };
        match self.document.create_element("style") {
            Ok(sheet) => {
                sheet.set_id(id);
                sheet.set_text_content(Some(css));
                log_failure(head.append_child(&sheet).map(|_| ()), "append style sheet");
            }
            Err(e) => warn!(error = ?e, sheet = %id, "style sheet not created"),
        }
    }

    fn remove_style_sheet(&mut self, id: &str) -> bool {
        match self.style_element(id) {
            Some(sheet) => {
                sheet.remove();
                true
            }
            None => false,
        }
    }

    fn rename_style_sheet(&mut self, from: &str, to: &str) -> bool {
        match self.style_element(from) {
            Some(sheet) => {
                sheet.set_id(to);
                true
            }
            None => false,
        }
    }
}
