//! JSON command surface exposed to the host.

use crate::attrs::AttrValue;
use crate::bridge::{Bridge, WidgetSpec};
use crate::error::{BridgeError, Result};
use crate::events::{ArgSpec, HostLink};
use crate::surface::Surface;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    CreateWidget(WidgetSpec),
    DestroyWidget {
        id: String,
    },
    GetAttribute {
        id: String,
        name: String,
    },
    SetAttribute {
        id: String,
        name: String,
        value: AttrValue,
    },
    RemoveAttribute {
        id: String,
        name: String,
    },
    AttributeExists {
        id: String,
        name: String,
    },
    #[serde(rename_all = "camelCase")]
    SetVisible {
        id: String,
        parent_id: String,
        visible: bool,
        #[serde(default)]
        index: Option<usize>,
    },
    #[serde(rename_all = "camelCase")]
    BindEvent {
        id: String,
        event_name: String,
        binding_name: String,
        #[serde(default)]
        arg_specs: Vec<ArgSpec>,
        #[serde(default)]
        remote_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    AddGlobalStyle {
        style_id: String,
        css_text: String,
    },
    #[serde(rename_all = "camelCase")]
    DeleteGlobalStyle {
        style_id: String,
    },
    #[serde(rename_all = "camelCase")]
    AddClass {
        id: String,
        class_name: String,
    },
    #[serde(rename_all = "camelCase")]
    RemoveClass {
        id: String,
        class_name: String,
    },
    UpdateStyleProperty {
        id: String,
        name: String,
        value: String,
    },
    RemoveStyleProperty {
        id: String,
        name: String,
    },
    HasStyleProperty {
        id: String,
        name: String,
    },
    WidgetIds,
}

impl Command {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateWidget(_) => "create_widget",
            Command::DestroyWidget { .. } => "destroy_widget",
            Command::GetAttribute { .. } => "get_attribute",
            Command::SetAttribute { .. } => "set_attribute",
            Command::RemoveAttribute { .. } => "remove_attribute",
            Command::AttributeExists { .. } => "attribute_exists",
            Command::SetVisible { .. } => "set_visible",
            Command::BindEvent { .. } => "bind_event",
            Command::AddGlobalStyle { .. } => "add_global_style",
            Command::DeleteGlobalStyle { .. } => "delete_global_style",
            Command::AddClass { .. } => "add_class",
            Command::RemoveClass { .. } => "remove_class",
            Command::UpdateStyleProperty { .. } => "update_style_property",
            Command::RemoveStyleProperty { .. } => "remove_style_property",
            Command::HasStyleProperty { .. } => "has_style_property",
            Command::WidgetIds => "widget_ids",
        }
    }
}

/// Outcome reported for commands that can fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Status {
    Success,
    Fail { message: String },
}

impl Status {
    pub fn fail(err: &BridgeError) -> Self {
        Status::Fail {
            message: err.to_string(),
        }
    }

    fn into_value(self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn reply<T: Serialize>(result: Result<T>) -> Value {
    match result.and_then(|v| Ok(serde_json::to_value(v)?)) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "command failed");
            Status::fail(&e).into_value()
        }
    }
}

impl<S: Surface, H: HostLink> Bridge<S, H> {
    /// Run one command and build the reply sent back to the host.
    pub fn execute(&mut self, command: Command) -> Value {
        debug!(command = command.name(), "executing");
        match command {
            Command::CreateWidget(spec) => match self.create(&spec) {
                Ok(()) => Status::Success.into_value(),
                Err(e) => {
                    warn!(widget = %spec.id, error = %e, "create failed");
                    Status::fail(&e).into_value()
                }
            },
            Command::DestroyWidget { id } => {
                self.destroy(&id);
                Value::Null
            }
            Command::GetAttribute { id, name } => reply(self.get_attribute(&id, &name)),
            Command::SetAttribute { id, name, value } => {
                reply(self.set_attribute(&id, &name, &value))
            }
            Command::RemoveAttribute { id, name } => reply(self.remove_attribute(&id, &name)),
            Command::AttributeExists { id, name } => reply(self.attribute_exists(&id, &name)),
            Command::SetVisible {
                id,
                parent_id,
                visible,
                index,
            } => {
                self.set_visible(&id, &parent_id, visible, index);
                Value::Null
            }
            Command::BindEvent {
                id,
                event_name,
                binding_name,
                arg_specs,
                remote_id,
            } => reply(
                self.bind(&id, &event_name, &binding_name, arg_specs, remote_id)
                    .map(|_| ()),
            ),
            Command::AddGlobalStyle { style_id, css_text } => {
                self.add_global_style(&style_id, &css_text);
                Value::Null
            }
            Command::DeleteGlobalStyle { style_id } => {
                self.delete_global_style(&style_id);
                Value::Null
            }
            Command::AddClass { id, class_name } => reply(self.add_class(&id, &class_name)),
            Command::RemoveClass { id, class_name } => reply(self.remove_class(&id, &class_name)),
            Command::UpdateStyleProperty { id, name, value } => {
                reply(self.update_style_property(&id, &name, &value))
            }
            Command::RemoveStyleProperty { id, name } => {
                reply(self.remove_style_property(&id, &name))
            }
            Command::HasStyleProperty { id, name } => reply(self.has_style_property(&id, &name)),
            Command::WidgetIds => reply(Ok(self.widget_ids())),
        }
    }

    /// Parse and run a JSON command, always producing a JSON reply.
    pub fn dispatch_json(&mut self, text: &str) -> String {
        match Command::from_json(text) {
            Ok(command) => self.execute(command).to_string(),
            Err(e) => {
                warn!(error = %e, "rejected command");
                Status::fail(&e).into_value().to_string()
            }
        }
    }
}
