use anyhow::{Context, Result};
use huf_bridge::{
    Bridge, BridgeConfig, BridgeError, MemorySurface, NativeEvent, RecordingHost, Status,
};
use serde_json::{Value, json};
use std::io::{BufRead, Write};
use tracing::{debug, info};

/// Counters reported once the input is exhausted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    pub commands: usize,
    pub failures: usize,
    pub notifications: usize,
}

/// Drives a bridge over an in-memory surface from newline-delimited JSON.
///
/// Besides the bridge commands, a line `{"command": "fire", "id": .., "event": ..}` raises a
/// native event on a registered widget; the host calls it produces are written as
/// `{"notify": ..}` lines.
pub struct Replay {
    bridge: Bridge<MemorySurface, RecordingHost>,
    stats: ReplayStats,
}

impl Replay {
    pub fn new(config: BridgeConfig) -> Self {
        let surface = MemorySurface::with_root_id(&config.root_container_id);
        Self {
            bridge: Bridge::with_config(config, surface, RecordingHost::new()),
            stats: ReplayStats::default(),
        }
    }

    pub fn stats(&self) -> ReplayStats {
        self.stats
    }

    pub fn outline(&self) -> String {
        self.bridge.surface().outline()
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<ReplayStats> {
        for (number, line) in input.lines().enumerate() {
            let line = line.with_context(|| format!("failed to read line {}", number + 1))?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            for reply in self.step(line) {
                writeln!(out, "{reply}")?;
            }
        }
        info!(
            commands = self.stats.commands,
            failures = self.stats.failures,
            notifications = self.stats.notifications,
            "replay finished"
        );
        Ok(self.stats)
    }

    /// Execute one input line, returning the lines to print.
    pub fn step(&mut self, line: &str) -> Vec<Value> {
        self.stats.commands += 1;
        let parsed: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => return vec![self.failed(&BridgeError::Json(e))],
        };

        let mut lines = if parsed["command"] == "fire" {
            vec![self.fire(&parsed)]
        } else {
            let reply: Value = match serde_json::from_value(parsed) {
                Ok(command) => self.bridge.execute(command),
                Err(e) => return vec![self.failed(&BridgeError::Json(e))],
            };
            if reply["state"] == "fail" {
                self.stats.failures += 1;
            }
            vec![reply]
        };

        for call in self.bridge.host_mut().take_calls() {
            self.stats.notifications += 1;
            lines.push(json!({ "notify": call }));
        }
        lines
    }

    fn fire(&mut self, line: &Value) -> Value {
        let (Some(id), Some(event)) = (line["id"].as_str(), line["event"].as_str()) else {
            return self.failed(&BridgeError::InvalidValue {
                name: "fire".into(),
                reason: "expected string `id` and `event`".into(),
            });
        };
        let Some(target) = self.bridge.node(id).copied() else {
            return self.failed(&BridgeError::UnknownWidget(id.to_string()));
        };

        let listeners = self.bridge.surface().dispatch(target, event);
        let native = NativeEvent::new(event, target).with_detail(line["detail"].clone());
        let fired = listeners
            .into_iter()
            .filter(|listener| self.bridge.handle_event(*listener, &native))
            .count();
        debug!(widget = %id, event, fired, "fired event");
        json!({ "fired": fired })
    }

    fn failed(&mut self, err: &BridgeError) -> Value {
        self.stats.failures += 1;
        serde_json::to_value(Status::fail(err)).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SESSION: &str = r#"
{"command": "create_widget", "tag": "div", "kind": "layout", "id": "main"}
{"command": "create_widget", "tag": "button", "kind": "widget", "id": "ok", "parentId": "main", "autoAttach": true, "attributes": {"text": "OK"}}
{"command": "bind_event", "id": "ok", "eventName": "click", "bindingName": "pressed", "argSpecs": ["text"], "remoteId": "r-1"}
{"command": "fire", "id": "ok", "event": "click"}
"#;

    fn replay() -> Replay {
        Replay::new(BridgeConfig::default())
    }

    #[test]
    fn test_session_prints_replies_and_notifications() {
        let mut replay = replay();
        let mut out = Vec::new();

        let stats = replay.run(Cursor::new(SESSION), &mut out).unwrap();

        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[0], json!({ "state": "success" }));
        assert_eq!(lines[1], json!({ "state": "success" }));
        assert_eq!(lines[2], Value::Null);
        assert_eq!(lines[3], json!({ "fired": 1 }));
        assert_eq!(lines[4]["notify"]["remoteId"], "r-1");
        assert_eq!(lines[4]["notify"]["bindingName"], "pressed");
        assert_eq!(
            stats,
            ReplayStats {
                commands: 4,
                failures: 0,
                notifications: 1
            }
        );
    }

    #[test]
    fn test_outline_shows_connected_widgets() {
        let mut replay = replay();
        replay.run(Cursor::new(SESSION), &mut Vec::new()).unwrap();

        let outline = replay.outline();
        assert!(outline.contains("div#main"));
        assert!(outline.contains("button#ok \"OK\""));
    }

    #[test]
    fn test_bad_lines_count_as_failures() {
        let mut replay = replay();

        let garbage = replay.step("not json");
        assert_eq!(garbage[0]["state"], "fail");

        let unknown = replay.step(r#"{"command": "fire", "id": "ghost", "event": "click"}"#);
        assert_eq!(unknown[0]["state"], "fail");

        let missing = replay.step(r#"{"command": "fire", "id": "ghost"}"#);
        assert_eq!(missing[0]["state"], "fail");

        assert_eq!(replay.stats().failures, 3);
    }
}
