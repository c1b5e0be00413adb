//! Closed event catalog: maps each emittable event name to its
//! payload-key list, so `NamedEventBus::emit` can reject unknown event
//! names and so hook/webhook registration can validate bindings.

use std::collections::HashMap;

pub type EventName = &'static str;

pub struct EventCatalog {
    payload_keys: HashMap<EventName, &'static [&'static str]>,
}

impl EventCatalog {
    pub fn known() -> Self {
        let mut payload_keys = HashMap::new();
        payload_keys.insert("wanted_item_created", &["wanted_item_id", "video_path", "language"][..]);
        payload_keys.insert("wanted_item_fulfilled", &["wanted_item_id", "output_path"][..]);
        payload_keys.insert("wanted_item_not_found", &["wanted_item_id", "reason"][..]);
        payload_keys.insert("job_started", &["job_id", "kind"][..]);
        payload_keys.insert("job_progress", &["job_id", "percent", "message"][..]);
        payload_keys.insert("job_completed", &["job_id"][..]);
        payload_keys.insert("job_failed", &["job_id", "error"][..]);
        payload_keys.insert("media_server_refreshed", &["server_name", "file_path"][..]);
        payload_keys.insert("upgrade_complete", &["wanted_item_id", "output_path"][..]);
        payload_keys.insert("config_updated", &["key"][..]);
        payload_keys.insert("provider_circuit_opened", &["provider_name"][..]);
        payload_keys.insert("hook_executed", &["hook_name", "event_name", "exit_code", "duration_ms"][..]);
        Self { payload_keys }
    }

    pub fn is_known(&self, event_name: &str) -> bool {
        self.payload_keys.contains_key(event_name)
    }

    pub fn payload_keys(&self, event_name: &str) -> Option<&'static [&'static str]> {
        self.payload_keys.get(event_name).copied()
    }

    /// Events eligible to trigger hooks/webhooks -- excludes `hook_executed`
    /// itself so the hook engine can never retrigger on its own output.
    pub fn hookable_events(&self) -> Vec<EventName> {
        self.payload_keys.keys().copied().filter(|name| *name != "hook_executed").collect()
    }
}

impl Default for EventCatalog {
    fn default() -> Self {
        Self::known()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_executed_is_excluded_from_hookable_events() {
        let catalog = EventCatalog::known();
        assert!(!catalog.hookable_events().contains(&"hook_executed"));
        assert!(catalog.is_known("hook_executed"));
    }

    #[test]
    fn unknown_event_name_is_rejected() {
        let catalog = EventCatalog::known();
        assert!(!catalog.is_known("not_a_real_event"));
    }
}
