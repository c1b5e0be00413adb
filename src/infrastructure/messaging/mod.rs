// Messaging Infrastructure
//
// This module provides implementations for event-driven communication
// including the in-memory event bus and persistent event bus.

pub mod named_event_bus;
pub mod catalog;
pub mod hooks;
pub mod webhooks;

pub use named_event_bus::NamedEventBus;
pub use catalog::{EventCatalog, EventName};
pub use hooks::ScriptHookEngine;
pub use webhooks::WebhookDispatcher;
