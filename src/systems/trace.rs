//! Event trace recorder.
//!
//! [`EventRecorder`] subscribes to every category and keeps an ordered log of
//! what went over the bus, including the nesting depth each event was
//! published at. The log can be dumped as JSON lines for offline inspection.

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::{Rc, Weak};

use log::info;
use serde::Serialize;

use crate::error::EngineError;
use crate::events::bus::{EventBus, HandlerResult, SubscriptionToken};
use crate::events::{Event, EventAction, EventCategory};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceEntry {
    pub sequence: u64,
    /// 1 for events published outside any handler.
    pub depth: u32,
    pub category: EventCategory,
    pub action: EventAction,
    pub event: Event,
}

pub struct EventRecorder {
    bus: Rc<EventBus>,
    entries: Rc<RefCell<Vec<TraceEntry>>>,
    tokens: Vec<SubscriptionToken>,
}

impl EventRecorder {
    pub fn attach(bus: &Rc<EventBus>) -> Self {
        let entries: Rc<RefCell<Vec<TraceEntry>>> = Rc::new(RefCell::new(Vec::new()));
        let mut tokens = Vec::with_capacity(EventCategory::ALL.len());
        for category in EventCategory::ALL {
            let log = Rc::clone(&entries);
            let weak_bus: Weak<EventBus> = Rc::downgrade(bus);
            let token = bus.subscribe(category, move |event: &Event| -> HandlerResult {
                let depth = weak_bus.upgrade().map_or(0, |bus| bus.dispatch_depth());
                let mut log = log.borrow_mut();
                let sequence = log.len() as u64;
                log.push(TraceEntry {
                    sequence,
                    depth,
                    category: event.category(),
                    action: event.action(),
                    event: event.clone(),
                });
                Ok(())
            });
            tokens.push(token);
        }
        Self {
            bus: Rc::clone(bus),
            entries,
            tokens,
        }
    }

    pub fn entries(&self) -> Vec<TraceEntry> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn actions(&self) -> Vec<EventAction> {
        self.entries.borrow().iter().map(|e| e.action).collect()
    }

    pub fn events(&self) -> Vec<Event> {
        self.entries.borrow().iter().map(|e| e.event.clone()).collect()
    }

    pub fn to_json_lines(&self) -> Result<String, EngineError> {
        let mut out = String::new();
        for entry in self.entries.borrow().iter() {
            out.push_str(&serde_json::to_string(entry)?);
            out.push('\n');
        }
        Ok(out)
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        let path = path.as_ref();
        let text = self.to_json_lines()?;
        fs::write(path, text).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Wrote {} trace entries to {:?}", self.len(), path);
        Ok(())
    }
}

impl Drop for EventRecorder {
    fn drop(&mut self) {
        for token in &self.tokens {
            self.bus.unsubscribe(*token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{MenuEvent, SoundEvent};

    #[test]
    fn records_nested_depth() {
        let bus = Rc::new(EventBus::new());
        let recorder = EventRecorder::attach(&bus);
        let weak = Rc::downgrade(&bus);
        bus.subscribe(EventCategory::Menu, move |_: &Event| -> HandlerResult {
            if let Some(bus) = weak.upgrade() {
                bus.publish(SoundEvent::play_2d("click"));
            }
            Ok(())
        });

        bus.publish(MenuEvent::Pause);

        let entries = recorder.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, EventAction::OnPause);
        assert_eq!(entries[0].depth, 1);
        assert_eq!(entries[1].action, EventAction::OnPlay2D);
        assert_eq!(entries[1].depth, 2);
        assert_eq!(entries[1].sequence, 1);
    }

    #[test]
    fn json_lines_one_per_event() {
        let bus = Rc::new(EventBus::new());
        let recorder = EventRecorder::attach(&bus);
        bus.publish(MenuEvent::Play);
        bus.publish(SoundEvent::stop("Steps"));

        let text = recorder.to_json_lines().unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("\"OnStop\""));
    }

    #[test]
    fn drop_unsubscribes() {
        let bus = Rc::new(EventBus::new());
        let recorder = EventRecorder::attach(&bus);
        assert_eq!(bus.total_subscribers(), EventCategory::ALL.len());
        drop(recorder);
        assert_eq!(bus.total_subscribers(), 0);
    }
}
