//! Event bus integration tests: delivery, re-entrancy, failure isolation and
//! scopes, observed through the public API only.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use mineshaft::error::HandlerError;
use mineshaft::events::bus::{EventBus, HandlerResult};
use mineshaft::events::{
    Event, EventAction, EventCategory, GameObjectEvent, InventoryEvent, MenuEvent, SoundEvent,
    VideoEvent,
};
use mineshaft::systems::trace::EventRecorder;

type Log = Rc<RefCell<Vec<String>>>;

fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn tagging(log: &Log, tag: &'static str) -> impl FnMut(&Event) -> HandlerResult + 'static {
    let log = Rc::clone(log);
    move |event: &Event| -> HandlerResult {
        log.borrow_mut().push(format!("{}:{:?}", tag, event.action()));
        Ok(())
    }
}

#[test]
fn events_reach_only_their_category() {
    let bus = EventBus::new();
    let seen = log();
    for category in EventCategory::ALL {
        let seen = Rc::clone(&seen);
        bus.subscribe(category, move |event: &Event| -> HandlerResult {
            assert_eq!(event.category(), category);
            seen.borrow_mut().push(format!("{:?}", category));
            Ok(())
        });
    }

    bus.publish(SoundEvent::play_2d("Pickup"));
    bus.publish(MenuEvent::Pause);
    bus.publish(VideoEvent::play("intro"));
    bus.publish(InventoryEvent::Add {
        description: "Gold nugget".into(),
        value: 10,
    });

    assert_eq!(*seen.borrow(), vec!["Sound", "Menu", "Video", "Inventory"]);
}

#[test]
fn handlers_run_in_registration_order() {
    let bus = EventBus::new();
    let seen = log();
    bus.subscribe(EventCategory::Menu, tagging(&seen, "first"));
    bus.subscribe(EventCategory::Menu, tagging(&seen, "second"));
    bus.subscribe(EventCategory::Menu, tagging(&seen, "third"));

    bus.publish(MenuEvent::Play);

    assert_eq!(
        *seen.borrow(),
        vec!["first:OnPlay", "second:OnPlay", "third:OnPlay"]
    );
}

#[test]
fn nested_publish_completes_outer_delivery() {
    let bus = Rc::new(EventBus::new());
    let seen = log();

    let weak: Weak<EventBus> = Rc::downgrade(&bus);
    let inner_log = Rc::clone(&seen);
    bus.subscribe(EventCategory::Menu, move |event: &Event| -> HandlerResult {
        inner_log.borrow_mut().push(format!("a:{:?}", event.action()));
        if let Some(bus) = weak.upgrade() {
            bus.publish(SoundEvent::stop("Heartbeat"));
            // subscribing mid-dispatch must not disturb the outer event
            bus.subscribe(EventCategory::Menu, |_: &Event| -> HandlerResult { Ok(()) });
        }
        Ok(())
    });
    bus.subscribe(EventCategory::Menu, tagging(&seen, "b"));
    bus.subscribe(EventCategory::Menu, tagging(&seen, "c"));
    bus.subscribe(EventCategory::Sound, tagging(&seen, "sound"));

    bus.publish(MenuEvent::Pause);

    assert_eq!(
        *seen.borrow(),
        vec!["a:OnPause", "sound:OnStop", "b:OnPause", "c:OnPause"]
    );
    assert_eq!(bus.subscriber_count(EventCategory::Menu), 4);
    assert_eq!(bus.dispatch_depth(), 0);
}

#[test]
fn running_handler_is_skipped_for_its_own_nested_event() {
    let bus = Rc::new(EventBus::new());
    let calls = Rc::new(RefCell::new(0));
    let other = log();

    let weak = Rc::downgrade(&bus);
    let counter = Rc::clone(&calls);
    bus.subscribe(EventCategory::Menu, move |event: &Event| -> HandlerResult {
        *counter.borrow_mut() += 1;
        if matches!(event, Event::Menu(MenuEvent::Pause))
            && let Some(bus) = weak.upgrade()
        {
            bus.publish(MenuEvent::Play);
        }
        Ok(())
    });
    bus.subscribe(EventCategory::Menu, tagging(&other, "other"));

    bus.publish(MenuEvent::Pause);

    assert_eq!(*calls.borrow(), 1);
    assert_eq!(*other.borrow(), vec!["other:OnPlay", "other:OnPause"]);
}

#[test]
fn failing_and_panicking_handlers_do_not_stop_delivery() {
    let bus = EventBus::new();
    let seen = log();
    bus.subscribe(EventCategory::Video, |_: &Event| -> HandlerResult {
        Err(HandlerError::Failed("decoder missing".into()))
    });
    bus.subscribe(EventCategory::Video, |_: &Event| -> HandlerResult {
        panic!("payload had the wrong shape")
    });
    bus.subscribe(EventCategory::Video, tagging(&seen, "last"));

    bus.publish(VideoEvent::play("intro"));
    bus.publish(VideoEvent::play("intro"));

    assert_eq!(*seen.borrow(), vec!["last:OnPlay", "last:OnPlay"]);
    assert_eq!(bus.dispatch_depth(), 0);
}

#[test]
fn unsubscribe_during_dispatch_applies_to_later_events() {
    let bus = Rc::new(EventBus::new());
    let seen = log();

    let victim = bus.subscribe(EventCategory::GameObject, tagging(&seen, "victim"));
    let weak = Rc::downgrade(&bus);
    let killer = bus.subscribe(
        EventCategory::GameObject,
        move |_: &Event| -> HandlerResult {
            if let Some(bus) = weak.upgrade() {
                bus.unsubscribe(victim);
            }
            Ok(())
        },
    );

    bus.publish(GameObjectEvent::Win);
    bus.publish(GameObjectEvent::Win);

    assert_eq!(*seen.borrow(), vec!["victim:OnWin"]);
    assert!(!bus.unsubscribe(victim));
    assert!(bus.unsubscribe(killer));
    assert_eq!(bus.total_subscribers(), 0);
}

#[test]
fn closing_a_scope_removes_only_its_handlers() {
    let bus = EventBus::new();
    let seen = log();
    let scope = bus.create_scope();
    bus.subscribe_scoped(scope, EventCategory::Ui, tagging(&seen, "scoped"));
    bus.subscribe_scoped(scope, EventCategory::Menu, tagging(&seen, "scoped"));
    bus.subscribe(EventCategory::Menu, tagging(&seen, "global"));

    assert_eq!(bus.close_scope(scope), 2);
    assert_eq!(bus.close_scope(scope), 0);

    bus.publish(MenuEvent::Pause);
    assert_eq!(*seen.borrow(), vec!["global:OnPause"]);
}

#[test]
fn recorder_sees_nested_events_in_publication_order() {
    let bus = Rc::new(EventBus::new());
    let recorder = EventRecorder::attach(&bus);

    let weak = Rc::downgrade(&bus);
    bus.subscribe(
        EventCategory::GameObject,
        move |event: &Event| -> HandlerResult {
            if matches!(event, Event::GameObject(GameObjectEvent::Win))
                && let Some(bus) = weak.upgrade()
            {
                bus.publish(SoundEvent::play_2d("Victory"));
                bus.publish(MenuEvent::Pause);
            }
            Ok(())
        },
    );

    bus.publish(GameObjectEvent::Win);

    assert_eq!(
        recorder.actions(),
        vec![EventAction::OnWin, EventAction::OnPlay2D, EventAction::OnPause]
    );
    let depths: Vec<u32> = recorder.entries().iter().map(|e| e.depth).collect();
    assert_eq!(depths, vec![1, 2, 2]);
    assert_eq!(bus.published_count(), 3);
}
