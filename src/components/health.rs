//! Health meter UI controller.
//!
//! The meter loses one point every decay interval and listens for
//! `Ui::HealthDelta` events addressed to its owner. When it reaches zero it
//! publishes `GameObject::Lose` once; later frames at zero stay silent.
//! The owner's UI sprite is cropped to the remaining fraction of health.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info};

use super::component::{
    AttachContext, Capabilities, Component, UpdateContext, component_boilerplate,
};
use crate::error::HandlerError;
use crate::events::bus::{EventBus, HandlerResult, SubscriptionToken};
use crate::events::{Event, EventCategory, GameObjectEvent, UiEvent};
use crate::resources::arena::ObjectId;

pub const DEFAULT_DECAY_INTERVAL_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthMeter {
    pub current: i32,
    pub max: i32,
    pub elapsed_ms: u64,
    pub lose_raised: bool,
}

impl HealthMeter {
    fn new(start: i32, max: i32) -> Self {
        let max = max.max(0);
        Self {
            current: start.clamp(0, max),
            max,
            elapsed_ms: 0,
            lose_raised: false,
        }
    }

    pub fn apply_delta(&mut self, delta: i32) {
        self.current = self.current.saturating_add(delta).clamp(0, self.max);
    }

    pub fn ratio(&self) -> f32 {
        if self.max == 0 {
            0.0
        } else {
            self.current as f32 / self.max as f32
        }
    }
}

pub struct UiHealthController {
    bus: Rc<EventBus>,
    meter: Rc<RefCell<HealthMeter>>,
    decay_interval_ms: u64,
    owner: Option<ObjectId>,
    subscription: Option<SubscriptionToken>,
    enabled: bool,
}

impl Clone for UiHealthController {
    /// Clones get their own meter and are not subscribed until attached.
    fn clone(&self) -> Self {
        Self {
            bus: Rc::clone(&self.bus),
            meter: Rc::new(RefCell::new(*self.meter.borrow())),
            decay_interval_ms: self.decay_interval_ms,
            owner: None,
            subscription: None,
            enabled: self.enabled,
        }
    }
}

impl UiHealthController {
    pub fn new(bus: Rc<EventBus>, start: i32, max: i32) -> Self {
        Self {
            bus,
            meter: Rc::new(RefCell::new(HealthMeter::new(start, max))),
            decay_interval_ms: DEFAULT_DECAY_INTERVAL_MS,
            owner: None,
            subscription: None,
            enabled: true,
        }
    }

    /// Interval between automatic decrements; 0 turns decay off.
    pub fn with_decay_interval(mut self, interval_ms: u64) -> Self {
        self.decay_interval_ms = interval_ms;
        self
    }

    pub fn current(&self) -> i32 {
        self.meter.borrow().current
    }

    pub fn max(&self) -> i32 {
        self.meter.borrow().max
    }

    pub fn meter(&self) -> HealthMeter {
        *self.meter.borrow()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }
}

fn delta_handler(
    owner: ObjectId,
    meter: Rc<RefCell<HealthMeter>>,
) -> impl FnMut(&Event) -> HandlerResult {
    move |event: &Event| -> HandlerResult {
        match event {
            Event::Ui(UiEvent::HealthDelta { target, delta }) => {
                if *target != owner {
                    return Ok(());
                }
                let mut meter = meter
                    .try_borrow_mut()
                    .map_err(|_| HandlerError::Failed("health meter is busy".into()))?;
                meter.apply_delta(*delta);
                debug!("Health of {} changed by {} to {}", owner, delta, meter.current);
                Ok(())
            }
            Event::Ui(_) => Ok(()),
            other => Err(other.unexpected()),
        }
    }
}

impl Component for UiHealthController {
    component_boilerplate!("UiHealthController");

    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATABLE
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn on_attach(&mut self, ctx: &AttachContext) {
        if let Some(token) = self.subscription.take() {
            self.bus.unsubscribe(token);
        }
        self.owner = Some(ctx.owner);
        let handler = delta_handler(ctx.owner, Rc::clone(&self.meter));
        self.subscription = Some(
            self.bus
                .subscribe_scoped(ctx.scope, EventCategory::Ui, handler),
        );
    }

    fn on_detach(&mut self) {
        if let Some(token) = self.subscription.take() {
            self.bus.unsubscribe(token);
        }
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let lost = {
            let Ok(mut meter) = self.meter.try_borrow_mut() else {
                return;
            };
            meter.elapsed_ms += ctx.time.delta_ms;
            if self.decay_interval_ms > 0 {
                while meter.elapsed_ms >= self.decay_interval_ms {
                    meter.elapsed_ms -= self.decay_interval_ms;
                    meter.current = (meter.current - 1).max(0);
                }
            }
            if let Some(sprite) = ctx.sprite.as_deref_mut() {
                sprite.set_visible_ratio(meter.ratio());
            }
            let lost = meter.current <= 0 && !meter.lose_raised;
            if lost {
                meter.lose_raised = true;
            }
            lost
        };
        if lost {
            info!("Health of {} depleted", ctx.owner);
            self.bus.publish(GameObjectEvent::Lose { source: ctx.owner });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_and_delta_clamp_to_range() {
        let bus = Rc::new(EventBus::new());
        let controller = UiHealthController::new(Rc::clone(&bus), 150, 100);
        assert_eq!(controller.current(), 100);

        let mut meter = controller.meter();
        meter.apply_delta(-250);
        assert_eq!(meter.current, 0);
        meter.apply_delta(i32::MAX);
        assert_eq!(meter.current, 100);
    }

    #[test]
    fn clone_owns_a_separate_meter() {
        let bus = Rc::new(EventBus::new());
        let controller = UiHealthController::new(bus, 40, 100);
        let copy = controller.clone();
        copy.meter.borrow_mut().apply_delta(10);
        assert_eq!(controller.current(), 40);
        assert_eq!(copy.current(), 50);
    }
}
