//! Blinking UI colour, e.g. a lamp indicator.

use super::component::{Capabilities, Component, UpdateContext, component_boilerplate};
use super::renderer::Color;

/// Alternates a UI sprite between two colours every `interval_ms`.
#[derive(Debug, Clone)]
pub struct TimeColorFlipBehaviour {
    pub start: Color,
    pub end: Color,
    pub interval_ms: u64,
    elapsed_ms: u64,
    showing_end: bool,
    enabled: bool,
}

impl TimeColorFlipBehaviour {
    pub fn new(start: Color, end: Color, interval_ms: u64) -> Self {
        Self {
            start,
            end,
            interval_ms,
            elapsed_ms: 0,
            showing_end: false,
            enabled: true,
        }
    }

    pub fn current(&self) -> Color {
        if self.showing_end { self.end } else { self.start }
    }
}

impl Component for TimeColorFlipBehaviour {
    component_boilerplate!("TimeColorFlipBehaviour");

    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATABLE
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        if self.interval_ms == 0 {
            return;
        }
        self.elapsed_ms += ctx.time.delta_ms;
        while self.elapsed_ms >= self.interval_ms {
            self.elapsed_ms -= self.interval_ms;
            self.showing_end = !self.showing_end;
        }
        if let Some(sprite) = ctx.sprite.as_deref_mut() {
            sprite.color = self.current();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use crate::components::renderer::Texture;
    use crate::components::transform::Transform;
    use crate::components::uisprite::UiSprite;
    use crate::resources::arena::{ObjectId, SceneId};
    use crate::resources::input::InputState;
    use crate::resources::worldtime::WorldTime;

    fn step(flip: &mut TimeColorFlipBehaviour, sprite: &mut UiSprite, dt_ms: u64) {
        let mut transform = Transform::default();
        let input = InputState::new();
        let mut time = WorldTime::default();
        time.advance(dt_ms);
        let mut ctx = UpdateContext {
            owner: ObjectId::new(SceneId(0), 0, 0),
            transform: &mut transform,
            sprite: Some(sprite),
            input: &input,
            time: &time,
        };
        flip.update(&mut ctx);
    }

    #[test]
    fn colour_flips_after_each_interval() {
        let texture = Rc::new(Texture {
            name: "lamp".into(),
            width: 8,
            height: 8,
        });
        let mut sprite = UiSprite::new(texture, [0.0, 0.0]);
        let mut flip = TimeColorFlipBehaviour::new(Color::RED, Color::YELLOW, 500);

        step(&mut flip, &mut sprite, 300);
        assert_eq!(sprite.color, Color::RED);
        step(&mut flip, &mut sprite, 300);
        assert_eq!(sprite.color, Color::YELLOW);
        step(&mut flip, &mut sprite, 500);
        assert_eq!(sprite.color, Color::RED);
        // a long frame crossing two intervals lands back on the same colour
        step(&mut flip, &mut sprite, 1000);
        assert_eq!(flip.current(), Color::RED);
    }

    #[test]
    fn zero_interval_never_flips() {
        let texture = Rc::new(Texture {
            name: "lamp".into(),
            width: 8,
            height: 8,
        });
        let mut sprite = UiSprite::new(texture, [0.0, 0.0]).with_color(Color::BLACK);
        let mut flip = TimeColorFlipBehaviour::new(Color::RED, Color::YELLOW, 0);
        step(&mut flip, &mut sprite, 5000);
        assert_eq!(sprite.color, Color::BLACK);
    }
}
