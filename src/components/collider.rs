//! Collision component.
//!
//! A [`Collider`] wraps one or more collision primitives and a set of
//! material properties. It moves through three states:
//!
//! | state            | detected by others | runs its own response |
//! |------------------|--------------------|-----------------------|
//! | `Disabled`       | no                 | no                    |
//! | `PassiveSensor`  | yes                | no                    |
//! | `PhysicalSolid`  | yes                | yes                   |
//!
//! [`Collider::enable`] arms the collider (`is_solid` picks the mode) and sets
//! its collision group. Colliders sharing a non-zero group never touch.
//!
//! On contact a solid collider first runs its [`ContactResponse`] (if any),
//! then the default physical resolution, whatever the response did.

use std::rc::Rc;

use bevy_math::Vec3;
use log::trace;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::component::{Capabilities, Component, ContactContext, component_boilerplate};
use super::response::ContactResponse;
use super::transform::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperties {
    pub restitution: f32,
    pub static_friction: f32,
    pub dynamic_friction: f32,
}

impl Default for MaterialProperties {
    fn default() -> Self {
        Self {
            restitution: 0.0,
            static_friction: 0.5,
            dynamic_friction: 0.5,
        }
    }
}

/// Shape in the owner's local space.
#[derive(Debug, Clone, PartialEq)]
pub enum ColliderPrimitive {
    /// Half space below `normal · p = offset`, in world space.
    Plane { normal: Vec3, offset: f32 },
    Box { center: Vec3, half_extents: Vec3 },
    /// Vertical capsule: `length` is the distance between the cap centres.
    Capsule { center: Vec3, radius: f32, length: f32 },
    TriangleMesh { triangles: Rc<[[Vec3; 3]]> },
}

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.cmplt(other.max).all() && self.max.cmpgt(other.min).all()
    }
}

impl ColliderPrimitive {
    /// World-space bounds; `None` for planes, which are unbounded.
    pub fn world_aabb(&self, transform: &Transform) -> Option<Aabb> {
        let rotation = bevy_math::Mat3::from_quat(transform.rotation);
        let abs_rotation = bevy_math::Mat3::from_cols(
            rotation.x_axis.abs(),
            rotation.y_axis.abs(),
            rotation.z_axis.abs(),
        );
        match self {
            ColliderPrimitive::Plane { .. } => None,
            ColliderPrimitive::Box {
                center,
                half_extents,
            } => Some(Aabb::from_center_half_extents(
                transform.transform_point(*center),
                abs_rotation * (*half_extents * transform.scale.abs()),
            )),
            ColliderPrimitive::Capsule {
                center,
                radius,
                length,
            } => {
                let half = Vec3::new(*radius, length * 0.5 + radius, *radius);
                Some(Aabb::from_center_half_extents(
                    transform.transform_point(*center),
                    abs_rotation * (half * transform.scale.abs()),
                ))
            }
            ColliderPrimitive::TriangleMesh { triangles } => Aabb::from_points(
                triangles
                    .iter()
                    .flat_map(|tri| tri.iter())
                    .map(|v| transform.transform_point(*v)),
            ),
        }
    }
}

/// Colliders sharing a non-zero group ignore each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CollisionGroup(pub u32);

impl CollisionGroup {
    pub const NONE: CollisionGroup = CollisionGroup(0);

    pub fn ignores(self, other: CollisionGroup) -> bool {
        self.0 != 0 && self.0 == other.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ColliderState {
    #[default]
    Disabled,
    PassiveSensor,
    PhysicalSolid,
}

#[derive(Clone)]
pub struct Collider {
    primitives: SmallVec<[ColliderPrimitive; 2]>,
    pub material: MaterialProperties,
    state: ColliderState,
    /// Mode restored by `set_enabled(true)`.
    armed: ColliderState,
    group: CollisionGroup,
    immovable: bool,
    responder: Option<Box<dyn ContactResponse>>,
    resolved_contacts: u32,
}

impl std::fmt::Debug for Collider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collider")
            .field("primitives", &self.primitives)
            .field("state", &self.state)
            .field("group", &self.group)
            .field("immovable", &self.immovable)
            .field("responder", &self.responder.as_ref().map(|r| r.kind()))
            .finish()
    }
}

impl Default for Collider {
    fn default() -> Self {
        Self::new()
    }
}

impl Collider {
    /// A disabled collider without primitives.
    pub fn new() -> Self {
        Self {
            primitives: SmallVec::new(),
            material: MaterialProperties::default(),
            state: ColliderState::Disabled,
            armed: ColliderState::PhysicalSolid,
            group: CollisionGroup::NONE,
            immovable: false,
            responder: None,
            resolved_contacts: 0,
        }
    }

    pub fn with_primitive(mut self, primitive: ColliderPrimitive) -> Self {
        self.primitives.push(primitive);
        self
    }

    pub fn with_material(mut self, material: MaterialProperties) -> Self {
        self.material = material;
        self
    }

    pub fn with_response(mut self, response: impl ContactResponse + 'static) -> Self {
        self.responder = Some(Box::new(response));
        self
    }

    /// Never moved by the default response (ground, walls).
    pub fn immovable(mut self) -> Self {
        self.immovable = true;
        self
    }

    /// Arm the collider as a solid body or a passive sensor in `group`.
    pub fn enable(&mut self, is_solid: bool, group: CollisionGroup) {
        let state = if is_solid {
            ColliderState::PhysicalSolid
        } else {
            ColliderState::PassiveSensor
        };
        self.state = state;
        self.armed = state;
        self.group = group;
    }

    pub fn enabled(mut self, is_solid: bool, group: CollisionGroup) -> Self {
        self.enable(is_solid, group);
        self
    }

    pub fn disable(&mut self) {
        self.state = ColliderState::Disabled;
    }

    pub fn state(&self) -> ColliderState {
        self.state
    }

    pub fn group(&self) -> CollisionGroup {
        self.group
    }

    pub fn is_solid(&self) -> bool {
        self.state == ColliderState::PhysicalSolid
    }

    pub fn is_immovable(&self) -> bool {
        self.immovable
    }

    pub fn primitives(&self) -> &[ColliderPrimitive] {
        &self.primitives
    }

    pub fn responder(&self) -> Option<&dyn ContactResponse> {
        self.responder.as_deref()
    }

    /// Contacts that reached the default physical response.
    pub fn resolved_contacts(&self) -> u32 {
        self.resolved_contacts
    }

    fn resolve(&mut self, ctx: &mut ContactContext<'_>) {
        self.resolved_contacts += 1;
        if self.immovable {
            return;
        }
        let Some(other) = ctx.other.get_component::<Collider>() else {
            return;
        };
        if !other.is_solid() {
            return;
        }
        // two movable solids share the separation
        let share = if other.immovable { 1.0 } else { 0.5 };
        ctx.transform.translate(ctx.normal * ctx.depth * share);
        trace!(
            "Separated {} from {} by {:.3}",
            ctx.owner,
            ctx.other_id,
            ctx.depth * share
        );
    }
}

impl Component for Collider {
    component_boilerplate!("Collider");

    fn capabilities(&self) -> Capabilities {
        Capabilities::COLLISION_RESPONDING
    }

    fn is_enabled(&self) -> bool {
        self.state != ColliderState::Disabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.state = if enabled {
            self.armed
        } else {
            ColliderState::Disabled
        };
    }

    fn on_contact(&mut self, ctx: &mut ContactContext<'_>) {
        if self.state != ColliderState::PhysicalSolid {
            return;
        }
        if let Some(responder) = self.responder.as_mut() {
            responder.respond(ctx);
        }
        self.resolve(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enable_picks_mode_and_set_enabled_restores_it() {
        let mut collider = Collider::new();
        assert_eq!(collider.state(), ColliderState::Disabled);

        collider.enable(false, CollisionGroup(10));
        assert_eq!(collider.state(), ColliderState::PassiveSensor);
        assert!(collider.is_enabled());

        collider.set_enabled(false);
        assert_eq!(collider.state(), ColliderState::Disabled);
        collider.set_enabled(true);
        assert_eq!(collider.state(), ColliderState::PassiveSensor);

        collider.enable(true, CollisionGroup(2));
        assert!(collider.is_solid());
        assert_eq!(collider.group(), CollisionGroup(2));
    }

    #[test]
    fn groups_only_filter_when_non_zero() {
        assert!(CollisionGroup(3).ignores(CollisionGroup(3)));
        assert!(!CollisionGroup(3).ignores(CollisionGroup(4)));
        assert!(!CollisionGroup::NONE.ignores(CollisionGroup::NONE));
    }

    #[test]
    fn rotated_box_bounds_grow() {
        let primitive = ColliderPrimitive::Box {
            center: Vec3::ZERO,
            half_extents: Vec3::new(2.0, 1.0, 1.0),
        };
        let transform = Transform::default().with_rotation_degrees(Vec3::new(0.0, 90.0, 0.0));
        let aabb = primitive.world_aabb(&transform).unwrap();
        assert!((aabb.half_extents() - Vec3::new(1.0, 1.0, 2.0)).length() < 1e-4);
    }

    #[test]
    fn triangle_mesh_bounds_cover_vertices() {
        let triangles: Rc<[[Vec3; 3]]> = Rc::from(vec![[
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(1.0, 2.0, 0.0),
            Vec3::new(0.0, 0.0, 3.0),
        ]]);
        let primitive = ColliderPrimitive::TriangleMesh { triangles };
        let aabb = primitive
            .world_aabb(&Transform::from_translation(Vec3::X))
            .unwrap();
        assert_eq!(aabb.min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(2.0, 2.0, 3.0));
    }
}
