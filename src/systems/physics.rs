//! Contact detection and dispatch.
//!
//! A frame handles collisions in two phases. First a [`ContactSource`] looks
//! at the whole active scene and returns every contact it finds, without
//! touching any object. Then [`dispatch_contacts`] hands each contact to both
//! objects' collision-responding components, one pair at a time. Events raised
//! by responses therefore never interleave with detection.
//!
//! [`AabbContactDetector`] is the built-in source. It approximates boxes,
//! capsules and triangle meshes by world-space AABBs and treats planes as
//! half spaces. Only the deepest contact of each object pair is reported.

use bevy_math::Vec3;
use log::trace;
use smallvec::SmallVec;

use crate::components::collider::{
    Aabb, Collider, ColliderPrimitive, ColliderState, CollisionGroup,
};
use crate::resources::arena::ObjectId;
use crate::systems::scene::{CommandQueue, Scene};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub a: ObjectId,
    pub b: ObjectId,
    /// Pushes `a` out of `b`.
    pub normal: Vec3,
    pub depth: f32,
}

/// Physics collaborator: finds contacts in a scene.
pub trait ContactSource {
    fn detect(&mut self, scene: &Scene) -> Vec<Contact>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Shape {
    Bounds(Aabb),
    HalfSpace { normal: Vec3, offset: f32 },
}

struct Body {
    id: ObjectId,
    solid: bool,
    group: CollisionGroup,
    shapes: SmallVec<[Shape; 2]>,
}

#[derive(Debug, Default)]
pub struct AabbContactDetector {
    /// Pairs tested during the last `detect` call.
    pub pairs_tested: usize,
}

impl AabbContactDetector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContactSource for AabbContactDetector {
    fn detect(&mut self, scene: &Scene) -> Vec<Contact> {
        let bodies: Vec<Body> = scene
            .iter()
            .filter(|(_, object)| object.is_enabled())
            .filter_map(|(id, object)| {
                let collider = object.get_component::<Collider>()?;
                if collider.state() == ColliderState::Disabled {
                    return None;
                }
                let shapes = collider
                    .primitives()
                    .iter()
                    .filter_map(|primitive| match primitive {
                        ColliderPrimitive::Plane { normal, offset } => Some(Shape::HalfSpace {
                            normal: normal.normalize_or_zero(),
                            offset: *offset,
                        }),
                        other => other.world_aabb(&object.transform).map(Shape::Bounds),
                    })
                    .collect();
                Some(Body {
                    id,
                    solid: collider.is_solid(),
                    group: collider.group(),
                    shapes,
                })
            })
            .collect();

        self.pairs_tested = 0;
        let mut contacts = Vec::new();
        for (i, a) in bodies.iter().enumerate() {
            for b in &bodies[i + 1..] {
                if !a.solid && !b.solid {
                    continue;
                }
                if a.group.ignores(b.group) {
                    continue;
                }
                self.pairs_tested += 1;
                let deepest = a
                    .shapes
                    .iter()
                    .flat_map(|sa| b.shapes.iter().filter_map(move |sb| shape_contact(sa, sb)))
                    .max_by(|x, y| x.1.total_cmp(&y.1));
                if let Some((normal, depth)) = deepest {
                    trace!("Contact {} <-> {} depth {:.3}", a.id, b.id, depth);
                    contacts.push(Contact {
                        a: a.id,
                        b: b.id,
                        normal,
                        depth,
                    });
                }
            }
        }
        contacts
    }
}

/// Penetration of `a` into `b` as (normal pushing `a` out, depth).
fn shape_contact(a: &Shape, b: &Shape) -> Option<(Vec3, f32)> {
    match (a, b) {
        (Shape::Bounds(a), Shape::Bounds(b)) => aabb_contact(a, b),
        (Shape::Bounds(a), Shape::HalfSpace { normal, offset }) => {
            half_space_contact(a, *normal, *offset)
        }
        (Shape::HalfSpace { normal, offset }, Shape::Bounds(b)) => {
            half_space_contact(b, *normal, *offset).map(|(n, depth)| (-n, depth))
        }
        (Shape::HalfSpace { .. }, Shape::HalfSpace { .. }) => None,
    }
}

fn aabb_contact(a: &Aabb, b: &Aabb) -> Option<(Vec3, f32)> {
    if !a.overlaps(b) {
        return None;
    }
    let overlap = a.max.min(b.max) - a.min.max(b.min);
    let delta = a.center() - b.center();
    let axes = [
        (overlap.x, Vec3::X * delta.x.signum()),
        (overlap.y, Vec3::Y * delta.y.signum()),
        (overlap.z, Vec3::Z * delta.z.signum()),
    ];
    axes.into_iter()
        .min_by(|x, y| x.0.total_cmp(&y.0))
        .map(|(depth, normal)| (normal, depth))
}

fn half_space_contact(bounds: &Aabb, normal: Vec3, offset: f32) -> Option<(Vec3, f32)> {
    let radius = normal.abs().dot(bounds.half_extents());
    let distance = normal.dot(bounds.center()) - offset - radius;
    (distance < 0.0).then_some((normal, -distance))
}

/// Deliver `contacts` to both objects of each pair. Returns how many
/// contacts were delivered.
///
/// Objects already queued for removal are skipped, so an object collected
/// earlier in the frame cannot be collected twice.
pub fn dispatch_contacts(scene: &mut Scene, contacts: &[Contact], queue: &CommandQueue) -> usize {
    let mut delivered = 0;
    for contact in contacts {
        if queue.is_pending_removal(contact.a) || queue.is_pending_removal(contact.b) {
            continue;
        }
        if let Some((a, b)) = scene.pair_mut(contact.a, contact.b) {
            a.respond_to_contact(contact.a, contact.b, b, contact.normal, contact.depth);
        }
        if queue.is_pending_removal(contact.a) || queue.is_pending_removal(contact.b) {
            delivered += 1;
            continue;
        }
        if let Some((b, a)) = scene.pair_mut(contact.b, contact.a) {
            b.respond_to_contact(contact.b, contact.a, a, -contact.normal, contact.depth);
        }
        delivered += 1;
    }
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_contact_picks_shallowest_axis() {
        let a = Aabb::from_center_half_extents(Vec3::new(0.0, 0.9, 0.0), Vec3::splat(0.5));
        let b = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::new(5.0, 0.5, 5.0));
        let (normal, depth) = aabb_contact(&a, &b).unwrap();
        assert_eq!(normal, Vec3::Y);
        assert!((depth - 0.1).abs() < 1e-5);
    }

    #[test]
    fn half_space_pushes_along_normal() {
        let bounds = Aabb::from_center_half_extents(Vec3::new(0.0, 0.25, 0.0), Vec3::splat(0.5));
        let (normal, depth) = half_space_contact(&bounds, Vec3::Y, 0.0).unwrap();
        assert_eq!(normal, Vec3::Y);
        assert!((depth - 0.25).abs() < 1e-5);

        let above = Aabb::from_center_half_extents(Vec3::new(0.0, 2.0, 0.0), Vec3::splat(0.5));
        assert!(half_space_contact(&above, Vec3::Y, 0.0).is_none());
    }

    #[test]
    fn reversed_shapes_flip_the_normal() {
        let bounds = Shape::Bounds(Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(1.0)));
        let plane = Shape::HalfSpace {
            normal: Vec3::Y,
            offset: 0.5,
        };
        let (n1, d1) = shape_contact(&bounds, &plane).unwrap();
        let (n2, d2) = shape_contact(&plane, &bounds).unwrap();
        assert_eq!(n1, -n2);
        assert_eq!(d1, d2);
    }
}
