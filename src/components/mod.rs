//! Game objects and the components they are composed of.
//!
//! Submodules overview:
//! - [`component`] – the [`Component`](component::Component) trait, capabilities and hook contexts
//! - [`gameobject`] – named, typed container of components plus a transform
//! - [`transform`] – position/rotation/scale of an object
//! - [`collider`] – collision primitives and the three-state collider
//! - [`response`] – gameplay responses run by solid colliders on contact
//! - [`pickup`] – metadata of collectable objects
//! - [`health`] – health meter UI controller with decay and lose detection
//! - [`controller`] – keyboard-driven first person movement
//! - [`curve`] – keyframed curves and the controller following them
//! - [`colorflip`] – timed colour toggling for UI sprites
//! - [`renderer`] – shared mesh/material/texture handles and the mesh renderer
//! - [`uisprite`] – screen-space textured rectangle of UI objects

pub mod collider;
pub mod colorflip;
pub mod component;
pub mod controller;
pub mod curve;
pub mod gameobject;
pub mod health;
pub mod pickup;
pub mod renderer;
pub mod response;
pub mod transform;
pub mod uisprite;
