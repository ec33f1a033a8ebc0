//! Renderable store and first-person camera
//!
//! Rendering is immediate-mode macroquad: entities register lightweight
//! renderable descriptions (shape + transform + color) here, and the world
//! draws them with `draw_plane`/`draw_grid`/`draw_cube` every frame. Each
//! slot is tagged with the owning entity, so removing an entity tears down
//! everything it attached in one step.
//!
//! Renderable ids are never recycled. A stale id held by a deferred task
//! simply resolves to nothing instead of aliasing a newer renderable.

use macroquad::prelude::*;

use crate::game::EntityId;

/// Handle to a renderable slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderableId(usize);

/// The primitive shapes the demo draws.
#[derive(Debug, Clone, Copy)]
pub enum Shape {
    /// Flat horizontal plane centered on its position.
    Plane { size: Vec2 },
    /// Decorative line grid. macroquad draws it through the world origin;
    /// the renderable's position is ignored for this shape.
    Grid { slices: u32, spacing: f32 },
    /// Axis-aligned box centered on its position. The yaw field picks the
    /// facing marker direction since the box itself cannot rotate.
    Cube { size: Vec3 },
}

/// One drawable thing in the scene.
#[derive(Debug, Clone, Copy)]
pub struct Renderable {
    pub shape: Shape,
    pub position: Vec3,
    pub yaw: f32,
    pub color: Color,
    pub visible: bool,
}

impl Renderable {
    pub fn new(shape: Shape, position: Vec3, color: Color) -> Self {
        Self {
            shape,
            position,
            yaw: 0.0,
            color,
            visible: true,
        }
    }
}

/// Storage for all renderables, drawn in attachment order.
pub struct RenderableStore {
    slots: Vec<Option<(EntityId, Renderable)>>,
}

impl RenderableStore {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Attach a renderable owned by `owner`. The returned id stays valid
    /// until the owner detaches it (or is removed from the world).
    pub fn attach(&mut self, owner: EntityId, renderable: Renderable) -> RenderableId {
        let id = RenderableId(self.slots.len());
        self.slots.push(Some((owner, renderable)));
        id
    }

    pub fn get(&self, id: RenderableId) -> Option<&Renderable> {
        self.slots.get(id.0).and_then(|s| s.as_ref()).map(|(_, r)| r)
    }

    pub fn get_mut(&mut self, id: RenderableId) -> Option<&mut Renderable> {
        self.slots.get_mut(id.0).and_then(|s| s.as_mut()).map(|(_, r)| r)
    }

    /// Drop every renderable attached by `owner`.
    pub fn detach_owned_by(&mut self, owner: EntityId) {
        for slot in &mut self.slots {
            if matches!(slot, Some((o, _)) if *o == owner) {
                *slot = None;
            }
        }
    }

    /// Number of live renderables.
    pub fn count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Number of live renderables attached by `owner`.
    pub fn count_owned_by(&self, owner: EntityId) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, Some((o, _)) if *o == owner))
            .count()
    }

    /// Draw every visible renderable. Must run inside a 3D camera pass.
    pub fn draw(&self) {
        for (_, renderable) in self.slots.iter().flatten() {
            if !renderable.visible {
                continue;
            }
            let pos = renderable.position;
            let color = renderable.color;
            match renderable.shape {
                Shape::Plane { size } => {
                    draw_plane(pos, size, None, color);
                }
                Shape::Grid { slices, spacing } => {
                    let faded = Color::new(color.r, color.g, color.b, color.a * 0.4);
                    draw_grid(slices, spacing, color, faded);
                }
                Shape::Cube { size } => {
                    draw_cube(pos, size, None, color);
                    // Small dark marker on the facing side; draw_cube cannot
                    // rotate, so this is how orientation reads on screen.
                    let facing = vec3(renderable.yaw.sin(), 0.0, renderable.yaw.cos());
                    let marker_pos = pos + facing * (size.z * 0.5) + vec3(0.0, size.y * 0.2, 0.0);
                    let marker = Color::new(color.r * 0.3, color.g * 0.3, color.b * 0.3, color.a);
                    draw_cube(marker_pos, vec3(0.2, 0.2, 0.2), None, marker);
                }
            }
        }
    }
}

impl Default for RenderableStore {
    fn default() -> Self {
        Self::new()
    }
}

/// First-person camera state. The player controller rewrites this every
/// frame; `to_camera3d` converts it for macroquad, which derives the aspect
/// ratio from the current screen size (that is all the resize handling the
/// demo needs).
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            position: vec3(0.0, 1.7, 0.0),
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// View direction for the current yaw/pitch.
    pub fn forward(&self) -> Vec3 {
        vec3(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.cos() * self.pitch.cos(),
        )
    }

    pub fn to_camera3d(&self) -> Camera3D {
        Camera3D {
            position: self.position,
            target: self.position + self.forward(),
            up: Vec3::Y,
            ..Default::default()
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_and_detach_by_owner() {
        let mut store = RenderableStore::new();
        let owner = EntityId::for_tests(0, 0);
        let other = EntityId::for_tests(1, 0);

        let a = store.attach(owner, Renderable::new(Shape::Cube { size: Vec3::ONE }, Vec3::ZERO, WHITE));
        store.attach(owner, Renderable::new(Shape::Grid { slices: 4, spacing: 1.0 }, Vec3::ZERO, WHITE));
        let c = store.attach(other, Renderable::new(Shape::Cube { size: Vec3::ONE }, Vec3::ZERO, WHITE));

        assert_eq!(store.count(), 3);
        assert_eq!(store.count_owned_by(owner), 2);

        store.detach_owned_by(owner);
        assert_eq!(store.count(), 1);
        assert!(store.get(a).is_none());
        assert!(store.get(c).is_some());
    }

    #[test]
    fn test_ids_not_recycled() {
        let mut store = RenderableStore::new();
        let owner = EntityId::for_tests(0, 0);

        let a = store.attach(owner, Renderable::new(Shape::Cube { size: Vec3::ONE }, Vec3::ZERO, WHITE));
        store.detach_owned_by(owner);
        let b = store.attach(owner, Renderable::new(Shape::Cube { size: Vec3::ONE }, Vec3::ZERO, WHITE));

        assert_ne!(a, b);
        assert!(store.get(a).is_none());
        assert!(store.get(b).is_some());
    }

    #[test]
    fn test_camera_forward_level() {
        let camera = Camera::new();
        let f = camera.forward();
        assert!((f - vec3(0.0, 0.0, 1.0)).length() < 1e-6);
    }
}
