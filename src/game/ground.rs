//! Ground plane
//!
//! Static scenery: a flat colored plane plus a line grid on top so motion
//! reads even with nothing else in view. No update hook; it attaches its
//! renderables on init and is done.

use macroquad::prelude::*;

use crate::config::GroundConfig;
use crate::render::{Renderable, Shape};

use super::entity::{Entity, EntityId};
use super::world::WorldContext;

/// Plane sits just below the grid lines to keep them from z-fighting.
const PLANE_Y: f32 = -0.01;

const GRID_COLOR: Color = Color::new(0.45, 0.45, 0.45, 1.0);

pub struct Ground {
    size: f32,
    color: Color,
}

impl Ground {
    pub fn new(config: &GroundConfig) -> Self {
        let [r, g, b] = config.color;
        Self {
            size: config.size,
            color: Color::new(r, g, b, 1.0),
        }
    }

    pub fn size(&self) -> f32 {
        self.size
    }
}

impl Entity for Ground {
    fn init(&mut self, id: EntityId, ctx: &mut WorldContext<'_>) {
        ctx.renderables.attach(
            id,
            Renderable::new(
                Shape::Plane {
                    size: vec2(self.size * 0.5, self.size * 0.5),
                },
                vec3(0.0, PLANE_Y, 0.0),
                self.color,
            ),
        );
        ctx.renderables.attach(
            id,
            Renderable::new(
                Shape::Grid {
                    slices: self.size as u32,
                    spacing: 1.0,
                },
                Vec3::ZERO,
                GRID_COLOR,
            ),
        );
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
