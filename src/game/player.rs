//! First-person player controller
//!
//! Owns position, vertical velocity, view angles, health, and score, and
//! rewrites the camera every frame. Per tick, strictly in order: mouse look,
//! horizontal movement, jump, gravity, ground clamp, camera write, boundary
//! clamp. Firing happens after the camera write so the shot uses the view
//! the player sees this frame.

use std::f32::consts::FRAC_PI_2;

use macroquad::prelude::*;

use crate::config::PlayerConfig;
use crate::hud::Hud;
use crate::input::Input;

use super::enemy::Enemy;
use super::entity::{CommandQueue, Entity, EntityId};
use super::world::WorldContext;

const GRAVITY: f32 = 24.0;
/// Feet rest at this height above the plane.
const GROUND_HEIGHT: f32 = 1.0;
/// Eye offset above the position.
const CAMERA_OFFSET: Vec3 = Vec3::new(0.0, 0.7, 0.0);
/// Just shy of straight up/down, keeping the view basis well formed.
const MAX_PITCH: f32 = FRAC_PI_2 - 0.01;

const FIRE_RANGE: f32 = 40.0;
const FIRE_RADIUS: f32 = 1.0;
const FIRE_DAMAGE: f32 = 25.0;

pub struct Player {
    id: EntityId,
    pub position: Vec3,
    velocity_y: f32,
    pub yaw: f32,
    pub pitch: f32,
    health: f32,
    score: u32,
    speed: f32,
    jump_force: f32,
    mouse_sensitivity: f32,
    grounded: bool,
    /// Half-extent of the playable area on x and z.
    bound: f32,
}

impl Player {
    pub fn new(config: &PlayerConfig, bound: f32) -> Self {
        Self {
            id: EntityId::NULL,
            position: vec3(0.0, GROUND_HEIGHT, 0.0),
            velocity_y: 0.0,
            yaw: 0.0,
            pitch: 0.0,
            health: config.health,
            score: 0,
            speed: config.speed,
            jump_force: config.jump_force,
            mouse_sensitivity: config.mouse_sensitivity,
            grounded: true,
            bound,
        }
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Desired horizontal direction in world space for the currently held
    /// keys. Always zero or unit length, so diagonals are no faster.
    fn movement_direction(&self, input: &Input) -> Vec3 {
        let mut local = Vec3::ZERO;
        if input.is_key_down(KeyCode::W) {
            local.z += 1.0;
        }
        if input.is_key_down(KeyCode::S) {
            local.z -= 1.0;
        }
        if input.is_key_down(KeyCode::D) {
            local.x += 1.0;
        }
        if input.is_key_down(KeyCode::A) {
            local.x -= 1.0;
        }
        if local == Vec3::ZERO {
            return Vec3::ZERO;
        }
        let local = local.normalize();

        let forward = vec3(self.yaw.sin(), 0.0, self.yaw.cos());
        let right = vec3(self.yaw.cos(), 0.0, -self.yaw.sin());
        forward * local.z + right * local.x
    }

    fn step(&mut self, dt: f32, input: &mut Input) {
        if input.pointer_locked() {
            let delta = input.consume_mouse_delta();
            self.yaw += delta.x * self.mouse_sensitivity;
            self.pitch = (self.pitch - delta.y * self.mouse_sensitivity).clamp(-MAX_PITCH, MAX_PITCH);
        }

        let dir = self.movement_direction(input);
        self.position += dir * self.speed * dt;

        if input.is_key_down(KeyCode::Space) && self.grounded {
            self.velocity_y = self.jump_force;
            self.grounded = false;
        }

        self.velocity_y -= GRAVITY * dt;
        self.position.y += self.velocity_y * dt;

        if self.position.y <= GROUND_HEIGHT {
            self.position.y = GROUND_HEIGHT;
            self.velocity_y = 0.0;
            self.grounded = true;
        }

        self.position.x = self.position.x.clamp(-self.bound, self.bound);
        self.position.z = self.position.z.clamp(-self.bound, self.bound);
    }

    /// Hitscan shot along the view direction. Hits the nearest live enemy
    /// whose center lies within `FIRE_RADIUS` of the ray, out to
    /// `FIRE_RANGE`.
    fn fire(&mut self, ctx: &mut WorldContext<'_>) {
        let eye = self.position + CAMERA_OFFSET;
        let dir = ctx.camera.forward();

        let mut best: Option<(EntityId, f32)> = None;
        for id in ctx.entities.ids() {
            let Some(enemy) = ctx.entities.get::<Enemy>(id) else {
                continue;
            };
            if !enemy.is_alive() {
                continue;
            }
            let to = enemy.position - eye;
            let along = to.dot(dir);
            if along <= 0.0 || along > FIRE_RANGE {
                continue;
            }
            let offset = (to - dir * along).length();
            if offset > FIRE_RADIUS {
                continue;
            }
            if best.map_or(true, |(_, d)| along < d) {
                best = Some((id, along));
            }
        }

        if let Some((id, _)) = best {
            if let Some(target) = ctx.entities.get_dyn_mut(id) {
                target.take_damage(FIRE_DAMAGE, ctx.hud, ctx.commands);
            }
        }
    }
}

impl Entity for Player {
    fn init(&mut self, id: EntityId, ctx: &mut WorldContext<'_>) {
        self.id = id;
        ctx.hud.set_health(self.health);
        ctx.hud.set_score(self.score);
    }

    fn update(&mut self, dt: f32, ctx: &mut WorldContext<'_>) {
        self.step(dt, ctx.input);

        ctx.camera.position = self.position + CAMERA_OFFSET;
        ctx.camera.yaw = self.yaw;
        ctx.camera.pitch = self.pitch;

        if ctx.input.attack_pressed() {
            self.fire(ctx);
        }
    }

    /// Reduce health, floored at zero. Death is announced once but does not
    /// end the run; enemies keep swinging at a downed player for nothing.
    fn take_damage(&mut self, amount: f32, hud: &mut Hud, _commands: &mut CommandQueue) {
        let was_alive = self.health > 0.0;
        self.health = (self.health - amount).max(0.0);
        hud.set_health(self.health);
        if was_alive && self.health <= 0.0 {
            println!("player down");
        }
    }

    fn add_score(&mut self, points: u32, hud: &mut Hud) {
        self.score += points;
        hud.set_score(self.score);
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
