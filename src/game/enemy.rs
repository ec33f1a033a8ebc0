//! Chasing enemy
//!
//! Walks toward its target on the ground plane, swings when close enough
//! and off cooldown, and wanders around its spawn point when it has no one
//! to chase. Any hit kills it: death awards points to its target and queues
//! its own removal, both deferred so the update pass stays safe.

use macroquad::prelude::*;

use crate::config::EnemyConfig;
use crate::hud::Hud;
use crate::render::{Renderable, RenderableId, Shape};

use super::entity::{CommandQueue, Entity, EntityId};
use super::player::Player;
use super::world::{TaskAction, WorldContext};

/// Points awarded to the target when this enemy dies.
pub const KILL_POINTS: u32 = 10;

const BODY_SIZE: Vec3 = Vec3::new(0.8, 1.8, 0.8);
const BODY_COLOR: Color = Color::new(0.75, 0.2, 0.2, 1.0);
const FLASH_COLOR: Color = Color::new(1.0, 0.85, 0.3, 1.0);
/// How long the body holds the attack flash before reverting.
const FLASH_SECS: f64 = 0.15;

const WANDER_RADIUS: f32 = 2.0;
const WANDER_FREQ_X: f64 = 0.7;
const WANDER_FREQ_Z: f64 = 0.9;

pub struct Enemy {
    id: EntityId,
    pub position: Vec3,
    speed: f32,
    target: EntityId,
    damage: f32,
    attack_range: f32,
    attack_cooldown: f32,
    cooldown_timer: f32,
    alive: bool,
    origin: Vec3,
    body: Option<RenderableId>,
    yaw: f32,
}

impl Enemy {
    pub fn new(config: &EnemyConfig, position: Vec3, target: EntityId) -> Self {
        Self {
            id: EntityId::NULL,
            position,
            speed: config.speed,
            target,
            damage: config.damage,
            attack_range: config.attack_range,
            attack_cooldown: config.attack_cooldown,
            // Swing immediately on first contact.
            cooldown_timer: config.attack_cooldown,
            alive: true,
            origin: position,
            body: None,
            yaw: 0.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    fn chase(&mut self, target_pos: Vec3, dt: f32, ctx: &mut WorldContext<'_>) {
        let mut to = target_pos - self.position;
        to.y = 0.0;

        if to.length() > self.attack_range {
            if let Some(dir) = to.try_normalize() {
                self.position += dir * self.speed * dt;
                self.yaw = dir.x.atan2(dir.z);
            }
        } else if to != Vec3::ZERO {
            self.yaw = to.x.atan2(to.z);
        }

        // Range check after the move, so a step into range attacks this
        // frame instead of next.
        let mut to = target_pos - self.position;
        to.y = 0.0;
        if to.length() <= self.attack_range && self.cooldown_timer >= self.attack_cooldown {
            self.attack(ctx);
        }
    }

    fn attack(&mut self, ctx: &mut WorldContext<'_>) {
        self.cooldown_timer = 0.0;
        if let Some(target) = ctx.entities.get_dyn_mut(self.target) {
            target.take_damage(self.damage, ctx.hud, ctx.commands);
        }
        if let Some(body) = self.body {
            if let Some(renderable) = ctx.renderables.get_mut(body) {
                renderable.color = FLASH_COLOR;
            }
            ctx.tasks.schedule(
                self.id,
                ctx.now + FLASH_SECS,
                TaskAction::SetRenderableColor(body, BODY_COLOR),
            );
        }
    }

    /// Idle drift around the spawn point, a closed loop driven by absolute
    /// time. No randomness; two enemies with the same origin move in step.
    fn wander(&mut self, now: f64) {
        let dx = (now * WANDER_FREQ_X).sin() as f32 * WANDER_RADIUS;
        let dz = (now * WANDER_FREQ_Z).cos() as f32 * WANDER_RADIUS;
        self.position.x = self.origin.x + dx;
        self.position.z = self.origin.z + dz;
    }
}

impl Entity for Enemy {
    fn init(&mut self, id: EntityId, ctx: &mut WorldContext<'_>) {
        self.id = id;
        let mut body = Renderable::new(Shape::Cube { size: BODY_SIZE }, self.position, BODY_COLOR);
        body.yaw = self.yaw;
        self.body = Some(ctx.renderables.attach(id, body));
    }

    fn update(&mut self, dt: f32, ctx: &mut WorldContext<'_>) {
        if !self.alive {
            return;
        }
        self.cooldown_timer += dt;

        let target_pos = ctx.entities.get::<Player>(self.target).map(|p| p.position);
        match target_pos {
            Some(pos) => self.chase(pos, dt, ctx),
            None => self.wander(ctx.now),
        }

        if let Some(body) = self.body {
            if let Some(renderable) = ctx.renderables.get_mut(body) {
                renderable.position = self.position;
                renderable.yaw = self.yaw;
            }
        }
    }

    /// Any hit is lethal. Death happens at most once: points to the target,
    /// then the enemy queues its own removal.
    fn take_damage(&mut self, _amount: f32, _hud: &mut Hud, commands: &mut CommandQueue) {
        if !self.alive {
            return;
        }
        self.alive = false;
        if !self.target.is_null() {
            commands.award_score(self.target, KILL_POINTS);
        }
        commands.remove(self.id);
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, PlayerConfig};
    use crate::game::{Command, World};
    use crate::input::Input;

    fn test_config() -> EnemyConfig {
        EnemyConfig::default()
    }

    fn world_with_player() -> (World, EntityId) {
        let mut world = World::new(Input::new());
        world.start();
        let player = world.add(Box::new(Player::new(&PlayerConfig::default(), 24.0)));
        (world, player)
    }

    #[test]
    fn test_chases_target_on_the_ground_plane() {
        let (mut world, player) = world_with_player();
        let enemy = world.add(Box::new(Enemy::new(
            &test_config(),
            vec3(0.0, 0.9, 10.0),
            player,
        )));

        let dt = 1.0 / 60.0;
        for i in 0..60 {
            world.tick(i as f64 * dt as f64, dt);
        }

        let e = world.get::<Enemy>(enemy).unwrap();
        assert!(e.position.z < 10.0, "should have closed distance");
        assert_eq!(e.position.y, 0.9, "stays on the ground plane");
        // Facing the target, which sits toward -z from the spawn.
        assert!((e.yaw - std::f32::consts::PI).abs() < 1e-3);
    }

    #[test]
    fn test_stops_at_attack_range() {
        let config = test_config();
        let (mut world, player) = world_with_player();
        let enemy = world.add(Box::new(Enemy::new(&config, vec3(0.0, 0.9, 20.0), player)));

        let dt = 1.0 / 60.0;
        for i in 0..3600 {
            world.tick(i as f64 * dt as f64, dt);
        }

        let e = world.get::<Enemy>(enemy).unwrap();
        let dist = vec3(e.position.x, 0.0, e.position.z).length();
        assert!(dist <= config.attack_range + config.speed * dt);
    }

    #[test]
    fn test_first_attack_is_immediate_then_gated_by_cooldown() {
        let config = test_config();
        let (mut world, player) = world_with_player();
        world.add(Box::new(Enemy::new(&config, vec3(0.0, 0.9, 1.0), player)));
        let start = world.get::<Player>(player).unwrap().health();

        let dt = 1.0 / 60.0;
        world.tick(0.0, dt);
        let after_one = world.get::<Player>(player).unwrap().health();
        assert_eq!(after_one, start - config.damage, "hits on first contact");

        // Well inside the cooldown window: no second hit.
        let mut now = dt as f64;
        for _ in 0..10 {
            world.tick(now, dt);
            now += dt as f64;
        }
        assert_eq!(world.get::<Player>(player).unwrap().health(), after_one);

        // Past the cooldown: exactly one more hit.
        let ticks = (config.attack_cooldown / dt).ceil() as usize + 1;
        for _ in 0..ticks {
            world.tick(now, dt);
            now += dt as f64;
        }
        assert_eq!(
            world.get::<Player>(player).unwrap().health(),
            after_one - config.damage
        );
    }

    #[test]
    fn test_no_damage_out_of_range() {
        let (mut world, player) = world_with_player();
        world.add(Box::new(Enemy::new(&test_config(), vec3(0.0, 0.9, 30.0), player)));
        let start = world.get::<Player>(player).unwrap().health();

        world.tick(0.0, 1.0 / 60.0);
        assert_eq!(world.get::<Player>(player).unwrap().health(), start);
    }

    #[test]
    fn test_death_happens_once() {
        let mut enemy = Enemy::new(&test_config(), vec3(0.0, 0.9, 5.0), EntityId::for_tests(0, 0));
        let mut hud = Hud::new();
        let mut commands = CommandQueue::new();

        enemy.take_damage(25.0, &mut hud, &mut commands);
        assert!(!enemy.is_alive());
        let drained = commands.drain();
        assert!(matches!(drained[0], Command::AwardScore(_, KILL_POINTS)));
        assert!(matches!(drained[1], Command::Remove(_)));

        // A second hit on a corpse queues nothing.
        enemy.take_damage(25.0, &mut hud, &mut commands);
        assert!(commands.is_empty());
    }

    #[test]
    fn test_untargeted_death_awards_nothing() {
        let mut enemy = Enemy::new(&test_config(), vec3(0.0, 0.9, 5.0), EntityId::NULL);
        let mut hud = Hud::new();
        let mut commands = CommandQueue::new();

        enemy.take_damage(25.0, &mut hud, &mut commands);
        let drained = commands.drain();
        assert_eq!(drained.len(), 1);
        assert!(matches!(drained[0], Command::Remove(_)));
    }

    #[test]
    fn test_dead_enemy_is_inert() {
        let config = test_config();
        let (mut world, player) = world_with_player();
        let enemy = world.add(Box::new(Enemy::new(&config, vec3(0.0, 0.9, 1.0), player)));

        world.get_mut::<Enemy>(enemy).unwrap().alive = false;
        let start = world.get::<Player>(player).unwrap().health();
        let pos = world.get::<Enemy>(enemy).unwrap().position;

        world.tick(0.0, 1.0 / 60.0);
        assert_eq!(world.get::<Player>(player).unwrap().health(), start);
        assert_eq!(world.get::<Enemy>(enemy).unwrap().position, pos);
    }

    #[test]
    fn test_wander_is_deterministic() {
        let run = || {
            let mut world = World::new(Input::new());
            world.start();
            // No player in the world: the enemy has nothing to chase.
            let enemy = world.add(Box::new(Enemy::new(
                &test_config(),
                vec3(4.0, 0.9, -3.0),
                EntityId::NULL,
            )));
            let dt = 1.0 / 60.0;
            let mut trail = Vec::new();
            for i in 0..60 {
                world.tick(i as f64 * dt as f64, dt);
                trail.push(world.get::<Enemy>(enemy).unwrap().position);
            }
            trail
        };

        let a = run();
        let b = run();
        assert_eq!(a, b);
        assert!(a.windows(2).any(|w| w[0] != w[1]), "actually moves");
        for p in &a {
            let off = vec2(p.x - 4.0, p.z + 3.0).length();
            assert!(off <= WANDER_RADIUS * 1.5, "stays near the origin");
        }
    }

    #[test]
    fn test_attack_flash_reverts_after_delay() {
        let config = test_config();
        let (mut world, player) = world_with_player();
        let enemy = world.add(Box::new(Enemy::new(&config, vec3(0.0, 0.9, 1.0), player)));
        let body = world.get::<Enemy>(enemy).unwrap().body.unwrap();

        world.tick(0.0, 1.0 / 60.0);
        assert_eq!(world.renderables().get(body).unwrap().color, FLASH_COLOR);

        world.tick(FLASH_SECS + 0.01, 1.0 / 60.0);
        assert_eq!(world.renderables().get(body).unwrap().color, BODY_COLOR);
    }

    #[test]
    fn test_flash_revert_cancelled_by_death() {
        let config = GameConfig::default();
        let (mut world, player) = world_with_player();
        let enemy = world.add(Box::new(Enemy::new(&config.enemy, vec3(0.0, 0.9, 1.0), player)));
        let body = world.get::<Enemy>(enemy).unwrap().body.unwrap();

        // Attack schedules the revert, then the enemy dies before it fires.
        world.tick(0.0, 1.0 / 60.0);
        world.remove(enemy);
        assert!(world.renderables().get(body).is_none());

        // Ticking past the due time must not touch the dead slot.
        world.tick(FLASH_SECS + 0.01, 1.0 / 60.0);
        assert!(world.renderables().get(body).is_none());
        assert_eq!(world.entity_count(), 1);
    }
}
