//! World driver
//!
//! Owns the entity collection, the renderables, the camera, the HUD, and
//! the per-frame tick. Scheduling is cooperative and single-threaded: the
//! tick updates every entity in insertion order, runs the frame callbacks,
//! fires due scheduled tasks, and flushes deferred commands. A slow entity
//! update delays the whole frame; nothing preempts anything.
//!
//! Scheduled tasks are the cancellable replacement for fire-and-forget
//! timers: each task carries its owner, tasks die with their owner, and a
//! task that outlives its target renderable fires into nothing.

use macroquad::prelude::*;

use crate::hud::Hud;
use crate::input::Input;
use crate::render::{Camera, RenderableId, RenderableStore};

use super::entity::{Command, CommandQueue, Entity, EntityId, EntityStore};

const SKY_COLOR: Color = Color::new(0.35, 0.48, 0.62, 1.0);

/// What a scheduled task does when it comes due.
#[derive(Debug, Clone, Copy)]
pub enum TaskAction {
    SetRenderableColor(RenderableId, Color),
}

struct ScheduledTask {
    owner: EntityId,
    due: f64,
    action: TaskAction,
}

/// Deferred one-shot actions keyed to absolute time.
pub struct TaskQueue {
    tasks: Vec<ScheduledTask>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Schedule `action` to fire at absolute time `due`. The task is
    /// cancelled if `owner` leaves the world first.
    pub fn schedule(&mut self, owner: EntityId, due: f64, action: TaskAction) {
        self.tasks.push(ScheduledTask { owner, due, action });
    }

    pub fn cancel_owned_by(&mut self, owner: EntityId) {
        self.tasks.retain(|t| t.owner != owner);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn take_due(&mut self, now: f64) -> Vec<TaskAction> {
        let mut due = Vec::new();
        self.tasks.retain(|t| {
            if t.due <= now {
                due.push(t.action);
                false
            } else {
                true
            }
        });
        due
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything an entity can reach during its own init/update.
///
/// The entity itself is checked out of the store while it holds this, so
/// `entities` reaches every *other* entity without aliasing.
pub struct WorldContext<'a> {
    pub input: &'a mut Input,
    pub entities: &'a mut EntityStore,
    pub renderables: &'a mut RenderableStore,
    pub camera: &'a mut Camera,
    pub hud: &'a mut Hud,
    pub commands: &'a mut CommandQueue,
    pub tasks: &'a mut TaskQueue,
    /// Absolute time of the current tick, in seconds.
    pub now: f64,
}

/// The scene driver: entity collection, camera, HUD, and the frame tick.
pub struct World {
    input: Input,
    entities: EntityStore,
    renderables: RenderableStore,
    camera: Camera,
    hud: Hud,
    commands: CommandQueue,
    tasks: TaskQueue,
    frame_callbacks: Vec<Box<dyn FnMut(f32)>>,
    running: bool,
    now: f64,
}

impl World {
    pub fn new(input: Input) -> Self {
        Self {
            input,
            entities: EntityStore::new(),
            renderables: RenderableStore::new(),
            camera: Camera::new(),
            hud: Hud::new(),
            commands: CommandQueue::new(),
            tasks: TaskQueue::new(),
            frame_callbacks: Vec::new(),
            running: false,
            now: 0.0,
        }
    }

    fn context(&mut self) -> WorldContext<'_> {
        WorldContext {
            input: &mut self.input,
            entities: &mut self.entities,
            renderables: &mut self.renderables,
            camera: &mut self.camera,
            hud: &mut self.hud,
            commands: &mut self.commands,
            tasks: &mut self.tasks,
            now: self.now,
        }
    }

    /// Add an entity: membership first, then its init hook with the world
    /// as context. Always succeeds; an entity that attaches no renderables
    /// changes membership only.
    pub fn add(&mut self, entity: Box<dyn Entity>) -> EntityId {
        let id = self.entities.insert(entity);
        if let Some(mut entity) = self.entities.take(id) {
            let mut ctx = self.context();
            entity.init(id, &mut ctx);
            self.entities.put_back(id, entity);
        }
        id
    }

    /// Remove an entity and everything it owns. Unknown ids are a silent
    /// no-op. Entities removing things mid-tick use the context's command
    /// queue instead; this entry point is for code outside the tick.
    pub fn remove(&mut self, id: EntityId) {
        self.commands.remove(id);
        self.flush_commands();
    }

    /// Register a callback invoked once per tick with the elapsed time.
    /// Callbacks accumulate; there is no removal.
    pub fn register_frame_callback(&mut self, callback: impl FnMut(f32) + 'static) {
        self.frame_callbacks.push(Box::new(callback));
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stop scheduling further ticks. The frame currently in flight is not
    /// interrupted; the next `tick` call just does nothing.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// One simulation step. `now` is absolute time in seconds, `dt` the
    /// elapsed time since the previous tick.
    pub fn tick(&mut self, now: f64, dt: f32) {
        if !self.running {
            return;
        }
        self.now = now;

        for id in self.entities.ids() {
            let Some(mut entity) = self.entities.take(id) else {
                continue;
            };
            let mut ctx = self.context();
            entity.update(dt, &mut ctx);
            self.entities.put_back(id, entity);
        }

        for callback in &mut self.frame_callbacks {
            callback(dt);
        }

        for action in self.tasks.take_due(now) {
            self.apply_task(action);
        }

        self.flush_commands();
    }

    fn apply_task(&mut self, action: TaskAction) {
        match action {
            TaskAction::SetRenderableColor(id, color) => {
                // The renderable may be gone; a late task fires into nothing.
                if let Some(renderable) = self.renderables.get_mut(id) {
                    renderable.color = color;
                }
            }
        }
    }

    fn flush_commands(&mut self) {
        for command in self.commands.drain() {
            match command {
                Command::AwardScore(id, points) => {
                    if let Some(entity) = self.entities.get_dyn_mut(id) {
                        entity.add_score(points, &mut self.hud);
                    }
                }
                Command::Remove(id) => {
                    if self.entities.remove(id) {
                        self.renderables.detach_owned_by(id);
                        self.tasks.cancel_owned_by(id);
                    }
                }
            }
        }
    }

    /// Render the current frame: 3D pass over the renderables, then the
    /// HUD in screen space. The camera aspect follows the screen size, so
    /// window resizes need no extra handling.
    pub fn draw(&self) {
        clear_background(SKY_COLOR);
        set_camera(&self.camera.to_camera3d());
        self.renderables.draw();
        set_default_camera();
        self.hud.draw(self.input.pointer_locked());
    }

    pub fn input_mut(&mut self) -> &mut Input {
        &mut self.input
    }

    pub fn get<T: 'static>(&self, id: EntityId) -> Option<&T> {
        self.entities.get(id)
    }

    pub fn get_mut<T: 'static>(&mut self, id: EntityId) -> Option<&mut T> {
        self.entities.get_mut(id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn renderables(&self) -> &RenderableStore {
        &self.renderables
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn hud_mut(&mut self) -> &mut Hud {
        &mut self.hud
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }
}
