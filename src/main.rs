//! A small first-person arena: walk a fenced ground plane, shoot the cubes
//! that chase you, don't let them corner you. Built as a demo of the entity
//! world in `game`; everything interesting lives there.

use macroquad::prelude::*;

mod config;
mod game;
mod hud;
mod input;
mod render;

use config::{ConfigError, GameConfig};
use game::{Enemy, EntityId, Ground, Player, World};
use input::Input;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const CONFIG_PATH: &str = "assets/config.ron";
/// Keeps the player's collision box off the plane's edge.
const BOUNDARY_MARGIN: f32 = 0.5;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("Skirmish v{}", VERSION),
        window_width: 1280,
        window_height: 720,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

struct Demo {
    world: World,
    player: EntityId,
}

fn setup(config: GameConfig) -> Demo {
    let mut world = World::new(Input::new());

    let ground = Ground::new(&config.ground);
    let bound = ground.size() * 0.5 - BOUNDARY_MARGIN;
    world.add(Box::new(ground));

    let player = world.add(Box::new(Player::new(&config.player, bound)));

    for &[x, y, z] in &config.enemy.positions {
        world.add(Box::new(Enemy::new(&config.enemy, vec3(x, y, z), player)));
    }
    println!(
        "world ready: {} entities, {} enemies",
        world.entity_count(),
        config.enemy.positions.len()
    );

    // Uptime heartbeat, once a minute.
    let mut elapsed = 0.0_f32;
    let mut next_report = 60.0_f32;
    world.register_frame_callback(move |dt| {
        elapsed += dt;
        if elapsed >= next_report {
            println!("uptime {:.0}s", elapsed);
            next_report += 60.0;
        }
    });

    world.start();
    Demo { world, player }
}

async fn error_screen(error: ConfigError) {
    let message = format!("{}", error);
    eprintln!("{}", message);
    loop {
        clear_background(BLACK);
        let dims = measure_text(&message, None, 28, 1.0);
        draw_text(
            &message,
            (screen_width() - dims.width) * 0.5,
            screen_height() * 0.5,
            28.0,
            RED,
        );
        next_frame().await;
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let config = match config::load_config(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            error_screen(e).await;
            return;
        }
    };

    let mut demo = setup(config);
    let mut show_debug = false;

    loop {
        demo.world.input_mut().poll();
        if is_key_pressed(KeyCode::F3) {
            show_debug = !show_debug;
        }

        demo.world.tick(get_time(), get_frame_time());

        let debug = show_debug.then(|| {
            let pos = demo
                .world
                .get::<Player>(demo.player)
                .map(|p| p.position)
                .unwrap_or_default();
            format!(
                "pos ({:.1}, {:.1}, {:.1})  entities {}  fps {}",
                pos.x,
                pos.y,
                pos.z,
                demo.world.entity_count(),
                get_fps()
            )
        });
        demo.world.hud_mut().set_debug(debug);

        demo.world.draw();
        next_frame().await;
    }
}
