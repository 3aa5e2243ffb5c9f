//! Demo host for the framework.
//!
//! Builds a small scene (title, button, checkbox, a moving box and a few
//! absolute shapes) and runs both loops for a while. Headless by default:
//! frames go to a [`RecordingSurface`] and a background thread plays a
//! scripted pointer session through the input queue. With the `raylib`
//! feature, `--window` opens a real window instead.
//!
//! ```sh
//! cargo run -- --seconds 2 --fps 60 --json
//! cargo run --features raylib -- --window --seconds 10
//! ```

use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use ngf::builders::{
    BoxBuilder, ButtonBuilder, CheckBoxBuilder, CircleBuilder, LineBuilder, PolyBuilder,
    TextBuilder,
};
use ngf::components::identity::EntityId;
use ngf::components::pointer::PointerHooks;
use ngf::components::shape::{Label, Shape};
use ngf::components::tint::Tint;
use ngf::error::FrameworkResult;
use ngf::resources::config::FrameworkConfig;
use ngf::resources::input::{InputEvent, MouseButton};
use ngf::resources::registry::EntityRegistry;
use ngf::scene::Scene;
use ngf::scheduler::{Ran, Scheduler};
use ngf::surface::recording::RecordingSurface;
use ngf::tweens::TweenOptions;
use ngf::types::{Rgba, Vector2};

const WIDTH: f32 = 640.0;
const HEIGHT: f32 = 480.0;

#[derive(Parser)]
#[command(version, about = "Nub's Canvas 2D Game Framework demo")]
struct Cli {
    /// INI configuration file to load before building the scene.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// How long to run, in seconds.
    #[arg(long, default_value_t = 3.0)]
    seconds: f64,

    /// Frame rate cap; 0 renders as fast as possible.
    #[arg(long)]
    fps: Option<u32>,

    /// Think passes per second.
    #[arg(long)]
    tick_rate: Option<u32>,

    /// Print the final frame timing as JSON.
    #[arg(long)]
    json: bool,

    /// Open a raylib window instead of running headless.
    #[cfg(feature = "raylib")]
    #[arg(long)]
    window: bool,
}

struct Demo {
    button: EntityId,
    status: EntityId,
}

fn set_label(world: &mut bevy_ecs::world::World, id: EntityId, text: String) {
    let Some(entity) = world.resource::<EntityRegistry>().get(id) else {
        return;
    };
    if let Some(mut label) = world.get_mut::<Label>(entity) {
        label.set_text(text);
    }
}

fn set_tint(world: &mut bevy_ecs::world::World, id: EntityId, color: Rgba) {
    let Some(entity) = world.resource::<EntityRegistry>().get(id) else {
        return;
    };
    if let Some(mut tint) = world.get_mut::<Tint>(entity) {
        tint.color = color;
    }
}

fn build_scene(scene: &mut Scene) -> FrameworkResult<Demo> {
    TextBuilder::new("Nub's Canvas 2D")
        .pos(20.0, 20.0)
        .text_color(Rgba::from_hex("#ffcc00").unwrap_or(Rgba::WHITE))
        .spawn(scene)?;

    let status = TextBuilder::new("").pos(20.0, HEIGHT - 30.0).spawn(scene)?;

    let idle = Rgba::new(40, 90, 160, 255);
    let hot = Rgba::new(70, 130, 220, 255);
    let button = ButtonBuilder::new("Click me")
        .pos(20.0, 60.0)
        .size(120.0, 32.0)
        .corner_radius(6.0)
        .color(idle)
        .hooks(
            PointerHooks::new()
                .on_hover_start(move |world, id| set_tint(world, id, hot))
                .on_hover_stop(move |world, id| set_tint(world, id, idle))
                .on_mouse_up(|world, id| {
                    info!("Button {} clicked", id);
                    set_label(world, id, "Clicked!".to_string());
                }),
        )
        .spawn(scene)?;

    CheckBoxBuilder::new()
        .pos(160.0, 66.0)
        .size(20.0, 20.0)
        .hooks(PointerHooks::new().on_mouse_up(|world, id| {
            let checked = world
                .resource::<EntityRegistry>()
                .get(id)
                .and_then(|e| world.get::<Shape>(e))
                .and_then(Shape::checked);
            info!("Checkbox {} is now {:?}", id, checked);
        }))
        .spawn(scene)?;

    let mover = BoxBuilder::new()
        .pos(20.0, 140.0)
        .size(40.0, 40.0)
        .corner_radius(8.0)
        .color(Rgba::new(200, 60, 60, 255))
        .angle(15.0)
        .mask(true)
        .spawn(scene)?;
    scene.move_to(
        mover,
        Vector2::new(WIDTH - 60.0, 140.0),
        TweenOptions::new(2000.0)
            .ease(2.0)
            .on_finish(|_, id| info!("Animation {:?} finished", id)),
    )?;
    scene.color_to(mover, Rgba::new(60, 200, 90, 255), TweenOptions::new(2000.0))?;
    scene.rotate_to(mover, 375.0, TweenOptions::new(2000.0))?;

    let circle = CircleBuilder::new()
        .pos(WIDTH / 2.0, 300.0)
        .radius(10.0)
        .color(Rgba::new(240, 240, 240, 200))
        .spawn(scene)?;
    scene.radius_to(circle, 60.0, TweenOptions::new(1500.0).ease(3.0))?;

    LineBuilder::new(Vector2::new(20.0, 400.0), Vector2::new(WIDTH - 20.0, 400.0))
        .weight(2.0)
        .color(Rgba::new(120, 120, 120, 255))
        .spawn(scene)?;

    PolyBuilder::new([
        Vector2::new(500.0, 220.0),
        Vector2::new(560.0, 260.0),
        Vector2::new(520.0, 320.0),
    ])
    .color(Rgba::new(160, 80, 200, 255))
    .spawn(scene)?;

    scene.on_frame(move |world, timing| {
        set_label(
            world,
            status,
            format!("{} fps ({:.2} ms/frame)", timing.fps, timing.delta_time * 1000.0),
        );
    });

    Ok(Demo { button, status })
}

/// Play a short pointer session against the button from another thread.
fn script_pointer(scene: &Scene, target: Vector2) -> thread::JoinHandle<()> {
    let tx = scene.input_sender();
    thread::spawn(move || {
        let script = [
            (200, InputEvent::PointerMove { x: 5.0, y: 5.0 }),
            (300, InputEvent::PointerMove {
                x: target.x,
                y: target.y,
            }),
            (500, InputEvent::PointerDown(MouseButton::Left)),
            (650, InputEvent::PointerUp(MouseButton::Left)),
            (900, InputEvent::PointerLeave),
        ];
        let started = Instant::now();
        for (at, event) in script {
            let at = Duration::from_millis(at);
            if let Some(wait) = at.checked_sub(started.elapsed()) {
                thread::sleep(wait);
            }
            if tx.send(event).is_err() {
                return;
            }
        }
    })
}

fn run_headless(scene: &mut Scene, scheduler: &mut Scheduler, limit: Duration, demo: &Demo) {
    let mut surface = RecordingSurface::new(WIDTH, HEIGHT);
    let pointer = script_pointer(scene, Vector2::new(80.0, 76.0));
    let started = Instant::now();
    let base = scene.now();
    let mut commands = 0usize;

    let clock = || base + started.elapsed().as_secs_f64() * 1000.0;

    while started.elapsed() < limit && scheduler.is_running() {
        if matches!(
            scheduler.pump_clock(scene, &mut surface, &clock),
            Ran::Frame | Ran::Both
        ) {
            commands += surface.drain().len();
        }
        match scheduler.next_wake() {
            Some(wake) => {
                let wait = wake - clock();
                if wait > 0.0 {
                    thread::sleep(Duration::from_secs_f64(wait / 1000.0));
                } else {
                    thread::yield_now();
                }
            }
            None => break,
        }
    }
    if pointer.join().is_err() {
        warn!("Pointer script thread panicked");
    }

    let label = scene
        .get::<Label>(demo.button)
        .map(|l| l.text.clone())
        .unwrap_or_default();
    let status = scene
        .get::<Label>(demo.status)
        .map(|l| l.text.clone())
        .unwrap_or_default();
    info!(
        "Headless run: {} frames, {} draw commands, button says {:?}, status {:?}",
        scene.timing().frames,
        commands,
        label,
        status
    );
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = FrameworkConfig::new();
    if let Some(path) = cli.config {
        config.config_path = path;
        if let Err(e) = config.load_from_file() {
            warn!("{}, using defaults", e);
        }
    }
    if let Some(fps) = cli.fps {
        config.fps = fps;
    }
    if let Some(rate) = cli.tick_rate {
        config.tick_rate = rate;
    }
    info!(
        "Starting: fps cap {}, tick rate {}/s, hover policy {:?}",
        config.fps, config.tick_rate, config.hover_policy
    );

    let mut scene = Scene::new(config);
    let demo = match build_scene(&mut scene) {
        Ok(demo) => demo,
        Err(e) => {
            eprintln!("Error building scene: {e}");
            std::process::exit(1);
        }
    };

    let mut scheduler = Scheduler::new();
    let limit = Duration::from_secs_f64(cli.seconds.max(0.0));

    #[cfg(feature = "raylib")]
    if cli.window {
        let frames = ngf::surface::raylib_backend::run_window(
            &mut scene,
            &mut scheduler,
            WIDTH as i32,
            HEIGHT as i32,
            "Nub's Canvas 2D",
            Some(limit),
        );
        info!("Window run: {} frames", frames);
    } else {
        run_headless(&mut scene, &mut scheduler, limit, &demo);
    }
    #[cfg(not(feature = "raylib"))]
    run_headless(&mut scene, &mut scheduler, limit, &demo);

    scheduler.stop();
    info!(
        "{} animations still running",
        scene.animations().running_count()
    );

    if cli.json {
        match serde_json::to_string_pretty(scene.timing()) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing frame timing: {e}");
                std::process::exit(1);
            }
        }
    }
}
