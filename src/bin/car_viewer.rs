//! Headless viewer driver
//!
//! Loads a model, replays a script of UI events and frames, and prints the
//! resulting viewer state.
//!
//! ```text
//! car-viewer --model volvos90.gltf --script "toggle-door-fl;frames:60;paint-color=#1e90ff"
//! ```
//!
//! Script steps are separated by `;`:
//! - `<control-id>` or `<control-id>=<value>`: fire a page control
//! - `frames:<n>`: advance `n` frames at the configured frame rate
//! - `pick:<object>`: click an object by name
//! - `click:<x>,<y>`: click a pixel of the viewport

use car_viewer::assets;
use car_viewer::resources::{format_hex_color, MaterialSlot};
use car_viewer::scene::CameraInput;
use car_viewer::{ViewerConfig, ViewerController, ViewerError, ViewerResult};
use clap::Parser;

/// Command line arguments for the viewer driver
#[derive(Parser, Debug)]
#[command(name = "car-viewer")]
#[command(about = "Drive the car viewer without a renderer")]
struct Args {
    /// glTF model to load (defaults to the preset's model path)
    #[arg(short, long)]
    model: Option<String>,

    /// Configuration preset: default or showroom
    #[arg(short, long, default_value = "default")]
    preset: String,

    /// Script of steps to replay
    #[arg(short, long, default_value = "")]
    script: String,

    /// Frames to run after the script
    #[arg(short, long, default_value_t = 0)]
    frames: u32,

    /// Simulated frame rate
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Viewport size used for pixel clicks
    #[arg(long, default_value_t = 1280.0)]
    width: f32,

    #[arg(long, default_value_t = 720.0)]
    height: f32,
}

/// Viewer plus the simulated clock
struct Session {
    viewer: ViewerController,
    input: CameraInput,
    time: f64,
    dt: f32,
    width: f32,
    height: f32,
}

impl Session {
    fn run_frames(&mut self, count: u32) {
        for _ in 0..count {
            self.time += f64::from(self.dt);
            self.viewer.frame(self.time, self.dt, &self.input);
        }
    }

    fn run_step(&mut self, step: &str) -> ViewerResult<()> {
        let bad_step = || ViewerError::InvalidConfig(format!("bad script step '{step}'"));

        if let Some(count) = step.strip_prefix("frames:") {
            let count = count.trim().parse::<u32>().map_err(|_| bad_step())?;
            self.run_frames(count);
        } else if let Some(object) = step.strip_prefix("pick:") {
            match self.viewer.pick_object(object.trim()) {
                Some(door) => log::info!("Picked {} handle", door.display_name()),
                None => log::info!("'{}' is not a door handle", object.trim()),
            }
        } else if let Some(point) = step.strip_prefix("click:") {
            let (x, y) = point.split_once(',').ok_or_else(bad_step)?;
            let x = x.trim().parse::<f32>().map_err(|_| bad_step())?;
            let y = y.trim().parse::<f32>().map_err(|_| bad_step())?;
            self.viewer.pick_at(x, y, self.width, self.height);
        } else {
            let (control, value) = match step.split_once('=') {
                Some((control, value)) => (control.trim(), Some(value.trim())),
                None => (step, None),
            };
            self.viewer.dispatch(control, value)?;
        }
        Ok(())
    }

    fn report(&self) {
        let state = self.viewer.state();
        println!("time: {:.3}s", self.time);
        println!("model: {}", if self.viewer.is_placeholder() { "placeholder" } else { "loaded" });
        println!("camera: {}", state.camera_mode.mode().name());
        println!("  position: {:?}", self.viewer.camera().position);
        println!("  target:   {:?}", self.viewer.camera().target);
        for (door, s) in state.doors.iter() {
            println!(
                "door {}: {:<6} angle {:+.4} -> {:+.4}",
                door.code(),
                if s.is_open { "open" } else { "closed" },
                s.current_angle,
                s.target_angle
            );
        }
        let pose = state.motion.pose();
        println!(
            "motion: {} (wheel {:.3} rad, grid {:+.3})",
            if state.motion.is_moving() { "moving" } else { "stopped" },
            pose.wheel_angle,
            self.viewer.grid_offset()
        );
        for slot in MaterialSlot::ALL {
            println!("{}: {}", slot.name(), format_hex_color(state.materials.get(slot).color));
        }
        if !self.viewer.missing_objects().is_empty() {
            println!("missing objects: {}", self.viewer.missing_objects().join(", "));
        }
    }
}

fn run(args: Args) -> ViewerResult<()> {
    let mut config = ViewerConfig::preset(&args.preset)?;
    if let Some(model) = &args.model {
        config = config.with_model_path(model);
    }
    if !(args.fps > 0.0) {
        return Err(ViewerError::InvalidConfig(format!("fps {} must be positive", args.fps)));
    }

    let mut viewer = ViewerController::new(config)?;
    let model_path = viewer.config().model_path.clone();
    viewer.load_model_or_placeholder(assets::load_gltf_file(&model_path));

    let mut session = Session {
        viewer,
        input: CameraInput::new(),
        time: 0.0,
        dt: 1.0 / args.fps,
        width: args.width,
        height: args.height,
    };

    for step in args.script.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        session.run_step(step)?;
    }
    session.run_frames(args.frames);
    session.report();
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Args::parse()) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
