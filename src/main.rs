mod cli;
mod control;
mod feed;
mod window;

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use log::{debug, info, warn};

use skyframe::config::Config;
use skyframe::raster::Canvas24;
use skyframe::scene::WeatherScene;
use skyframe::util::{FrameClock, Periodic};
use skyframe::weather::{LatestObservation, Observation, SAMPLE_PAYLOAD};

use cli::Args;
use control::{Command, Controller};
use feed::WeatherFeed;
use window::{PanelTexture, PanelWindow, WindowEvent};

/// Brightness change per arrow key press
const BRIGHTNESS_STEP: u8 = 16;
const STATS_INTERVAL: Duration = Duration::from_secs(5);

fn load_config(args: &Args) -> Result<Config> {
    let mut config = if args.config.exists() {
        Config::load(&args.config)?
    } else {
        info!("No config at {}, using defaults", args.config.display());
        Config::default()
    };
    args.apply(&mut config);
    Ok(config)
}

/// Keyboard shortcuts expressed as remote-control commands
fn key_command(event: WindowEvent, brightness: u8) -> Command {
    match event {
        WindowEvent::Quit => Command::Quit,
        WindowEvent::BrightnessUp => {
            Command::Brightness(brightness.saturating_add(BRIGHTNESS_STEP))
        },
        WindowEvent::BrightnessDown => {
            Command::Brightness(brightness.saturating_sub(BRIGHTNESS_STEP))
        },
        WindowEvent::Rotate => Command::RotateNext,
    }
}

/// Returns false once the app should stop
fn apply_command(panel: &mut Canvas24, command: Command) -> bool {
    match command {
        Command::Quit => return false,
        Command::Brightness(level) => {
            panel.set_brightness(level);
            info!("Brightness {}", level);
        },
        Command::Rotate(rotation) => {
            panel.set_rotation(rotation);
            info!("Rotation {:?}", panel.rotation());
        },
        Command::RotateNext => {
            panel.set_rotation(panel.rotation().next());
            info!("Rotation {:?}", panel.rotation());
        },
    }
    true
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(&args)?;

    if args.write_config {
        config.save(&args.config)?;
        info!("Wrote {}", args.config.display());
        return Ok(());
    }

    let latest = LatestObservation::new();
    let _feed = if args.simulate {
        latest.publish(Observation::from_json(SAMPLE_PAYLOAD)?);
        info!("Simulating weather feed");
        None
    } else {
        match WeatherFeed::connect(&config.feed, latest.clone()) {
            Ok(feed) => Some(feed),
            Err(e) => {
                warn!("Weather feed unavailable: {:#}", e);
                None
            },
        }
    };

    let controller = match Controller::bind(&config.control_socket) {
        Ok(controller) => {
            info!("Control socket at {}", controller.socket_path().display());
            Some(controller)
        },
        Err(e) => {
            warn!("Remote control disabled: {:#}", e);
            None
        },
    };

    let mut panel =
        Canvas24::try_new(config.panel.width, config.panel.height).context("allocating panel")?;
    panel.set_rotation(config.panel.rotation);
    panel.set_brightness(config.panel.brightness);

    let (mut window, texture_creator) = PanelWindow::open(
        "skyframe",
        panel.raw_width(),
        panel.raw_height(),
        config.window.scale,
        config.window.vsync,
    )?;
    let mut texture = PanelTexture::new(&texture_creator, panel.raw_width(), panel.raw_height())?;

    let mut scene = WeatherScene::new(panel.width(), &config.scene, config.clock.utc_offset_secs);
    let mut clock = FrameClock::new(60, config.max_fps);
    let mut stats = Periodic::new(STATS_INTERVAL);

    info!(
        "Panel {}x{}, rotation {:?}, brightness {}",
        panel.raw_width(),
        panel.raw_height(),
        panel.rotation(),
        config.panel.brightness
    );
    info!("Controls: Up/Down brightness, R rotate, Escape quit");

    'main: loop {
        let dt = clock.tick();

        let brightness = panel.gain().brightness();
        let mut commands: Vec<Command> = window
            .poll_events()
            .into_iter()
            .map(|event| key_command(event, brightness))
            .collect();
        if let Some(controller) = &controller {
            commands.extend(controller.poll());
        }
        for command in commands {
            if !apply_command(&mut panel, command) {
                break 'main;
            }
        }

        let observation = latest.snapshot();
        scene.render(&mut panel, observation.as_ref(), Utc::now(), dt);
        window.present(&mut texture, &panel)?;

        if stats.due(Instant::now()) {
            debug!(
                "{:.1} fps avg, {:.2} ms/frame",
                clock.average_fps(),
                clock.avg_frame_time_ms()
            );
        }
        clock.throttle();
    }

    info!("Shutting down");
    Ok(())
}
