//! Ambush probe - replay screenshots through the map event handlers
//!
//! Used for tuning thresholds on desktop without a device attached. The
//! first frame of the replay must show a clean map; it is used to sample
//! the overlay reference colors.

use std::process::ExitCode;
use std::time::Duration;

use ambush_sentry::device::replay::DEFAULT_FRAME_INTERVAL;
use ambush_sentry::device::{ButtonSet, DeviceError, ReplayDevice};
use ambush_sentry::{
    AmbushHandler, Combat, Device, ExpectedEnd, GlyphClassifier, HandlerError, Settings,
};

struct Args {
    frames: String,
    templates: String,
    settings: Option<String>,
    buttons: Option<String>,
    frame_interval: Duration,
}

impl Args {
    fn parse() -> Option<Self> {
        let mut frames = None;
        let mut templates = None;
        let mut settings = None;
        let mut buttons = None;
        let mut frame_interval = DEFAULT_FRAME_INTERVAL;

        for arg in std::env::args().skip(1) {
            if arg == "--help" || arg == "-h" {
                print_help();
                return None;
            } else if arg == "--version" || arg == "-v" {
                println!("Ambush probe v{}", env!("CARGO_PKG_VERSION"));
                return None;
            } else if let Some(value) = arg.strip_prefix("--frames=") {
                frames = Some(value.to_string());
            } else if let Some(value) = arg.strip_prefix("--templates=") {
                templates = Some(value.to_string());
            } else if let Some(value) = arg.strip_prefix("--settings=") {
                settings = Some(value.to_string());
            } else if let Some(value) = arg.strip_prefix("--buttons=") {
                buttons = Some(value.to_string());
            } else if let Some(value) = arg.strip_prefix("--frame-interval=") {
                match value.parse::<u64>() {
                    Ok(ms) => frame_interval = Duration::from_millis(ms),
                    Err(_) => {
                        eprintln!("Invalid frame interval: {}", value);
                        return None;
                    }
                }
            } else {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                return None;
            }
        }

        let (Some(frames), Some(templates)) = (frames, templates) else {
            eprintln!("Both --frames and --templates are required");
            print_help();
            return None;
        };

        Some(Self {
            frames,
            templates,
            settings,
            buttons,
            frame_interval,
        })
    }
}

fn print_help() {
    println!("Usage: ambush-probe --frames=DIR --templates=DIR [--settings=FILE] [--buttons=FILE] [--frame-interval=MS]");
    println!();
    println!("  --frames=DIR      Directory of PNG screenshots, replayed in name order");
    println!("  --templates=DIR   Directory holding the info bar template PNGs");
    println!("  --settings=FILE   Handler settings as JSON");
    println!("  --buttons=FILE    Button areas and colors as JSON");
    println!(
        "  --frame-interval=MS  Time between recorded frames (default {})",
        DEFAULT_FRAME_INTERVAL.as_millis()
    );
}

/// Stands in for the combat sub-system during a replay
struct ReplayCombat {
    battles: u32,
}

impl Combat for ReplayCombat {
    fn combat_appear(&mut self, _device: &mut dyn Device) -> bool {
        false
    }

    fn handle_low_emotion(&mut self, _device: &mut dyn Device) -> Result<bool, HandlerError> {
        Ok(false)
    }

    fn handle_retirement(&mut self, _device: &mut dyn Device) -> Result<bool, HandlerError> {
        Ok(false)
    }

    fn engage(&mut self, _device: &mut dyn Device, expected_end: ExpectedEnd) -> Result<(), HandlerError> {
        self.battles += 1;
        log::info!("Combat requested, expected end: {:?}", expected_end);
        Ok(())
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let buttons = match &args.buttons {
        Some(path) => ButtonSet::load(path)?,
        None => ButtonSet::default(),
    };

    let glyphs = GlyphClassifier::load(&args.templates, settings.detection.glyph_similarity)?;
    let tolerance = settings.detection.button_color_tolerance;
    let mut handler = AmbushHandler::new(settings, glyphs);
    let mut device =
        ReplayDevice::open(&args.frames, buttons, tolerance)?.with_frame_interval(args.frame_interval);
    let mut combat = ReplayCombat { battles: 0 };

    device.screenshot()?;
    handler.load_reference_colors(&device)?;

    loop {
        match step(&mut handler, &mut device, &mut combat) {
            Ok(()) => {}
            Err(HandlerError::Device(DeviceError::Exhausted)) => break,
            Err(e) => return Err(e.into()),
        }
    }

    println!("Taps:");
    for tap in device.taps() {
        println!("  {:?} at ({}, {})", tap.element, tap.x, tap.y);
    }
    println!("Battles: {}", combat.battles);
    println!("Stats: {}", serde_json::to_string_pretty(handler.stats())?);

    Ok(())
}

fn step(
    handler: &mut AmbushHandler,
    device: &mut ReplayDevice,
    combat: &mut ReplayCombat,
) -> Result<(), HandlerError> {
    device.screenshot()?;
    if handler.handle_ambush(device, combat)? {
        log::info!("Ambush event handled");
    }
    if handler.handle_walk_out_of_step(device)? {
        log::info!("Out of step notice handled");
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(args) = Args::parse() else {
        return ExitCode::SUCCESS;
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
