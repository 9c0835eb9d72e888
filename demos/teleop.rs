// Keyboard teleop: W/S speed, A/D steering, space stop, Q quit
//
// Drives the drivetrain controller directly over the bus.
// Usage: cargo run --example teleop --features hardware

use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use tracing::info;

use linebot_bsp::bus::RpiI2cBus;
use linebot_bsp::config::{DRIVETRAIN_ADDR, DRIVE_SPEED_MAX};
use linebot_bsp::motor::Drivetrain;

const SPEED_STEP: i16 = 10; // cm/s per keypress
const STEERING_STEP: i16 = 20;

#[derive(Parser)]
#[command(about = "Keyboard teleop for the drivetrain controller")]
struct Args {
    /// Peripheral bus address of the drivetrain controller
    #[arg(long, default_value_t = DRIVETRAIN_ADDR)]
    address: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let bus = RpiI2cBus::open()?;
    let mut drive = Drivetrain::new(bus, args.address);
    drive.set_default_accelerations();

    info!("Controls: W/S=speed, A/D=steering, space=stop, Q=quit");

    enable_raw_mode()?;
    let result = run_teleop(&mut drive);
    disable_raw_mode()?;

    drive.stop();
    drive.coast();
    result
}

fn run_teleop(drive: &mut Drivetrain<RpiI2cBus>) -> Result<(), Box<dyn std::error::Error>> {
    let mut speed: i16 = 0;
    let mut steering: i16 = 0;
    let mut moving = false;

    loop {
        if !event::poll(Duration::from_millis(20))? {
            continue;
        }
        let Event::Key(KeyEvent { code, kind, .. }) = event::read()? else {
            continue;
        };
        if kind != KeyEventKind::Press && kind != KeyEventKind::Repeat {
            continue;
        }

        match code {
            KeyCode::Char('w') => {
                speed = (speed + SPEED_STEP).min(DRIVE_SPEED_MAX);
            }
            KeyCode::Char('s') => {
                speed = (speed - SPEED_STEP).max(-DRIVE_SPEED_MAX);
            }
            KeyCode::Char('a') => {
                steering = (steering - STEERING_STEP).max(-100);
            }
            KeyCode::Char('d') => {
                steering = (steering + STEERING_STEP).min(100);
            }
            KeyCode::Char(' ') => {
                speed = 0;
                steering = 0;
                drive.stop();
                moving = false;
                info!("stopped");
                continue;
            }
            KeyCode::Char('q') | KeyCode::Esc => break,
            _ => continue,
        }

        drive.set_speed(speed);
        drive.set_steering(steering);
        if !moving && speed != 0 {
            drive.go();
            moving = true;
        }
        info!("speed={} cm/s, steering={}", speed, steering);
    }

    Ok(())
}
