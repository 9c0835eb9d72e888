// Motor check: careful, step-by-step hardware test for the drivetrain board
//
// Usage: cargo run --example motor_check --features hardware -- [--address 4]
//
// Safety:
// - Explicit confirmation before anything moves
// - Short, slow moves only
// - Ctrl+C aborts at any time

use std::io::{self, Write};
use std::thread::sleep;
use std::time::Duration;

use clap::Parser;

use linebot_bsp::bus::RpiI2cBus;
use linebot_bsp::config::DRIVETRAIN_ADDR;
use linebot_bsp::motor::{estimate_travel_ms, Drivetrain};

#[derive(Parser)]
#[command(about = "Step-by-step drivetrain controller test")]
struct Args {
    /// Peripheral bus address of the drivetrain controller
    #[arg(long, default_value_t = DRIVETRAIN_ADDR)]
    address: u8,

    /// I2C bus number (e.g. 1 for /dev/i2c-1)
    #[arg(long)]
    bus: Option<u8>,
}

fn confirm(prompt: &str) -> bool {
    print!("{} [y/N]: ", prompt);
    io::stdout().flush().unwrap();
    let mut input = String::new();
    io::stdin().read_line(&mut input).unwrap();
    input.trim().eq_ignore_ascii_case("y")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    println!("Step 1: Opening I2C bus...");
    let bus = match args.bus {
        Some(n) => RpiI2cBus::open_bus(n)?,
        None => RpiI2cBus::open()?,
    };
    println!("  ok");

    let mut drive = Drivetrain::new(bus, args.address);

    println!("Step 2: Reading status (no movement)...");
    let status = drive.status();
    println!("  status word: {}", status.raw());
    if !status.is_valid() {
        println!("  controller did not answer cleanly - check wiring and address");
        return Ok(());
    }

    println!();
    println!("Step 3: Short, slow test move (10 cm at 10 cm/s)");
    if !confirm("The wheels will turn. Proceed?") {
        return Ok(());
    }

    drive.set_default_accelerations();
    drive.set_speed(10);
    drive.set_steering(0);
    drive.set_target_steps(1000);

    let (accel, decel) = drive.accelerations();
    let expected_ms = estimate_travel_ms(100, 10, accel, decel);
    println!("  expected travel time: {} ms", expected_ms);

    drive.go();
    sleep(Duration::from_millis(expected_ms as u64 + 200));

    let status = drive.status();
    if status.is_idle() {
        println!("  move complete");
    } else if let Some(left) = status.steps_remaining() {
        println!("  still {} steps to go", left);
    } else {
        println!("  status error: {}", status.raw());
    }

    drive.stop();
    drive.coast();
    println!();
    println!("Done. If the wheels moved as expected, the controller is working.");

    Ok(())
}
