// Simulated line following: the caller-side control loop, no hardware needed
//
// A tiny world model stands in for the bus and the photoreflectors: the robot
// drifts sideways off a dark line, the estimator reads the simulated sensors,
// and the loop feeds the offset back into the drivetrain's steering. Run with
// `cargo run --example line_follow`.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use serde_json::json;
use tracing::info;

use linebot_bsp::bus::{BusTransport, Result as BusResult};
use linebot_bsp::config::DRIVETRAIN_ADDR;
use linebot_bsp::motor::{protocol, DriveCommand, Drivetrain};
use linebot_bsp::sensor::{AnalogInput, Calibration, LedPair, LineSensor};

#[derive(Parser)]
#[command(about = "Closed-loop line following against a simulated track")]
struct Args {
    /// Control loop iterations
    #[arg(long, default_value_t = 120)]
    steps: u32,

    /// Initial lateral displacement from the line center, mm
    #[arg(long, default_value_t = -18.0)]
    start_mm: f32,

    /// Sideways drift per tick, mm
    #[arg(long, default_value_t = 0.3)]
    drift_mm: f32,
}

const LINE_HALF_WIDTH_MM: f32 = 10.0;
const SENSOR_SPACING_MM: f32 = 9.0;
const AMBIENT: u16 = 40;
const REFLECT_WHITE: u16 = 850;
const REFLECT_LINE: u16 = 120;

/// World state shared by the fake sensors and the fake bus
struct World {
    position_mm: f32,
    led_on: bool,
    steering: i16,
}

type Shared = Rc<RefCell<World>>;

/// One photoreflector channel, mounted `side_mm` off the robot's center
struct Channel {
    world: Shared,
    side_mm: f32,
}

impl AnalogInput for Channel {
    fn sample(&mut self) -> u16 {
        let w = self.world.borrow();
        let x = w.position_mm + self.side_mm;
        let reflect = if x.abs() < LINE_HALF_WIDTH_MM {
            REFLECT_LINE
        } else {
            REFLECT_WHITE
        };
        if w.led_on { AMBIENT + reflect } else { AMBIENT }
    }
}

struct Leds(Shared);

impl LedPair for Leds {
    fn set(&mut self, on: bool) {
        self.0.borrow_mut().led_on = on;
    }
}

/// Fake drivetrain controller: records steering, always reports running
struct SimBus(Shared);

impl BusTransport for SimBus {
    fn write(&mut self, _address: u8, bytes: &[u8]) -> BusResult<()> {
        let (cmd, value) = protocol::decode_frame([bytes[0], bytes[1], bytes[2]]);
        if cmd == DriveCommand::Steering as u8 {
            self.0.borrow_mut().steering = value;
        }
        Ok(())
    }

    fn read(&mut self, _address: u8, buf: &mut [u8]) -> BusResult<usize> {
        let steps = 100i16.to_le_bytes();
        let n = steps.len().min(buf.len());
        buf[..n].copy_from_slice(&steps[..n]);
        Ok(n)
    }
}

fn main() {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let world: Shared = Rc::new(RefCell::new(World {
        position_mm: args.start_mm,
        led_on: false,
        steering: 0,
    }));

    let mut line = LineSensor::new(
        Channel {
            world: world.clone(),
            side_mm: -SENSOR_SPACING_MM,
        },
        Channel {
            world: world.clone(),
            side_mm: SENSOR_SPACING_MM,
        },
        Leds(world.clone()),
    )
    .with_sampling(4, Duration::ZERO, Duration::ZERO);

    line.calibrate(Calibration {
        white_left: REFLECT_WHITE as i16,
        white_right: REFLECT_WHITE as i16,
        black_left: REFLECT_LINE as i16,
        black_right: REFLECT_LINE as i16,
    });

    let mut drive =
        Drivetrain::new(SimBus(world.clone()), DRIVETRAIN_ADDR).with_settle(Duration::ZERO);
    drive.set_default_accelerations();
    drive.set_speed(30);
    drive.go();

    info!(
        "Starting {}mm off the line, drifting {}mm per tick",
        args.start_mm, args.drift_mm
    );

    for step in 0..args.steps {
        let offset = line.offset();
        let steering = offset / 10;
        drive.set_steering(steering);

        {
            let mut w = world.borrow_mut();
            // Steering pushes the robot back toward the line; drift pushes away
            w.position_mm += -0.02 * w.steering as f32 + args.drift_mm;
        }

        if step % 10 == 0 {
            let w = world.borrow();
            println!(
                "{}",
                json!({
                    "step": step,
                    "offset": offset,
                    "steering": w.steering,
                    "position_mm": (w.position_mm * 10.0).round() / 10.0,
                })
            );
        }
    }

    drive.stop();
    let final_pos = world.borrow().position_mm;
    info!("Final displacement: {:.1} mm", final_pos);
}
