use std::{io, path::Path};

use anyhow::Result;
use orient_common::AccelerationSample;
use rand::Rng;
use serde::Deserialize;
use tokio::sync::watch::Sender;
use tokio::time::{sleep, Duration, Instant};

// Output data rate of the virtual sensor
const SAMPLE_PERIOD: Duration = Duration::from_millis(10);

/// Hold one acceleration for a while.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct MotionStep {
    pub duration_ms: u64,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl MotionStep {
    pub const fn new(duration_ms: u64, x: f32, y: f32, z: f32) -> Self {
        Self {
            duration_ms,
            x,
            y,
            z,
        }
    }

    pub fn sample(&self) -> AccelerationSample {
        AccelerationSample::new(self.x, self.y, self.z)
    }
}

/// Rows of `duration_ms,x,y,z` with a header.
pub fn parse_motion_script<R: io::Read>(reader: R) -> Result<Vec<MotionStep>> {
    let mut steps = vec![];
    for step in csv::Reader::from_reader(reader).deserialize() {
        steps.push(step?);
    }
    Ok(steps)
}

pub fn read_motion_script<P: AsRef<Path>>(path: P) -> Result<Vec<MotionStep>> {
    parse_motion_script(std::fs::File::open(path)?)
}

/// Lies flat, then visits every edge with a short bump in between that
/// shouldn't be reported.
pub fn builtin_tour() -> Vec<MotionStep> {
    vec![
        MotionStep::new(3000, 0.0, 0.0, 1.0),
        MotionStep::new(3000, 1.0, 0.0, 0.0),
        MotionStep::new(40, 0.0, 1.0, 0.0),
        MotionStep::new(3000, 1.0, 0.0, 0.0),
        MotionStep::new(3000, 0.0, 1.0, 0.0),
        MotionStep::new(3000, -1.0, 0.0, 0.0),
        MotionStep::new(3000, 0.0, -1.0, 0.0),
        MotionStep::new(3000, 0.0, 0.0, 1.0),
    ]
}

pub fn with_noise(
    sample: AccelerationSample,
    amplitude: f32,
    rng: &mut impl Rng,
) -> AccelerationSample {
    if amplitude <= 0.0 {
        return sample;
    }
    AccelerationSample::new(
        sample.x + rng.gen_range(-amplitude..=amplitude),
        sample.y + rng.gen_range(-amplitude..=amplitude),
        sample.z + rng.gen_range(-amplitude..=amplitude),
    )
}

/// Feeds the steps into the virtual accelerometer, one sample per sensor
/// period.
pub async fn play(steps: &[MotionStep], sensor: &Sender<AccelerationSample>, noise: f32) {
    let mut rng = rand::thread_rng();
    for step in steps {
        log::debug!("Motion step {:?}", step);
        let end = Instant::now() + Duration::from_millis(step.duration_ms);
        while Instant::now() < end {
            sensor.send_replace(with_noise(step.sample(), noise, &mut rng));
            sleep(SAMPLE_PERIOD).await;
        }
    }
}
