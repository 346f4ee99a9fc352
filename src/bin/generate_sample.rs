use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Daily concentration profile: a calm baseline with a morning and an
/// evening traffic peak, in ppm.
fn profile(minute_of_day: f64) -> f64 {
    let hour = minute_of_day / 60.0;
    let peak = |center: f64, width: f64, amp: f64| {
        amp * (-(hour - center).powi(2) / (2.0 * width * width)).exp()
    };
    55.0 + peak(8.0, 1.5, 120.0) + peak(19.0, 2.0, 160.0)
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let start = NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("building start timestamp")?;

    let output_path = "sample_gas_readings.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record(["Time", "PPM"])?;

    // 24 hours at a 5-minute cadence.
    let rows: i64 = 288;
    for i in 0..rows {
        let t = start + Duration::minutes(5 * i);
        let minute_of_day = (5 * i % 1440) as f64;
        let ppm = profile(minute_of_day) + rng.gauss(0.0, 6.0);

        // Sprinkle a few sensor glitches so the invalid-value handling has
        // something to chew on.
        let cell = if rng.next_f64() < 0.01 {
            "ERR".to_string()
        } else {
            format!("{:.1}", ppm.max(0.0))
        };

        writer.write_record([t.format("%Y-%m-%d %H:%M:%S").to_string(), cell])?;
    }

    writer.flush()?;
    println!("Wrote {rows} readings to {output_path}");
    Ok(())
}
