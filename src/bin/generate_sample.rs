use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

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

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const ROWS: usize = 300;

/// Render the sample table as CSV text.
///
/// Columns cover every inference path: integers, floats, booleans, text,
/// date strings, a numeric-looking column with one dirty cell and a column
/// with gaps.
fn sample_csv(rng: &mut SimpleRng) -> Result<Vec<u8>> {
    let cities = ["NYC", "LA", "SF", "Chicago", "Austin"];
    let plans = ["free", "pro", "team"];

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "customer_id",
        "age",
        "monthly_spend",
        "sessions",
        "city",
        "plan",
        "active",
        "signup_date",
        "zip_code",
        "referrals",
    ])?;

    for i in 0..ROWS {
        let age = rng.gauss(38.0, 11.0).clamp(18.0, 90.0).round() as i64;
        let sessions = rng.gauss(20.0, 6.0).max(0.0).round();
        let spend = (sessions * 1.7 + rng.gauss(10.0, 4.0)).max(0.0);
        let day = 1 + (rng.next_u64() % 28);
        let month = 1 + (rng.next_u64() % 12);
        // One malformed zip code keeps the column textual until it is fixed.
        let zip_code = if i == 17 {
            "unknown".to_string()
        } else {
            format!("{:05}", 10000 + rng.next_u64() % 89999)
        };
        let referrals = if rng.next_f64() < 0.2 {
            String::new()
        } else {
            (rng.next_u64() % 5).to_string()
        };

        writer.write_record([
            (1000 + i).to_string(),
            age.to_string(),
            format!("{spend:.2}"),
            sessions.to_string(),
            rng.pick(&cities).to_string(),
            rng.pick(&plans).to_string(),
            (rng.next_f64() < 0.7).to_string(),
            format!("2023-{month:02}-{day:02}"),
            zip_code,
            referrals,
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV buffer: {}", e.error()))
}

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let csv_bytes = sample_csv(&mut rng)?;

    let csv_path = out_dir.join("sample_data.csv");
    std::fs::write(&csv_path, &csv_bytes)
        .with_context(|| format!("writing {}", csv_path.display()))?;

    let zip_path = out_dir.join("sample_data.zip");
    let file =
        File::create(&zip_path).with_context(|| format!("creating {}", zip_path.display()))?;
    let mut archive = ZipWriter::new(file);
    archive
        .start_file("sample_data.csv", SimpleFileOptions::default())
        .context("starting archive entry")?;
    archive.write_all(&csv_bytes).context("writing archive entry")?;
    archive.finish().context("finishing archive")?;

    log::info!("sample written to {}", out_dir.display());
    println!(
        "Wrote {ROWS} rows to {} and {}",
        csv_path.display(),
        zip_path.display()
    );
    Ok(())
}
