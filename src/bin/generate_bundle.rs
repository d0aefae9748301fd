//! Synthesize a demo artifact bundle so the inspector can be run without
//! the upstream training outputs.
//!
//! Usage: `generate_bundle [out_dir] [n_samples] [seed]`
//!
//! The bone readings form a noisy "filled" profile that decays past the
//! slice position; the air readings form a hump that drifts and fades
//! toward the feet. The bundled model is a single decision tree that
//! binary-searches the bone profile for its decay point.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Array, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::{json, Value};

const BONE_BINS: usize = 241;
const AIR_BINS: usize = 143;
const FEATURES: usize = BONE_BINS + AIR_BINS;
const AXIAL_RANGE: f64 = 180.0;

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

/// Axial position (in degrees head→feet) covered by a bone bin.
fn bin_position(bin: usize) -> f64 {
    bin as f64 / (BONE_BINS - 1) as f64 * AXIAL_RANGE
}

/// One sample's 384 readings for a slice at axial position `y`.
fn generate_features(y: f64, rng: &mut SimpleRng) -> Vec<f64> {
    let mut row = Vec::with_capacity(FEATURES);

    // Bone: filled profile, ~1 above the slice position, ~0 below it.
    for i in 0..BONE_BINS {
        let edge = 1.0 / (1.0 + ((bin_position(i) - y) / 4.0).exp());
        row.push((edge + rng.gauss(0.0, 0.03)).max(0.0));
    }

    // Air: a hump that drifts with the slice and fades toward the feet.
    let mu = y / AXIAL_RANGE * (AIR_BINS - 1) as f64;
    let amp = 0.2 + 0.8 * (1.0 - y / AXIAL_RANGE);
    for j in 0..AIR_BINS {
        let hump = amp * (-(j as f64 - mu).powi(2) / (2.0 * 18.0_f64.powi(2))).exp();
        row.push((hump + rng.gauss(0.0, 0.02)).max(0.0));
    }

    row
}

/// Build a flat decision tree that binary-searches the bone profile over
/// the bin range `[lo, hi]`. Children always land after their parent.
fn build_search_tree(nodes: &mut Vec<Value>, lo: usize, hi: usize) -> usize {
    if hi - lo <= 3 {
        let mid = (lo + hi) / 2;
        nodes.push(json!({ "value": bin_position(mid) }));
        return nodes.len() - 1;
    }

    let mid = (lo + hi) / 2;
    let idx = nodes.len();
    nodes.push(Value::Null); // patched below once the children exist
    let left = build_search_tree(nodes, lo, mid);
    let right = build_search_tree(nodes, mid, hi);
    // bone[mid] > 0.5 means the slice sits below this bin's position.
    nodes[idx] = json!({
        "feature": mid,
        "threshold": 0.5,
        "left": left,
        "right": right,
        "default_left": false,
    });
    idx
}

fn feature_names() -> Vec<String> {
    let bone = (0..BONE_BINS).map(|i| format!("bone_{i:03}"));
    let air = (0..AIR_BINS).map(|j| format!("air_{j:03}"));
    bone.chain(air).collect()
}

fn write_json(dir: &Path, name: &str, value: &Value) -> Result<()> {
    let path = dir.join(name);
    let text = serde_json::to_string(value).context("serializing artifact")?;
    std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))
}

fn write_parquet(dir: &Path, name: &str, schema: Arc<Schema>, batch: &RecordBatch) -> Result<()> {
    let path = dir.join(name);
    let file =
        std::fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let out_dir = args.next().unwrap_or_else(|| "artifacts".to_string());
    let n_samples: usize = args
        .next()
        .map(|s| s.parse().context("parsing n_samples"))
        .transpose()?
        .unwrap_or(240);
    let seed: u64 = args
        .next()
        .map(|s| s.parse().context("parsing seed"))
        .transpose()?
        .unwrap_or(42);

    let out_dir = Path::new(&out_dir);
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(seed);

    // ---- Held-out split ----
    let labels: Vec<f64> = (0..n_samples)
        .map(|_| rng.next_f64() * AXIAL_RANGE)
        .collect();
    let rows: Vec<Vec<f64>> = labels
        .iter()
        .map(|&y| generate_features(y, &mut rng))
        .collect();

    let names = feature_names();
    let fields: Vec<Field> = names
        .iter()
        .map(|n| Field::new(n, DataType::Float64, false))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let columns: Vec<Arc<dyn Array>> = (0..FEATURES)
        .map(|c| {
            let column: Vec<f64> = rows.iter().map(|row| row[c]).collect();
            Arc::new(Float64Array::from(column)) as Arc<dyn Array>
        })
        .collect();
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building feature batch")?;
    write_parquet(out_dir, "test_features.parquet", schema, &batch)?;

    let label_schema = Arc::new(Schema::new(vec![Field::new(
        "label",
        DataType::Float64,
        false,
    )]));
    let label_batch = RecordBatch::try_new(
        label_schema.clone(),
        vec![Arc::new(Float64Array::from(labels)) as Arc<dyn Array>],
    )
    .context("building label batch")?;
    write_parquet(out_dir, "test_labels.parquet", label_schema, &label_batch)?;

    // ---- Model: one binary-search tree over the bone profile ----
    let mut nodes = Vec::new();
    build_search_tree(&mut nodes, 0, BONE_BINS - 1);
    write_json(
        out_dir,
        "model.json",
        &json!({
            "kind": "gbdt_regressor",
            "n_features": FEATURES,
            "base_score": 0.0,
            "trees": [ { "nodes": nodes } ],
        }),
    )?;

    // ---- Preprocessing statistics from the generated matrix ----
    let mut mean = vec![0.0f64; FEATURES];
    for row in &rows {
        for (m, v) in mean.iter_mut().zip(row) {
            *m += v;
        }
    }
    for m in &mut mean {
        *m /= n_samples as f64;
    }
    let mut scale = vec![0.0f64; FEATURES];
    for row in &rows {
        for (s, (v, m)) in scale.iter_mut().zip(row.iter().zip(&mean)) {
            *s += (v - m) * (v - m);
        }
    }
    for s in &mut scale {
        *s = (*s / n_samples as f64).sqrt().max(1e-6);
    }

    write_json(out_dir, "scaler.json", &json!({ "mean": mean, "scale": scale }))?;
    write_json(
        out_dir,
        "imputer.json",
        &json!({ "strategy": "mean", "statistics": mean }),
    )?;
    write_json(out_dir, "feature_names.json", &json!(names))?;

    println!(
        "Wrote {} samples × {FEATURES} features and a {}-node search tree to {}",
        n_samples,
        nodes.len(),
        out_dir.display()
    );
    Ok(())
}
