use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, Float32Array, Float64Array};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::de::DeserializeOwned;

use crate::data::bundle::{ArtifactBundle, FeatureMatrix, AXIAL_RANGE, FEATURE_COUNT};
use crate::error::ArtifactError;
use crate::inference::transform::{Imputer, StandardScaler};
use crate::inference::ModelArtifact;

// ---------------------------------------------------------------------------
// Artifact names (fixed by convention with the training pipeline)
// ---------------------------------------------------------------------------

pub const MODEL_FILE: &str = "model.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const IMPUTER_FILE: &str = "imputer.json";
pub const FEATURE_NAMES_FILE: &str = "feature_names.json";
/// Held-out split files are a stem plus `.parquet` or `.csv`.
pub const FEATURES_STEM: &str = "test_features";
pub const LABELS_STEM: &str = "test_labels";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the six-artifact bundle from one directory.
///
/// Called once at startup (and again only when the operator points the
/// session at a different bundle directory). Any missing file or shape
/// violation is an error; the caller decides whether that is fatal.
pub fn load_bundle(dir: &Path) -> Result<ArtifactBundle, ArtifactError> {
    let model_artifact: ModelArtifact = read_json(dir, MODEL_FILE)?;
    model_artifact
        .validate()
        .map_err(|reason| ArtifactError::corrupt(MODEL_FILE, reason))?;
    let model = model_artifact.into_regressor();

    let scaler: StandardScaler = read_json(dir, SCALER_FILE)?;
    let imputer: Imputer = read_json(dir, IMPUTER_FILE)?;
    let feature_names: Vec<String> = read_json(dir, FEATURE_NAMES_FILE)?;

    if feature_names.len() != FEATURE_COUNT {
        return Err(ArtifactError::corrupt(
            FEATURE_NAMES_FILE,
            format!("holds {} names, expected {FEATURE_COUNT}", feature_names.len()),
        ));
    }
    if model.n_features() != FEATURE_COUNT {
        return Err(ArtifactError::corrupt(
            MODEL_FILE,
            format!("model arity is {}, expected {FEATURE_COUNT}", model.n_features()),
        ));
    }
    scaler
        .validate(FEATURE_COUNT)
        .map_err(|reason| ArtifactError::corrupt(SCALER_FILE, reason))?;
    imputer
        .validate(FEATURE_COUNT)
        .map_err(|reason| ArtifactError::corrupt(IMPUTER_FILE, reason))?;

    let features = load_features(&resolve_split(dir, FEATURES_STEM)?, &feature_names)?;
    let labels = load_labels(&resolve_split(dir, LABELS_STEM)?)?;

    if features.rows() == 0 {
        return Err(ArtifactError::corrupt(FEATURES_STEM, "test set is empty"));
    }
    if labels.len() != features.rows() {
        return Err(ArtifactError::corrupt(
            LABELS_STEM,
            format!(
                "{} labels for {} feature rows",
                labels.len(),
                features.rows()
            ),
        ));
    }

    let outside = labels
        .iter()
        .filter(|l| **l < 0.0 || **l > AXIAL_RANGE)
        .count();
    if outside > 0 {
        log::warn!("{outside} label(s) fall outside the nominal [0, {AXIAL_RANGE}] axial range");
    }

    log::info!(
        "Loaded bundle from {}: {} samples × {} features, {}",
        dir.display(),
        features.rows(),
        features.cols(),
        model.describe()
    );

    Ok(ArtifactBundle {
        model,
        scaler,
        imputer,
        feature_names,
        features,
        labels,
    })
}

// ---------------------------------------------------------------------------
// JSON artifacts
// ---------------------------------------------------------------------------

fn read_json<T: DeserializeOwned>(dir: &Path, name: &'static str) -> Result<T, ArtifactError> {
    let path = dir.join(name);
    if !path.is_file() {
        return Err(ArtifactError::Missing {
            name,
            dir: dir.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(&path)
        .map_err(|e| ArtifactError::corrupt(name, e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| ArtifactError::corrupt(name, e.to_string()))
}

/// Find `<stem>.parquet` or `<stem>.csv` under `dir`.
fn resolve_split(dir: &Path, stem: &'static str) -> Result<PathBuf, ArtifactError> {
    for ext in ["parquet", "csv"] {
        let candidate = dir.join(format!("{stem}.{ext}"));
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    Err(ArtifactError::Missing {
        name: stem,
        dir: dir.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Held-out feature matrix
// ---------------------------------------------------------------------------

fn load_features(path: &Path, feature_names: &[String]) -> Result<FeatureMatrix, ArtifactError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "parquet" => load_features_parquet(path, feature_names),
        "csv" => load_features_csv(path, feature_names),
        other => Err(ArtifactError::corrupt(
            FEATURES_STEM,
            format!("unsupported extension .{other}"),
        )),
    }
}

/// Expected Parquet schema: one Float64 (or Float32) column per feature,
/// named and ordered exactly like `feature_names.json`.
fn load_features_parquet(
    path: &Path,
    feature_names: &[String],
) -> Result<FeatureMatrix, ArtifactError> {
    let file = std::fs::File::open(path)
        .map_err(|e| ArtifactError::corrupt(FEATURES_STEM, e.to_string()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| ArtifactError::corrupt(FEATURES_STEM, e.to_string()))?;

    let schema = builder.schema().clone();
    let columns: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    check_columns(FEATURES_STEM, &columns, feature_names)?;

    let reader = builder
        .build()
        .map_err(|e| ArtifactError::corrupt(FEATURES_STEM, e.to_string()))?;

    let mut data = Vec::new();
    let mut rows = 0usize;
    for batch_result in reader {
        let batch =
            batch_result.map_err(|e| ArtifactError::corrupt(FEATURES_STEM, e.to_string()))?;
        let n_rows = batch.num_rows();

        // Pull every column out as f64 once, then interleave row-major.
        let mut cols = Vec::with_capacity(batch.num_columns());
        for (c, col) in batch.columns().iter().enumerate() {
            cols.push(column_as_f64(col).ok_or_else(|| {
                ArtifactError::corrupt(
                    FEATURES_STEM,
                    format!(
                        "column `{}` has type {:?}, expected Float64 or Float32",
                        feature_names[c],
                        col.data_type()
                    ),
                )
            })?);
        }
        for row in 0..n_rows {
            for col in &cols {
                data.push(col[row]);
            }
        }
        rows += n_rows;
    }

    FeatureMatrix::from_rows(rows, feature_names.len(), data)
        .map_err(|reason| ArtifactError::corrupt(FEATURES_STEM, reason))
}

/// CSV layout: a header row holding the feature names, then one sample
/// per row with plain float cells.
fn load_features_csv(
    path: &Path,
    feature_names: &[String],
) -> Result<FeatureMatrix, ArtifactError> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| ArtifactError::corrupt(FEATURES_STEM, e.to_string()))?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ArtifactError::corrupt(FEATURES_STEM, e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
    check_columns(FEATURES_STEM, &header_refs, feature_names)?;

    let mut data = Vec::new();
    let mut rows = 0usize;
    for (row_no, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| ArtifactError::corrupt(FEATURES_STEM, e.to_string()))?;
        if record.len() != feature_names.len() {
            return Err(ArtifactError::corrupt(
                FEATURES_STEM,
                format!(
                    "row {row_no} holds {} cells, expected {}",
                    record.len(),
                    feature_names.len()
                ),
            ));
        }
        for (j, cell) in record.iter().enumerate() {
            let value = cell.trim().parse::<f64>().map_err(|_| {
                ArtifactError::corrupt(
                    FEATURES_STEM,
                    format!("row {row_no}, column {j}: `{cell}` is not a number"),
                )
            })?;
            data.push(value);
        }
        rows += 1;
    }

    FeatureMatrix::from_rows(rows, feature_names.len(), data)
        .map_err(|reason| ArtifactError::corrupt(FEATURES_STEM, reason))
}

fn check_columns(
    name: &'static str,
    found: &[&str],
    expected: &[String],
) -> Result<(), ArtifactError> {
    if found.len() != expected.len() {
        return Err(ArtifactError::corrupt(
            name,
            format!("has {} columns, expected {}", found.len(), expected.len()),
        ));
    }
    for (i, (have, want)) in found.iter().zip(expected).enumerate() {
        if *have != want.as_str() {
            return Err(ArtifactError::corrupt(
                name,
                format!("column {i} is `{have}`, expected `{want}`"),
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Held-out labels
// ---------------------------------------------------------------------------

fn load_labels(path: &Path) -> Result<Vec<f64>, ArtifactError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "parquet" => load_labels_parquet(path),
        "csv" => load_labels_csv(path),
        other => Err(ArtifactError::corrupt(
            LABELS_STEM,
            format!("unsupported extension .{other}"),
        )),
    }
}

/// Expected Parquet schema: a single float column.
fn load_labels_parquet(path: &Path) -> Result<Vec<f64>, ArtifactError> {
    let file = std::fs::File::open(path)
        .map_err(|e| ArtifactError::corrupt(LABELS_STEM, e.to_string()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| ArtifactError::corrupt(LABELS_STEM, e.to_string()))?;

    if builder.schema().fields().len() != 1 {
        return Err(ArtifactError::corrupt(
            LABELS_STEM,
            format!(
                "has {} columns, expected a single label column",
                builder.schema().fields().len()
            ),
        ));
    }

    let reader = builder
        .build()
        .map_err(|e| ArtifactError::corrupt(LABELS_STEM, e.to_string()))?;

    let mut labels = Vec::new();
    for batch_result in reader {
        let batch =
            batch_result.map_err(|e| ArtifactError::corrupt(LABELS_STEM, e.to_string()))?;
        let col = batch.column(0);
        let values = column_as_f64(col).ok_or_else(|| {
            ArtifactError::corrupt(
                LABELS_STEM,
                format!(
                    "label column has type {:?}, expected Float64 or Float32",
                    col.data_type()
                ),
            )
        })?;
        labels.extend(values);
    }
    Ok(labels)
}

/// CSV layout: a one-column file with a header row.
fn load_labels_csv(path: &Path) -> Result<Vec<f64>, ArtifactError> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| ArtifactError::corrupt(LABELS_STEM, e.to_string()))?;

    let mut labels = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| ArtifactError::corrupt(LABELS_STEM, e.to_string()))?;
        let cell = record.get(0).unwrap_or("");
        let value = cell.trim().parse::<f64>().map_err(|_| {
            ArtifactError::corrupt(
                LABELS_STEM,
                format!("row {row_no}: `{cell}` is not a number"),
            )
        })?;
        labels.push(value);
    }
    Ok(labels)
}

// -- Arrow helpers --

/// Read a whole Arrow column as `f64`, accepting Float64 or Float32.
fn column_as_f64(col: &Arc<dyn Array>) -> Option<Vec<f64>> {
    if let Some(arr) = col.as_any().downcast_ref::<Float64Array>() {
        Some(arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    } else if let Some(arr) = col.as_any().downcast_ref::<Float32Array>() {
        Some(arr.iter().map(|v| v.unwrap_or(f32::NAN) as f64).collect())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::Path;

    use super::*;
    use crate::data::testutil;

    fn write_json(dir: &Path, name: &str, value: serde_json::Value) {
        let mut f = std::fs::File::create(dir.join(name)).expect("create");
        write!(f, "{value}").expect("write");
    }

    /// A complete, valid CSV-format bundle with `labels.len()` samples.
    fn write_bundle(dir: &Path, labels: &[f64]) {
        let names = testutil::feature_names();

        write_json(
            dir,
            MODEL_FILE,
            serde_json::json!({
                "kind": "linear_regressor",
                "intercept": 42.0,
                "weights": vec![0.0; FEATURE_COUNT],
            }),
        );
        write_json(
            dir,
            SCALER_FILE,
            serde_json::json!({
                "mean": vec![0.0; FEATURE_COUNT],
                "scale": vec![1.0; FEATURE_COUNT],
            }),
        );
        write_json(
            dir,
            IMPUTER_FILE,
            serde_json::json!({
                "strategy": "mean",
                "statistics": vec![0.0; FEATURE_COUNT],
            }),
        );
        write_json(dir, FEATURE_NAMES_FILE, serde_json::json!(names));

        let mut features = std::fs::File::create(dir.join("test_features.csv")).expect("create");
        writeln!(features, "{}", names.join(",")).expect("header");
        for _ in labels {
            let row: Vec<String> = (0..FEATURE_COUNT).map(|j| format!("{}.0", j)).collect();
            writeln!(features, "{}", row.join(",")).expect("row");
        }

        let mut label_file = std::fs::File::create(dir.join("test_labels.csv")).expect("create");
        writeln!(label_file, "label").expect("header");
        for l in labels {
            writeln!(label_file, "{l}").expect("row");
        }
    }

    #[test]
    fn valid_bundle_loads() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_bundle(dir.path(), &[10.0, 170.0]);

        let bundle = load_bundle(dir.path()).expect("load");
        assert_eq!(bundle.len(), 2);
        assert_eq!(bundle.feature_names.len(), FEATURE_COUNT);
        assert_eq!(bundle.labels, vec![10.0, 170.0]);
        // Linear model with zero weights: intercept comes straight through.
        let sample = bundle.sample(0).expect("sample");
        assert_eq!(bundle.model.infer(sample.features).unwrap(), 42.0);
    }

    #[test]
    fn each_missing_artifact_is_reported_by_name() {
        for victim in [
            MODEL_FILE,
            SCALER_FILE,
            IMPUTER_FILE,
            FEATURE_NAMES_FILE,
            "test_features.csv",
            "test_labels.csv",
        ] {
            let dir = tempfile::tempdir().expect("tempdir");
            write_bundle(dir.path(), &[10.0]);
            std::fs::remove_file(dir.path().join(victim)).expect("remove");

            match load_bundle(dir.path()) {
                Err(ArtifactError::Missing { name, .. }) => {
                    assert!(victim.starts_with(name), "victim {victim}, reported {name}");
                }
                other => panic!("expected Missing for {victim}, got {other:?}"),
            }
        }
    }

    #[test]
    fn wrong_feature_column_count_is_corrupt() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_bundle(dir.path(), &[10.0]);

        let mut f = std::fs::File::create(dir.path().join("test_features.csv")).expect("create");
        writeln!(f, "a,b,c").expect("header");
        writeln!(f, "1.0,2.0,3.0").expect("row");

        match load_bundle(dir.path()) {
            Err(ArtifactError::Corrupt { name, reason }) => {
                assert_eq!(name, FEATURES_STEM);
                assert!(reason.contains("3 columns"), "reason: {reason}");
            }
            other => panic!("expected Corrupt, got {other:?}"),
        }
    }

    #[test]
    fn label_count_mismatch_is_corrupt() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_bundle(dir.path(), &[10.0, 20.0]);

        let mut f = std::fs::File::create(dir.path().join("test_labels.csv")).expect("create");
        writeln!(f, "label").expect("header");
        writeln!(f, "10.0").expect("row");

        match load_bundle(dir.path()) {
            Err(ArtifactError::Corrupt { name, .. }) => assert_eq!(name, LABELS_STEM),
            other => panic!("expected Corrupt, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_model_json_is_corrupt() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_bundle(dir.path(), &[10.0]);
        std::fs::write(dir.path().join(MODEL_FILE), "{ not json").expect("write");

        match load_bundle(dir.path()) {
            Err(ArtifactError::Corrupt { name, .. }) => assert_eq!(name, MODEL_FILE),
            other => panic!("expected Corrupt, got {other:?}"),
        }
    }

    #[test]
    fn short_feature_name_list_is_corrupt() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_bundle(dir.path(), &[10.0]);
        write_json(
            dir.path(),
            FEATURE_NAMES_FILE,
            serde_json::json!(["only", "three", "names"]),
        );

        match load_bundle(dir.path()) {
            Err(ArtifactError::Corrupt { name, .. }) => assert_eq!(name, FEATURE_NAMES_FILE),
            other => panic!("expected Corrupt, got {other:?}"),
        }
    }

    #[test]
    fn parquet_split_loads() {
        use arrow::array::Float64Array;
        use arrow::datatypes::{DataType, Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let dir = tempfile::tempdir().expect("tempdir");
        write_bundle(dir.path(), &[10.0, 20.0]);
        std::fs::remove_file(dir.path().join("test_features.csv")).expect("remove");
        std::fs::remove_file(dir.path().join("test_labels.csv")).expect("remove");

        let names = testutil::feature_names();
        let fields: Vec<Field> = names
            .iter()
            .map(|n| Field::new(n, DataType::Float64, false))
            .collect();
        let schema = std::sync::Arc::new(Schema::new(fields));
        let columns: Vec<std::sync::Arc<dyn Array>> = (0..FEATURE_COUNT)
            .map(|j| {
                std::sync::Arc::new(Float64Array::from(vec![j as f64, j as f64 + 0.5]))
                    as std::sync::Arc<dyn Array>
            })
            .collect();
        let batch = RecordBatch::try_new(schema.clone(), columns).expect("batch");
        let file = std::fs::File::create(dir.path().join("test_features.parquet")).expect("create");
        let mut writer = ArrowWriter::try_new(file, schema, None).expect("writer");
        writer.write(&batch).expect("write");
        writer.close().expect("close");

        let label_schema = std::sync::Arc::new(Schema::new(vec![Field::new(
            "label",
            DataType::Float64,
            false,
        )]));
        let label_batch = RecordBatch::try_new(
            label_schema.clone(),
            vec![std::sync::Arc::new(Float64Array::from(vec![10.0, 20.0]))
                as std::sync::Arc<dyn Array>],
        )
        .expect("batch");
        let file = std::fs::File::create(dir.path().join("test_labels.parquet")).expect("create");
        let mut writer = ArrowWriter::try_new(file, label_schema, None).expect("writer");
        writer.write(&label_batch).expect("write");
        writer.close().expect("close");

        let bundle = load_bundle(dir.path()).expect("load");
        assert_eq!(bundle.len(), 2);
        let sample = bundle.sample(1).expect("sample");
        assert_eq!(sample.features[0], 0.5);
        assert_eq!(sample.features[383], 383.5);
    }
}
