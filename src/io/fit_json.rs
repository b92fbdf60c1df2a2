//! Read/write fit record JSON files.
//!
//! A fit record is the portable representation of one run:
//! - channel window and fit configuration
//! - integrated intensity per mu
//! - coefficients per law, with the mu samples each law was fitted on
//!
//! The schema is defined by `domain::FitRecord`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::debug;

use crate::domain::{ChannelWindow, FitRecord};
use crate::error::LdError;

/// Write a fit record as pretty-printed JSON.
pub fn write_fit_json(path: &Path, record: &FitRecord) -> Result<(), LdError> {
    let file = File::create(path).map_err(|source| LdError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, record)?;
    writer.flush().map_err(|source| LdError::Io {
        path: path.display().to_string(),
        source,
    })?;

    debug!("wrote fit record for {} law(s) to {}", record.coefficients.len(), path.display());
    Ok(())
}

/// Read a fit record and re-validate its window and configuration.
pub fn read_fit_json(path: &Path) -> Result<FitRecord, LdError> {
    let file = File::open(path).map_err(|source| LdError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let record: FitRecord = serde_json::from_reader(BufReader::new(file))?;

    ChannelWindow::new(record.window.cuton_nm(), record.window.cutoff_nm())?;
    record.config.validate()?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::domain::{FitConfig, IntegratedIntensity, LawFit, LawKind, LdCoefficientFit};

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("limb-darkening-{}-{name}", std::process::id()))
    }

    fn sample_record() -> FitRecord {
        let mut laws = BTreeMap::new();
        laws.insert(
            LawKind::Linear,
            LawFit {
                coefficients: vec![0.5],
                mu_used: vec![1.0, 0.5, 0.1],
            },
        );
        FitRecord {
            tool: "limb-darkening".to_string(),
            window: ChannelWindow::new(500.0, 600.0).unwrap(),
            config: FitConfig::default(),
            integrated: IntegratedIntensity {
                mu: vec![1.0, 0.5, 0.1],
                values: vec![1.0, 0.75, 0.55],
            },
            coefficients: LdCoefficientFit::from_map(laws),
        }
    }

    #[test]
    fn written_record_reads_back() {
        let path = temp_path("roundtrip.json");
        let record = sample_record();
        write_fit_json(&path, &record).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"linear\""));

        let back = read_fit_json(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(back, record);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_fit_json(&temp_path("does-not-exist.json")).unwrap_err();
        assert!(matches!(err, LdError::Io { .. }));
    }

    #[test]
    fn invalid_window_in_file_is_rejected() {
        let path = temp_path("bad-window.json");
        let mut value = serde_json::to_value(sample_record()).unwrap();
        value["window"]["cuton_nm"] = serde_json::json!(700.0);
        std::fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();

        let err = read_fit_json(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, LdError::InvalidWindow { .. }));
    }

    #[test]
    fn malformed_json_is_json_error() {
        let path = temp_path("malformed.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = read_fit_json(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, LdError::Json(_)));
    }
}
