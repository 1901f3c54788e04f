//! JSON runtime configuration and grid-file loading for the demo tools.
//!
//! The library itself owns no file formats; these helpers exist so the
//! `align_demo` binary can be driven from a config file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::aligner::AlignParams;
use crate::field::Field;

#[derive(Clone, Default, Deserialize)]
pub struct OutputConfig {
    pub curve_json: Option<PathBuf>,
    pub corrected_json: Option<PathBuf>,
    pub background_json: Option<PathBuf>,
}

#[derive(Clone, Deserialize)]
pub struct RuntimeConfig {
    pub input_path: PathBuf,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub align_params: AlignParams,
}

pub fn load_config(path: &Path) -> Result<RuntimeConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config: RuntimeConfig = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
    Ok(config)
}

/// On-disk grid representation: row-major samples plus optional mask.
#[derive(Deserialize, Serialize)]
pub struct GridFile {
    pub xres: usize,
    pub yres: usize,
    #[serde(default = "default_spacing")]
    pub dx: f64,
    #[serde(default = "default_spacing")]
    pub dy: f64,
    pub data: Vec<f64>,
    #[serde(default)]
    pub mask: Option<Vec<f64>>,
}

fn default_spacing() -> f64 {
    1.0
}

impl GridFile {
    /// Split into a field and its optional mask grid.
    pub fn into_fields(self) -> Result<(Field, Option<Field>), String> {
        let field = Field::from_data(self.xres, self.yres, self.dx, self.dy, self.data)?;
        let mask = match self.mask {
            Some(values) => Some(Field::from_data(
                self.xres, self.yres, self.dx, self.dy, values,
            )?),
            None => None,
        };
        Ok((field, mask))
    }
}

pub fn load_grid_file(path: &Path) -> Result<(Field, Option<Field>), String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read grid {}: {e}", path.display()))?;
    let grid: GridFile = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse grid {}: {e}", path.display()))?;
    grid.into_fields()
}

pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    let contents = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize {}: {e}", path.display()))?;
    fs::write(path, contents).map_err(|e| format!("Failed to write {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::GridFile;

    #[test]
    fn grid_file_splits_into_field_and_mask() {
        let grid: GridFile = serde_json::from_str(
            r#"{"xres": 2, "yres": 1, "data": [1.0, 2.0], "mask": [1.0, 0.0]}"#,
        )
        .expect("parse");
        let (field, mask) = grid.into_fields().expect("fields");
        assert_eq!(field.dx, 1.0, "spacing defaults to 1");
        assert_eq!(field.data, vec![1.0, 2.0]);
        assert_eq!(mask.expect("mask").data, vec![1.0, 0.0]);
    }

    #[test]
    fn mismatched_mask_length_is_rejected() {
        let grid: GridFile =
            serde_json::from_str(r#"{"xres": 2, "yres": 1, "data": [1.0, 2.0], "mask": [1.0]}"#)
                .expect("parse");
        assert!(grid.into_fields().is_err());
    }
}
