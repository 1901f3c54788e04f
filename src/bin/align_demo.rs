use std::env;
use std::path::Path;

use row_align::config::{load_config, load_grid_file, write_json_file};
use row_align::RowAligner;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    let config_path = args
        .get(1)
        .ok_or_else(|| "usage: align_demo <config.json>".to_string())?;
    let config = load_config(Path::new(config_path))?;

    let (mut field, mask) = load_grid_file(&config.input_path)?;
    let aligner = RowAligner::new(config.align_params.clone());
    let report = aligner.align(&mut field, mask.as_ref())?;

    println!(
        "aligned {} lanes: degenerate={} singular={} zero_weight_pairs={} unconverged={} removed_mean={:.6e}",
        report.diagnostics.lanes,
        report.diagnostics.degenerate_lanes,
        report.diagnostics.singular_fits,
        report.diagnostics.zero_weight_pairs,
        report.diagnostics.unconverged_lanes,
        report.diagnostics.mean_shift_removed,
    );

    if let Some(path) = &config.output.curve_json {
        write_json_file(path, &report.shifts)?;
    }
    if let Some(path) = &config.output.corrected_json {
        write_json_file(path, &field)?;
    }
    if let Some(path) = &config.output.background_json {
        write_json_file(path, &report.background)?;
    }
    Ok(())
}
