use row_align::{AlignMethod, AlignParams, Field, RowAligner};

fn main() {
    // Demo stub: builds a synthetic grid with per-row drift and removes it
    let xres = 256usize;
    let yres = 256usize;
    let mut field = Field::new(xres, yres, 1.0, 1.0);
    for y in 0..yres {
        let drift = 0.02 * (y as f64 * 0.31).sin();
        let row = field.row_mut(y);
        for (x, v) in row.iter_mut().enumerate() {
            let surface = (x as f64 * 0.05).cos();
            *v = surface + drift;
        }
    }

    let aligner = RowAligner::new(AlignParams {
        method: AlignMethod::Median,
        ..Default::default()
    });
    match aligner.align(&mut field, None) {
        Ok(report) => println!(
            "lanes={} degenerate={} removed_mean={:.3e}",
            report.diagnostics.lanes,
            report.diagnostics.degenerate_lanes,
            report.diagnostics.mean_shift_removed
        ),
        Err(err) => eprintln!("Error: {err}"),
    }
}
