mod common;

use common::synthetic_field::{constant_rows, noise_field, wavy_profile};
use row_align::{
    AlignMethod, AlignParams, Direction, Field, MaskingPolicy, ParallelOptions, RowAligner,
};

fn params(method: AlignMethod) -> AlignParams {
    AlignParams {
        method,
        ..Default::default()
    }
}

#[test]
fn median_collapses_flat_rows_onto_the_grid_mean() {
    // Rows at constant levels 0..3; the estimated levels are 0..3, the
    // zero-mean curve is [-1.5, -0.5, 0.5, 1.5], and subtracting it leaves
    // every row at the preserved grid mean 1.5.
    let mut field = constant_rows(4, &[0.0, 1.0, 2.0, 3.0]);
    let report = RowAligner::new(params(AlignMethod::Median))
        .align(&mut field, None)
        .unwrap();

    assert_eq!(report.shifts.values, vec![-1.5, -0.5, 0.5, 1.5]);
    assert_eq!(report.diagnostics.mean_shift_removed, 1.5);
    for &v in &field.data {
        assert_eq!(v, 1.5);
    }
    // The background carries exactly what was removed.
    for y in 0..4 {
        for &b in report.background.row(y) {
            assert_eq!(b, report.shifts.values[y]);
        }
    }
}

#[test]
fn median_is_trimmed_mean_with_half_trim() {
    let reference = noise_field(31, 17);

    let mut by_median = reference.clone();
    let median_report = RowAligner::new(params(AlignMethod::Median))
        .align(&mut by_median, None)
        .unwrap();

    let mut by_trim = reference.clone();
    let trim_report = RowAligner::new(AlignParams {
        method: AlignMethod::TrimmedMean,
        trim_fraction: 0.5,
        ..Default::default()
    })
    .align(&mut by_trim, None)
    .unwrap();

    assert_eq!(by_median.data, by_trim.data);
    assert_eq!(median_report.shifts, trim_report.shifts);
}

#[test]
fn degree_zero_polynomial_matches_plain_mean() {
    let reference = noise_field(24, 12);

    let mut by_mean = reference.clone();
    RowAligner::new(AlignParams {
        method: AlignMethod::TrimmedMean,
        trim_fraction: 0.0,
        ..Default::default()
    })
    .align(&mut by_mean, None)
    .unwrap();

    let mut by_poly = reference.clone();
    let poly_report = RowAligner::new(AlignParams {
        method: AlignMethod::Polynomial,
        degree: 0,
        ..Default::default()
    })
    .align(&mut by_poly, None)
    .unwrap();

    assert_eq!(poly_report.diagnostics.singular_fits, 0);
    for (a, b) in by_mean.data.iter().zip(by_poly.data.iter()) {
        assert!((a - b).abs() < 1e-9, "{a} vs {b}");
    }
}

#[test]
fn fully_masked_row_is_left_untouched() {
    let methods = [
        AlignMethod::Median,
        AlignMethod::TrimmedMean,
        AlignMethod::Modus,
        AlignMethod::Polynomial,
    ];
    for method in methods {
        let offsets = [0.4, 7.0, -0.2, 0.1, 0.3];
        let mut field = common::synthetic_field::drifting_profile(32, &offsets, wavy_profile);
        let original_row: Vec<f64> = field.row(1).to_vec();

        let mut mask_data = vec![1.0; 32 * 5];
        for m in mask_data.iter_mut().skip(32).take(32) {
            *m = 0.0;
        }
        let mask = Field::from_data(32, 5, 1.0, 1.0, mask_data).unwrap();

        let report = RowAligner::new(AlignParams {
            method,
            masking: MaskingPolicy::Include,
            ..Default::default()
        })
        .align(&mut field, Some(&mask))
        .unwrap();

        assert_eq!(
            report.shifts.values[1], 0.0,
            "{method:?}: masked row must get shift 0"
        );
        assert!(!report.shifts.valid[1], "{method:?}");
        assert_eq!(report.diagnostics.degenerate_lanes, 1, "{method:?}");
        assert_eq!(field.row(1), &original_row[..], "{method:?}");
        assert!(
            field.data.iter().all(|v| v.is_finite()),
            "{method:?}: corrected grid must stay finite"
        );
        assert!(
            report.background.data.iter().all(|v| v.is_finite()),
            "{method:?}: background must stay finite"
        );
    }
}

#[test]
fn pairwise_methods_survive_a_fully_masked_row() {
    for method in [AlignMethod::Match, AlignMethod::MedianOfDifferences] {
        let mut field = constant_rows(16, &[0.0, 1.0, 2.0, 3.0]);
        let mut mask_data = vec![1.0; 16 * 4];
        for m in mask_data.iter_mut().skip(16).take(16) {
            *m = 0.0;
        }
        let mask = Field::from_data(16, 4, 1.0, 1.0, mask_data).unwrap();

        let report = RowAligner::new(AlignParams {
            method,
            masking: MaskingPolicy::Include,
            ..Default::default()
        })
        .align(&mut field, Some(&mask))
        .unwrap();

        // Both pairs touching the masked row carry no weight.
        assert_eq!(report.diagnostics.zero_weight_pairs, 2, "{method:?}");
        assert!(field.data.iter().all(|v| v.is_finite()), "{method:?}");
        // The surviving pair (rows 2->3) is still corrected.
        let step = field.get(0, 3) - field.get(0, 2);
        assert!(step.abs() < 1e-12, "{method:?}: residual step {step}");
    }
}

#[test]
fn facet_tilt_reports_an_identity_curve() {
    let xres = 48;
    let mut field = Field::new(xres, 6, 1.0, 1.0);
    for y in 0..6 {
        let slope = 0.1 * (y as f64 + 1.0);
        let row = field.row_mut(y);
        for (x, v) in row.iter_mut().enumerate() {
            *v = slope * x as f64;
        }
    }

    let report = RowAligner::new(params(AlignMethod::FacetTilt))
        .align(&mut field, None)
        .unwrap();

    assert!(report.shifts.values.iter().all(|&v| v == 0.0));
    assert_eq!(report.diagnostics.mean_shift_removed, 0.0);
    // Every row is flattened even though the curve is empty of information.
    for y in 0..6 {
        let row = field.row(y);
        let span = row.iter().fold(f64::NEG_INFINITY, |m, v| m.max(*v))
            - row.iter().fold(f64::INFINITY, |m, v| m.min(*v));
        assert!(span < 1e-9, "row {y} span {span}");
    }
}

#[test]
fn parallel_and_sequential_paths_agree() {
    let methods = [
        AlignMethod::Median,
        AlignMethod::Match,
        AlignMethod::Modus,
        AlignMethod::Polynomial,
        AlignMethod::FacetTilt,
    ];
    for method in methods {
        let reference = noise_field(40, 70);

        let mut sequential = reference.clone();
        let seq_report = RowAligner::new(AlignParams {
            method,
            parallel: ParallelOptions::disabled(),
            ..Default::default()
        })
        .align(&mut sequential, None)
        .unwrap();

        let mut parallel = reference.clone();
        let par_report = RowAligner::new(AlignParams {
            method,
            parallel: ParallelOptions::new(true, 1),
            ..Default::default()
        })
        .align(&mut parallel, None)
        .unwrap();

        assert_eq!(sequential.data, parallel.data, "{method:?}");
        assert_eq!(seq_report.shifts, par_report.shifts, "{method:?}");
    }
}

#[test]
fn column_direction_removes_column_drift() {
    // Transposed drift: each column has its own baseline.
    let col_offsets = [0.5, -0.25, 0.0, 1.0, -0.5, 0.25];
    let mut field = Field::new(6, 20, 1.0, 1.0);
    for y in 0..20 {
        let row_profile = (0.3 * y as f64).cos();
        for x in 0..6 {
            field.set(x, y, row_profile + col_offsets[x]);
        }
    }

    let report = RowAligner::new(AlignParams {
        method: AlignMethod::Median,
        direction: Direction::Columns,
        ..Default::default()
    })
    .align(&mut field, None)
    .unwrap();

    assert_eq!(report.shifts.len(), 6);
    let mean_offset = col_offsets.iter().sum::<f64>() / 6.0;
    for (x, &offset) in col_offsets.iter().enumerate() {
        let expected = offset - mean_offset;
        assert!(
            (report.shifts.values[x] - expected).abs() < 1e-12,
            "column {x}: {} vs {expected}",
            report.shifts.values[x]
        );
    }
    // All columns now carry the same profile.
    for y in 0..20 {
        for x in 1..6 {
            assert!((field.get(x, y) - field.get(0, y)).abs() < 1e-12);
        }
    }
}
