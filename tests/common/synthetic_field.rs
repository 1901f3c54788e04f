use row_align::Field;

/// Grid built as `profile(x) + offsets[y]`: a fixed lateral profile with a
/// known independent baseline per row.
pub fn drifting_profile<F>(xres: usize, offsets: &[f64], profile: F) -> Field
where
    F: Fn(usize) -> f64,
{
    assert!(xres > 0 && !offsets.is_empty(), "grid must be non-empty");

    let mut field = Field::new(xres, offsets.len(), 1.0, 1.0);
    for (y, &offset) in offsets.iter().enumerate() {
        let row = field.row_mut(y);
        for (x, v) in row.iter_mut().enumerate() {
            *v = profile(x) + offset;
        }
    }
    field
}

/// Grid whose rows are constant at the given levels.
pub fn constant_rows(xres: usize, levels: &[f64]) -> Field {
    drifting_profile(xres, levels, |_| 0.0)
}

/// A smooth but clearly non-trivial lateral profile.
pub fn wavy_profile(x: usize) -> f64 {
    (0.2 * x as f64).sin() + 0.03 * x as f64
}

/// Deterministic pseudo-random samples in roughly [-1, 1].
pub fn noise_field(xres: usize, yres: usize) -> Field {
    let mut field = Field::new(xres, yres, 1.0, 1.0);
    let mut state = 0x9e3779b97f4a7c15u64;
    for v in field.data.iter_mut() {
        // xorshift; keeps the fixture free of RNG dependencies
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        *v = (state >> 11) as f64 / (1u64 << 52) as f64 - 1.0;
    }
    field
}
