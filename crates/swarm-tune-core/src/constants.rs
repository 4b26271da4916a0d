/// Number of coefficients in a genetic string: three interaction weights plus
/// two magnitudes and two decay rates for each of the three interaction kinds.
pub const COEFFICIENT_COUNT: usize = 15;

/// Upper limit on `ceil(max_flight_time / dt)`. Keeps trajectory buffers bounded.
pub const MAX_STEP_BUDGET: usize = 1_000_000;

/// Relative slack used when turning `max_flight_time / dt` into a step count,
/// so that ratios like 60 / 0.2 land on 300 instead of 301.
pub const STEP_BUDGET_TOLERANCE: f64 = 1e-9;
