//! Simulation parameters for scene generation and stepping.

/// Canvas extents and generation ranges for a run.
///
/// Extents are in pixels; one tick advances positions by one velocity unit,
/// so speeds are pixels per tick.
#[derive(Clone, Copy, Debug)]
pub struct SimParams {
    /// Canvas width the atoms bounce in.
    pub width: f64,
    /// Canvas height.
    pub height: f64,
    /// Minimum generated radius.
    pub r_min: f64,
    /// Maximum generated radius.
    pub r_max: f64,
    /// Minimum generated speed magnitude.
    pub v_min: f64,
    /// Maximum generated speed magnitude.
    pub v_max: f64,
    /// Placement draws allowed per atom before the scene counts as too dense.
    pub placement_attempts: u32,
    /// Atom count when no initial-state file is given.
    pub default_count: usize,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 480.0,
            r_min: 10.0,
            r_max: 30.0,
            v_min: 1.0,
            v_max: 5.0,
            placement_attempts: 3,
            default_count: 10,
        }
    }
}
