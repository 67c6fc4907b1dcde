pub const MIN_OVERLAP: usize = 2;
pub const NSCALE: f64 = 1.;
pub const MIN_POSERR: f64 = 1e-9;
pub const EPSILON: f64 = 1e-6;
pub const MAX_ITER: usize = 10_000;
pub const N_STARTS: usize = 1;
pub const SEED: u64 = 0;
pub const MAXSTACK: usize = 100;
pub const BIAS_BOUNDS: (f64, f64) = (-5., 5.);
pub const STRETCH_BOUNDS: (f64, f64) = (0.8, 1.2);
pub const DEFAULT_STRETCH: f64 = 1.;
pub const MAX_KPERMS: usize = 5040;
pub const MAX_CYCLES: usize = 20;
//Relative spread of random restarts, in units of each prior's scale.
pub const RESTART_SPREAD: f64 = 3.;
