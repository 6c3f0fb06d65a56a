/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Minimum time-slice count to use slice-level Rayon parallelism.
pub const PARALLEL_SLICE_THRESHOLD: usize = 4;
