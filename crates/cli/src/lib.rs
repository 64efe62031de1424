//! Library side of the `concord` binary. Export lives here so the
//! end-to-end pipeline test can drive it without spawning a process.

pub mod export;
