pub mod prober;

pub use prober::{DestinationProber, HttpProber, ProbeOutcome};
