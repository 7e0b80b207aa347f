//! Domain models shared across CiteForge crates

mod analysis;
mod paper;

pub use analysis::{ClusteringStrategy, Direction};
pub use paper::{FetchedPaper, PublicationRecord};
