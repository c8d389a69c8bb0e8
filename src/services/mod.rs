pub mod admission;
pub mod delivery;
pub mod formatting;
pub mod monitor;
pub mod novelty;
pub mod patterns;
pub mod providers;
pub mod ranking;
pub mod scoring;

pub use admission::{admit, AdmissionPolicy};
pub use monitor::{CycleReport, Monitor, MonitorSettings};
pub use novelty::{filter_new, NoveltyState, NoveltyTracker};
pub use ranking::RankingEngine;
pub use scoring::Scorer;
