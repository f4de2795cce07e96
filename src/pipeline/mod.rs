// Correlation pipeline: footprint and comparison requests.

pub mod correlator;

pub use correlator::{
    ComparisonReport, Correlator, CorrelatorSettings, FootprintReport, FootprintRequest,
    FootprintTarget,
};
