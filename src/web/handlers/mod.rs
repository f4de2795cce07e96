pub mod compare;
pub mod footprint;
