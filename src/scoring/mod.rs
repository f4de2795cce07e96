// Scoring: exposure index and impersonation likelihood.

pub mod exposure;
pub mod impersonation;
