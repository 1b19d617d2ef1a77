pub mod fitter;
pub mod optimizer;
pub mod smoothing;

pub use fitter::{fit, FitOptions, FittedModel};
pub use smoothing::{SmoothingModel, SmoothingParams, SmoothingState};
