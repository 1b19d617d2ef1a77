mod pipeline;

pub use pipeline::{produce_forecast, produce_forecast_with_defaults};
