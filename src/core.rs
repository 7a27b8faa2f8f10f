pub mod budget;
pub mod daylight;
pub mod series;
pub mod shortfall;
