//! Core types and utilities

pub mod environment;
pub mod fire_point;
pub mod units;

pub use environment::{
    parse_leading_integer, EnvironmentFields, EnvironmentalReader, EnvironmentalSnapshot,
    WindDirection,
};
pub use fire_point::{FirePoint, PointGeneration};
pub use units::{Celsius, KilometersPerHour, Percent};
