//! Brightness and weather collaborators used by the search engine and the
//! scoring pipeline.

pub mod brightness;
pub mod cache;
pub mod client;
pub mod error;
pub mod provider;
pub mod weather;

pub use brightness::{BrightnessInfo, BrightnessLookup, DummyBrightness, HttpBrightnessClient};
pub use cache::{CachedBrightness, CachedWeather};
pub use error::LookupError;
pub use provider::{brightness_from_config, weather_from_config};
pub use weather::{DummyWeather, HttpWeatherClient, WeatherLookup};
