pub mod client;
pub mod config;
pub mod poller;
pub mod readers;
pub mod registry;
pub mod reshape;
pub mod sanitize;
pub mod sensor;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod registry_tests;

pub use client::{build_url, FetchError, HttpSource, JsonSource};
pub use config::{endpoints, ScraperConfig};
pub use poller::{PollReport, Poller};
pub use readers::{find_by_id, read_devices, read_stats, DeviceDescriptor, RefreshError};
pub use registry::discover;
pub use reshape::{Reading, ReshapeError, StateValue};
pub use sanitize::sanitize_text;
pub use sensor::{Sensor, SensorKind, SensorSnapshot};
