// meraki-exporter: HTTP surface and Prometheus rendering on top of meraki-core.

pub mod exposition;
pub mod routes;

pub use exposition::{CONTENT_TYPE, Exposition, Family};
pub use routes::app;
