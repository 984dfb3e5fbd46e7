// Domain layer: value types and ports. Nothing here touches the filesystem.

pub mod amount;
pub mod fiscal_year;
pub mod model;
pub mod ports;
