// Domain layer: records, table rules and ports. No I/O here.

pub mod model;
pub mod password;
pub mod ports;
pub mod schema;
