mod commands;
mod driver;
mod pump;

pub(crate) use driver::HarnessDriver;
pub use pump::{HarnessLinePump, NoopLinePump};
