pub(crate) mod bootstrap;
mod breach;
mod harness_port;
pub(crate) mod loop_runner;
