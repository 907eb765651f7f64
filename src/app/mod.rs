// Application layer: wires configuration and adapters into runnable pipelines.

pub mod runner;
