// Adapters layer: concrete transports behind the domain ports.

pub mod ssh;
