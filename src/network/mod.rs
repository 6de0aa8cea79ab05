pub mod network;
pub mod spec;

pub use network::{ForwardTrace, Gradients, Layer, Network};
pub use spec::{LayerSpec, NetworkSpec};
