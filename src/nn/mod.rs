//! Neural network layers built on the message passing primitive

mod conv;
mod convcxn_layer;

pub use conv::Conv;
pub use convcxn_layer::ConvCxnLayer;
