pub mod encoder;
pub mod pipeline;
pub mod registry;
pub mod single;
