pub mod decode;
pub mod encoder;
pub mod model;
