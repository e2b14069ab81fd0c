mod frame_decoder;
mod health;

pub use frame_decoder::*;
pub use health::*;
