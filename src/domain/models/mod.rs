mod backend;
mod chunk;
mod conversation;
mod error;
mod event;
mod message;
mod qna;
mod role;

pub use backend::*;
pub use chunk::*;
pub use conversation::*;
pub use error::*;
pub use event::*;
pub use message::*;
pub use qna::*;
pub use role::*;
