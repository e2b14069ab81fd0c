pub mod hosted;
pub mod local;
mod orchestrator;

pub use hosted::Hosted;
pub use local::Local;
pub use orchestrator::*;

use crate::domain::models::BackendBox;
use crate::domain::models::BackendName;

pub struct BackendManager {}

impl BackendManager {
    pub fn get(name: BackendName) -> BackendBox {
        if name == BackendName::Local {
            return Box::<Local>::default();
        }

        return Box::<Hosted>::default();
    }
}
