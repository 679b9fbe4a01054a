pub mod domain;
pub mod intent;
pub mod ports;

pub use domain::{ChatRole, ChatTurn, User, UserCredentials};
pub use intent::{classify, Intent};
pub use ports::{GenerationService, PortError, PortResult, UserStore};
