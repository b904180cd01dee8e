mod identity;
pub use identity::{TaskIdentity, TaskKey};

mod record;
pub use record::{OpenTask, TaskStatRecord};

mod pairing;
pub use pairing::PairingErrorKind;
