pub use beacon_core::model::{RoomId, SignalId, UserId};

pub mod model {
    pub use beacon_core::model::*;
}

pub mod wire {
    pub use beacon_core::wire::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use beacon_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use beacon_client::*;
}
