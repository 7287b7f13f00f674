mod messages;
mod relay;
mod rooms;

pub use messages::*;
pub use relay::*;
pub use rooms::*;
