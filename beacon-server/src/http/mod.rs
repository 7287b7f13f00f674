mod extract;
mod handlers;
mod routes;
mod state;

pub use extract::*;
pub use routes::*;
pub use state::*;
