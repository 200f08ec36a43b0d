mod cli;
mod dname;
mod error;
mod keytool;
mod net;
mod provision;
mod secret;
mod version;
pub use cli::*;
pub use dname::*;
pub use error::*;
pub use keytool::*;
pub use net::*;
pub use provision::*;
pub use secret::Secret;
pub use version::*;
