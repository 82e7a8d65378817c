//! Wire-level vocabulary of the module command protocol.
//!
//! Commands are a name plus binary-safe arguments. Replies follow the
//! shapes of the underlying key-value server: status strings, integers,
//! bulk strings, nested arrays and error strings.
mod command;
mod outcome;
mod reply;
pub use command::*;
pub use outcome::*;
pub use reply::*;
