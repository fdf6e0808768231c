//! Session lifecycle and persistence for chatvault.
//!
//! - `codec`: the `SessionCodec` port (serialize + encrypt)
//! - `store`: the `ContextStore` port (one durable slot per user)
//! - `interpret`: the `Interpreter` port to the language front end
//! - `scheduler`: restartable one-shot inactivity timer
//! - `manager`: `ContextManager`, the lifecycle controller tying them together

pub mod codec;
pub mod interpret;
pub mod manager;
pub mod scheduler;
pub mod store;
