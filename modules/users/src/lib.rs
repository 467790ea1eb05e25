// === PUBLIC CONTRACT ===
pub mod contract;
pub use contract::{NewUser, User};

// === MODULE DEFINITION ===
pub mod module;
pub use module::UsersModule;

pub mod config;
pub use config::UsersConfig;

// === INTERNAL MODULES ===
// Exposed for tests and for the binary's wiring; other modules should go
// through `contract` and `UsersModule`.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
