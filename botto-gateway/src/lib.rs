//! botto-gateway: Discord ingress for the botto motto bot.
//!
//! Events flow from serenity's handler into the lifecycle state machine
//! (`lifecycle`), the DM command processor (`dm`) or the expiry sweeper
//! (`sweeper`); every user-visible consequence goes back out through the
//! effect executor in `discord::effects`.

pub mod discord;
pub mod dm;
pub mod lifecycle;
pub mod state;
pub mod sweeper;

pub use state::AppState;
