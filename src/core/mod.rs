//! Race core: winner selection, demand and severance.
//!
//! The public API of this module is [`Amb`] (race definition), [`AmbBuilder`],
//! [`AmbConfig`] and [`RaceHandle`] (downstream side of one race instance).
//!
//! Internal modules:
//! - [`coordinator`]: decides the winner, relays its signals, severs the losers;
//! - [`winner`]: single-CAS winner cell;
//! - [`slot`]: per-candidate subscription/producer state;
//! - [`ledger`]: downstream demand accounting and fan-out;
//! - [`sequencer`]: ordered subscription of candidates;
//! - [`candidate`]: observer handed to each candidate source;
//! - [`monitor`]: bus listener feeding event subscribers.

mod amb;
mod builder;
mod candidate;
mod config;
mod coordinator;
mod handle;
mod ledger;
mod monitor;
mod sequencer;
mod slot;
mod winner;

pub use amb::Amb;
pub use builder::AmbBuilder;
pub use config::AmbConfig;
pub use handle::RaceHandle;
