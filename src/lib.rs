//! # cyclity
//!
//! Client-side session layer for the Cyclity single-page application.
//!
//! This crate owns the bearer-token session (establish, persist, reuse, tear
//! down), the API facade that turns every remote call into an [`Envelope`],
//! the normalizer that folds transport failures into one taxonomy, and the
//! navigation guard that gates route transitions on session presence.
//!
//! SYSTEM CONTEXT
//! ==============
//! The application root builds one [`Session`] from a [`PersistentStore`] and
//! hands clones of it to the [`Api`] facade and the [`Navigator`]. Nothing in
//! this crate reaches for ambient globals.

pub mod api;
pub mod config;
pub mod envelope;
pub mod guard;
pub mod models;
pub mod navigation;
pub mod normalize;
pub mod session;
pub mod storage;
pub mod transport;

pub use api::Api;
pub use config::ClientConfig;
pub use envelope::Envelope;
pub use guard::{Decision, NavigationGuard};
pub use navigation::{Location, NavigationIntent, Navigator};
pub use normalize::{ErrorNormalizer, FailureKind};
pub use session::{Session, Token};
pub use storage::PersistentStore;
pub use transport::{Transport, TransportError};
