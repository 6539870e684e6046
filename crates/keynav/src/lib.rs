//! keynav - directional keyboard navigation
//!
//! Moves focus between the "items" of a page (search results, list rows,
//! video cards) with arrow keys or `h`/`j`/`k`/`l`, choosing the nearest
//! item in the pressed direction.
//!
//! Per keystroke: [`KeyMap::resolve`] turns the key into a [`Direction`],
//! [`locate`] gathers candidate items, [`select`] picks one, and
//! [`FocusEffector`] focuses and outlines it. [`NavigationSession`] wires
//! those into a document's keydown listeners for every matching
//! [`SitePattern`].
//!
//! # Example
//! ```rust,ignore
//! use keynav::{Config, NavigationSession};
//!
//! let mut session = NavigationSession::new(Config::default().resolve()?);
//! session.start(&mut document);
//! let outcome = session.dispatch_keydown(&mut document, &mut KeyboardEvent::new("j"));
//! ```

mod config;
mod direction;
mod effector;
mod host;
mod locator;
mod pattern;
mod session;
mod spatial;

pub use config::{Config, ConfigError, PatternSpec, ResolvedConfig, ScrollBlock};
pub use direction::{Direction, KeyMap, ParseDirectionError};
pub use effector::{FocusEffector, FocusMark, OutlineStyle};
pub use host::{FocusHost, LayoutHost, ListenerHost};
pub use locator::{active_item, locate};
pub use pattern::{PatternError, PatternTable, SitePattern};
pub use session::{DocumentSession, IgnoreReason, KeyOutcome, NavigationSession};
pub use spatial::{distance, in_direction, select};

pub use keynav_css::SelectorList;
pub use keynav_dom::{DOMRect, KeyModifiers, KeyboardEvent, ListenerId};
