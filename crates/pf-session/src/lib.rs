//! `pf-session` — the outer state object an animation driver talks to.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`session`] | `Session`: graph + start/end selection + search engine    |
//! | [`driver`]  | `Driver`, `SearchObserver`, `DriverStatus`                 |
//! | [`error`]   | `SessionError`, `SessionResult<T>`                         |
//!
//! # Typical flow
//!
//! ```rust,ignore
//! let mut session = Session::new(SearchConfig::default())?;
//! session.select_start(&source, &source, click_a)?;   // fetches the area
//! session.select_end(&source, click_b)?;              // OutOfBounds if outside
//! session.start()?;
//!
//! let mut driver = Driver::new();
//! while matches!(driver.tick(&mut session, &mut renderer), DriverStatus::Searching | DriverStatus::Tracing) {
//!     // wait for the next animation frame
//! }
//! ```

pub mod driver;
pub mod error;
pub mod session;


pub use driver::{Driver, DriverStatus, DriverSummary, NoopObserver, SearchObserver};
pub use error::{Outside, SessionError, SessionResult};
pub use session::Session;
