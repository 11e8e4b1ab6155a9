//! Delegate/Event Library
//!
//! A lightweight, single-threaded callback abstraction in two pieces:
//!
//! - [`Delegate`]: a value wrapping "a function, optionally bound to an
//!   owning instance", invoked uniformly whether the target is a free
//!   function, a mutating method, or a const method.
//! - [`Event`]: an ordered multicast list of delegates supporting
//!   registration, removal (safe even from inside a running dispatch), and
//!   group invocation.
//!
//! # Architecture
//!
//! This library is intentionally minimal and focused on dispatch:
//! - Delegates erase their concrete target behind a trampoline and compare
//!   by identity, which is what unregistration keys on
//! - Events preserve registration order and compact removed entries lazily,
//!   so a delegate may unregister itself or a sibling mid-dispatch
//!
//! The library does NOT:
//! - Provide any thread safety (delegates hold raw owner pointers and are
//!   `!Send`/`!Sync`)
//! - Track or extend the lifetime of bound instances
//! - Serialize callbacks or give them cross-process identity
//!
//! # Example Usage
//!
//! ```
//! use delegate_event::{Delegate, Event};
//!
//! // Multi-argument signatures use a tuple payload.
//! fn sum(args: (i32, i32)) -> i32 { args.0 + args.1 }
//!
//! let handle = Delegate::from_fn(sum);
//! assert_eq!(handle.call((40, 2)), 42);
//!
//! let event: Event<(i32, i32), i32> = Event::new();
//! event.register(handle);
//! event.emit((1, 2)); // return values are discarded during dispatch
//!
//! event.unregister(&handle);
//! assert!(event.is_empty());
//! ```

// Public modules
pub mod delegate;
pub mod event;

// Re-export main types for convenience
pub use delegate::Delegate;
pub use event::Event;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
