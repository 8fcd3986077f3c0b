//! # hive-core
//!
//! Observable state containers and the registry that owns them.
//!
//! - [`Honeycomb<T>`]: one value plus subscribers; replaced only through
//!   [`Honeycomb::dispatch`], which ignores structurally equal states.
//! - [`Hive`]: a fixed set of named containers, each with a cached [`Hook`].
//! - [`Hook<T>`] and [`RenderScope`]: read a container from a render pass and
//!   get flagged for re-render when what was read changes.
//! - [`RestHoneycomb<T>`]: a `Vec<T>` kept in sync with a REST collection
//!   through a [`hive_pollen::Pollen`] client.
//!
//! Everything here is single-threaded (`Rc`/`RefCell`); REST futures are
//! `!Send` and run on a current-thread runtime or a `LocalSet`.
//!
//! ```ignore
//! use hive_core::{Hive, Honeycomb, RenderScope};
//!
//! let hive = Hive::builder()
//!     .register("counter", Honeycomb::new(0u32))
//!     .build()?;
//!
//! let hook = hive.hook::<u32>("counter")?;
//! let mut scope = RenderScope::new();
//! let n = scope.render(|cx| hook.use_state(cx))?;
//!
//! hive.get::<Honeycomb<u32>>("counter")?.dispatch(n + 1);
//! assert!(scope.needs_render());
//! ```

pub mod error;
pub mod hive;
pub mod honeycomb;
pub mod hook;
pub mod render;
pub mod rest;

pub use error::{HiveError, HookError, RestError};
pub use hive::{Comb, Hive, HiveBuilder};
pub use honeycomb::{AsHoneycomb, Honeycomb, State, Unsubscribe};
pub use hook::Hook;
pub use render::{RenderContext, RenderScope};
pub use rest::RestHoneycomb;
