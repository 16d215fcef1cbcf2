//! Request compilation (verb module)
//!
//! Runs the resolvers in dependency order over a [`RawRequest`], checks the
//! cross-field rules and assembles the [`CompiledRequest`].
//!
//! [`RawRequest`]: crate::request::RawRequest
//! [`CompiledRequest`]: crate::request::CompiledRequest

mod compile;

pub use compile::RequestCompiler;
