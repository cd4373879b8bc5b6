// ABOUTME: Host-level error type for conditions the language model has no opinion about
//! Host-level errors — distinct from `Value::Error`, which is a first-class
//! language value produced by stack underflow/overflow, undefined symbols,
//! and type mismatches. Nothing in this enum is ever raised for
//! those; they flow through the stacks as ordinary `Value`s. This type
//! exists only for the boundary the language-level model has no opinion
//! about: the host process itself.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OliverError {
    /// Writing `EMIT`/`ENDL` output to the host stream failed. The
    /// reader-fallback contract handles "path doesn't open" silently by
    /// treating the argument as inline source, so this variant is reserved
    /// for failures that really are exceptional to the process, not to the
    /// language.
    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),

    #[error("failed to read source: {0}")]
    Io(#[source] std::io::Error),

    #[error("failed to initialize interactive session: {0}")]
    Repl(String),
}
