//! Configuration loader and schema types.
//!
//! Server URL, tokens and the library section are explicit configuration
//! passed into the runtime at startup — there is no hidden process-wide
//! state. `plexdash login` writes this file; `plexdash` reads it.

mod load;
mod schema;

pub use schema::*;

#[cfg(test)]
mod tests;
