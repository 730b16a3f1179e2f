//! State access for the resolver: the SlateDB-backed store client and the
//! namespace directory used to expand label selectors.

pub mod client;
pub mod namespaces;
