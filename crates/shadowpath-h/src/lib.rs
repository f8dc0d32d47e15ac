//! Chromium backend: resolves shadow paths in a live page over CDP.

pub mod backend;
pub mod cdp;
pub mod tree;
