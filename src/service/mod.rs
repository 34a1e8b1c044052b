//! Management of helper processes the CLI can run for the user.

pub mod chromedriver;
