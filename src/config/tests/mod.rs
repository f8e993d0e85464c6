//! Configuration tests: layer precedence, `load_from_iter` against a scratch
//! home directory, and validation of the typed accessors.

mod helpers;
mod precedence;
