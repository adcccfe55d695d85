//! Hierarchical configuration objects for experiments and applications.
//! Build a tree of settings, address it by dotted paths, merge it with other
//! trees and load or save it as JSON, TOML or YAML.
//!
//! ```ignore
//! use layerconf::{Config, Policy};
//!
//! let config = Config::from_pairs(Policy::CAREFUL, [("lr", 0.1.into())])?;
//! config.set("model.depth", 18)?;
//! let merged = config.union(other_config)?;
//! ```
//!
//! # The tree
//!
//! A [`Config`] is an ordered mapping from string keys to [`Value`]s. Values
//! that are mappings themselves become sub-configurations on insertion, so
//! every level of the tree is a [`Config`] with the same interface.
//!
//! Any entry can be reached in three equivalent ways:
//!
//! - a dotted string: `config.get("model.depth")`
//! - a key path: `config.get(["model", "depth"])`
//! - chained single lookups: `config.get_attr("model")?` and then
//!   `get_attr("depth")` on the result
//!
//! Assigning through a path creates the missing intermediate levels.
//!
//! `Config` is a handle. Cloning it shares the node (like `Rc`), and a
//! sub-configuration returned by [`Config::get`] is the live node stored in
//! its parent. [`Config::shallow_copy`] and [`Config::deep_copy`] make new
//! nodes. Inserting a mapping or configuration always copies it, so a tree
//! never contains itself.
//!
//! # Policies
//!
//! Every configuration carries a [`Policy`] that decides how strict it is:
//!
//! | Preset | Keys | Re-assigning a key | Values |
//! |--------|------|--------------------|--------|
//! | [`Policy::PLAIN`] | any non-empty key | replaces silently | as given |
//! | [`Policy::CAREFUL`] | must start with a letter and not shadow the interface | fails, use `overwrite` | as given |
//! | [`Policy::FROZEN`] | any non-empty key | fails, no mutation at all | lists become tuples |
//! | [`Policy::STRICT`] | identifiers only | fails, use `overwrite` | as given |
//!
//! Keys that are accepted but are not identifiers produce a `tracing` warning:
//! they remain reachable through paths but not through attribute-style access.
//!
//! # Merging
//!
//! [`Config::union`] merges two trees recursively: sub-configurations on both
//! sides are merged, other values from the right-hand side win. Careful and
//! strict configurations refuse to let any value win and report a conflict
//! instead. [`Config::union_assign`] merges in place, [`Config::rev_union`]
//! puts a plain mapping underneath a configuration.
//!
//! # Key modifiers
//!
//! Keys from external sources are often not identifiers (`"learning rate"`,
//! `"num-layers"`). A [`KeyMods`] rewrites them on import
//! ([`Config::from_dict`]) or export ([`Config::to_dict`]) in a single pass,
//! so the result does not depend on the order modifiers are given in.
//!
//! # Files and the command line
//!
//! The [`file`] functions pick the codec from the extension and accept
//! optional [`KeyMods`] to rewrite keys on the way in or out. With the `clap`
//! feature (on by default), [`ConfigArgs`] accepts `--config FILE` followed by
//! `KEY=VALUE` overrides, which are applied with [`Config::overwrite_all`] and
//! therefore work on careful configurations too.
//!
//! # Errors
//!
//! All fallible operations return [`ConfigError`]. Its `is_*_error` methods
//! group the variants into missing keys, type errors, rejected values and
//! attribute errors.

pub mod error;
pub mod file;
pub mod overrides;
pub mod policy;

#[cfg(feature = "clap")]
mod cli;
mod config;
mod flatten;
mod key;
mod merge;
mod normalize;
mod resolve;
mod rewrite;
mod validate;
mod value;

#[cfg(test)]
mod fixtures;

#[cfg(feature = "clap")]
pub use cli::ConfigArgs;
pub use config::{Config, IntoEntries};
pub use error::ConfigError;
pub use file::{Format, load_config, save_config};
pub use flatten::{Items, Keys, Values, flat_items};
pub use key::Key;
pub use policy::{KeyPolicy, OverwritePolicy, Policy, ValuePolicy};
pub use rewrite::KeyMods;
pub use validate::{RESERVED_NAMES, is_identifier, validate_key};
pub use value::Value;
