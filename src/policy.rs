//! Behavioural presets for configuration objects.
//!
//! Every [`Config`](crate::Config) carries a [`Policy`] made of three
//! independent strategies. They compose freely; the named presets cover the
//! common flavours:
//!
//! | Preset | Keys | Overwrites | Values |
//! |--------|------|------------|--------|
//! | [`Policy::PLAIN`] | permissive | silent | wrap mappings |
//! | [`Policy::CAREFUL`] | careful | reject duplicates | wrap mappings |
//! | [`Policy::FROZEN`] | permissive | read-only | require hashable |
//! | [`Policy::STRICT`] | strict | reject duplicates | wrap mappings |
//!
//! Sub-configurations always inherit the policy of the configuration they are
//! inserted into.

/// How keys are checked before insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPolicy {
    /// Keys must start with a letter, be identifiers and must not shadow an
    /// interface name.
    Strict,
    /// Like `Strict`, but non-identifier keys only produce a warning.
    Careful,
    /// Any non-empty key. Non-identifiers warn, interface names are allowed.
    Permissive,
}

/// What happens when a key that already exists is assigned again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// The new value replaces the old one (sub-configurations are merged).
    Silent,
    /// Assignment fails; use `overwrite` to replace values deliberately.
    RejectDuplicate,
    /// No mutation at all after construction.
    ReadOnly,
}

/// How values are coerced on insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValuePolicy {
    /// Mappings become sub-configurations, everything else is kept as is.
    WrapMappings,
    /// Mappings become sub-configurations and lists become tuples, so every
    /// stored value is hashable.
    RequireHashable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub keys: KeyPolicy,
    pub overwrite: OverwritePolicy,
    pub values: ValuePolicy,
}

impl Policy {
    pub const PLAIN: Policy = Policy {
        keys: KeyPolicy::Permissive,
        overwrite: OverwritePolicy::Silent,
        values: ValuePolicy::WrapMappings,
    };

    pub const CAREFUL: Policy = Policy {
        keys: KeyPolicy::Careful,
        overwrite: OverwritePolicy::RejectDuplicate,
        values: ValuePolicy::WrapMappings,
    };

    pub const FROZEN: Policy = Policy {
        keys: KeyPolicy::Permissive,
        overwrite: OverwritePolicy::ReadOnly,
        values: ValuePolicy::RequireHashable,
    };

    pub const STRICT: Policy = Policy {
        keys: KeyPolicy::Strict,
        overwrite: OverwritePolicy::RejectDuplicate,
        values: ValuePolicy::WrapMappings,
    };

    pub fn is_read_only(&self) -> bool {
        self.overwrite == OverwritePolicy::ReadOnly
    }

    pub fn rejects_duplicates(&self) -> bool {
        self.overwrite == OverwritePolicy::RejectDuplicate
    }

    /// Name used in `Debug` output and type-related error messages.
    pub fn type_name(&self) -> &'static str {
        match (self.keys, self.overwrite) {
            (_, OverwritePolicy::ReadOnly) => "FrozenConfig",
            (KeyPolicy::Strict, _) => "StrictConfig",
            (_, OverwritePolicy::RejectDuplicate) => "CarefulConfig",
            (_, OverwritePolicy::Silent) => "PlainConfig",
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Policy::PLAIN
    }
}
