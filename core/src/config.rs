//! Check-session configuration: a small explicit struct rather than
//! ambient global state.

/// Tuning knobs for one call to any of the four external entry points.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CheckConfig {
    /// Stop accumulating new *solving* errors once this many have been
    /// recorded (generation-time errors are never bounded: they are cheap
    /// and each is independently informative). `None` means unbounded.
    pub max_errors: Option<usize>,

    /// Controls whether a declared record's leftover field constraints
    /// are checked to be a subset of its declared fields during
    /// lowering. `true` (the default) stays permissive; `false` enforces
    /// the subset check and reports `InvalidRecordFields` for any field
    /// not on the record.
    pub permissive_record_fields: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        CheckConfig {
            max_errors: None,
            permissive_record_fields: true,
        }
    }
}
