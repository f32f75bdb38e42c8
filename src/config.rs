//! Capacity policy for `ChainMap`.
//!
//! Every field holding zero means "unset" and is replaced by its default when
//! the config is resolved. Resolution happens once, when the config is handed
//! to a map; fields that were explicitly set pass through untouched, even if
//! they are out of range. Use [`Config::validate`] to range-check.

use thiserror::Error;

/// Default for [`Config::initial_cap`].
pub const DEFAULT_INITIAL_CAP: usize = 8;

/// Default for [`Config::grow_load_limit`].
pub const DEFAULT_GROW_LOAD_LIMIT: f64 = 0.8;

/// Default for [`Config::shrink_load_limit`].
pub const DEFAULT_SHRINK_LOAD_LIMIT: f64 = 0.25;

/// Default for [`Config::change_factor`].
pub const DEFAULT_CHANGE_FACTOR: f64 = 2.0;

/// Tunable capacity parameters. `Config::default()` leaves everything unset.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Config {
    /// Capacity established when the first entry is added. Automatic
    /// shrinking never goes below it.
    pub initial_cap: usize,
    /// Load factor (entries per bucket) at which the bucket count is derived
    /// from a capacity.
    pub grow_load_limit: f64,
    /// Load factor under which the map shrinks.
    pub shrink_load_limit: f64,
    /// Multiplier (on grow) or divisor (on shrink) of the current capacity.
    pub change_factor: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("initial capacity must be at least 1, got {0}")]
    InitialCap(usize),
    #[error("grow load limit must be in (0, 1], got {0}")]
    GrowLoadLimit(f64),
    #[error("shrink load limit must be in [0, {grow}), got {shrink}")]
    ShrinkLoadLimit { shrink: f64, grow: f64 },
    #[error("change factor must be greater than 1, got {0}")]
    ChangeFactor(f64),
}

impl Config {
    /// The fully resolved default policy.
    pub const DEFAULT: Config = Config {
        initial_cap: DEFAULT_INITIAL_CAP,
        grow_load_limit: DEFAULT_GROW_LOAD_LIMIT,
        shrink_load_limit: DEFAULT_SHRINK_LOAD_LIMIT,
        change_factor: DEFAULT_CHANGE_FACTOR,
    };

    pub fn with_initial_cap(mut self, initial_cap: usize) -> Self {
        self.initial_cap = initial_cap;
        self
    }

    pub fn with_grow_load_limit(mut self, limit: f64) -> Self {
        self.grow_load_limit = limit;
        self
    }

    pub fn with_shrink_load_limit(mut self, limit: f64) -> Self {
        self.shrink_load_limit = limit;
        self
    }

    pub fn with_change_factor(mut self, factor: f64) -> Self {
        self.change_factor = factor;
        self
    }

    /// Replace unset (zero) fields with their defaults. Idempotent.
    pub fn resolve(mut self) -> Self {
        if self.initial_cap == 0 {
            self.initial_cap = DEFAULT_INITIAL_CAP;
        }
        if self.grow_load_limit == 0.0 {
            self.grow_load_limit = DEFAULT_GROW_LOAD_LIMIT;
        }
        if self.shrink_load_limit == 0.0 {
            self.shrink_load_limit = DEFAULT_SHRINK_LOAD_LIMIT;
        }
        if self.change_factor == 0.0 {
            self.change_factor = DEFAULT_CHANGE_FACTOR;
        }
        self
    }

    /// Range-check a resolved config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_cap < 1 {
            return Err(ConfigError::InitialCap(self.initial_cap));
        }
        // Written as negations so NaN is rejected too.
        if !(self.grow_load_limit > 0.0 && self.grow_load_limit <= 1.0) {
            return Err(ConfigError::GrowLoadLimit(self.grow_load_limit));
        }
        if !(self.shrink_load_limit >= 0.0 && self.shrink_load_limit < self.grow_load_limit) {
            return Err(ConfigError::ShrinkLoadLimit {
                shrink: self.shrink_load_limit,
                grow: self.grow_load_limit,
            });
        }
        if !(self.change_factor > 1.0) {
            return Err(ConfigError::ChangeFactor(self.change_factor));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: resolving an all-unset config yields exactly the defaults.
    #[test]
    fn resolve_all_unset_yields_defaults() {
        assert_eq!(Config::default().resolve(), Config::DEFAULT);
        assert_eq!(
            Config::DEFAULT,
            Config {
                initial_cap: 8,
                grow_load_limit: 0.8,
                shrink_load_limit: 0.25,
                change_factor: 2.0,
            }
        );
    }

    /// Invariant: explicitly set fields pass through unchanged, even when
    /// they would not validate.
    #[test]
    fn resolve_keeps_set_fields() {
        let set = Config {
            initial_cap: 1,
            grow_load_limit: 0.1,
            shrink_load_limit: 0.2,
            change_factor: 0.3,
        };
        assert_eq!(set.resolve(), set);
    }

    #[test]
    fn resolve_fills_only_unset_fields() {
        let cfg = Config::default().with_initial_cap(10).with_change_factor(3.0);
        let r = cfg.resolve();
        assert_eq!(r.initial_cap, 10);
        assert_eq!(r.grow_load_limit, DEFAULT_GROW_LOAD_LIMIT);
        assert_eq!(r.shrink_load_limit, DEFAULT_SHRINK_LOAD_LIMIT);
        assert_eq!(r.change_factor, 3.0);
    }

    #[test]
    fn resolve_is_idempotent() {
        let once = Config::default().with_grow_load_limit(0.5).resolve();
        assert_eq!(once.resolve(), once);
    }

    #[test]
    fn validate_accepts_defaults() {
        assert_eq!(Config::DEFAULT.validate(), Ok(()));
        assert_eq!(Config::default().resolve().validate(), Ok(()));
    }

    #[test]
    fn validate_reports_each_out_of_range_field() {
        let base = Config::DEFAULT;
        assert_eq!(
            base.with_initial_cap(0).validate(),
            Err(ConfigError::InitialCap(0))
        );
        assert_eq!(
            base.with_grow_load_limit(1.5).validate(),
            Err(ConfigError::GrowLoadLimit(1.5))
        );
        assert_eq!(
            base.with_shrink_load_limit(0.9).validate(),
            Err(ConfigError::ShrinkLoadLimit {
                shrink: 0.9,
                grow: 0.8
            })
        );
        assert_eq!(
            base.with_change_factor(1.0).validate(),
            Err(ConfigError::ChangeFactor(1.0))
        );
        assert!(base.with_grow_load_limit(f64::NAN).validate().is_err());
    }
}
