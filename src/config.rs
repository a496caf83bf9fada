//! Configuration for the pooled menu UI.
//!
//! Plain structs with sensible defaults. Override only what you need:
//!
//! ```ignore
//! use spark_menu::{UiConfig, PoolCapacities, ExhaustionPolicy};
//!
//! let config = UiConfig {
//!     capacities: PoolCapacities { category: 10, ..Default::default() },
//!     exhaustion: ExhaustionPolicy::Grow { limit: 16 },
//!     ..Default::default()
//! };
//! ```

use crate::types::PoolRole;

// =============================================================================
// Pool Capacities
// =============================================================================

/// Number of instances pre-warmed per pool role.
///
/// Defaults cover one page plus a handful of simultaneously visible rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolCapacities {
    pub page: usize,
    pub category: usize,
    pub function: usize,
    pub value: usize,
    pub toggle: usize,
}

impl Default for PoolCapacities {
    fn default() -> Self {
        Self {
            page: 2,
            category: 6,
            function: 6,
            value: 6,
            toggle: 6,
        }
    }
}

impl PoolCapacities {
    /// Capacity configured for `role`.
    pub fn get(&self, role: PoolRole) -> usize {
        match role {
            PoolRole::Page => self.page,
            PoolRole::Category => self.category,
            PoolRole::Function => self.function,
            PoolRole::Value => self.value,
            PoolRole::Toggle => self.toggle,
        }
    }

    /// Set the capacity for `role`.
    pub fn set(&mut self, role: PoolRole, capacity: usize) {
        match role {
            PoolRole::Page => self.page = capacity,
            PoolRole::Category => self.category = capacity,
            PoolRole::Function => self.function = capacity,
            PoolRole::Value => self.value = capacity,
            PoolRole::Toggle => self.toggle = capacity,
        }
    }
}

// =============================================================================
// Exhaustion Policy
// =============================================================================

/// What `spawn` does when a pool has no instance left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExhaustionPolicy {
    /// Return `UiError::PoolExhausted`.
    #[default]
    Fail,
    /// Clone one more instance from the template, up to `limit` instances
    /// in total. Past the limit, fail like `Fail`.
    Grow { limit: usize },
}

// =============================================================================
// UiConfig
// =============================================================================

/// Top-level configuration for [`crate::UiManager`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UiConfig {
    pub capacities: PoolCapacities,
    pub exhaustion: ExhaustionPolicy,
    /// Vertical distance between drawn rows on a page.
    pub row_spacing: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            capacities: PoolCapacities::default(),
            exhaustion: ExhaustionPolicy::Fail,
            row_spacing: 0.1,
        }
    }
}

impl UiConfig {
    /// Config with a single pool capacity changed.
    pub fn with_capacity(mut self, role: PoolRole, capacity: usize) -> Self {
        self.capacities.set(role, capacity);
        self
    }

    pub fn with_exhaustion(mut self, exhaustion: ExhaustionPolicy) -> Self {
        self.exhaustion = exhaustion;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacities() {
        let caps = PoolCapacities::default();
        assert_eq!(caps.get(PoolRole::Page), 2);
        for role in [PoolRole::Category, PoolRole::Function, PoolRole::Value, PoolRole::Toggle] {
            assert_eq!(caps.get(role), 6);
        }
    }

    #[test]
    fn test_with_capacity() {
        let config = UiConfig::default().with_capacity(PoolRole::Toggle, 9);
        assert_eq!(config.capacities.toggle, 9);
        assert_eq!(config.capacities.value, 6);
        assert_eq!(config.exhaustion, ExhaustionPolicy::Fail);
    }
}
