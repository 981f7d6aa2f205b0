// Sensorfleet - Site registry
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Built-in site registry for device placement.
//!
//! Sites are fixed at registry construction; devices receive one at
//! creation time and keep it for the whole run.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A named geographic site hosting simulated devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Stable identifier (e.g. `warehouse_a`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Base latitude in degrees; readings add fresh jitter on top.
    pub base_latitude: f64,
    /// Base longitude in degrees.
    pub base_longitude: f64,
}

impl Location {
    /// Create a location.
    pub fn new(id: &str, name: &str, base_latitude: f64, base_longitude: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            base_latitude,
            base_longitude,
        }
    }
}

/// Fixed, ordered set of sites available to a simulation run.
///
/// The registry is immutable after construction and must hold at least
/// one site.
#[derive(Debug, Clone)]
pub struct LocationRegistry {
    locations: Vec<Location>,
}

impl LocationRegistry {
    /// The five built-in industrial sites (Seattle area).
    pub fn builtin() -> Self {
        Self {
            locations: vec![
                Location::new("warehouse_a", "Warehouse A", 47.6062, -122.3321),
                Location::new("warehouse_b", "Warehouse B", 47.6152, -122.3447),
                Location::new("office_main", "Main Office", 47.6205, -122.3493),
                Location::new("production_floor", "Production Floor", 47.6170, -122.3377),
                Location::new("storage_cold", "Cold Storage", 47.6180, -122.3399),
            ],
        }
    }

    /// Build a registry from custom sites. Must be non-empty.
    pub fn with_locations(locations: Vec<Location>) -> Self {
        assert!(!locations.is_empty(), "registry requires at least one site");
        Self { locations }
    }

    /// All sites in registration order.
    pub fn all(&self) -> &[Location] {
        &self.locations
    }

    /// Number of registered sites.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Whether the registry has no sites (never true for a constructed one).
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Pick a site for a new device. Called at device creation only.
    pub fn assign(&self, rng: &mut (impl Rng + ?Sized)) -> &Location {
        &self.locations[rng.gen_range(0..self.locations.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_builtin_sites() {
        let registry = LocationRegistry::builtin();
        assert_eq!(registry.len(), 5);

        let ids: Vec<_> = registry.all().iter().map(|l| l.id.as_str()).collect();
        assert!(ids.contains(&"warehouse_a"));
        assert!(ids.contains(&"storage_cold"));
    }

    #[test]
    fn test_assign_returns_registered_site() {
        let registry = LocationRegistry::builtin();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            let location = registry.assign(&mut rng);
            assert!(registry.all().contains(location));
        }
    }

    #[test]
    fn test_assign_is_deterministic_with_seed() {
        let registry = LocationRegistry::builtin();

        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);

        for _ in 0..20 {
            assert_eq!(registry.assign(&mut rng1), registry.assign(&mut rng2));
        }
    }

    #[test]
    fn test_custom_registry() {
        let registry =
            LocationRegistry::with_locations(vec![Location::new("lab", "Test Lab", 0.0, 0.0)]);
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.assign(&mut rng).id, "lab");
    }

    #[test]
    #[should_panic(expected = "at least one site")]
    fn test_empty_registry_rejected() {
        LocationRegistry::with_locations(Vec::new());
    }
}
