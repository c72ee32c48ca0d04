//! # Race configuration.
//!
//! Provides [`AmbConfig`], the settings shared by every race an [`Amb`](crate::Amb)
//! starts.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by [`AmbConfig::bus_capacity_clamped`]

/// Configuration of an [`Amb`](crate::Amb).
///
/// ## Field semantics
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped)
/// - `demand_events`: Publish `DemandRequested` for every downstream request
///
/// ## Notes
/// All fields are public for flexibility; start from `AmbConfig::default()`.
#[derive(Clone, Debug)]
pub struct AmbConfig {
    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// A listener that lags behind more than `bus_capacity` events skips the oldest
    /// ones and publishes `EventKind::ListenerLagged`.
    pub bus_capacity: usize,

    /// Publish an `EventKind::DemandRequested` event for every downstream request.
    ///
    /// Off by default: demand requests sit on the hot path of backpressured races.
    pub demand_events: bool,
}

impl AmbConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for AmbConfig {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `demand_events = false`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            demand_events: false,
        }
    }
}
