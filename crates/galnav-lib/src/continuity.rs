//! Route continuity check.
//!
//! Repeated queries against a slowly updating remote source can yield a
//! slightly different route to the same goal each time. A fresh route only
//! displaces the stored one when it goes somewhere else or is strictly
//! shorter in waypoints.

use tracing::debug;

use crate::route::RouteCollection;

/// Decide whether `fresh` should replace the `stored` plotted route.
pub fn should_replace(stored: Option<&RouteCollection>, fresh: &RouteCollection) -> bool {
    let Some(stored) = stored else {
        return true;
    };

    let stored_goal = stored.final_destination().and_then(|wp| wp.system_address);
    let fresh_goal = fresh.final_destination().and_then(|wp| wp.system_address);

    match (stored_goal, fresh_goal) {
        (Some(a), Some(b)) if a == b && fresh.len() >= stored.len() => {
            debug!(
                destination = a,
                stored = stored.len(),
                fresh = fresh.len(),
                "keeping stored route to the same destination"
            );
            false
        }
        _ => true,
    }
}
