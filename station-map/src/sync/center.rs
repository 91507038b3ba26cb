//! The viewport center refreshes are filtered around.

use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::LatLon;

/// Latest requested viewport center, shared by every refresh trigger.
///
/// This is where the map is *asked* to be, not where the last published
/// set was filtered around: a refresh that failed or is still running has
/// already moved it.
#[derive(Debug, Clone)]
pub struct ViewCenter {
    tx: Arc<watch::Sender<LatLon>>,
}

impl ViewCenter {
    pub fn new(initial: LatLon) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn get(&self) -> LatLon {
        *self.tx.borrow()
    }

    pub fn set(&self, center: LatLon) {
        self.tx.send_replace(center);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_center() {
        let center = ViewCenter::new(LatLon::TOKYO_STATION);
        let other = center.clone();
        assert_eq!(other.get(), LatLon::TOKYO_STATION);

        other.set(LatLon::new(43.0686, 141.3508));
        assert_eq!(center.get(), LatLon::new(43.0686, 141.3508));
    }
}
