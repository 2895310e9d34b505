//! Staleness of the authoritative mockup set

use crate::domain::SourceFingerprint;

/// Remembers what the current set was rendered from. Staleness is sticky:
/// reverting the inputs does not clear it, only a regeneration does.
#[derive(Debug, Clone, Default)]
pub struct InvalidationTracker {
    last_fingerprint: Option<SourceFingerprint>,
    stale: bool,
}

impl InvalidationTracker {
    /// Compare the current inputs against the last generation
    pub fn observe(&mut self, current: &SourceFingerprint) -> bool {
        if let Some(last) = &self.last_fingerprint {
            if last != current {
                self.stale = true;
            }
        }
        self.stale
    }

    pub fn regenerated(&mut self, fingerprint: SourceFingerprint) {
        self.last_fingerprint = Some(fingerprint);
        self.stale = false;
    }

    /// Forget the set entirely (template or provider switch)
    pub fn discard(&mut self) {
        self.last_fingerprint = None;
        self.stale = false;
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContentId, VariantSet};

    fn fp(design: &[u8], version: u64) -> SourceFingerprint {
        SourceFingerprint {
            design: ContentId::from_bytes(design),
            transform_version: version,
            variants: VariantSet::new(["1"]),
        }
    }

    #[test]
    fn test_nothing_to_invalidate_without_set() {
        let mut tracker = InvalidationTracker::default();
        assert!(!tracker.observe(&fp(b"a", 1)));
    }

    #[test]
    fn test_staleness_is_sticky() {
        let mut tracker = InvalidationTracker::default();
        tracker.regenerated(fp(b"a", 1));
        assert!(!tracker.observe(&fp(b"a", 1)));
        assert!(tracker.observe(&fp(b"b", 1)));
        // Reverting does not clear it
        assert!(tracker.observe(&fp(b"a", 1)));

        tracker.regenerated(fp(b"b", 1));
        assert!(!tracker.is_stale());
        assert_eq!(tracker.last_fingerprint.as_ref(), Some(&fp(b"b", 1)));

        tracker.discard();
        assert!(tracker.last_fingerprint.as_ref().is_none());
    }
}
