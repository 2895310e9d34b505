//! Browsing state for the authoritative mockup set

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{MockupImage, MockupSet};

/// Captions used when a mockup carries no position metadata
const FALLBACK_LABELS: [&str; 6] = ["Front", "Back", "Left", "Right", "Detail", "Lifestyle"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GalleryState {
    Empty,
    Loading,
    Populated,
}

#[derive(Debug, Clone, Default)]
pub struct MockupGallery {
    set: Option<MockupSet>,
    selected_index: usize,
    loading: bool,
}

impl MockupGallery {
    pub fn state(&self) -> GalleryState {
        match (&self.set, self.loading) {
            (_, true) => GalleryState::Loading,
            (Some(set), false) if !set.is_empty() => GalleryState::Populated,
            _ => GalleryState::Empty,
        }
    }

    /// Current set, readable while a regeneration is loading
    pub fn set(&self) -> Option<&MockupSet> {
        self.set.as_ref()
    }

    pub fn set_mut(&mut self) -> Option<&mut MockupSet> {
        self.set.as_mut()
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn selected(&self) -> Option<&MockupImage> {
        self.set.as_ref().and_then(|s| s.images.get(self.selected_index))
    }

    fn len(&self) -> usize {
        self.set.as_ref().map_or(0, MockupSet::len)
    }

    pub fn select(&mut self, index: usize) -> usize {
        self.selected_index = index.min(self.len().saturating_sub(1));
        self.selected_index
    }

    pub fn next(&mut self) -> usize {
        let len = self.len();
        if len > 0 {
            self.selected_index = (self.selected_index + 1) % len;
        }
        self.selected_index
    }

    pub fn previous(&mut self) -> usize {
        let len = self.len();
        if len > 0 {
            self.selected_index = (self.selected_index + len - 1) % len;
        }
        self.selected_index
    }

    /// Swap in a new set and select its default entry
    pub fn replace(&mut self, set: MockupSet) {
        self.selected_index = set.default_index();
        self.set = Some(set);
        self.loading = false;
    }

    pub fn clear(&mut self) {
        self.set = None;
        self.selected_index = 0;
        self.loading = false;
    }

    pub fn begin_loading(&mut self) {
        self.loading = true;
    }

    pub fn end_loading(&mut self) {
        self.loading = false;
    }

    /// Caption for a mockup at a given position in the set
    pub fn label(mockup: &MockupImage, index: usize) -> String {
        match mockup.position_label.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            Some(position) => humanize(position),
            None => FALLBACK_LABELS[index % FALLBACK_LABELS.len()].to_string(),
        }
    }
}

/// `left_sleeve` / `left-sleeve` -> `Left Sleeve`
fn humanize(raw: &str) -> String {
    raw.split(|c| c == '_' || c == '-' || c == ' ')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContentId, SourceFingerprint, VariantSet};

    fn mockup(label: Option<&str>, is_default: bool) -> MockupImage {
        MockupImage {
            url: "https://m/1.png".to_string(),
            variant_ids: VariantSet::new(["1"]),
            position_label: label.map(String::from),
            is_default,
            batch_id: "b".to_string(),
        }
    }

    fn set(n: usize, default_at: Option<usize>) -> MockupSet {
        let images = (0..n).map(|i| mockup(None, Some(i) == default_at)).collect();
        MockupSet::new(images, SourceFingerprint {
            design: ContentId::from_bytes(b"d"),
            transform_version: 0,
            variants: VariantSet::new(["1"]),
        })
    }

    #[test]
    fn test_states_are_distinct() {
        let mut gallery = MockupGallery::default();
        assert_eq!(gallery.state(), GalleryState::Empty);

        gallery.begin_loading();
        assert_eq!(gallery.state(), GalleryState::Loading);

        gallery.replace(set(3, None));
        assert_eq!(gallery.state(), GalleryState::Populated);

        // Previous set stays readable while loading
        gallery.begin_loading();
        assert_eq!(gallery.state(), GalleryState::Loading);
        assert_eq!(gallery.set().map(MockupSet::len), Some(3));

        gallery.end_loading();
        assert_eq!(gallery.state(), GalleryState::Populated);
    }

    #[test]
    fn test_select_clamps_and_wraps() {
        let mut gallery = MockupGallery::default();
        assert_eq!(gallery.select(5), 0);
        assert_eq!(gallery.next(), 0);

        gallery.replace(set(3, None));
        assert_eq!(gallery.select(10), 2);
        assert_eq!(gallery.next(), 0);
        assert_eq!(gallery.previous(), 2);
        assert_eq!(gallery.previous(), 1);
    }

    #[test]
    fn test_replace_selects_default() {
        let mut gallery = MockupGallery::default();
        gallery.replace(set(4, Some(2)));
        assert_eq!(gallery.selected_index(), 2);

        gallery.replace(set(2, None));
        assert_eq!(gallery.selected_index(), 0);

        gallery.clear();
        assert_eq!(gallery.state(), GalleryState::Empty);
        assert!(gallery.selected().is_none());
    }

    #[test]
    fn test_labels() {
        assert_eq!(MockupGallery::label(&mockup(Some("left_sleeve"), false), 0), "Left Sleeve");
        assert_eq!(MockupGallery::label(&mockup(Some("back-LARGE"), false), 0), "Back Large");
        assert_eq!(MockupGallery::label(&mockup(None, false), 1), "Back");
        assert_eq!(MockupGallery::label(&mockup(Some("  "), false), 5), "Lifestyle");
        assert_eq!(MockupGallery::label(&mockup(None, false), 6), "Front");
    }
}
