use crate::locations::Locations;
use crate::types::Region;

/// Two-level region → commune selection.
///
/// The commune candidates always come from the selected region. Picking a
/// region clears the commune unconditionally.
#[derive(Debug, Clone)]
pub struct RegionSelector<'a> {
    locations: &'a Locations,
    region: String,
    commune: String,
    candidates: &'a [String],
}

impl<'a> RegionSelector<'a> {
    pub fn new(locations: &'a Locations) -> Self {
        Self {
            locations,
            region: String::new(),
            commune: String::new(),
            candidates: &[],
        }
    }

    /// Restore a stored region/commune pair without clearing the commune.
    /// Used when an update form opens so the pre-filled commune has a
    /// candidate list to match against.
    pub fn prime(&mut self, region: &str, commune: &str) {
        self.region = region.to_string();
        self.candidates = self.locations.communes(region);
        self.commune = commune.to_string();
    }

    pub fn select_region(&mut self, region: &str) {
        self.region = region.to_string();
        self.candidates = self.locations.communes(region);
        self.commune.clear();
    }

    /// Record the chosen commune. Membership is gated by the options the
    /// control offers, not checked here.
    pub fn select_commune(&mut self, commune: &str) {
        self.commune = commune.to_string();
    }

    pub fn reset(&mut self) {
        self.region.clear();
        self.commune.clear();
        self.candidates = &[];
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    #[cfg(test)]
    pub fn commune(&self) -> &str {
        &self.commune
    }

    pub fn region_options(&self) -> &'a [Region] {
        self.locations.regions()
    }

    pub fn candidates(&self) -> &'a [String] {
        self.candidates
    }

    pub fn commune_enabled(&self) -> bool {
        self.locations.region(&self.region).is_some()
    }

    pub fn is_candidate(&self, commune: &str) -> bool {
        self.candidates.iter().any(|c| c == commune)
    }
}
