use crate::error::{Result, UsersError};
use crate::locations::Locations;
use crate::output;

pub fn regions(locations: &Locations) {
    let names: Vec<String> = locations.regions().iter().map(|r| r.name.clone()).collect();
    output::print_names(&names);
}

pub fn communes(locations: &Locations, region: &str) -> Result<()> {
    let region = locations
        .region(region)
        .ok_or_else(|| UsersError::UnknownRegion(region.to_string()))?;

    output::print_names(&region.communes);
    Ok(())
}
