use std::fmt::Write;

use crate::landuse::LandUseType;
use crate::session::Session;

/// Plain-text summary of the session, as printed by the CLI.
pub fn summary(session: &Session, years: u32) -> String {
    let mut out = String::new();
    let Some(estimate) = session.estimate() else {
        out.push_str("no area selected\n");
        return out;
    };
    let location = session.location();
    let _ = writeln!(
        out,
        "location: {:.5}, {:.5} ({} polygons)",
        location.lat,
        location.lon,
        session.polygons().len()
    );
    for d in session.polygons().polygons() {
        let _ = writeln!(
            out,
            "  {:<24} {:>14} {:>12.1} m²",
            d.geometry.label(),
            d.land_use.as_str(),
            d.area
        );
    }
    out.push('\n');
    for t in &estimate.by_type {
        let _ = writeln!(out, "{}:", t.land_use);
        let _ = writeln!(out, "        area: {:.2} ha", t.area_hectares);
        if t.land_use == LandUseType::Solar {
            let _ = writeln!(out, "      energy: {:.1} MWh/year", t.energy_production);
            let _ = writeln!(out, "      offset: {:.1} tCO2e/year", t.carbon_offset);
        } else {
            let _ = writeln!(out, "  sequestered: {:.1} tCO2e/year", t.carbon_offset);
        }
        let _ = writeln!(
            out,
            "  over {} years: {:.0} tCO2e",
            years,
            t.carbon_offset * years as f64
        );
    }
    let (energy, carbon) = estimate.over_years(years);
    out.push('\n');
    let _ = writeln!(out, "total:");
    let _ = writeln!(out, "      energy: {:.1} MWh/year", estimate.energy_production);
    let _ = writeln!(out, "      carbon: {:.1} tCO2e/year", estimate.carbon_offset);
    let _ = writeln!(
        out,
        "  over {} years: {:.0} MWh, {:.0} tCO2e",
        years, energy, carbon
    );
    out
}
