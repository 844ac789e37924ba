use crate::estimate::ImpactEstimate;
use crate::landuse::LandUseType;
use crate::session::Session;

fn title(land_use: LandUseType) -> &'static str {
    match land_use {
        LandUseType::Solar => "Solar panels",
        LandUseType::Reforestation => "Reforestation",
    }
}

/// Typst source of a comparison report for the session's polygons.
pub fn make_typst_document(session: &Session, years: u32, svg: Option<&str>) -> String {
    let mut doc = String::from("#set page(paper: \"a4\")\n#set text(size: 11pt)\n\n");
    doc.push_str("= Land use comparison\n\n");

    let Some(estimate) = session.estimate() else {
        doc.push_str("No area selected.\n");
        return doc;
    };

    let location = session.location();
    doc.push_str(&format!(
        "Location: {:.5}, {:.5} #h(1em) Polygons: {}\n\n",
        location.lat,
        location.lon,
        session.polygons().len()
    ));

    doc.push_str("#table(\n");
    doc.push_str("  columns: (1.4fr, 1fr, 1fr, 1fr, 1fr),\n");
    doc.push_str("  inset: 8pt,\n");
    doc.push_str("  align: horizon,\n");
    doc.push_str(&format!(
        "  [*Land use*], [*Area*], [*Energy*], [*Carbon*], [*Carbon, {} years*],\n",
        years
    ));
    for t in &estimate.by_type {
        doc.push_str(&format!(
            "  [{}], [{:.2} ha], [{:.0} MWh/yr], [{:.1} t/yr], [{:.0} t],\n",
            title(t.land_use),
            t.area_hectares,
            t.energy_production,
            t.carbon_offset,
            t.carbon_offset * years as f64
        ));
    }
    let (_, carbon_total) = estimate.over_years(years);
    doc.push_str(&format!(
        "  [*Total*], [{:.2} ha], [{:.0} MWh/yr], [{:.1} t/yr], [{:.0} t],\n",
        total_hectares(&estimate),
        estimate.energy_production,
        estimate.carbon_offset,
        carbon_total
    ));
    doc.push_str(")\n\n");

    doc.push_str("== Coefficients\n\n");
    for t in LandUseType::ALL {
        let c = session.coefficients(t);
        doc.push_str(&format!(
            "- {}: {:.1} MWh/ha/yr, {:.2} tCO2e/ha/yr\n",
            title(t),
            c.energy_production_per_hectare,
            c.carbon_offset_per_hectare
        ));
    }
    doc.push('\n');

    if let Some(svg) = svg {
        // raw block keeps the markup verbatim
        doc.push_str("#align(center, image(\n");
        doc.push_str(&format!("  bytes(```{}```.text),\n", svg));
        doc.push_str("  width: 80%\n");
        doc.push_str("))\n");
    }

    doc
}

fn total_hectares(estimate: &ImpactEstimate) -> f64 {
    estimate.by_type.iter().map(|t| t.area_hectares).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::tests::square;

    #[test]
    fn test_empty_session() {
        let doc = make_typst_document(&Session::default(), 30, None);
        assert!(doc.contains("No area selected."));
        assert!(!doc.contains("#table"));
    }

    #[test]
    fn test_table_rows() {
        let mut s = Session::default();
        s.handle_draw_end(10_000.0, square(28.4, -81.58, 100.0));
        s.toggle_land_use_type();
        s.handle_draw_end(20_000.0, square(28.41, -81.58, 141.0));
        let doc = make_typst_document(&s, 30, Some("<svg></svg>"));
        assert!(doc.contains("[Solar panels], [1.00 ha], [1850 MWh/yr], [650.0 t/yr], [19500 t]"));
        assert!(doc.contains("[Reforestation], [2.00 ha], [0 MWh/yr], [7.0 t/yr], [210 t]"));
        assert!(doc.contains("[*Total*], [3.00 ha]"));
        assert!(doc.contains("bytes(```<svg></svg>```.text)"));
    }
}
