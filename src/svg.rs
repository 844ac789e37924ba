use crate::aggregator::DrawnPolygon;
use crate::error::Result;
use crate::landuse::LandUseType;
use crate::mercator::UtmProjection;
use crate::point::{MercatorBoundingBox, MercatorPoint};

const SIZE: f64 = 500.0;

fn fill(land_use: LandUseType) -> &'static str {
    match land_use {
        LandUseType::Solar => "gold",
        LandUseType::Reforestation => "forestgreen",
    }
}

/// Top-down preview of the drawn polygons, coloured by land use.
pub struct SVG {
    mercator_bbox: MercatorBoundingBox,
    padding: f64,
    polygons: Vec<(Vec<MercatorPoint>, LandUseType)>,
}

impl SVG {
    /// Projects every polygon into the UTM zone of the first vertex drawn.
    /// `None` when there is nothing to draw.
    pub fn from_polygons(drawn: &[DrawnPolygon]) -> Result<Option<Self>> {
        let Some(first) = drawn.iter().flat_map(|d| d.geometry.wgs.first()).next() else {
            return Ok(None);
        };
        let projection = UtmProjection::for_point(first)?;
        let mut polygons = Vec::new();
        for d in drawn {
            polygons.push((projection.project_all(&d.geometry.wgs)?, d.land_use));
        }
        let all: Vec<MercatorPoint> = polygons.iter().flat_map(|(p, _)| p.iter().copied()).collect();
        let Some(mercator_bbox) = MercatorBoundingBox::from_points(&all) else {
            return Ok(None);
        };
        Ok(Some(Self {
            mercator_bbox,
            padding: 0.1,
            polygons,
        }))
    }

    pub fn render(&self) -> String {
        let mut svg = format!(
            r#"<svg width="{0}" height="{0}" xmlns="http://www.w3.org/2000/svg">"#,
            SIZE
        );
        svg.push('\n');
        for (points, land_use) in &self.polygons {
            let s = points
                .iter()
                .map(|p| {
                    let (x, y) = self.transform(p.x, p.y);
                    format!("{:.2},{:.2}", x, y)
                })
                .collect::<Vec<String>>()
                .join(" ");
            svg.push_str(&format!(
                r#"  <polygon points="{}" fill="{}" fill-opacity="0.6" stroke="black" stroke-width="1"><title>{}</title></polygon>"#,
                s,
                fill(*land_use),
                land_use
            ));
            svg.push('\n');
        }
        svg.push_str("</svg>");
        svg
    }

    fn width(&self) -> f64 {
        self.mercator_bbox.width()
    }
    fn height(&self) -> f64 {
        self.mercator_bbox.height()
    }
    fn scale(&self) -> f64 {
        let padded_width = self.width() * (1.0 + 2.0 * self.padding);
        let padded_height = self.height() * (1.0 + 2.0 * self.padding);
        let extent = padded_width.max(padded_height);
        if extent > 0.0 { SIZE / extent } else { 1.0 }
    }
    fn transform(&self, x: f64, y: f64) -> (f64, f64) {
        let svg_x = (x - self.mercator_bbox.min.x + self.width() * self.padding) * self.scale();
        let svg_y =
            SIZE - (y - self.mercator_bbox.min.y + self.height() * self.padding) * self.scale();
        (svg_x, svg_y)
    }
}
