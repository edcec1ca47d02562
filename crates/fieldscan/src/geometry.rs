//! Extent computations over a layer's geometries
//!
//! The oriented box is the minimum-area rotated rectangle around every
//! coordinate of every geometry. That is the same rectangle as around their
//! union, since both share one convex hull.

use geo::{BoundingRect, Coord, Geometry, GeometryCollection, MinimumRotatedRect, Rect};

/// Axis-aligned and oriented extents of a set of geometries.
#[derive(Debug, Clone, PartialEq)]
pub struct Extent {
    pub bbox: Rect<f64>,
    /// First four corners of the rectangle's exterior ring
    pub obb: [Coord<f64>; 4],
}

/// Extent of all geometries, `None` when they hold no coordinates.
pub fn extent(geometries: Vec<Geometry<f64>>) -> Option<Extent> {
    let collection = GeometryCollection::new_from(geometries);
    let bbox = collection.bounding_rect()?;
    let obb = collection
        .minimum_rotated_rect()
        .and_then(|rect| first_four(rect.exterior().0.as_slice()))
        .unwrap_or_else(|| rect_corners(&bbox));
    Some(Extent { bbox, obb })
}

fn first_four(coords: &[Coord<f64>]) -> Option<[Coord<f64>; 4]> {
    match coords {
        [a, b, c, d, ..] if coords.iter().all(|p| p.x.is_finite() && p.y.is_finite()) => {
            Some([*a, *b, *c, *d])
        }
        _ => None,
    }
}

// Degenerate inputs (one point, collinear points) land here as a
// zero-width rectangle.
fn rect_corners(rect: &Rect<f64>) -> [Coord<f64>; 4] {
    let (min, max) = (rect.min(), rect.max());
    [
        Coord { x: min.x, y: min.y },
        Coord { x: max.x, y: min.y },
        Coord { x: max.x, y: max.y },
        Coord { x: min.x, y: max.y },
    ]
}

/// Geometry type name as written to `geometry_types`.
pub fn geometry_type_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "LineString",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Polygon",
        Geometry::Triangle(_) => "Polygon",
    }
}

/// OGR's upper-case geometry names (`CURVEPOLYGON`, `MULTISURFACE`) in the
/// same CamelCase form as [`geometry_type_name`].
pub fn ogr_type_name(name: &str) -> String {
    const KNOWN: &[&str] = &[
        "Point",
        "LineString",
        "Polygon",
        "MultiPoint",
        "MultiLineString",
        "MultiPolygon",
        "GeometryCollection",
        "CircularString",
        "CompoundCurve",
        "CurvePolygon",
        "MultiCurve",
        "MultiSurface",
        "Curve",
        "Surface",
        "PolyhedralSurface",
        "TIN",
        "Triangle",
        "LinearRing",
    ];
    let base = name.trim();
    let (base, suffix) = match base.rsplit_once(' ') {
        Some((head, tail)) if matches!(tail, "Z" | "M" | "ZM") => (head, Some(tail)),
        _ => (base, None),
    };
    let camel = KNOWN
        .iter()
        .find(|known| known.eq_ignore_ascii_case(base))
        .map(|known| known.to_string())
        .unwrap_or_else(|| {
            let mut chars = base.chars();
            chars
                .next()
                .map(|first| first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect())
                .unwrap_or_default()
        });
    match suffix {
        Some(suffix) => format!("{} {}", camel, suffix),
        None => camel,
    }
}

/// `[min_x, min_y, max_x, max_y]`
pub fn format_bbox(rect: &Rect<f64>) -> String {
    format!(
        "[{}, {}, {}, {}]",
        rect.min().x,
        rect.min().y,
        rect.max().x,
        rect.max().y
    )
}

/// `[(x, y), (x, y), (x, y), (x, y)]`
pub fn format_corners(corners: &[Coord<f64>; 4]) -> String {
    let pairs: Vec<String> = corners
        .iter()
        .map(|c| format!("({}, {})", c.x, c.y))
        .collect();
    format!("[{}]", pairs.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, point, polygon};

    fn area(corners: &[Coord<f64>; 4]) -> f64 {
        let mut sum = 0.0;
        for i in 0..4 {
            let (a, b) = (corners[i], corners[(i + 1) % 4]);
            sum += a.x * b.y - b.x * a.y;
        }
        (sum / 2.0).abs()
    }

    #[test]
    fn test_axis_aligned_square() {
        let square = polygon![(x: 0.0, y: 0.0), (x: 2.0, y: 0.0), (x: 2.0, y: 2.0), (x: 0.0, y: 2.0)];
        let extent = extent(vec![Geometry::Polygon(square)]).unwrap();
        assert_eq!(format_bbox(&extent.bbox), "[0, 0, 2, 2]");
        assert!((area(&extent.obb) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotated_shape_gets_smaller_box() {
        let diamond = polygon![(x: 1.0, y: 0.0), (x: 2.0, y: 1.0), (x: 1.0, y: 2.0), (x: 0.0, y: 1.0)];
        let extent = extent(vec![Geometry::Polygon(diamond)]).unwrap();
        // Axis-aligned box has area 4, the diamond itself 2.
        assert!((area(&extent.obb) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_spans_all_geometries() {
        let geometries = vec![
            Geometry::Point(point!(x: 0.0, y: 0.0)),
            Geometry::Point(point!(x: 10.0, y: 5.0)),
        ];
        let extent = extent(geometries).unwrap();
        assert_eq!(format_bbox(&extent.bbox), "[0, 0, 10, 5]");
    }

    #[test]
    fn test_degenerate_inputs_yield_four_corners() {
        let single = extent(vec![Geometry::Point(point!(x: 3.0, y: 4.0))]).unwrap();
        assert_eq!(single.obb.len(), 4);
        assert!(area(&single.obb) < 1e-9);

        let line = line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0), (x: 2.0, y: 2.0)];
        let collinear = extent(vec![Geometry::LineString(line)]).unwrap();
        assert_eq!(collinear.obb.len(), 4);
        assert!(area(&collinear.obb) < 1e-9);
    }

    #[test]
    fn test_empty_input_has_no_extent() {
        assert!(extent(Vec::new()).is_none());
    }

    #[test]
    fn test_formatting() {
        let corners = [
            Coord { x: 0.5, y: 1.0 },
            Coord { x: 2.0, y: 1.0 },
            Coord { x: 2.0, y: 3.0 },
            Coord { x: 0.5, y: 3.0 },
        ];
        assert_eq!(
            format_corners(&corners),
            "[(0.5, 1), (2, 1), (2, 3), (0.5, 3)]"
        );
    }

    #[test]
    fn test_ogr_names_match_geo_casing() {
        assert_eq!(ogr_type_name("CURVEPOLYGON"), "CurvePolygon");
        assert_eq!(ogr_type_name("MULTISURFACE"), "MultiSurface");
        assert_eq!(ogr_type_name("COMPOUNDCURVE"), "CompoundCurve");
        assert_eq!(ogr_type_name("TIN"), "TIN");
        assert_eq!(ogr_type_name("POLYGON Z"), "Polygon Z");
        assert_eq!(ogr_type_name("NURBSCURVE"), "Nurbscurve");
        assert_eq!(ogr_type_name(""), "");
    }

    #[test]
    fn test_type_names() {
        let p = Geometry::Point(point!(x: 0.0, y: 0.0));
        assert_eq!(geometry_type_name(&p), "Point");
    }
}
