//! Geospatial coverage: GML points, bounding geometry and bounding boxes
use crate::builder::{self, Builder, BuilderList};
use crate::component::{self, Component, ElementDef};
use crate::context::RecordContext;
use crate::error::Result;
use crate::node::{ComponentNode, QName};
use crate::security::{SecurityAttributes, SecurityAttributesBuilder};
use crate::validation::{self, NodeChecks, ValidationMessage, adopt_warnings};
use crate::version::{SchemaVersion, Space};

const POS: ElementDef = ElementDef::new(Space::Gml, "pos");
const POINT: ElementDef = ElementDef::new(Space::Gml, "Point");
const BOUNDING_GEOMETRY: ElementDef = ElementDef::new(Space::Ddms, "boundingGeometry");
const BOUNDING_BOX: ElementDef = ElementDef::new(Space::Ddms, "boundingBox");
const GEOSPATIAL_COVERAGE: ElementDef = ElementDef::new(Space::Ddms, "geospatialCoverage");
const GEOSPATIAL_EXTENT: ElementDef = ElementDef::new(Space::Ddms, "GeospatialExtent").until(SchemaVersion::V3_1);

const WEST: ElementDef = ElementDef::new(Space::Ddms, "WestBL").renamed(SchemaVersion::V4_0_1, "westBL");
const EAST: ElementDef = ElementDef::new(Space::Ddms, "EastBL").renamed(SchemaVersion::V4_0_1, "eastBL");
const SOUTH: ElementDef = ElementDef::new(Space::Ddms, "SouthBL").renamed(SchemaVersion::V4_0_1, "southBL");
const NORTH: ElementDef = ElementDef::new(Space::Ddms, "NorthBL").renamed(SchemaVersion::V4_0_1, "northBL");

const SRS_NAME: &str = "srsName";
const SRS_DIMENSION: &str = "srsDimension";
const ID: &str = "id";

const LATITUDE: (f64, f64) = (-90.0, 90.0);
const LONGITUDE: (f64, f64) = (-180.0, 180.0);

fn format_coordinates(values: &[f64]) -> String {
    values
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// A `gml:pos`: latitude, longitude and an optional height
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    node: ComponentNode,
    version: SchemaVersion,
    coordinates: Vec<f64>,
}

impl Position {
    pub fn new(coordinates: &[f64], ctx: &RecordContext) -> Result<Self> {
        Self::from_text(&format_coordinates(coordinates), ctx)
    }

    /// Build from a whitespace-separated coordinate string
    pub fn from_text(text: &str, ctx: &RecordContext) -> Result<Self> {
        let node = POS.new_node(ctx)?.with_text(text.trim());
        Self::from_node(&node, ctx)
    }

    pub fn coordinates(&self) -> &[f64] {
        &self.coordinates
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[1]
    }

    pub fn height(&self) -> Option<f64> {
        self.coordinates.get(2).copied()
    }
}

impl Component for Position {
    fn from_node(node: &ComponentNode, ctx: &RecordContext) -> Result<Self> {
        let checks = POS.open(node, ctx)?;
        let raw: Vec<&str> = checks.required_text()?.split_whitespace().collect();
        if !(2..=3).contains(&raw.len()) {
            return Err(checks.fail("A position must be represented by either 2 or 3 coordinates."));
        }

        let locator = checks.locator();
        let mut coordinates = vec![
            validation::check_bounded(raw[0], LATITUDE.0, LATITUDE.1, "latitude", locator)?,
            validation::check_bounded(raw[1], LONGITUDE.0, LONGITUDE.1, "longitude", locator)?,
        ];
        if let Some(height) = raw.get(2) {
            coordinates.push(validation::check_bounded(height, f64::MIN, f64::MAX, "height", locator)?);
        }

        Ok(Self {
            node: node.clone(),
            version: ctx.version(),
            coordinates,
        })
    }

    fn node(&self) -> &ComponentNode {
        &self.node
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &[]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionBuilder {
    pub coordinates: Vec<String>,
}

impl From<&Position> for PositionBuilder {
    fn from(position: &Position) -> Self {
        Self {
            coordinates: position.coordinates.iter().map(f64::to_string).collect(),
        }
    }
}

impl Builder for PositionBuilder {
    type Target = Position;

    fn is_empty(&self) -> bool {
        self.coordinates.iter().all(|value| builder::is_blank(value))
    }

    fn commit(&self, ctx: &RecordContext) -> Result<Option<Position>> {
        if self.is_empty() {
            return Ok(None);
        }
        let text = self
            .coordinates
            .iter()
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Position::from_text(&text, ctx).map(Some)
    }
}

/// A `gml:Point` holding one position
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    node: ComponentNode,
    version: SchemaVersion,
    position: Position,
}

impl Point {
    pub fn new(
        position: &Position,
        srs_name: &str,
        srs_dimension: Option<u32>,
        id: &str,
        ctx: &RecordContext,
    ) -> Result<Self> {
        let dimension = srs_dimension.map(|value| value.to_string());
        let node = POINT
            .new_node(ctx)?
            .with_optional_attribute(QName::unqualified(SRS_NAME), Some(srs_name))
            .with_optional_attribute(QName::unqualified(SRS_DIMENSION), dimension.as_deref())
            .with_optional_attribute(ctx.qname(Space::Gml, ID)?, Some(id))
            .with_child(position.node().clone());
        Self::from_node(&node, ctx)
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn srs_name(&self) -> &str {
        self.node.attribute("", SRS_NAME).unwrap_or_default()
    }

    pub fn srs_dimension(&self) -> Option<u32> {
        self.node
            .attribute("", SRS_DIMENSION)
            .and_then(|value| value.trim().parse().ok())
    }

    pub fn id(&self) -> &str {
        let gml = self.version.namespace(Space::Gml).unwrap_or("");
        self.node.attribute(gml, ID).unwrap_or_default()
    }
}

impl Component for Point {
    fn from_node(node: &ComponentNode, ctx: &RecordContext) -> Result<Self> {
        let checks = POINT.open(node, ctx)?;
        let gml = ctx.namespace_or_empty(Space::Gml);
        let (_, pos) = POS.expected(ctx);

        let srs_name = checks.required_attribute("", SRS_NAME)?;
        let id = checks.required_attribute(gml, ID)?;
        let positions = checks.children(gml, pos);
        checks.exactly(positions.len(), 1, "gml:pos element")?;

        let locator = checks.locator();
        validation::check_uri(srs_name, SRS_NAME, locator)?;
        validation::check_ncname(id, ID, locator)?;
        if let Some(dimension) = checks.attribute("", SRS_DIMENSION) {
            validation::check_positive_integer(dimension, SRS_DIMENSION, locator)?;
        }

        let parent = node.name().qualified();
        let position = component::child::<Position>(positions[0], &parent, ctx)?;

        Ok(Self {
            node: node.clone(),
            version: ctx.version(),
            position,
        })
    }

    fn node(&self) -> &ComponentNode {
        &self.node
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &[]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointBuilder {
    pub srs_name: String,
    pub srs_dimension: String,
    pub id: String,
    pub position: PositionBuilder,
}

impl From<&Point> for PointBuilder {
    fn from(point: &Point) -> Self {
        Self {
            srs_name: point.srs_name().to_string(),
            srs_dimension: point.srs_dimension().map(|value| value.to_string()).unwrap_or_default(),
            id: point.id().to_string(),
            position: PositionBuilder::from(&point.position),
        }
    }
}

impl Builder for PointBuilder {
    type Target = Point;

    fn is_empty(&self) -> bool {
        builder::is_blank(&self.srs_name)
            && builder::is_blank(&self.srs_dimension)
            && builder::is_blank(&self.id)
            && self.position.is_empty()
    }

    fn commit(&self, ctx: &RecordContext) -> Result<Option<Point>> {
        if self.is_empty() {
            return Ok(None);
        }
        let mut node = POINT
            .new_node(ctx)?
            .with_optional_attribute(QName::unqualified(SRS_NAME), Some(self.srs_name.as_str()))
            .with_optional_attribute(QName::unqualified(SRS_DIMENSION), Some(self.srs_dimension.as_str()))
            .with_optional_attribute(ctx.qname(Space::Gml, ID)?, Some(self.id.as_str()));
        if let Some(position) = self.position.commit(ctx)? {
            node = node.with_child(position.node().clone());
        }
        Point::from_node(&node, ctx).map(Some)
    }
}

/// A `ddms:boundingGeometry` made of one or more points
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingGeometry {
    node: ComponentNode,
    version: SchemaVersion,
    points: Vec<Point>,
}

impl BoundingGeometry {
    pub fn new(points: &[Point], ctx: &RecordContext) -> Result<Self> {
        let node = BOUNDING_GEOMETRY
            .new_node(ctx)?
            .with_children(points.iter().map(|point| point.node().clone()));
        Self::from_node(&node, ctx)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

impl Component for BoundingGeometry {
    fn from_node(node: &ComponentNode, ctx: &RecordContext) -> Result<Self> {
        let checks = BOUNDING_GEOMETRY.open(node, ctx)?;
        let (gml, point) = POINT.expected(ctx);
        let point_nodes = checks.children(gml, point);
        checks.at_least(point_nodes.len(), 1, "gml:Point")?;

        let parent = node.name().qualified();
        let points = point_nodes
            .into_iter()
            .map(|child| component::child::<Point>(child, &parent, ctx))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            node: node.clone(),
            version: ctx.version(),
            points,
        })
    }

    fn node(&self) -> &ComponentNode {
        &self.node
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &[]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundingGeometryBuilder {
    pub points: BuilderList<PointBuilder>,
}

impl From<&BoundingGeometry> for BoundingGeometryBuilder {
    fn from(geometry: &BoundingGeometry) -> Self {
        Self {
            points: geometry.points.iter().map(PointBuilder::from).collect(),
        }
    }
}

impl Builder for BoundingGeometryBuilder {
    type Target = BoundingGeometry;

    fn is_empty(&self) -> bool {
        self.points.all_empty()
    }

    fn commit(&self, ctx: &RecordContext) -> Result<Option<BoundingGeometry>> {
        if self.is_empty() {
            return Ok(None);
        }
        BoundingGeometry::new(&self.points.commit_all(ctx)?, ctx).map(Some)
    }
}

/// A `ddms:boundingBox` given by its four bounds
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    node: ComponentNode,
    version: SchemaVersion,
    west: f64,
    east: f64,
    south: f64,
    north: f64,
    warnings: Vec<ValidationMessage>,
}

impl BoundingBox {
    pub fn new(west: f64, east: f64, south: f64, north: f64, ctx: &RecordContext) -> Result<Self> {
        Self::from_text(
            &west.to_string(),
            &east.to_string(),
            &south.to_string(),
            &north.to_string(),
            ctx,
        )
    }

    fn from_text(west: &str, east: &str, south: &str, north: &str, ctx: &RecordContext) -> Result<Self> {
        let bounds = [(WEST, west), (EAST, east), (SOUTH, south), (NORTH, north)];
        let mut node = BOUNDING_BOX.new_node(ctx)?;
        for (def, value) in bounds {
            if !builder::is_blank(value) {
                node = node.with_child(def.new_node(ctx)?.with_text(value.trim()));
            }
        }
        Self::from_node(&node, ctx)
    }

    pub fn west(&self) -> f64 {
        self.west
    }

    pub fn east(&self) -> f64 {
        self.east
    }

    pub fn south(&self) -> f64 {
        self.south
    }

    pub fn north(&self) -> f64 {
        self.north
    }

    fn bound(checks: &NodeChecks<'_>, def: ElementDef, range: (f64, f64), ctx: &RecordContext) -> Result<f64> {
        let (namespace, local) = def.expected(ctx);
        let found = checks.children(namespace, local);
        checks.exactly(found.len(), 1, &format!("{} element", local))?;
        validation::check_bounded(found[0].text_or_empty(), range.0, range.1, local, checks.locator())
    }
}

impl Component for BoundingBox {
    fn from_node(node: &ComponentNode, ctx: &RecordContext) -> Result<Self> {
        let checks = BOUNDING_BOX.open(node, ctx)?;
        let west = Self::bound(&checks, WEST, LONGITUDE, ctx)?;
        let east = Self::bound(&checks, EAST, LONGITUDE, ctx)?;
        let south = Self::bound(&checks, SOUTH, LATITUDE, ctx)?;
        let north = Self::bound(&checks, NORTH, LATITUDE, ctx)?;

        let mut warnings = Vec::new();
        if south > north {
            warnings.push(checks.warn("The southern bound is north of the northern bound."));
        }

        Ok(Self {
            node: node.clone(),
            version: ctx.version(),
            west,
            east,
            south,
            north,
            warnings,
        })
    }

    fn node(&self) -> &ComponentNode {
        &self.node
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &self.warnings
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundingBoxBuilder {
    pub west: String,
    pub east: String,
    pub south: String,
    pub north: String,
}

impl From<&BoundingBox> for BoundingBoxBuilder {
    fn from(bbox: &BoundingBox) -> Self {
        Self {
            west: bbox.west.to_string(),
            east: bbox.east.to_string(),
            south: bbox.south.to_string(),
            north: bbox.north.to_string(),
        }
    }
}

impl Builder for BoundingBoxBuilder {
    type Target = BoundingBox;

    fn is_empty(&self) -> bool {
        [&self.west, &self.east, &self.south, &self.north]
            .iter()
            .all(|value| builder::is_blank(value))
    }

    fn commit(&self, ctx: &RecordContext) -> Result<Option<BoundingBox>> {
        if self.is_empty() {
            return Ok(None);
        }
        BoundingBox::from_text(&self.west, &self.east, &self.south, &self.north, ctx).map(Some)
    }
}

/// Where the resource applies: a bounding box, bounding geometry or both
#[derive(Debug, Clone, PartialEq)]
pub struct GeospatialCoverage {
    node: ComponentNode,
    version: SchemaVersion,
    bounding_box: Option<BoundingBox>,
    bounding_geometry: Option<BoundingGeometry>,
    security: SecurityAttributes,
    warnings: Vec<ValidationMessage>,
}

impl GeospatialCoverage {
    pub fn new(
        bounding_box: Option<&BoundingBox>,
        bounding_geometry: Option<&BoundingGeometry>,
        security: &SecurityAttributes,
        ctx: &RecordContext,
    ) -> Result<Self> {
        let content: Vec<ComponentNode> = bounding_geometry
            .map(|geometry| geometry.node().clone())
            .into_iter()
            .chain(bounding_box.map(|bbox| bbox.node().clone()))
            .collect();

        let mut node = GEOSPATIAL_COVERAGE.new_node(ctx)?;
        if GEOSPATIAL_EXTENT.is_applicable(ctx.version()) {
            node = node.with_child(GEOSPATIAL_EXTENT.new_node(ctx)?.with_children(content));
        } else {
            node = node.with_children(content);
        }
        let node = security.apply(node, ctx)?;
        Self::from_node(&node, ctx)
    }

    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bounding_box.as_ref()
    }

    pub fn bounding_geometry(&self) -> Option<&BoundingGeometry> {
        self.bounding_geometry.as_ref()
    }

    pub fn security_attributes(&self) -> &SecurityAttributes {
        &self.security
    }
}

impl Component for GeospatialCoverage {
    fn from_node(node: &ComponentNode, ctx: &RecordContext) -> Result<Self> {
        let checks = GEOSPATIAL_COVERAGE.open(node, ctx)?;
        let parent = node.name().qualified();

        // Before 4.0.1 the content sits inside a single ddms:GeospatialExtent
        let (content, breadcrumb) = if GEOSPATIAL_EXTENT.is_applicable(ctx.version()) {
            let (namespace, local) = GEOSPATIAL_EXTENT.expected(ctx);
            let extents = checks.children(namespace, local);
            checks.exactly(extents.len(), 1, "GeospatialExtent element")?;
            (extents[0], format!("{}/{}", parent, extents[0].name().qualified()))
        } else {
            (node, parent.clone())
        };

        let inner = NodeChecks::new(content);
        let (ddms, bbox) = BOUNDING_BOX.expected(ctx);
        let (_, geometry) = BOUNDING_GEOMETRY.expected(ctx);
        let bbox_nodes = inner.children(ddms, bbox);
        let geometry_nodes = inner.children(ddms, geometry);
        checks.at_most(bbox_nodes.len(), 1, "boundingBox element")?;
        checks.at_most(geometry_nodes.len(), 1, "boundingGeometry element")?;
        if bbox_nodes.is_empty() && geometry_nodes.is_empty() {
            return Err(checks.fail("At least one of boundingBox or boundingGeometry must exist."));
        }

        let bounding_box = bbox_nodes
            .first()
            .map(|child| component::child::<BoundingBox>(child, &breadcrumb, ctx))
            .transpose()?;
        let bounding_geometry = geometry_nodes
            .first()
            .map(|child| component::child::<BoundingGeometry>(child, &breadcrumb, ctx))
            .transpose()?;
        let security = SecurityAttributes::from_node(&checks, ctx)?;

        let mut warnings = Vec::new();
        if let Some(bbox) = &bounding_box {
            adopt_warnings(&mut warnings, &breadcrumb, bbox.warnings());
        }
        if let Some(geometry) = &bounding_geometry {
            adopt_warnings(&mut warnings, &breadcrumb, geometry.warnings());
        }

        Ok(Self {
            node: node.clone(),
            version: ctx.version(),
            bounding_box,
            bounding_geometry,
            security,
            warnings,
        })
    }

    fn node(&self) -> &ComponentNode {
        &self.node
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &self.warnings
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeospatialCoverageBuilder {
    pub bounding_box: BoundingBoxBuilder,
    pub bounding_geometry: BoundingGeometryBuilder,
    pub security: SecurityAttributesBuilder,
}

impl From<&GeospatialCoverage> for GeospatialCoverageBuilder {
    fn from(coverage: &GeospatialCoverage) -> Self {
        Self {
            bounding_box: coverage
                .bounding_box
                .as_ref()
                .map(BoundingBoxBuilder::from)
                .unwrap_or_default(),
            bounding_geometry: coverage
                .bounding_geometry
                .as_ref()
                .map(BoundingGeometryBuilder::from)
                .unwrap_or_default(),
            security: SecurityAttributesBuilder::from(&coverage.security),
        }
    }
}

impl Builder for GeospatialCoverageBuilder {
    type Target = GeospatialCoverage;

    fn is_empty(&self) -> bool {
        self.bounding_box.is_empty() && self.bounding_geometry.is_empty() && self.security.is_empty()
    }

    fn commit(&self, ctx: &RecordContext) -> Result<Option<GeospatialCoverage>> {
        if self.is_empty() {
            return Ok(None);
        }
        let bounding_box = self.bounding_box.commit(ctx)?;
        let bounding_geometry = self.bounding_geometry.commit(ctx)?;
        GeospatialCoverage::new(
            bounding_box.as_ref(),
            bounding_geometry.as_ref(),
            &self.security.to_attributes(),
            ctx,
        )
        .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRS: &str = "http://metadata.dod.mil/mdr/ns/GSIP/crs/WGS84E_2D";

    fn ctx(version: SchemaVersion) -> RecordContext {
        RecordContext::for_version(version)
    }

    #[test]
    fn test_position_bounds() {
        let ctx = ctx(SchemaVersion::V5_0);
        let position = Position::new(&[32.1, 40.1], &ctx).unwrap();
        assert_eq!(position.node().text(), Some("32.1 40.1"));
        assert_eq!(position.height(), None);

        let err = Position::new(&[91.0, 0.0], &ctx).unwrap_err();
        assert!(err.to_string().contains("latitude value must be between -90 and 90"));

        let err = Position::new(&[0.0, 181.0], &ctx).unwrap_err();
        assert!(err.to_string().contains("longitude"));

        let err = Position::from_text("1 2 3 4", &ctx).unwrap_err();
        assert!(err.to_string().contains("either 2 or 3 coordinates"));
    }

    #[test]
    fn test_point_requires_ncname_id_and_uri_srs() {
        let ctx = ctx(SchemaVersion::V4_1);
        let position = Position::new(&[32.1, 40.1, 5.0], &ctx).unwrap();
        let point = Point::new(&position, SRS, Some(10), "IDValue", &ctx).unwrap();
        assert_eq!(point.srs_dimension(), Some(10));
        assert_eq!(point.position().height(), Some(5.0));

        let err = Point::new(&position, SRS, None, "1bad", &ctx).unwrap_err();
        assert!(err.to_string().contains("NCName"));

        let err = Point::new(&position, "", None, "IDValue", &ctx).unwrap_err();
        assert!(err.to_string().contains("srsName attribute is required"));
    }

    #[test]
    fn test_bounding_geometry_needs_a_point() {
        let err = BoundingGeometry::new(&[], &ctx(SchemaVersion::V5_0)).unwrap_err();
        assert_eq!(err.message().unwrap().text(), "At least one gml:Point must exist.");
    }

    #[test]
    fn test_bounding_box_names_and_warning() {
        let old = BoundingBox::new(1.0, 2.0, 3.0, 4.0, &ctx(SchemaVersion::V3_0)).unwrap();
        assert_eq!(old.node().children()[0].name().local(), "WestBL");
        assert!(old.warnings().is_empty());

        let new = BoundingBox::new(1.0, 2.0, 10.0, 4.0, &ctx(SchemaVersion::V5_0)).unwrap();
        assert_eq!(new.node().children()[0].name().local(), "westBL");
        assert_eq!(new.warnings().len(), 1);
    }

    #[test]
    fn test_coverage_wrapper_and_warning_locator() {
        let v3 = ctx(SchemaVersion::V3_1);
        let bbox = BoundingBox::new(1.0, 2.0, 10.0, 4.0, &v3).unwrap();
        let coverage = GeospatialCoverage::new(Some(&bbox), None, &SecurityAttributes::default(), &v3).unwrap();
        assert_eq!(
            coverage.warnings()[0].locator(),
            "/ddms:geospatialCoverage/ddms:GeospatialExtent/ddms:boundingBox"
        );

        let v5 = ctx(SchemaVersion::V5_0);
        let bbox = BoundingBox::new(1.0, 2.0, 3.0, 4.0, &v5).unwrap();
        let coverage = GeospatialCoverage::new(Some(&bbox), None, &SecurityAttributes::default(), &v5).unwrap();
        assert_eq!(coverage.node().children()[0].name().local(), "boundingBox");
        assert_eq!(coverage.bounding_box().unwrap().north(), 4.0);

        let err = GeospatialCoverage::new(None, None, &SecurityAttributes::default(), &v5).unwrap_err();
        assert!(err.to_string().contains("At least one of boundingBox or boundingGeometry"));
    }

    #[test]
    fn test_coverage_builder_round_trip() {
        let ctx = ctx(SchemaVersion::V4_0_1);
        let mut builder = GeospatialCoverageBuilder::default();
        assert!(builder.commit(&ctx).unwrap().is_none());

        let point = builder.bounding_geometry.points.get_or_default(0);
        point.srs_name = SRS.to_string();
        point.id = "P1".to_string();
        point.position.coordinates = vec!["32.1".to_string(), "40.1".to_string()];

        let coverage = builder.commit(&ctx).unwrap().unwrap();
        assert_eq!(coverage.bounding_geometry().unwrap().points().len(), 1);

        let again = GeospatialCoverageBuilder::from(&coverage).commit(&ctx).unwrap().unwrap();
        assert_eq!(again, coverage);
    }
}
