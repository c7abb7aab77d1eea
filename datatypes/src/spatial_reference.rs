use crate::error;
use crate::util::Result;
use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use snafu::ResultExt;
use std::fmt::Formatter;
use std::str::FromStr;

/// A spatial reference authority that is part of a spatial reference definition
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum SpatialReferenceAuthority {
    Epsg,
    SrOrg,
    Iau2000,
    Esri,
}

impl std::fmt::Display for SpatialReferenceAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SpatialReferenceAuthority::Epsg => "EPSG",
                SpatialReferenceAuthority::SrOrg => "SR-ORG",
                SpatialReferenceAuthority::Iau2000 => "IAU2000",
                SpatialReferenceAuthority::Esri => "ESRI",
            }
        )
    }
}

/// A spatial reference consists of an authority and a code
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SpatialReference {
    authority: SpatialReferenceAuthority,
    code: u32,
}

impl SpatialReference {
    pub fn new(authority: SpatialReferenceAuthority, code: u32) -> Self {
        Self { authority, code }
    }

    pub fn authority(self) -> SpatialReferenceAuthority {
        self.authority
    }

    pub fn code(self) -> u32 {
        self.code
    }

    /// the WGS 84 spatial reference system
    pub fn epsg_4326() -> Self {
        Self::new(SpatialReferenceAuthority::Epsg, 4326)
    }
}

impl std::fmt::Display for SpatialReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.authority, self.code)
    }
}

impl Serialize for SpatialReference {
    fn serialize<S>(&self, serializer: S) -> Result<<S as Serializer>::Ok, <S as Serializer>::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Helper struct for deserializing a `SpatialReference`
struct SpatialReferenceDeserializeVisitor;

impl Visitor<'_> for SpatialReferenceDeserializeVisitor {
    type Value = SpatialReference;

    fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
        formatter.write_str("a spatial reference in the form authority:code")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        v.parse().map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for SpatialReference {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as Deserializer<'de>>::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(SpatialReferenceDeserializeVisitor)
    }
}

impl FromStr for SpatialReferenceAuthority {
    type Err = error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "EPSG" => SpatialReferenceAuthority::Epsg,
            "SR-ORG" => SpatialReferenceAuthority::SrOrg,
            "IAU2000" => SpatialReferenceAuthority::Iau2000,
            "ESRI" => SpatialReferenceAuthority::Esri,
            _ => {
                return Err(error::Error::InvalidSpatialReferenceString {
                    spatial_reference_string: s.into(),
                });
            }
        })
    }
}

impl FromStr for SpatialReference {
    type Err = error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut split = s.split(':');

        match (split.next(), split.next(), split.next()) {
            (Some(authority), Some(code), None) => Ok(Self::new(
                authority.parse()?,
                code.parse::<u32>().context(error::ParseU32Snafu)?,
            )),
            _ => Err(error::Error::InvalidSpatialReferenceString {
                spatial_reference_string: s.into(),
            }),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum SpatialReferenceOption {
    SpatialReference(SpatialReference),
    Unreferenced,
}

impl SpatialReferenceOption {
    pub fn is_spatial_ref(self) -> bool {
        matches!(self, SpatialReferenceOption::SpatialReference(_))
    }
}

impl std::fmt::Display for SpatialReferenceOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpatialReferenceOption::SpatialReference(p) => write!(f, "{p}"),
            SpatialReferenceOption::Unreferenced => Ok(()),
        }
    }
}

impl From<SpatialReference> for SpatialReferenceOption {
    fn from(spatial_reference: SpatialReference) -> Self {
        Self::SpatialReference(spatial_reference)
    }
}

impl From<Option<SpatialReference>> for SpatialReferenceOption {
    fn from(option: Option<SpatialReference>) -> Self {
        match option {
            Some(p) => SpatialReferenceOption::SpatialReference(p),
            None => SpatialReferenceOption::Unreferenced,
        }
    }
}

impl Serialize for SpatialReferenceOption {
    fn serialize<S>(&self, serializer: S) -> Result<<S as Serializer>::Ok, <S as Serializer>::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Helper struct for deserializing a `SpatialReferenceOption`
struct SpatialReferenceOptionDeserializeVisitor;

impl Visitor<'_> for SpatialReferenceOptionDeserializeVisitor {
    type Value = SpatialReferenceOption;

    fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
        formatter.write_str("a spatial reference in the form authority:code")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        if v.is_empty() {
            return Ok(SpatialReferenceOption::Unreferenced);
        }

        let spatial_reference: SpatialReference = v.parse().map_err(serde::de::Error::custom)?;

        Ok(spatial_reference.into())
    }
}

impl<'de> Deserialize<'de> for SpatialReferenceOption {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as Deserializer<'de>>::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(SpatialReferenceOptionDeserializeVisitor)
    }
}

/// The direction a coordinate system axis points to, as published by the
/// defining authority.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum AxisDirection {
    East,
    West,
    North,
    South,
    Up,
    Down,
}

impl AxisDirection {
    /// True for axes running along a meridian (northing / latitude axes).
    pub fn is_north_south(self) -> bool {
        matches!(self, AxisDirection::North | AxisDirection::South)
    }

    /// True for axes running along a parallel (easting / longitude axes).
    pub fn is_east_west(self) -> bool {
        matches!(self, AxisDirection::East | AxisDirection::West)
    }

    pub fn opposite(self) -> Self {
        match self {
            AxisDirection::East => AxisDirection::West,
            AxisDirection::West => AxisDirection::East,
            AxisDirection::North => AxisDirection::South,
            AxisDirection::South => AxisDirection::North,
            AxisDirection::Up => AxisDirection::Down,
            AxisDirection::Down => AxisDirection::Up,
        }
    }
}

/// A resolved coordinate reference system: the identifier plus the axis
/// metadata (count, order and directions) needed by the grid geometry.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrsDefinition {
    spatial_reference: SpatialReferenceOption,
    axis_directions: Vec<AxisDirection>,
}

impl CrsDefinition {
    pub fn new<S: Into<SpatialReferenceOption>>(
        spatial_reference: S,
        axis_directions: Vec<AxisDirection>,
    ) -> Self {
        Self {
            spatial_reference: spatial_reference.into(),
            axis_directions,
        }
    }

    /// An unreferenced, engineering-style coordinate system with the usual
    /// (east, north, up, ...) axis directions.
    pub fn cartesian(dimension: usize) -> Self {
        let axis_directions = (0..dimension)
            .map(|axis| match axis {
                1 => AxisDirection::North,
                2 => AxisDirection::Up,
                _ => AxisDirection::East,
            })
            .collect();
        Self {
            spatial_reference: SpatialReferenceOption::Unreferenced,
            axis_directions,
        }
    }

    pub fn spatial_reference(&self) -> SpatialReferenceOption {
        self.spatial_reference
    }

    pub fn dimension(&self) -> usize {
        self.axis_directions.len()
    }

    pub fn axis_directions(&self) -> &[AxisDirection] {
        &self.axis_directions
    }
}

/// Looks up the axis metadata for a spatial reference. Consumed read-only by
/// the grid geometry; implementations may be backed by a database, a PROJ
/// context or a static table.
pub trait CrsResolver {
    fn resolve(&self, spatial_reference: SpatialReference) -> Result<CrsDefinition>;
}

/// A resolver backed by a static table of well-known EPSG codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCrsResolver;

impl CrsResolver for StaticCrsResolver {
    fn resolve(&self, spatial_reference: SpatialReference) -> Result<CrsDefinition> {
        use AxisDirection::{East, North, Up};

        if spatial_reference.authority() != SpatialReferenceAuthority::Epsg {
            return Err(error::Error::UnknownSpatialReference { spatial_reference });
        }

        // Geographic systems keep the authority's latitude-first axis order.
        let axis_directions = match spatial_reference.code() {
            4326 | 4269 | 4258 => vec![North, East],
            4979 => vec![North, East, Up],
            3395 | 3857 => vec![East, North],
            code if (32601..=32660).contains(&code) => vec![East, North], // UTM north zones
            code if (25828..=25838).contains(&code) => vec![East, North], // ETRS89 / UTM
            _ => return Err(error::Error::UnknownSpatialReference { spatial_reference }),
        };

        tracing::trace!(
            "Resolved {} to {} axes via static table",
            spatial_reference,
            axis_directions.len()
        );

        Ok(CrsDefinition::new(spatial_reference, axis_directions))
    }
}
