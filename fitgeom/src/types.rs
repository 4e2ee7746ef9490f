//! Types de données partagés avec la couche hôte

use geo::Geometry;
use std::collections::HashMap;

/// Identifiant d'entité tel que fourni par la couche hôte
pub type FeatureId = i64;

/// Valeur d'attribut d'une entité
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Null,
    Double(f64),
    Integer(i64),
    Text(String),
}

impl AttributeValue {
    /// Valeur numérique, `None` pour null ou texte
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            Self::Integer(v) => Some(*v as f64),
            Self::Null | Self::Text(_) => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Type de champ attributaire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Double,
    Integer,
    Text,
    Other,
}

/// Définition d'un champ de la couche
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }

    pub fn is_double(&self) -> bool {
        self.field_type == FieldType::Double
    }
}

/// Type de géométrie d'une couche
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryType {
    Point,
    Line,
    Polygon,
    Unknown,
}

impl GeometryType {
    /// Déduit le type de couche depuis une géométrie
    pub fn of(geometry: &Geometry) -> Self {
        match geometry {
            Geometry::Point(_) | Geometry::MultiPoint(_) => Self::Point,
            Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => {
                Self::Line
            }
            Geometry::Polygon(_)
            | Geometry::MultiPolygon(_)
            | Geometry::Rect(_)
            | Geometry::Triangle(_) => Self::Polygon,
            Geometry::GeometryCollection(_) => Self::Unknown,
        }
    }
}

/// Une entité de la couche avec sa géométrie et ses attributs
#[derive(Debug, Clone)]
pub struct Feature {
    /// Identifiant de l'entité
    pub id: FeatureId,

    /// Géométrie, absente pour les entités sans géométrie
    pub geometry: Option<Geometry>,

    /// Attributs (nom du champ -> valeur)
    pub attributes: HashMap<String, AttributeValue>,
}

impl Feature {
    pub fn new(id: FeatureId, geometry: Option<Geometry>) -> Self {
        Self {
            id,
            geometry,
            attributes: HashMap::new(),
        }
    }

    /// Ajoute un attribut (builder)
    pub fn with_attribute(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Surface cible lue dans le champ, `None` si null, absente ou non numérique
    pub fn target_area(&self, field: &str) -> Option<f64> {
        self.attributes.get(field).and_then(AttributeValue::as_f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Point};

    #[test]
    fn test_target_area() {
        let feature = Feature::new(1, None)
            .with_attribute("surf", AttributeValue::Double(12.5))
            .with_attribute("count", AttributeValue::Integer(4))
            .with_attribute("empty", AttributeValue::Null)
            .with_attribute("name", AttributeValue::Text("A".to_string()));

        assert_eq!(feature.target_area("surf"), Some(12.5));
        assert_eq!(feature.target_area("count"), Some(4.0));
        assert_eq!(feature.target_area("empty"), None);
        assert_eq!(feature.target_area("name"), None);
        assert_eq!(feature.target_area("missing"), None);
    }

    #[test]
    fn test_zero_is_a_value() {
        let feature = Feature::new(1, None).with_attribute("surf", AttributeValue::Double(0.0));
        assert_eq!(feature.target_area("surf"), Some(0.0));
    }

    #[test]
    fn test_geometry_type() {
        let poly = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)];
        assert_eq!(
            GeometryType::of(&Geometry::Polygon(poly)),
            GeometryType::Polygon
        );
        assert_eq!(
            GeometryType::of(&Geometry::Point(Point::new(0.0, 0.0))),
            GeometryType::Point
        );
    }
}
