//! Couche vectorielle adossée à un fichier GeoJSON

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use anyhow::{bail, Context, Result};
use fitgeom::{
    AttributeValue, Crs, Feature, FeatureId, Field, FieldType, GeometryType, VectorLayer,
};
use geojson::{feature::Id, FeatureCollection, GeoJson, JsonObject, JsonValue};
use tracing::{debug, warn};

const CRS_URN_PREFIX: &str = "urn:ogc:def:crs:EPSG::";

/// Couche GeoJSON chargée en mémoire
#[derive(Debug)]
pub struct GeoJsonLayer {
    id: String,
    name: String,
    crs: Crs,
    geometry_type: GeometryType,
    fields: Vec<Field>,
    editable: bool,
    collection: FeatureCollection,
    ids: Vec<FeatureId>,
    /// `None` : toutes les entités sont sélectionnées
    selection: Option<BTreeSet<FeatureId>>,
}

impl GeoJsonLayer {
    /// Lit une FeatureCollection ; `crs` remplace le SCR déclaré dans le fichier
    pub fn open(path: &Path, crs: Option<Crs>) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read GeoJSON file: {}", path.display()))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "layer".to_string());
        Self::from_geojson_str(&name, &content, crs)
            .context(format!("Invalid GeoJSON layer: {}", path.display()))
    }

    /// Construit la couche depuis le texte GeoJSON
    pub fn from_geojson_str(name: &str, content: &str, crs: Option<Crs>) -> Result<Self> {
        let geojson: GeoJson = content.parse().context("Failed to parse GeoJSON")?;
        let collection = match geojson {
            GeoJson::FeatureCollection(fc) => fc,
            GeoJson::Feature(f) => FeatureCollection {
                bbox: None,
                features: vec![f],
                foreign_members: None,
            },
            GeoJson::Geometry(_) => bail!("Expected a FeatureCollection, found a bare geometry"),
        };

        let crs = match crs {
            Some(crs) => crs,
            None => declared_crs(&collection)?.unwrap_or(Crs::from_epsg(4326)?),
        };

        let mut ids = Vec::with_capacity(collection.features.len());
        let mut seen = BTreeSet::new();
        for (index, feature) in collection.features.iter().enumerate() {
            let id = feature_id(feature.id.as_ref(), index)?;
            if !seen.insert(id) {
                bail!("Duplicate feature id {} in layer '{}'", id, name);
            }
            ids.push(id);
        }

        let layer = Self {
            id: format!("{}_{}", name, crs.authid()),
            name: name.to_string(),
            geometry_type: layer_geometry_type(&collection),
            fields: collect_fields(&collection),
            crs,
            editable: true,
            collection,
            ids,
            selection: None,
        };
        debug!(
            layer = %layer.name,
            features = layer.ids.len(),
            crs = %layer.crs,
            geometry_type = ?layer.geometry_type,
            "GeoJSON layer loaded"
        );
        Ok(layer)
    }

    /// Restreint la sélection à une liste d'identifiants
    pub fn select(&mut self, ids: &[FeatureId]) {
        for id in ids {
            if !self.ids.contains(id) {
                warn!(fid = id, layer = %self.name, "Selected feature does not exist");
            }
        }
        self.selection = Some(ids.iter().copied().collect());
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    pub fn feature_count(&self) -> usize {
        self.ids.len()
    }

    /// Sérialise la couche (membres étrangers et propriétés conservés)
    pub fn to_geojson_string(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.collection).context("Failed to serialize GeoJSON")
    }

    /// Écrit la couche dans un fichier
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_geojson_string()?)
            .context(format!("Failed to write GeoJSON file: {}", path.display()))
    }

    fn is_selected(&self, fid: FeatureId) -> bool {
        self.selection.as_ref().map_or(true, |s| s.contains(&fid))
    }
}

impl VectorLayer for GeoJsonLayer {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn crs(&self) -> &Crs {
        &self.crs
    }

    fn geometry_type(&self) -> GeometryType {
        self.geometry_type
    }

    fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn is_editable(&self) -> bool {
        self.editable
    }

    fn selected_features(&self) -> Vec<Feature> {
        self.collection
            .features
            .iter()
            .zip(&self.ids)
            .filter(|(_, fid)| self.is_selected(**fid))
            .map(|(feature, fid)| to_feature(*fid, feature))
            .collect()
    }

    fn change_geometry(&mut self, fid: FeatureId, geometry: geo::Geometry) -> bool {
        if !self.editable {
            return false;
        }
        let Some(index) = self.ids.iter().position(|id| *id == fid) else {
            return false;
        };
        let feature = &mut self.collection.features[index];
        feature.geometry = Some(geojson::Geometry::new(geojson::Value::from(&geometry)));
        feature.bbox = None;
        true
    }

    fn update_extents(&mut self) {
        self.collection.bbox = None;
    }

    fn trigger_repaint(&mut self) {}
}

/// SCR déclaré par le membre `crs` (GeoJSON 2008)
fn declared_crs(collection: &FeatureCollection) -> Result<Option<Crs>> {
    let name = collection
        .foreign_members
        .as_ref()
        .and_then(|m| m.get("crs"))
        .and_then(|crs| crs.get("properties"))
        .and_then(|p| p.get("name"))
        .and_then(JsonValue::as_str);

    let Some(name) = name else {
        return Ok(None);
    };

    let authid = match name.strip_prefix(CRS_URN_PREFIX) {
        Some(code) => format!("EPSG:{}", code),
        None => name.to_string(),
    };
    Ok(Some(Crs::from_authid(&authid)?))
}

fn feature_id(id: Option<&Id>, index: usize) -> Result<FeatureId> {
    match id {
        None => Ok(index as FeatureId),
        Some(Id::Number(n)) => n
            .as_i64()
            .with_context(|| format!("Feature id {} is not an integer", n)),
        Some(Id::String(s)) => s
            .parse()
            .with_context(|| format!("Feature id '{}' is not an integer", s)),
    }
}

fn layer_geometry_type(collection: &FeatureCollection) -> GeometryType {
    collection
        .features
        .iter()
        .filter_map(|f| f.geometry.as_ref())
        .find_map(|g| geo::Geometry::<f64>::try_from(g.value.clone()).ok())
        .map(|g| GeometryType::of(&g))
        .unwrap_or(GeometryType::Unknown)
}

/// Champs déduits des propriétés : les nombres sont des doubles
fn collect_fields(collection: &FeatureCollection) -> Vec<Field> {
    let mut types: Vec<(String, FieldType)> = Vec::new();
    for properties in collection.features.iter().filter_map(|f| f.properties.as_ref()) {
        for (name, value) in properties {
            let field_type = match value {
                JsonValue::Number(_) => FieldType::Double,
                JsonValue::String(_) => FieldType::Text,
                JsonValue::Null => continue,
                _ => FieldType::Other,
            };
            match types.iter_mut().find(|(n, _)| n == name) {
                Some((_, existing)) if *existing != field_type => *existing = FieldType::Other,
                Some(_) => {}
                None => types.push((name.clone(), field_type)),
            }
        }
    }
    types
        .into_iter()
        .map(|(name, field_type)| Field::new(name, field_type))
        .collect()
}

fn to_feature(fid: FeatureId, feature: &geojson::Feature) -> Feature {
    let geometry = feature.geometry.as_ref().and_then(|g| {
        match geo::Geometry::<f64>::try_from(g.value.clone()) {
            Ok(geom) => Some(geom),
            Err(e) => {
                warn!(fid, error = %e, "Unreadable geometry, treated as empty");
                None
            }
        }
    });

    Feature {
        id: fid,
        geometry,
        attributes: feature
            .properties
            .as_ref()
            .map(to_attributes)
            .unwrap_or_default(),
    }
}

fn to_attributes(properties: &JsonObject) -> HashMap<String, AttributeValue> {
    properties
        .iter()
        .map(|(name, value)| {
            let value = match value {
                JsonValue::Null => AttributeValue::Null,
                JsonValue::Number(n) => n
                    .as_f64()
                    .map(AttributeValue::Double)
                    .unwrap_or(AttributeValue::Null),
                JsonValue::String(s) => AttributeValue::Text(s.clone()),
                other => AttributeValue::Text(other.to_string()),
            };
            (name.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARCELS: &str = r#"{
        "type": "FeatureCollection",
        "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::2154"}},
        "features": [
            {"type": "Feature", "id": 10, "properties": {"surface": 400.0, "nom": "A"},
             "geometry": {"type": "Polygon", "coordinates": [[[0,0],[10,0],[10,10],[0,10],[0,0]]]}},
            {"type": "Feature", "id": "11", "properties": {"surface": null, "nom": "B"},
             "geometry": {"type": "Polygon", "coordinates": [[[20,0],[30,0],[30,10],[20,10],[20,0]]]}},
            {"type": "Feature", "properties": {"surface": 50}, "geometry": null}
        ]
    }"#;

    #[test]
    fn test_load() {
        let layer = GeoJsonLayer::from_geojson_str("parcelles", PARCELS, None).unwrap();
        assert_eq!(layer.crs().authid(), "EPSG:2154");
        assert_eq!(layer.geometry_type(), GeometryType::Polygon);
        assert_eq!(layer.ids, vec![10, 11, 2]);
        assert!(layer
            .fields()
            .contains(&Field::new("surface", FieldType::Double)));
        assert!(layer.fields().contains(&Field::new("nom", FieldType::Text)));
    }

    #[test]
    fn test_crs_override_and_default() {
        let utm = Crs::from_epsg(32722).unwrap();
        let layer = GeoJsonLayer::from_geojson_str("p", PARCELS, Some(utm)).unwrap();
        assert_eq!(layer.crs().authid(), "EPSG:32722");

        let bare = r#"{"type": "FeatureCollection", "features": []}"#;
        let layer = GeoJsonLayer::from_geojson_str("p", bare, None).unwrap();
        assert_eq!(layer.crs().authid(), "EPSG:4326");
        assert_eq!(layer.geometry_type(), GeometryType::Unknown);
    }

    #[test]
    fn test_selection() {
        let mut layer = GeoJsonLayer::from_geojson_str("parcelles", PARCELS, None).unwrap();
        assert_eq!(layer.selected_features().len(), 3);

        layer.select(&[11]);
        let selected = layer.selected_features();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, 11);
        assert_eq!(selected[0].target_area("surface"), None);
    }

    #[test]
    fn test_change_geometry_roundtrip() {
        let mut layer = GeoJsonLayer::from_geojson_str("parcelles", PARCELS, None).unwrap();
        let point = geo::Geometry::Point(geo::Point::new(1.0, 2.0));

        assert!(layer.change_geometry(10, point));
        assert!(!layer.change_geometry(99, geo::Geometry::Point(geo::Point::new(0.0, 0.0))));

        let json = layer.to_geojson_string().unwrap();
        assert!(json.contains("urn:ogc:def:crs:EPSG::2154"));
        let reloaded = GeoJsonLayer::from_geojson_str("parcelles", &json, None).unwrap();
        let first = &reloaded.selected_features()[0];
        assert_eq!(first.id, 10);
        assert!(matches!(first.geometry, Some(geo::Geometry::Point(_))));
    }

    #[test]
    fn test_read_only() {
        let mut layer = GeoJsonLayer::from_geojson_str("parcelles", PARCELS, None).unwrap();
        layer.set_editable(false);
        assert!(!layer.is_editable());
        assert!(!layer.change_geometry(10, geo::Geometry::Point(geo::Point::new(0.0, 0.0))));
    }

    #[test]
    fn test_non_integer_id_rejected() {
        let content = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "id": "abc", "properties": {}, "geometry": null}
        ]}"#;
        assert!(GeoJsonLayer::from_geojson_str("p", content, None).is_err());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let content = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "id": 1, "properties": {}, "geometry": null},
            {"type": "Feature", "id": 1, "properties": {}, "geometry": null}
        ]}"#;
        let err = GeoJsonLayer::from_geojson_str("p", content, None).unwrap_err();
        assert_eq!(err.to_string(), "Duplicate feature id 1 in layer 'p'");

        // Entité sans id : son index entre en conflit avec l'id explicite
        let content = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "id": 1, "properties": {}, "geometry": null},
            {"type": "Feature", "properties": {}, "geometry": null}
        ]}"#;
        assert!(GeoJsonLayer::from_geojson_str("p", content, None).is_err());
    }
}
