//! Font faces resolved once at startup.

use std::path::PathBuf;

use resvg::usvg::fontdb::{self, Database, Family, Query};
use thiserror::Error;
use tracing::{debug, info};
use ttf_parser::{Face, GlyphId, OutlineBuilder};

use super::{FontWeight, GlyphMetrics, GlyphOutline, GlyphSource, PathSegment};
use crate::config::FontConfig;

/// Weights the layouts ask for: regular subtitle, black wordmark and letter.
pub const REQUIRED_WEIGHTS: [FontWeight; 2] = [FontWeight::REGULAR, FontWeight::BLACK];

#[derive(Debug, Error)]
pub enum FontError {
    #[error("font directory {0} does not exist")]
    MissingDirectory(PathBuf),

    #[error("no font matches the family stack at weight {0}")]
    NoMatch(u16),

    #[error("failed to parse font face: {0}")]
    Parse(#[from] ttf_parser::FaceParsingError),
}

/// An owned face plus the weight it was registered under.
#[derive(Debug)]
struct RegisteredFace {
    family: String,
    weight: FontWeight,
    data: Vec<u8>,
    index: u32,
}

impl RegisteredFace {
    fn new(family: String, weight: FontWeight, data: &[u8], index: u32) -> Result<Self, FontError> {
        // Validate once so later lookups can treat a parse failure as "no glyph".
        Face::parse(data, index)?;
        Ok(Self {
            family,
            weight,
            data: data.to_vec(),
            index,
        })
    }

    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, self.index).ok()
    }
}

/// Immutable set of faces, one per weight, shared by every render.
#[derive(Debug, Default)]
pub struct FontRegistry {
    faces: Vec<RegisteredFace>,
}

impl FontRegistry {
    /// Resolves the configured family stack for every required weight.
    ///
    /// # Errors
    ///
    /// Fails if the font directory is missing or some weight has no match.
    pub fn load(config: &FontConfig) -> Result<Self, FontError> {
        let mut db = Database::new();

        if let Some(dir) = &config.dir {
            if !dir.is_dir() {
                return Err(FontError::MissingDirectory(dir.clone()));
            }
            db.load_fonts_dir(dir);
        }
        if config.system_fonts {
            db.load_system_fonts();
        }
        info!(faces = db.len(), "Font database populated");

        let families: Vec<Family<'_>> = config
            .families
            .iter()
            .map(|name| Family::Name(name.as_str()))
            .chain(std::iter::once(Family::Serif))
            .collect();

        let mut registry = Self::default();
        for weight in REQUIRED_WEIGHTS {
            let query = Query {
                families: &families,
                weight: fontdb::Weight(weight.0),
                ..Query::default()
            };
            let id = db.query(&query).ok_or(FontError::NoMatch(weight.0))?;
            let family = db
                .face(id)
                .and_then(|info| info.families.first())
                .map(|(name, _)| name.clone())
                .unwrap_or_default();

            let face = db
                .with_face_data(id, |data, index| {
                    RegisteredFace::new(family.clone(), weight, data, index)
                })
                .ok_or(FontError::NoMatch(weight.0))??;

            info!(family = %face.family, weight = weight.0, "Registered font face");
            registry.faces.push(face);
        }

        Ok(registry)
    }

    /// Registers raw font bytes under an explicit weight.
    ///
    /// # Errors
    ///
    /// Fails if the bytes are not a parseable TrueType/OpenType face.
    pub fn add_face(
        &mut self,
        family: impl Into<String>,
        weight: FontWeight,
        data: &[u8],
        index: u32,
    ) -> Result<(), FontError> {
        let face = RegisteredFace::new(family.into(), weight, data, index)?;
        debug!(family = %face.family, weight = weight.0, "Registered font face");
        self.faces.push(face);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Family names in registration order.
    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.faces.iter().map(|f| f.family.as_str())
    }

    fn closest(&self, weight: FontWeight) -> Option<&RegisteredFace> {
        self.faces
            .iter()
            .min_by_key(|f| f.weight.0.abs_diff(weight.0))
    }

    fn with_glyph<T>(
        &self,
        ch: char,
        weight: FontWeight,
        f: impl FnOnce(&Face<'_>, GlyphId) -> T,
    ) -> Option<T> {
        let face = self.closest(weight)?.face()?;
        let glyph = face.glyph_index(ch).unwrap_or(GlyphId(0));
        Some(f(&face, glyph))
    }
}

impl GlyphSource for FontRegistry {
    fn metrics(&self, ch: char, size: f32, weight: FontWeight) -> GlyphMetrics {
        self.with_glyph(ch, weight, |face, glyph| {
            let scale = size / f32::from(face.units_per_em());
            let advance = face.glyph_hor_advance(glyph).unwrap_or(0);
            let (ascent, descent) = face
                .glyph_bounding_box(glyph)
                .map_or((0.0, 0.0), |bbox| {
                    (f32::from(bbox.y_max) * scale, -f32::from(bbox.y_min) * scale)
                });
            GlyphMetrics {
                width: f32::from(advance) * scale,
                ascent,
                descent,
            }
        })
        .unwrap_or_default()
    }

    fn outline(&self, ch: char, size: f32, weight: FontWeight) -> Option<GlyphOutline> {
        self.with_glyph(ch, weight, |face, glyph| {
            let mut builder = ScaledOutline {
                scale: size / f32::from(face.units_per_em()),
                outline: GlyphOutline::default(),
            };
            face.outline_glyph(glyph, &mut builder)?;
            Some(builder.outline)
        })
        .flatten()
        .filter(|outline| !outline.is_empty())
    }
}

/// Collects font-unit outline commands as y-down pixel segments.
struct ScaledOutline {
    scale: f32,
    outline: GlyphOutline,
}

impl ScaledOutline {
    fn pt(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.scale, -y * self.scale)
    }
}

impl OutlineBuilder for ScaledOutline {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.pt(x, y);
        self.outline.segments.push(PathSegment::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.pt(x, y);
        self.outline.segments.push(PathSegment::LineTo(x, y));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.pt(x1, y1);
        let (x, y) = self.pt(x, y);
        self.outline.segments.push(PathSegment::QuadTo(x1, y1, x, y));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.pt(x1, y1);
        let (x2, y2) = self.pt(x2, y2);
        let (x, y) = self.pt(x, y);
        self.outline
            .segments
            .push(PathSegment::CubicTo(x1, y1, x2, y2, x, y));
    }

    fn close(&mut self) {
        self.outline.segments.push(PathSegment::Close);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_is_an_error() {
        let config = FontConfig {
            dir: Some(PathBuf::from("/definitely/not/a/font/dir")),
            system_fonts: false,
            ..FontConfig::default()
        };
        let err = FontRegistry::load(&config).unwrap_err();
        assert!(matches!(err, FontError::MissingDirectory(_)));
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let mut registry = FontRegistry::default();
        let err = registry
            .add_face("Nope", FontWeight::BLACK, b"not a font", 0)
            .unwrap_err();
        assert!(matches!(err, FontError::Parse(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn empty_registry_measures_nothing() {
        let registry = FontRegistry::default();
        let m = registry.metrics('A', 100.0, FontWeight::BLACK);
        assert_eq!(m, GlyphMetrics::default());
        assert!(registry.outline('A', 100.0, FontWeight::BLACK).is_none());
    }

    #[test]
    fn scaled_outline_flips_y() {
        let mut builder = ScaledOutline {
            scale: 0.5,
            outline: GlyphOutline::default(),
        };
        builder.move_to(10.0, 20.0);
        builder.line_to(30.0, -40.0);
        builder.close();
        assert_eq!(
            builder.outline.segments,
            vec![
                PathSegment::MoveTo(5.0, -10.0),
                PathSegment::LineTo(15.0, 20.0),
                PathSegment::Close,
            ]
        );
    }
}
