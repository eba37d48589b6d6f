//! Text measurement. The layout engine only needs line widths; heights come
//! from the configured font size and leading.

use std::collections::HashMap;
use std::sync::Mutex;

use fontdb::{Database, Family, Query, Stretch, Weight};
use once_cell::sync::Lazy;
use ttf_parser::Face;

/// Weight/slant a measured line is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
}

impl FontStyle {
    pub const NORMAL: FontStyle = FontStyle {
        bold: false,
        italic: false,
    };
    pub const BOLD: FontStyle = FontStyle {
        bold: true,
        italic: false,
    };
}

/// Measures rendered text width. Injected into the layout pass so the engine
/// stays independent of any particular font backend.
pub trait Measurer {
    fn text_width(&self, text: &str, family: &str, size: f32, style: FontStyle) -> f32;
}

/// Advance-width ratio used when no glyph or no font is available.
const FALLBACK_ADVANCE: f32 = 0.56;

static METRICS: Lazy<Mutex<MetricsCache>> = Lazy::new(|| Mutex::new(MetricsCache::new()));

/// System-font measurer backed by fontdb and ttf-parser. Falls back to a
/// fixed average advance when the requested family cannot be resolved, so
/// headless environments still get a usable layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontMeasurer;

impl Measurer for FontMeasurer {
    fn text_width(&self, text: &str, family: &str, size: f32, style: FontStyle) -> f32 {
        if text.is_empty() || size <= 0.0 {
            return 0.0;
        }
        let fallback = size * FALLBACK_ADVANCE * text.chars().count() as f32;
        let Ok(mut cache) = METRICS.lock() else {
            return fallback;
        };
        match cache.metrics(family, style) {
            Some(metrics) => metrics.width_of(text, size),
            None => fallback,
        }
    }
}

struct MetricsCache {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<(String, bool, bool), Option<FaceMetrics>>,
}

impl MetricsCache {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn metrics(&mut self, family: &str, style: FontStyle) -> Option<&FaceMetrics> {
        let key = (family.trim().to_string(), style.bold, style.italic);
        if !self.faces.contains_key(&key) {
            let loaded = self.load(family, style);
            self.faces.insert(key.clone(), loaded);
        }
        self.faces.get(&key).and_then(|m| m.as_ref())
    }

    fn load(&mut self, family: &str, style: FontStyle) -> Option<FaceMetrics> {
        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }
        let names: Vec<&str> = family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\''))
            .filter(|part| !part.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = Vec::with_capacity(names.len() + 1);
        for name in &names {
            match name.to_ascii_lowercase().as_str() {
                "serif" => families.push(Family::Serif),
                "sans-serif" | "system-ui" => families.push(Family::SansSerif),
                "monospace" => families.push(Family::Monospace),
                _ => families.push(Family::Name(name)),
            }
        }
        families.push(Family::SansSerif);
        let query = Query {
            families: &families,
            weight: if style.bold {
                Weight::BOLD
            } else {
                Weight::NORMAL
            },
            stretch: Stretch::Normal,
            style: if style.italic {
                fontdb::Style::Italic
            } else {
                fontdb::Style::Normal
            },
        };
        let id = self.db.query(&query)?;
        let mut metrics = None;
        self.db.with_face_data(id, |data, index| {
            if let Ok(face) = Face::parse(data, index) {
                metrics = Some(FaceMetrics::from_face(&face));
            }
        });
        metrics
    }
}

/// Precomputed ASCII advance table; everything else uses the average.
struct FaceMetrics {
    units_per_em: f32,
    ascii: [u16; 128],
    average: f32,
}

impl FaceMetrics {
    fn from_face(face: &Face<'_>) -> Self {
        let mut ascii = [0u16; 128];
        let mut total = 0u32;
        let mut counted = 0u32;
        for byte in 0x20u8..0x7f {
            if let Some(glyph) = face.glyph_index(byte as char) {
                let advance = face.glyph_hor_advance(glyph).unwrap_or(0);
                ascii[byte as usize] = advance;
                if advance > 0 {
                    total += advance as u32;
                    counted += 1;
                }
            }
        }
        let units_per_em = face.units_per_em().max(1) as f32;
        let average = if counted > 0 {
            total as f32 / counted as f32
        } else {
            units_per_em * FALLBACK_ADVANCE
        };
        Self {
            units_per_em,
            ascii,
            average,
        }
    }

    fn width_of(&self, text: &str, size: f32) -> f32 {
        let scale = size / self.units_per_em;
        let mut width = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = match u32::from(ch) {
                code if code < 128 => {
                    let table = self.ascii[code as usize];
                    if table > 0 { table as f32 } else { self.average }
                }
                _ => self.average,
            };
            width += advance * scale;
        }
        width.max(0.0)
    }
}
