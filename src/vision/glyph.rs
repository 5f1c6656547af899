//! Info bar letter recognition
//!
//! The info bar at the top of the map reports the result of an evade
//! attempt or a fleet running out of steps. Its lettering is normalized
//! and compared against a small set of prepared templates.

use std::path::Path;

use image::{GrayImage, Luma, RgbaImage};
use imageproc::template_matching::{match_template, MatchTemplateMethod};
use once_cell::sync::OnceCell;

use super::VisionError;

/// Messages the info bar can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlyphLabel {
    /// "Evaded the ambush"
    EvadeSuccess,
    /// "Failed to evade"
    EvadeFailed,
    /// "Not enough steps"
    WalkOutOfStep,
}

impl GlyphLabel {
    /// Template image file name for this label
    pub fn file_name(&self) -> &'static str {
        match self {
            GlyphLabel::EvadeSuccess => "TEMPLATE_AMBUSH_EVADE_SUCCESS.png",
            GlyphLabel::EvadeFailed => "TEMPLATE_AMBUSH_EVADE_FAILED.png",
            GlyphLabel::WalkOutOfStep => "TEMPLATE_MAP_WALK_OUT_OF_STEP.png",
        }
    }

    /// The template set this label belongs to
    pub fn set(&self) -> GlyphSet {
        match self {
            GlyphLabel::EvadeSuccess | GlyphLabel::EvadeFailed => GlyphSet::AmbushEvade,
            GlyphLabel::WalkOutOfStep => GlyphSet::Walk,
        }
    }
}

/// Templates compared together, one set per flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphSet {
    AmbushEvade,
    Walk,
}

impl GlyphSet {
    pub fn labels(&self) -> &'static [GlyphLabel] {
        match self {
            GlyphSet::AmbushEvade => &[GlyphLabel::EvadeSuccess, GlyphLabel::EvadeFailed],
            GlyphSet::Walk => &[GlyphLabel::WalkOutOfStep],
        }
    }
}

/// Normalize info bar lettering: grayscale, drop the dark background and
/// stretch the remaining range.
pub fn info_letter_preprocess(image: &RgbaImage) -> GrayImage {
    let mut gray = image::imageops::grayscale(image);
    for pixel in gray.pixels_mut() {
        let value = (pixel[0] as f32 - 64.0) / 0.75;
        *pixel = Luma([value.clamp(0.0, 255.0) as u8]);
    }
    gray
}

/// Best normalized cross-correlation of a template anywhere in an image
///
/// Windows with no signal (all black) score 0.
pub fn match_score(image: &GrayImage, template: &GrayImage) -> f32 {
    let (tw, th) = template.dimensions();
    if tw == 0 || th == 0 || tw > image.width() || th > image.height() {
        return 0.0;
    }

    let scores = match_template(image, template, MatchTemplateMethod::CrossCorrelationNormalized);
    scores
        .pixels()
        .map(|p| p[0])
        .filter(|score| score.is_finite())
        .fold(0.0, f32::max)
}

/// A group of templates, preprocessed on first use
pub struct TemplateSet {
    raw: Vec<(GlyphLabel, RgbaImage)>,
    prepared: OnceCell<Vec<(GlyphLabel, GrayImage)>>,
}

impl TemplateSet {
    pub fn new(raw: Vec<(GlyphLabel, RgbaImage)>) -> Self {
        Self {
            raw,
            prepared: OnceCell::new(),
        }
    }

    /// Preprocessed templates, prepared once and cached
    pub fn prepared(&self) -> &[(GlyphLabel, GrayImage)] {
        self.prepared.get_or_init(|| {
            log::debug!("Preparing {} info bar templates", self.raw.len());
            self.raw
                .iter()
                .map(|(label, image)| (*label, info_letter_preprocess(image)))
                .collect()
        })
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared.get().is_some()
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

/// Classifies cropped info bars against per-flow template sets
pub struct GlyphClassifier {
    ambush: TemplateSet,
    walk: TemplateSet,
    similarity: f32,
}

impl GlyphClassifier {
    /// Build a classifier from raw template images
    ///
    /// Each template lands in the set of its label.
    pub fn new(templates: Vec<(GlyphLabel, RgbaImage)>, similarity: f32) -> Self {
        let (ambush, walk): (Vec<_>, Vec<_>) = templates
            .into_iter()
            .partition(|(label, _)| label.set() == GlyphSet::AmbushEvade);

        Self {
            ambush: TemplateSet::new(ambush),
            walk: TemplateSet::new(walk),
            similarity,
        }
    }

    /// Load every template image from a directory
    pub fn load(dir: impl AsRef<Path>, similarity: f32) -> Result<Self, VisionError> {
        let dir = dir.as_ref();
        let labels = GlyphSet::AmbushEvade
            .labels()
            .iter()
            .chain(GlyphSet::Walk.labels());

        let mut templates = Vec::new();
        for label in labels {
            let path = dir.join(label.file_name());
            let image = image::open(&path).map_err(|source| VisionError::TemplateLoad {
                name: label.file_name().to_string(),
                source,
            })?;
            templates.push((*label, image.to_rgba8()));
        }

        log::info!("Loaded {} info bar templates from {}", templates.len(), dir.display());
        Ok(Self::new(templates, similarity))
    }

    pub fn templates(&self, set: GlyphSet) -> &TemplateSet {
        match set {
            GlyphSet::AmbushEvade => &self.ambush,
            GlyphSet::Walk => &self.walk,
        }
    }

    /// Classify a cropped info bar against one template set
    ///
    /// Returns the best scoring label above the similarity threshold, or
    /// `None` when nothing in the set matches.
    pub fn classify(&self, set: GlyphSet, crop: &RgbaImage) -> Option<GlyphLabel> {
        let image = info_letter_preprocess(crop);

        let mut best: Option<(GlyphLabel, f32)> = None;
        for (label, template) in self.templates(set).prepared() {
            let score = match_score(&image, template);
            log::debug!("Template {:?}: {:.3}", label, score);

            let better = match best {
                Some((_, top)) => score > top,
                None => true,
            };
            if score > self.similarity && better {
                best = Some((*label, score));
            }
        }

        best.map(|(label, _)| label)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    /// Vertical stripes
    pub(crate) fn success_glyph() -> RgbaImage {
        ImageBuffer::from_fn(16, 8, |x, _| if x % 4 < 2 { WHITE } else { BLACK })
    }

    /// Horizontal stripes
    pub(crate) fn failed_glyph() -> RgbaImage {
        ImageBuffer::from_fn(16, 8, |_, y| if y % 4 < 2 { WHITE } else { BLACK })
    }

    /// Solid left half
    pub(crate) fn out_of_step_glyph() -> RgbaImage {
        ImageBuffer::from_fn(16, 8, |x, _| if x < 8 { WHITE } else { BLACK })
    }

    pub(crate) fn classifier() -> GlyphClassifier {
        GlyphClassifier::new(
            vec![
                (GlyphLabel::EvadeSuccess, success_glyph()),
                (GlyphLabel::EvadeFailed, failed_glyph()),
                (GlyphLabel::WalkOutOfStep, out_of_step_glyph()),
            ],
            0.85,
        )
    }

    /// A dark info bar crop with a glyph drawn at (4, 2)
    fn bar_with(glyph: &RgbaImage) -> RgbaImage {
        let mut bar: RgbaImage = ImageBuffer::from_pixel(24, 12, BLACK);
        image::imageops::overlay(&mut bar, glyph, 4, 2);
        bar
    }

    #[test]
    fn test_preprocess() {
        let image: RgbaImage = ImageBuffer::from_fn(3, 1, |x, _| match x {
            0 => Rgba([40, 40, 40, 255]),
            1 => Rgba([127, 127, 127, 255]),
            _ => Rgba([255, 255, 255, 255]),
        });
        let processed = info_letter_preprocess(&image);
        assert_eq!(processed.get_pixel(0, 0)[0], 0);
        assert_eq!(processed.get_pixel(1, 0)[0], 84);
        assert_eq!(processed.get_pixel(2, 0)[0], 254);
    }

    #[test]
    fn test_classify_evade_result() {
        let classifier = classifier();
        assert_eq!(
            classifier.classify(GlyphSet::AmbushEvade, &bar_with(&success_glyph())),
            Some(GlyphLabel::EvadeSuccess)
        );
        assert_eq!(
            classifier.classify(GlyphSet::AmbushEvade, &bar_with(&failed_glyph())),
            Some(GlyphLabel::EvadeFailed)
        );
    }

    #[test]
    fn test_unrecognised_bar() {
        let classifier = classifier();
        let empty: RgbaImage = ImageBuffer::from_pixel(24, 12, BLACK);
        assert_eq!(classifier.classify(GlyphSet::AmbushEvade, &empty), None);
        assert_eq!(
            classifier.classify(GlyphSet::AmbushEvade, &bar_with(&out_of_step_glyph())),
            None
        );
    }

    #[test]
    fn test_sets_do_not_cross_match() {
        let classifier = classifier();
        assert_eq!(
            classifier.classify(GlyphSet::Walk, &bar_with(&out_of_step_glyph())),
            Some(GlyphLabel::WalkOutOfStep)
        );
        assert_eq!(classifier.classify(GlyphSet::Walk, &bar_with(&success_glyph())), None);
    }

    #[test]
    fn test_templates_prepared_once() {
        let classifier = classifier();
        let set = classifier.templates(GlyphSet::AmbushEvade);
        assert_eq!(set.len(), 2);
        assert!(!set.is_prepared());

        classifier.classify(GlyphSet::AmbushEvade, &bar_with(&success_glyph()));
        assert!(set.is_prepared());
        assert!(!classifier.templates(GlyphSet::Walk).is_prepared());

        let first = set.prepared().as_ptr();
        classifier.classify(GlyphSet::AmbushEvade, &bar_with(&failed_glyph()));
        assert_eq!(first, set.prepared().as_ptr());
    }

    #[test]
    fn test_template_larger_than_crop() {
        let tiny: GrayImage = ImageBuffer::new(4, 4);
        let template: GrayImage = ImageBuffer::from_pixel(8, 8, Luma([255]));
        assert_eq!(match_score(&tiny, &template), 0.0);
    }

    #[test]
    fn test_load_templates_from_directory() {
        let dir = std::env::temp_dir().join(format!("ambush-templates-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        success_glyph().save(dir.join("TEMPLATE_AMBUSH_EVADE_SUCCESS.png")).unwrap();
        failed_glyph().save(dir.join("TEMPLATE_AMBUSH_EVADE_FAILED.png")).unwrap();
        // Stored without alpha, the loader has to widen it back to RGBA
        image::DynamicImage::ImageRgba8(out_of_step_glyph())
            .to_rgb8()
            .save(dir.join("TEMPLATE_MAP_WALK_OUT_OF_STEP.png"))
            .unwrap();

        let classifier = GlyphClassifier::load(&dir, 0.85).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(classifier.templates(GlyphSet::AmbushEvade).len(), 2);
        assert_eq!(classifier.templates(GlyphSet::Walk).len(), 1);
        assert_eq!(
            classifier.classify(GlyphSet::AmbushEvade, &bar_with(&success_glyph())),
            Some(GlyphLabel::EvadeSuccess)
        );
        assert_eq!(
            classifier.classify(GlyphSet::AmbushEvade, &bar_with(&failed_glyph())),
            Some(GlyphLabel::EvadeFailed)
        );
        assert_eq!(
            classifier.classify(GlyphSet::Walk, &bar_with(&out_of_step_glyph())),
            Some(GlyphLabel::WalkOutOfStep)
        );
    }

    #[test]
    fn test_load_missing_directory() {
        let result = GlyphClassifier::load("/nonexistent/templates", 0.85);
        assert!(matches!(result, Err(VisionError::TemplateLoad { .. })));
    }
}
