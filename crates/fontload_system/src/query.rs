//! Translating request settings into a font database query.
//!
//! Understood keys: `weight`, `style`, `stretch`. Other keys still shape
//! the cache key but do not affect matching.

use fontdb::{Stretch, Style, Weight};
use fontload_core::{SettingValue, Settings};

/// Face attributes to look for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceQuery {
    /// Requested weight
    pub weight: Weight,
    /// Requested style
    pub style: Style,
    /// Requested stretch
    pub stretch: Stretch,
    /// Whether the style was set explicitly and must match exactly
    pub strict_style: bool,
}

impl Default for FaceQuery {
    fn default() -> Self {
        Self {
            weight: Weight::NORMAL,
            style: Style::Normal,
            stretch: Stretch::Normal,
            strict_style: false,
        }
    }
}

impl FaceQuery {
    /// Build from request settings; unparseable values fall back to defaults
    #[must_use]
    pub fn from_settings(settings: Option<&Settings>) -> Self {
        let mut query = Self::default();
        let Some(settings) = settings else {
            return query;
        };

        if let Some(weight) = settings.get("weight").and_then(parse_weight) {
            query.weight = weight;
        }
        if let Some(style) = settings.get("style").and_then(parse_style) {
            query.style = style;
            query.strict_style = true;
        }
        if let Some(stretch) = settings.get("stretch").and_then(parse_stretch) {
            query.stretch = stretch;
        }
        query
    }
}

fn parse_weight(value: &SettingValue) -> Option<Weight> {
    match value.as_str().map(str::trim) {
        Some("normal") => return Some(Weight::NORMAL),
        Some("bold") => return Some(Weight::BOLD),
        _ => {}
    }
    let weight = value.as_i64()?;
    (1..=1000).contains(&weight).then(|| Weight(weight as u16))
}

fn parse_style(value: &SettingValue) -> Option<Style> {
    match value.as_str()?.trim() {
        "normal" => Some(Style::Normal),
        "italic" => Some(Style::Italic),
        s if s.starts_with("oblique") => Some(Style::Oblique),
        _ => None,
    }
}

fn parse_stretch(value: &SettingValue) -> Option<Stretch> {
    let stretch = match value.as_str()?.trim() {
        "ultra-condensed" => Stretch::UltraCondensed,
        "extra-condensed" => Stretch::ExtraCondensed,
        "condensed" => Stretch::Condensed,
        "semi-condensed" => Stretch::SemiCondensed,
        "normal" => Stretch::Normal,
        "semi-expanded" => Stretch::SemiExpanded,
        "expanded" => Stretch::Expanded,
        "extra-expanded" => Stretch::ExtraExpanded,
        "ultra-expanded" => Stretch::UltraExpanded,
        _ => return None,
    };
    Some(stretch)
}
