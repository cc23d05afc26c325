//! Static reference data for the civilizations a story can be set in.

use serde::Serialize;

use crate::models::{Culture, StoryType};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CultureProfile {
    pub culture: Culture,
    pub name: &'static str,
    pub description: &'static str,
    pub characters: &'static [&'static str],
    pub places: &'static [&'static str],
    pub elements: &'static [&'static str],
}

const MEXICA: CultureProfile = CultureProfile {
    culture: Culture::Mexica,
    name: "Mexica (Azteca)",
    description: "Imperio poderoso del centro de México",
    characters: &["Quetzalcóatl", "Tezcatlipoca", "Moctezuma", "Cuauhtémoc"],
    places: &["Tenochtitlan", "Templo Mayor", "Lago de Texcoco", "Tlatelolco"],
    elements: &["calpulli", "huey tlatoani", "pochteca", "macuahuitl"],
};

const MAYA: CultureProfile = CultureProfile {
    culture: Culture::Maya,
    name: "Maya",
    description: "Civilización avanzada del sureste mexicano",
    characters: &["Itzamná", "Kukulkán", "Ixchel", "Chaac"],
    places: &["Chichén Itzá", "Palenque", "Tikal", "Uxmal"],
    elements: &["cenotes", "observatorios", "códices", "tzolk'in"],
};

const ZAPOTECA: CultureProfile = CultureProfile {
    culture: Culture::Zapoteca,
    name: "Zapoteca",
    description: "Cultura del valle de Oaxaca",
    characters: &["Pitao Cocijo", "Pitao Cozobi", "Cosijopi"],
    places: &["Monte Albán", "Mitla", "Zaachila", "Yagul"],
    elements: &["guelaguetza", "jeroglíficos", "urnas funerarias"],
};

const OLMECA: CultureProfile = CultureProfile {
    culture: Culture::Olmeca,
    name: "Olmeca",
    description: "Cultura madre de Mesoamérica",
    characters: &["Jaguar", "Hombre-Jaguar", "Niño-Jaguar"],
    places: &["La Venta", "Tres Zapotes", "San Lorenzo"],
    elements: &["cabezas colosales", "altares", "hachas ceremoniales"],
};

const TOLTECA: CultureProfile = CultureProfile {
    culture: Culture::Tolteca,
    name: "Tolteca",
    description: "Maestros artesanos del centro de México",
    characters: &["Ce Ácatl Topiltzin", "Quetzalcóatl"],
    places: &["Tollan-Xicocotitlan", "Tula"],
    elements: &["atlantes", "chac mool", "serpiente emplumada"],
};

pub fn profile(culture: Culture) -> &'static CultureProfile {
    match culture {
        Culture::Mexica => &MEXICA,
        Culture::Maya => &MAYA,
        Culture::Zapoteca => &ZAPOTECA,
        Culture::Olmeca => &OLMECA,
        Culture::Tolteca => &TOLTECA,
    }
}

pub fn all_profiles() -> Vec<&'static CultureProfile> {
    Culture::ALL.into_iter().map(profile).collect()
}

pub fn story_type_description(story_type: StoryType) -> &'static str {
    match story_type {
        StoryType::Myth => "Relatos sobre dioses y la creación del mundo",
        StoryType::Legend => "Historias heroicas de personajes legendarios",
        StoryType::Adventure => "Viajes épicos y descubrimientos",
        StoryType::Didactic => "Enseñanzas sobre valores y tradiciones",
        StoryType::Fantasy => "Mundos mágicos con elementos sobrenaturales",
    }
}

#[derive(Debug, Serialize)]
pub struct StoryTypeInfo {
    pub story_type: StoryType,
    pub description: &'static str,
}

/// Everything the story form needs to offer choices and suggestions.
#[derive(Debug, Serialize)]
pub struct ReferenceData {
    pub cultures: Vec<&'static CultureProfile>,
    pub story_types: Vec<StoryTypeInfo>,
}

pub fn reference_data() -> ReferenceData {
    ReferenceData {
        cultures: all_profiles(),
        story_types: StoryType::ALL
            .into_iter()
            .map(|story_type| StoryTypeInfo {
                story_type,
                description: story_type_description(story_type),
            })
            .collect(),
    }
}
