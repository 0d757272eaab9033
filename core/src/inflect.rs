//! Plural-to-singular reduction used before dictionary lookups.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

static UNCOUNTABLE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "advice", "aircraft", "always", "bison", "chassis", "clothes", "corps", "deer",
        "does", "equipment", "fish", "furniture", "information", "jeans", "lens", "means",
        "money", "moose", "news", "perhaps", "plus", "police", "rice", "series", "sheep",
        "species", "thus", "trousers", "was", "has", "his", "its", "yes", "this", "whereas",
    ]
    .into_iter()
    .collect()
});

static IRREGULAR: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("analyses", "analysis"),
        ("calves", "calf"),
        ("canoes", "canoe"),
        ("children", "child"),
        ("cookies", "cookie"),
        ("crises", "crisis"),
        ("criteria", "criterion"),
        ("dice", "die"),
        ("elves", "elf"),
        ("feet", "foot"),
        ("geese", "goose"),
        ("halves", "half"),
        ("indices", "index"),
        ("knives", "knife"),
        ("leaves", "leaf"),
        ("lives", "life"),
        ("loaves", "loaf"),
        ("matrices", "matrix"),
        ("men", "man"),
        ("mice", "mouse"),
        ("movies", "movie"),
        ("oxen", "ox"),
        ("people", "person"),
        ("phenomena", "phenomenon"),
        ("scarves", "scarf"),
        ("selves", "self"),
        ("shelves", "shelf"),
        ("shoes", "shoe"),
        ("teeth", "tooth"),
        ("theses", "thesis"),
        ("thieves", "thief"),
        ("toes", "toe"),
        ("wives", "wife"),
        ("wolves", "wolf"),
        ("women", "woman"),
    ]
    .into_iter()
    .collect()
});

/// Singulars ending in a sibilant `s` whose plural adds "es" ("buses").
/// Other "-uses" and "-ases" plurals ("causes", "cases") only add "s".
static SIBILANT_SINGULARS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "alias", "apparatus", "atlas", "bias", "bonus", "bus", "cactus", "campus", "canvas",
        "census", "chorus", "circus", "focus", "gas", "genius", "iris", "minus", "octopus",
        "prospectus", "status", "syllabus", "virus", "walrus",
    ]
    .into_iter()
    .collect()
});

/// Singulars ending in "che", whose plural would otherwise lose the "e".
static CHE_SINGULARS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "ache", "avalanche", "backache", "bellyache", "cache", "cliche", "creche", "earache",
        "headache", "heartache", "microfiche", "moustache", "mustache", "niche", "psyche",
        "quiche", "stomachache", "toothache",
    ]
    .into_iter()
    .collect()
});

/// Reduce a lowercase word to its singular form. Words that are already
/// singular, or that the rules do not recognise, come back unchanged.
pub fn singularize(word: &str) -> String {
    if let Some(single) = IRREGULAR.get(word) {
        return (*single).to_string();
    }
    if UNCOUNTABLE.contains(word) || word.chars().count() <= 3 {
        return word.to_string();
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("es") {
        if SIBILANT_SINGULARS.contains(stem) {
            return stem.to_string();
        }
    }
    if let Some(stem) = word.strip_suffix('s') {
        if CHE_SINGULARS.contains(stem) {
            return stem.to_string();
        }
    }
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    for suffix in ["sses", "xes", "ches", "shes", "zzes", "oes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    match word.strip_suffix('s') {
        Some(stem) => stem.to_string(),
        None => word.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_plurals() {
        assert_eq!(singularize("cats"), "cat");
        assert_eq!(singularize("cities"), "city");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("churches"), "church");
        assert_eq!(singularize("classes"), "class");
        assert_eq!(singularize("potatoes"), "potato");
        assert_eq!(singularize("waves"), "wave");
    }

    #[test]
    fn sibilant_singulars_drop_es() {
        assert_eq!(singularize("buses"), "bus");
        assert_eq!(singularize("gases"), "gas");
        assert_eq!(singularize("viruses"), "virus");
        assert_eq!(singularize("causes"), "cause");
        assert_eq!(singularize("houses"), "house");
        assert_eq!(singularize("cases"), "case");
    }

    #[test]
    fn che_singulars_keep_their_e() {
        assert_eq!(singularize("headaches"), "headache");
        assert_eq!(singularize("aches"), "ache");
        assert_eq!(singularize("niches"), "niche");
        assert_eq!(singularize("caches"), "cache");
        assert_eq!(singularize("beaches"), "beach");
        assert_eq!(singularize("attaches"), "attach");
    }

    #[test]
    fn irregular_plurals() {
        assert_eq!(singularize("children"), "child");
        assert_eq!(singularize("people"), "person");
        assert_eq!(singularize("wolves"), "wolf");
        assert_eq!(singularize("teeth"), "tooth");
    }

    #[test]
    fn singulars_are_untouched() {
        for word in ["glass", "status", "analysis", "sheep", "news", "bus", "determination"] {
            assert_eq!(singularize(word), word);
        }
    }
}
