use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Image shown when an item has no pictures of its own.
pub const PLACEHOLDER_IMAGE: &str = "/images/placeholder.jpg";

/// Main product line, in display order.
pub const PRIMARY_GROUPS: [&str; 7] = [
    "Tortilla de Maíz",
    "Tortilla de Maseca®",
    "Tortilla cortada para freir",
    "Productos de Harina",
    "Mini tacos",
    "Chips y Shells",
    "Bultos de harina",
];

/// Spices, seasonings and everything else, in display order.
pub const SECONDARY_GROUPS: [&str; 7] = [
    "Especias",
    "Sazonadores",
    "Caldos",
    "Chilitos",
    "Chile seco",
    "Mole",
    "Más productos",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Unknown language: {0} (expected \"es\" or \"en\")")]
    UnknownLanguage(String),
    #[error("Unknown view tab: {0} (expected \"all\", \"primary\" or \"secondary\")")]
    UnknownTab(String),
}

// ==================== Language ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Es,
    #[default]
    En,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::En => "en",
        }
    }

    /// The other language, as flipped by the ES/EN switch.
    pub fn toggle(self) -> Self {
        match self {
            Language::Es => Language::En,
            Language::En => Language::Es,
        }
    }

    /// Pick between a Spanish and an English string.
    pub fn pick<'a>(self, es: &'a str, en: &'a str) -> &'a str {
        match self {
            Language::Es => es,
            Language::En => en,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "es" | "spanish" | "español" => Ok(Language::Es),
            "en" | "english" => Ok(Language::En),
            _ => Err(CatalogError::UnknownLanguage(s.to_string())),
        }
    }
}

/// A pair of Spanish and English strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Localized {
    #[serde(default)]
    pub es: String,
    #[serde(default)]
    pub en: String,
}

impl Localized {
    pub fn new(es: &str, en: &str) -> Self {
        Self {
            es: es.to_string(),
            en: en.to_string(),
        }
    }

    pub fn get(&self, lang: Language) -> &str {
        lang.pick(&self.es, &self.en)
    }
}

// ==================== Catalog Items ====================

/// A single product as served by the catalog data source.
///
/// Identity is `code`; the data source is trusted to keep codes unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub group: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name_es: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name_en: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub presentation: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description_es: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description_en: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
}

/// Missing and `null` fields both read as empty.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl CatalogItem {
    pub fn name(&self, lang: Language) -> &str {
        lang.pick(&self.name_es, &self.name_en)
    }

    pub fn description(&self, lang: Language) -> &str {
        lang.pick(&self.description_es, &self.description_en)
    }

    pub fn cover_image(&self) -> &str {
        self.images
            .first()
            .map(String::as_str)
            .unwrap_or(PLACEHOLDER_IMAGE)
    }

    pub fn group_kind(&self) -> Option<GroupKind> {
        GroupKind::of(&self.group)
    }

    fn matches(&self, query: &str) -> bool {
        let haystack = format!(
            "{}{}{}{}{}",
            self.name_es, self.name_en, self.description_es, self.presentation, self.code
        );
        haystack.to_lowercase().contains(query)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Primary,
    Secondary,
}

impl GroupKind {
    /// Classify a group name. Groups outside both enumerations are `None`.
    pub fn of(group: &str) -> Option<Self> {
        if PRIMARY_GROUPS.contains(&group) {
            Some(GroupKind::Primary)
        } else if SECONDARY_GROUPS.contains(&group) {
            Some(GroupKind::Secondary)
        } else {
            None
        }
    }
}

/// Built-in catalog shown until (or instead of) the fetched one.
pub fn sample_catalog() -> Vec<CatalogItem> {
    vec![
        CatalogItem {
            code: "1108".to_string(),
            group: "Productos de Harina".to_string(),
            name_es: "Tortilla de harina 6\" 11ct".to_string(),
            name_en: "Flour tortilla 6\" 11ct".to_string(),
            presentation: "Paquete".to_string(),
            description_es: "Tortilla de harina tamaño 6 pulgadas.".to_string(),
            description_en: "6-inch flour tortillas.".to_string(),
            images: Vec::new(),
        },
        CatalogItem {
            code: "2507".to_string(),
            group: "Chips y Shells".to_string(),
            name_es: "Tostada shells 200 ct".to_string(),
            name_en: "Tostada shells 200 ct".to_string(),
            presentation: "Caja 200 piezas".to_string(),
            description_es: "Tostadas listas para servir.".to_string(),
            description_en: "Ready-to-serve tostada shells.".to_string(),
            images: Vec::new(),
        },
        CatalogItem {
            code: "2401/1100".to_string(),
            group: "Especias".to_string(),
            name_es: "Ajo granulado".to_string(),
            name_en: "Granulated garlic".to_string(),
            presentation: "5 libras".to_string(),
            description_es: "Ajo granulado calidad foodservice.".to_string(),
            description_en: "Foodservice-grade granulated garlic.".to_string(),
            images: Vec::new(),
        },
    ]
}

// ==================== Catalog View ====================

/// Which part of the catalog the product section shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewTab {
    #[default]
    All,
    Primary,
    Secondary,
}

impl ViewTab {
    pub fn label(self, lang: Language) -> &'static str {
        match self {
            ViewTab::All => lang.pick("Todas", "All"),
            ViewTab::Primary => lang.pick("Productos principales", "Main products"),
            ViewTab::Secondary => {
                lang.pick("Especias, sazonadores y más", "Spices, seasonings & more")
            }
        }
    }

    /// Key used by the translation files (`filters.<key>`).
    pub fn translation_key(self) -> &'static str {
        match self {
            ViewTab::All => "filters.all",
            ViewTab::Primary => "filters.primary",
            ViewTab::Secondary => "filters.seasonings",
        }
    }

    fn shows(self, kind: GroupKind) -> bool {
        matches!(
            (self, kind),
            (ViewTab::All, _)
                | (ViewTab::Primary, GroupKind::Primary)
                | (ViewTab::Secondary, GroupKind::Secondary)
        )
    }
}

impl FromStr for ViewTab {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(ViewTab::All),
            "primary" => Ok(ViewTab::Primary),
            "secondary" | "seasonings" => Ok(ViewTab::Secondary),
            _ => Err(CatalogError::UnknownTab(s.to_string())),
        }
    }
}

/// One horizontal row of the product section: a group and its items.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRow<'a> {
    pub group: &'static str,
    pub items: Vec<&'a CatalogItem>,
}

/// Rows to render for a given query and tab.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogRows<'a> {
    pub primary: Vec<CatalogRow<'a>>,
    pub secondary: Vec<CatalogRow<'a>>,
}

impl CatalogRows<'_> {
    /// True when nothing matched ("no products found").
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.secondary.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.primary
            .iter()
            .chain(&self.secondary)
            .map(|row| row.items.len())
            .sum()
    }
}

/// Catalog grouped by category, each group sorted by Spanish name.
#[derive(Debug, Clone, Default)]
pub struct CatalogView {
    by_group: HashMap<String, Vec<CatalogItem>>,
}

impl CatalogView {
    pub fn new(items: &[CatalogItem]) -> Self {
        let mut by_group: HashMap<String, Vec<CatalogItem>> = HashMap::new();
        for item in items {
            by_group
                .entry(item.group.clone())
                .or_default()
                .push(item.clone());
        }
        for group in by_group.values_mut() {
            group.sort_by_cached_key(|item| item.name_es.to_lowercase());
        }
        Self { by_group }
    }

    /// Items of one group, sorted. Unknown groups yield an empty slice.
    pub fn group(&self, name: &str) -> &[CatalogItem] {
        self.by_group.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Build the rows for a free-text query and a tab.
    ///
    /// Groups outside the fixed enumerations are never shown, and groups with
    /// no matching items are dropped.
    pub fn rows(&self, query: &str, tab: ViewTab) -> CatalogRows<'_> {
        let query = query.trim().to_lowercase();

        CatalogRows {
            primary: if tab.shows(GroupKind::Primary) {
                self.build_rows(&PRIMARY_GROUPS, &query)
            } else {
                Vec::new()
            },
            secondary: if tab.shows(GroupKind::Secondary) {
                self.build_rows(&SECONDARY_GROUPS, &query)
            } else {
                Vec::new()
            },
        }
    }

    fn build_rows(&self, groups: &[&'static str], query: &str) -> Vec<CatalogRow<'_>> {
        groups
            .iter()
            .filter_map(|&group| {
                let items: Vec<&CatalogItem> = self
                    .group(group)
                    .iter()
                    .filter(|item| query.is_empty() || item.matches(query))
                    .collect();
                (!items.is_empty()).then_some(CatalogRow { group, items })
            })
            .collect()
    }
}
