//! The catalog site put together: business details, hours, products,
//! localized strings and the visit counter behind the carousel.

use crate::api::Translations;
use crate::catalog::{CatalogItem, CatalogView, Language, PRIMARY_GROUPS};
use crate::config::BusinessConfig;
use crate::featured::{self, Carousel};
use crate::links;
use crate::schedule::BusinessHours;
use crate::traits::{Clock, VisitStorage};
use crate::visits::VisitCounter;

pub struct Storefront<S: VisitStorage, C: Clock> {
    business: BusinessConfig,
    hours: BusinessHours<C>,
    catalog: Vec<CatalogItem>,
    translations: Translations,
    lang: Language,
    visits: VisitCounter<S>,
    featured_limit: usize,
}

impl<S: VisitStorage, C: Clock> Storefront<S, C> {
    pub fn new(
        business: BusinessConfig,
        hours: BusinessHours<C>,
        catalog: Vec<CatalogItem>,
        visits: VisitCounter<S>,
        featured_limit: usize,
    ) -> Self {
        Self {
            business,
            hours,
            catalog,
            translations: Translations::empty(),
            lang: Language::default(),
            visits,
            featured_limit,
        }
    }

    pub fn business(&self) -> &BusinessConfig {
        &self.business
    }

    pub fn hours(&self) -> &BusinessHours<C> {
        &self.hours
    }

    pub fn catalog(&self) -> &[CatalogItem] {
        &self.catalog
    }

    pub fn set_catalog(&mut self, catalog: Vec<CatalogItem>) {
        self.catalog = catalog;
    }

    pub fn translations(&self) -> &Translations {
        &self.translations
    }

    pub fn set_translations(&mut self, translations: Translations) {
        self.translations = translations;
    }

    pub fn language(&self) -> Language {
        self.lang
    }

    pub fn set_language(&mut self, lang: Language) {
        self.lang = lang;
    }

    /// Flip ES/EN. Translations for the new language must be loaded again.
    pub fn toggle_language(&mut self) -> Language {
        self.lang = self.lang.toggle();
        self.translations = Translations::empty();
        self.lang
    }

    /// Translated UI string with built-in fallback.
    pub fn text<'a>(&'a self, key: &str, es: &'a str, en: &'a str) -> &'a str {
        self.translations.text(key, self.lang, es, en)
    }

    pub fn find(&self, code: &str) -> Option<&CatalogItem> {
        self.catalog.iter().find(|item| item.code == code)
    }

    pub fn view(&self) -> CatalogView {
        CatalogView::new(&self.catalog)
    }

    // ==================== Featured / Visits ====================

    /// Current carousel selection, recomputed from the catalog and visits.
    pub fn featured(&mut self) -> Vec<CatalogItem> {
        let visits = self.visits.all();
        featured::select(&self.catalog, visits, &PRIMARY_GROUPS, self.featured_limit)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn carousel(&mut self, interval: std::time::Duration) -> Carousel<CatalogItem> {
        Carousel::new(self.featured(), interval)
    }

    /// A product was opened or its order link was clicked.
    pub fn record_visit(&mut self, code: &str) -> u64 {
        self.visits.record(code)
    }

    pub fn visits(&mut self) -> &mut VisitCounter<S> {
        &mut self.visits
    }

    // ==================== Location ====================

    pub fn is_open_now(&self) -> bool {
        self.hours.is_open_now()
    }

    pub fn open_label(&self) -> &str {
        if self.is_open_now() {
            self.text("location.hour_open", "Abierto", "Open")
        } else {
            self.text("location.hour_closed", "Fuera de horario", "Closed")
        }
    }

    pub fn address(&self) -> &str {
        self.translations
            .get("business.address")
            .unwrap_or(self.business.address.as_str())
    }

    pub fn map_link(&self) -> String {
        links::map_embed_link(&self.business.address)
    }

    // ==================== Contact ====================

    /// WhatsApp link for ordering `code`, or `None` for an unknown code.
    pub fn order_link(&self, code: &str) -> Option<String> {
        let item = self.find(code)?;
        Some(links::whatsapp_link(
            &self.business.phone_digits,
            &links::order_message(item, self.lang),
        ))
    }

    pub fn contact_link(&self) -> String {
        links::whatsapp_link(
            &self.business.phone_digits,
            links::general_order_message(self.lang),
        )
    }

    pub fn tel_link(&self) -> String {
        links::tel_link(&self.business.phone)
    }

    pub fn mailto_link(&self) -> String {
        links::mailto_link(&self.business.email)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use crate::catalog::sample_catalog;
    use crate::schedule::{BusinessClock, DEFAULT_TIMEZONE, default_hours};
    use crate::traits::{MemoryStorage, MockClock};

    fn storefront(storage: MemoryStorage) -> Storefront<MemoryStorage, MockClock> {
        // Wednesday 2024-02-14 12:00 CST
        let clock = MockClock::new(Utc.with_ymd_and_hms(2024, 2, 14, 18, 0, 0).unwrap());
        let hours = BusinessHours::new(
            default_hours(),
            BusinessClock::new(clock, DEFAULT_TIMEZONE).unwrap(),
        );
        Storefront::new(
            BusinessConfig::default(),
            hours,
            sample_catalog(),
            VisitCounter::new(storage),
            5,
        )
    }

    #[test]
    fn test_featured_follows_visits() {
        let mut site = storefront(MemoryStorage::new());
        assert_eq!(site.featured()[0].code, "1108");

        site.record_visit("2507");
        let featured = site.featured();
        assert_eq!(featured[0].code, "2507");
        assert_eq!(featured.len(), 2);
    }

    #[test]
    fn test_carousel_over_featured() {
        let mut site = storefront(MemoryStorage::new());
        let carousel = site.carousel(std::time::Duration::from_millis(4000));
        assert_eq!(carousel.len(), 2);
        assert_eq!(carousel.current().map(|i| i.code.as_str()), Some("1108"));
    }

    #[test]
    fn test_open_label_uses_translations() {
        let mut site = storefront(MemoryStorage::new());
        assert!(site.is_open_now());
        assert_eq!(site.open_label(), "Open");

        site.set_language(Language::Es);
        assert_eq!(site.open_label(), "Abierto");

        site.set_translations(
            Translations::from_value(json!({"location": {"hour_open": "Abierto ya"}})).unwrap(),
        );
        assert_eq!(site.open_label(), "Abierto ya");
    }

    #[test]
    fn test_toggle_language_clears_translations() {
        let mut site = storefront(MemoryStorage::new());
        site.set_translations(Translations::from_value(json!({"a": "b"})).unwrap());

        assert_eq!(site.toggle_language(), Language::Es);
        assert!(site.translations().is_empty());
    }

    #[test]
    fn test_order_link_for_known_and_unknown_codes() {
        let site = storefront(MemoryStorage::new());
        let link = site.order_link("1108").unwrap();
        assert!(link.starts_with("https://wa.me/12107769278?text=Hi%2C%20I'm%20interested"));
        assert!(site.order_link("nope").is_none());
    }

    #[test]
    fn test_contact_links() {
        let site = storefront(MemoryStorage::new());
        assert_eq!(site.tel_link(), "tel:(210) 776-9278");
        assert_eq!(site.mailto_link(), "mailto:cmsmexicanfoods@gmail.com");
        assert!(site.map_link().contains("5718%20Business%20Park"));
        assert!(site.contact_link().ends_with("place%20an%20order"));
    }

    #[test]
    fn test_address_override() {
        let mut site = storefront(MemoryStorage::new());
        assert_eq!(site.address(), "5718 Business Park, San Antonio, TX 78218");

        site.set_translations(
            Translations::from_value(json!({"business": {"address": "Otra dirección"}})).unwrap(),
        );
        assert_eq!(site.address(), "Otra dirección");
    }
}
