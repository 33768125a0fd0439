use std::time::Duration;

use crate::catalog::CatalogItem;
use crate::visits::VisitMap;

/// Maximum number of items in the carousel.
pub const FEATURED_LIMIT: usize = 5;

/// Default time between automatic slide changes.
pub const DEFAULT_ADVANCE_INTERVAL: Duration = Duration::from_millis(4000);

// ==================== Featured Selection ====================

/// Pick up to `limit` items for the carousel.
///
/// In order of preference:
/// 1. items of any primary group, most visited first (ties keep catalog order);
/// 2. the items of the first primary group, in declared order, that has any;
/// 3. the head of the catalog as served.
///
/// Never returns an empty list for a non-empty catalog and a non-zero limit.
pub fn select<'a>(
    catalog: &'a [CatalogItem],
    visits: &VisitMap,
    primary_groups: &[&str],
    limit: usize,
) -> Vec<&'a CatalogItem> {
    let visit_count = |item: &CatalogItem| visits.get(&item.code).copied().unwrap_or(0);

    let mut pool: Vec<&CatalogItem> = catalog
        .iter()
        .filter(|item| primary_groups.contains(&item.group.as_str()))
        .collect();
    if !pool.is_empty() {
        // sort_by is stable, equal counts keep their catalog order
        pool.sort_by(|a, b| visit_count(b).cmp(&visit_count(a)));
        pool.truncate(limit);
        return pool;
    }

    for group in primary_groups {
        let items: Vec<&CatalogItem> = catalog
            .iter()
            .filter(|item| item.group == *group)
            .take(limit)
            .collect();
        if !items.is_empty() {
            return items;
        }
    }

    tracing::debug!("No primary items in catalog, featuring catalog head");
    catalog.iter().take(limit).collect()
}

// ==================== Carousel ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CarouselState {
    #[default]
    Stopped,
    Running,
    /// Auto-advance suspended by a pointer or touch interaction.
    Paused,
}

/// Slideshow over the featured items with an explicit timer state.
///
/// The caller owns the actual timer and calls [`Carousel::tick`] every
/// [`Carousel::interval`]; ticks only advance while running.
#[derive(Debug, Clone)]
pub struct Carousel<T> {
    slides: Vec<T>,
    index: usize,
    state: CarouselState,
    interval: Duration,
}

impl<T> Carousel<T> {
    /// Build a carousel over at most [`FEATURED_LIMIT`] slides.
    pub fn new(slides: Vec<T>, interval: Duration) -> Self {
        let mut slides = slides;
        slides.truncate(FEATURED_LIMIT);
        Self {
            slides,
            index: 0,
            state: CarouselState::Stopped,
            interval,
        }
    }

    pub fn state(&self) -> CarouselState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn current(&self) -> Option<&T> {
        self.slides.get(self.index)
    }

    /// Whether the timer should be armed at all. A single slide never moves.
    pub fn auto_advances(&self) -> bool {
        self.state == CarouselState::Running && self.slides.len() > 1
    }

    pub fn start(&mut self) {
        if self.state == CarouselState::Stopped {
            self.state = CarouselState::Running;
        }
    }

    /// Pointer entered or touch began.
    pub fn pause(&mut self) {
        if self.state == CarouselState::Running {
            self.state = CarouselState::Paused;
        }
    }

    /// Pointer left or touch ended.
    pub fn resume(&mut self) {
        if self.state == CarouselState::Paused {
            self.state = CarouselState::Running;
        }
    }

    pub fn stop(&mut self) {
        self.state = CarouselState::Stopped;
    }

    /// Timer fired. Returns true if the slide changed.
    pub fn tick(&mut self) -> bool {
        if !self.auto_advances() {
            return false;
        }
        self.next();
        true
    }

    pub fn next(&mut self) {
        if !self.slides.is_empty() {
            self.index = (self.index + 1) % self.slides.len();
        }
    }

    pub fn prev(&mut self) {
        if !self.slides.is_empty() {
            let len = self.slides.len();
            self.index = (self.index + len - 1) % len;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PRIMARY_GROUPS, sample_catalog};

    fn item(code: &str, group: &str) -> CatalogItem {
        CatalogItem {
            code: code.to_string(),
            group: group.to_string(),
            name_es: code.to_string(),
            name_en: code.to_string(),
            presentation: String::new(),
            description_es: String::new(),
            description_en: String::new(),
            images: Vec::new(),
        }
    }

    fn visits(pairs: &[(&str, u64)]) -> VisitMap {
        pairs.iter().map(|(c, n)| (c.to_string(), *n)).collect()
    }

    fn codes(items: &[&CatalogItem]) -> Vec<String> {
        items.iter().map(|i| i.code.clone()).collect()
    }

    // ==================== Selection Tests ====================

    #[test]
    fn test_ranking_by_visits() {
        let catalog = vec![
            item("C", "Mini tacos"),
            item("B", "Mini tacos"),
            item("A", "Mini tacos"),
        ];
        let counts = visits(&[("A", 5), ("B", 1), ("C", 0)]);
        let top = select(&catalog, &counts, &PRIMARY_GROUPS, 2);
        assert_eq!(codes(&top), vec!["A", "B"]);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let catalog = vec![
            item("x", "Tortilla de Maíz"),
            item("y", "Chips y Shells"),
            item("z", "Mini tacos"),
        ];
        let top = select(&catalog, &VisitMap::new(), &PRIMARY_GROUPS, 5);
        assert_eq!(codes(&top), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_secondary_items_excluded_when_primary_exist() {
        let catalog = sample_catalog();
        let counts = visits(&[("2401/1100", 100)]);
        let top = select(&catalog, &counts, &PRIMARY_GROUPS, 5);
        assert_eq!(codes(&top), vec!["1108", "2507"]);
    }

    #[test]
    fn test_fallback_to_catalog_head() {
        let catalog = vec![
            item("1", "Especias"),
            item("2", "Mole"),
            item("3", "Caldos"),
        ];
        let top = select(&catalog, &VisitMap::new(), &PRIMARY_GROUPS, 2);
        assert_eq!(codes(&top), vec!["1", "2"]);
    }

    #[test]
    fn test_empty_catalog_selects_nothing() {
        assert!(select(&[], &VisitMap::new(), &PRIMARY_GROUPS, 5).is_empty());
    }

    #[test]
    fn test_limit_zero_selects_nothing() {
        assert!(select(&sample_catalog(), &VisitMap::new(), &PRIMARY_GROUPS, 0).is_empty());
    }

    #[test]
    fn test_select_is_idempotent() {
        let catalog = sample_catalog();
        let counts = visits(&[("2507", 3)]);
        let first = select(&catalog, &counts, &PRIMARY_GROUPS, 5);
        let second = select(&catalog, &counts, &PRIMARY_GROUPS, 5);
        assert_eq!(first, second);
    }

    // ==================== Carousel Tests ====================

    #[test]
    fn test_carousel_truncates_to_limit() {
        let carousel = Carousel::new((0..8).collect(), DEFAULT_ADVANCE_INTERVAL);
        assert_eq!(carousel.len(), FEATURED_LIMIT);
        assert_eq!(carousel.current(), Some(&0));
    }

    #[test]
    fn test_stopped_carousel_does_not_advance() {
        let mut carousel = Carousel::new(vec!['a', 'b'], DEFAULT_ADVANCE_INTERVAL);
        assert!(!carousel.tick());
        assert_eq!(carousel.index(), 0);
    }

    #[test]
    fn test_running_carousel_wraps() {
        let mut carousel = Carousel::new(vec!['a', 'b', 'c'], DEFAULT_ADVANCE_INTERVAL);
        carousel.start();
        assert!(carousel.tick());
        assert!(carousel.tick());
        assert_eq!(carousel.current(), Some(&'c'));
        assert!(carousel.tick());
        assert_eq!(carousel.current(), Some(&'a'));
    }

    #[test]
    fn test_pause_and_resume_keep_position() {
        let mut carousel = Carousel::new(vec!['a', 'b', 'c'], DEFAULT_ADVANCE_INTERVAL);
        carousel.start();
        carousel.tick();

        carousel.pause();
        assert_eq!(carousel.state(), CarouselState::Paused);
        assert!(!carousel.tick());
        assert_eq!(carousel.current(), Some(&'b'));

        carousel.resume();
        assert_eq!(carousel.state(), CarouselState::Running);
        assert!(carousel.tick());
        assert_eq!(carousel.current(), Some(&'c'));
    }

    #[test]
    fn test_resume_does_not_start_stopped_carousel() {
        let mut carousel = Carousel::new(vec!['a', 'b'], DEFAULT_ADVANCE_INTERVAL);
        carousel.resume();
        assert_eq!(carousel.state(), CarouselState::Stopped);

        carousel.start();
        carousel.stop();
        carousel.pause();
        assert_eq!(carousel.state(), CarouselState::Stopped);
    }

    #[test]
    fn test_single_slide_never_auto_advances() {
        let mut carousel = Carousel::new(vec!['a'], DEFAULT_ADVANCE_INTERVAL);
        carousel.start();
        assert!(!carousel.auto_advances());
        assert!(!carousel.tick());
    }

    #[test]
    fn test_manual_navigation_wraps_both_ways() {
        let mut carousel = Carousel::new(vec!['a', 'b', 'c'], DEFAULT_ADVANCE_INTERVAL);
        carousel.prev();
        assert_eq!(carousel.current(), Some(&'c'));
        carousel.next();
        assert_eq!(carousel.current(), Some(&'a'));
    }

    #[test]
    fn test_empty_carousel_is_inert() {
        let mut carousel: Carousel<char> = Carousel::new(Vec::new(), DEFAULT_ADVANCE_INTERVAL);
        carousel.start();
        carousel.next();
        carousel.prev();
        assert!(carousel.is_empty());
        assert_eq!(carousel.current(), None);
    }

    // ==================== Property-Based Tests ====================

    #[cfg(test)]
    mod proptest_tests {
        use proptest::prelude::*;

        use super::*;
        use crate::catalog::SECONDARY_GROUPS;

        fn arb_catalog() -> impl Strategy<Value = Vec<CatalogItem>> {
            let groups: Vec<&'static str> = PRIMARY_GROUPS
                .iter()
                .chain(SECONDARY_GROUPS.iter())
                .copied()
                .chain(["Bebidas"])
                .collect();
            let group_count = groups.len();
            prop::collection::vec(0usize..group_count, 0..20).prop_map(move |entries| {
                entries
                    .into_iter()
                    .enumerate()
                    .map(|(i, g)| item(&format!("item-{}", i), groups[g]))
                    .collect()
            })
        }

        proptest! {
            #[test]
            fn never_empty_for_non_empty_catalog(
                catalog in arb_catalog(),
                limit in 1usize..10,
            ) {
                let top = select(&catalog, &VisitMap::new(), &PRIMARY_GROUPS, limit);
                prop_assert!(top.len() <= limit);
                prop_assert_eq!(top.is_empty(), catalog.is_empty());
            }

            #[test]
            fn ranked_counts_are_descending(
                catalog in arb_catalog(),
                counts in prop::collection::vec(0u64..10, 20),
            ) {
                let visit_map: VisitMap = catalog
                    .iter()
                    .zip(&counts)
                    .map(|(item, &n)| (item.code.clone(), n))
                    .collect();
                let top = select(&catalog, &visit_map, &PRIMARY_GROUPS, FEATURED_LIMIT);
                let ranked: Vec<u64> = top
                    .iter()
                    .map(|i| visit_map.get(&i.code).copied().unwrap_or(0))
                    .collect();
                if top.iter().all(|i| PRIMARY_GROUPS.contains(&i.group.as_str())) {
                    prop_assert!(ranked.windows(2).all(|w| w[0] >= w[1]));
                }
            }
        }
    }
}
