//! CMS Catalog Library
//!
//! Core of the bilingual product catalog for a wholesale food distributor:
//! business hours in a fixed timezone, the popularity-ranked carousel, and
//! the data sources and links around them.

pub mod api;
pub mod catalog;
pub mod config;
pub mod featured;
pub mod links;
pub mod schedule;
pub mod storefront;
pub mod traits;
pub mod visits;

// Re-export commonly used types
pub use api::{CatalogClient, MountGuard, Translations, fetch_or_default, or_fallback};
pub use catalog::{
    CatalogItem, CatalogView, GroupKind, Language, Localized, PRIMARY_GROUPS, SECONDARY_GROUPS,
    ViewTab, sample_catalog,
};
pub use config::AppConfig;
pub use featured::{Carousel, CarouselState, FEATURED_LIMIT, select};
pub use schedule::{
    BusinessClock, BusinessHours, DaySet, HoursRow, LocalSample, ScheduleRule, is_open,
    parse_range,
};
pub use storefront::Storefront;
pub use traits::{Clock, MemoryStorage, MockClock, SystemClock, VisitStorage};
pub use visits::{FileStorage, VisitCounter, VisitMap};
