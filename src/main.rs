use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cms_catalog::{
    BusinessClock, BusinessHours, CatalogClient, FileStorage, Language, Storefront, SystemClock,
    VisitCounter, ViewTab, config::AppConfig, sample_catalog,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "cms-catalog")]
#[command(about = "Bilingual product catalog: hours, featured products and ordering links")]
struct Args {
    /// Display language (es or en)
    #[arg(long, global = true, default_value = "en")]
    lang: Language,

    /// Skip fetching and use the built-in catalog
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show whether the business is open right now, with the weekly hours
    Status,
    /// Show the products the carousel would feature
    Featured,
    /// List the catalog grouped by category
    Catalog {
        /// Free-text filter
        #[arg(long, default_value = "")]
        query: String,
        /// all, primary or secondary
        #[arg(long, default_value = "all")]
        tab: ViewTab,
    },
    /// Record a visit for a product code
    Visit { code: String },
    /// Print the WhatsApp order link for a product, or the general contact link
    Link { code: Option<String> },
    /// Export visit counts to a CSV file
    Export {
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Cycle through the featured carousel
    Slideshow {
        /// Number of full passes before stopping
        #[arg(long, default_value_t = 1)]
        rounds: usize,
    },
}

type Site = Storefront<FileStorage, SystemClock>;

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::builder()
            .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
            .parse_lossy("cms_catalog=debug")
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    let mut site = build_site(&config)?;
    site.set_language(args.lang);

    if !args.offline {
        rt.block_on(load_remote_data(&config, &mut site))?;
    }

    match args.command {
        Command::Status => print_status(&site),
        Command::Featured => print_featured(&mut site),
        Command::Catalog { query, tab } => print_catalog(&site, &query, tab),
        Command::Visit { code } => {
            if site.find(&code).is_none() {
                tracing::warn!("{} is not in the current catalog", code);
            }
            let count = site.record_visit(&code);
            println!("{}: {}", code, count);
        }
        Command::Link { code } => match code {
            Some(code) => {
                let link = site
                    .order_link(&code)
                    .with_context(|| format!("Unknown product code: {}", code))?;
                site.record_visit(&code);
                println!("{}", link);
            }
            None => println!("{}", site.contact_link()),
        },
        Command::Export { dir } => {
            let path = site.visits().export_to_csv(&dir, &SystemClock)?;
            println!("{}", path.display());
        }
        Command::Slideshow { rounds } => {
            rt.block_on(run_slideshow(&mut site, config.carousel.interval(), rounds));
        }
    }

    Ok(())
}

fn build_site(config: &AppConfig) -> Result<Site> {
    let clock = BusinessClock::new(SystemClock, &config.business.timezone)
        .context("Invalid business timezone")?;
    let hours = BusinessHours::new(config.business.hours.clone(), clock);

    let visits_path = config.data.visits_path();
    tracing::debug!("Visit counts stored at {}", visits_path.display());
    let visits = VisitCounter::new(FileStorage::new(visits_path));

    Ok(Storefront::new(
        config.business.clone(),
        hours,
        sample_catalog(),
        visits,
        config.carousel.featured_limit,
    ))
}

/// Fetch catalog and translations concurrently; either may fall back.
async fn load_remote_data(config: &AppConfig, site: &mut Site) -> Result<()> {
    let client = CatalogClient::new(config.data.base_url.clone(), &config.network)?;

    let (catalog, translations) = tokio::join!(
        client.load_catalog(),
        client.load_translations(site.language())
    );

    site.set_catalog(catalog);
    site.set_translations(translations);
    Ok(())
}

fn print_status(site: &Site) {
    let lang = site.language();
    let business = site.business();

    println!("{}", business.name);
    println!("{}", site.text("business.tagline", &business.tagline, &business.tagline));
    println!();
    println!(
        "{}: {}",
        site.text("location.title", "Ubicación", "Location"),
        site.open_label()
    );
    for row in site.hours().rows() {
        println!("  {:<12} {}", row.label(lang), row.hours);
    }
    println!();
    println!("{}", site.address());
    println!("{}", site.map_link());
    println!("{}  {}", site.tel_link(), site.mailto_link());
}

fn print_featured(site: &mut Site) {
    let lang = site.language();
    let featured = site.featured();
    if featured.is_empty() {
        println!(
            "{}",
            site.text(
                "carousel.empty",
                "Agrega productos al primer grupo para ver el carrusel.",
                "Add products to the main group to show the carousel."
            )
        );
        return;
    }
    for (i, item) in featured.iter().enumerate() {
        println!(
            "{}. [{}] {} - {}",
            i + 1,
            item.code,
            item.name(lang),
            item.description(lang)
        );
    }
}

fn print_catalog(site: &Site, query: &str, tab: ViewTab) {
    let lang = site.language();
    let view = site.view();
    let rows = view.rows(query, tab);

    if rows.is_empty() {
        println!(
            "{}",
            lang.pick("No encontramos productos con ese criterio.", "No products found.")
        );
        return;
    }

    let sections = [
        (
            &rows.primary,
            site.text(
                "product_groups.primary_title",
                "Nuestros productos principales",
                "Main product line",
            ),
        ),
        (
            &rows.secondary,
            site.text(
                "product_groups.sec_title",
                "Especias, sazonadores y más",
                "Spices, seasonings & more",
            ),
        ),
    ];

    for (section, title) in sections {
        if section.is_empty() {
            continue;
        }
        println!("== {} ==", title);
        for row in section {
            println!("{}", row.group);
            for item in &row.items {
                println!(
                    "  [{}] {} ({})",
                    item.code,
                    item.name(lang),
                    item.presentation
                );
            }
        }
    }
}

async fn run_slideshow(site: &mut Site, interval: Duration, rounds: usize) {
    let lang = site.language();
    let mut carousel = site.carousel(interval);
    if carousel.is_empty() {
        tracing::info!("Nothing to show in the carousel");
        return;
    }

    carousel.start();
    let mut ticker = tokio::time::interval(carousel.interval());
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let total = carousel.len() * rounds;
    for _ in 0..total {
        ticker.tick().await;
        if let Some(item) = carousel.current() {
            println!("[{}] {}", item.code, item.name(lang));
        }
        if !carousel.tick() {
            break;
        }
    }
    carousel.stop();
}
