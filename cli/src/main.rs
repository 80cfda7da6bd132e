use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand};
use server::category::{db as category_db, mutations as category_mutations};
use server::db::{self, SqlitePool};
use server::error::OpError;
use server::page::{db as page_db, mutations as page_mutations};
use server::{config, validation::slug::slugify};

#[derive(Parser)]
#[command(name = "linkdex")]
#[command(about = "Linkdex CLI - Manage categories and pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the database with the sample dataset
    Populate,
    #[command(subcommand)]
    Category(CategoryCommands),
    #[command(subcommand)]
    Page(PageCommands),
}

#[derive(Subcommand)]
enum CategoryCommands {
    /// Create a new category (the slug is derived from the name)
    Add {
        /// Category display name
        name: String,
    },
    /// Rename a category; its slug is recomputed from the new name
    Rename {
        /// Current category slug
        slug: String,
        /// New display name
        new_name: String,
    },
}

#[derive(Subcommand)]
enum PageCommands {
    /// Create a new page under a category
    Add {
        /// Slug of the category to add the page to
        category_slug: String,
        /// Page title
        title: String,
        /// Absolute http(s) URL the page links to
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let app_config = config::loader::load_with_discovery()?;
    let (pool, _data_dir) = db::init_pool(&app_config.database.path).await?;

    match cli.command {
        Commands::Populate => populate(&pool).await?,
        Commands::Category(cmd) => match cmd {
            CategoryCommands::Add { name } => add_category(&pool, &name).await?,
            CategoryCommands::Rename { slug, new_name } => {
                rename_category(&pool, &slug, &new_name).await?
            }
        },
        Commands::Page(cmd) => match cmd {
            PageCommands::Add {
                category_slug,
                title,
                url,
            } => add_page(&pool, &category_slug, &title, &url).await?,
        },
    }

    Ok(())
}

async fn add_category(pool: &SqlitePool, name: &str) -> Result<()> {
    let category = category_mutations::create_category(pool, name)
        .await
        .map_err(user_error)?;

    println!("✓ Category created successfully!");
    println!("  ID:   {}", category.id);
    println!("  Name: {}", category.name);
    println!("  Slug: {}", category.slug);

    Ok(())
}

async fn rename_category(pool: &SqlitePool, slug: &str, new_name: &str) -> Result<()> {
    let category = category_mutations::rename_category(pool, slug, new_name)
        .await
        .map_err(user_error)?;

    println!("✓ Category renamed successfully!");
    println!("  Name: {}", category.name);
    println!("  Slug: {}", category.slug);

    Ok(())
}

async fn add_page(pool: &SqlitePool, category_slug: &str, title: &str, url: &str) -> Result<()> {
    let Some(category) = category_db::fetch_category_by_slug(pool, category_slug).await? else {
        bail!("no category with slug '{category_slug}'");
    };

    let page = page_mutations::create_page(pool, &category.id, title, url)
        .await
        .map_err(user_error)?;

    println!("✓ Page created successfully!");
    println!("  ID:       {}", page.id);
    println!("  Title:    {}", page.title);
    println!("  URL:      {}", page.url);
    println!("  Category: {}", category.slug);

    Ok(())
}

/// The sample dataset: three categories of Python-ecosystem links with
/// pre-baked counters so the top-N listings have something to rank.
async fn populate(pool: &SqlitePool) -> Result<()> {
    let dataset: &[(&str, i64, i64, &[(&str, &str, i64)])] = &[
        (
            "Python",
            128,
            64,
            &[
                (
                    "Official Python Tutorial",
                    "https://docs.python.org/3/tutorial/",
                    32,
                ),
                (
                    "How to Think like a Computer Scientist",
                    "http://www.greenteapress.com/thinkpython/",
                    16,
                ),
                (
                    "Learn Python in 10 Minutes",
                    "http://www.korokithakis.net/tutorials/python/",
                    8,
                ),
            ],
        ),
        (
            "Django",
            64,
            32,
            &[
                (
                    "Official Django Tutorial",
                    "https://docs.djangoproject.com/en/2.1/intro/tutorial01/",
                    24,
                ),
                ("Django Rocks", "http://www.djangorocks.com/", 12),
                (
                    "How to Tango with Django",
                    "http://www.tangowithdjango.com/",
                    6,
                ),
            ],
        ),
        (
            "Other Frameworks",
            32,
            16,
            &[
                ("Bottle", "http://bottlepy.org/docs/dev/", 4),
                ("Flask", "http://flask.pocoo.org", 2),
            ],
        ),
    ];

    for (name, views, likes, pages) in dataset {
        // Re-running populate against an existing database skips what's
        // already there.
        let category = match category_db::fetch_category_by_slug(pool, &slugify(name)).await? {
            Some(existing) => {
                println!("- Category '{name}' already exists, skipping");
                existing
            }
            None => {
                let category = category_mutations::create_category(pool, name)
                    .await
                    .map_err(user_error)?;
                category_db::set_counters(pool, &category.id, *views, *likes)
                    .await
                    .context("failed to set category counters")?;
                println!("✓ Category '{name}' created");
                category
            }
        };

        let existing = page_db::pages_for_category(pool, &category.id).await?;
        for (title, url, page_views) in *pages {
            if existing.iter().any(|p| p.title == *title) {
                continue;
            }
            let page = page_mutations::create_page(pool, &category.id, title, url)
                .await
                .map_err(user_error)?;
            page_db::set_views(pool, &page.id, *page_views)
                .await
                .context("failed to set page views")?;
            println!("  ✓ Page '{title}' created");
        }
    }

    println!("✓ Sample data in place");
    Ok(())
}

fn user_error(err: OpError) -> anyhow::Error {
    anyhow::anyhow!("{err}")
}
