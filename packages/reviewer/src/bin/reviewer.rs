//! Operator CLI for browsing and reviewing extracted articles
//!
//! A thin consumer of `reviewer_core`: every command goes through a
//! `ReviewSession` the same way an interactive front end would.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use reviewer_core::common::ArticleId;
use reviewer_core::domains::articles::{
    Article, EditField, EditState, FilterSelection, PageView, RawFilters, ReviewDecision,
    ReviewError, ReviewSession, ReviewState, ReviewTarget, SortKey, SummaryStatus,
};
use reviewer_core::kernel::{BaseArticleStore, PgArticleStore};
use reviewer_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "reviewer")]
#[command(about = "Browse extracted magazine articles and review their AI summaries")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List one page of articles matching the filters
    List {
        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long, default_value_t = 1)]
        page: i64,

        /// id, year or year_desc
        #[arg(long, default_value = "id")]
        sort: SortKey,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the years, editions and authors available for filtering
    Facets {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Accept or reject an article's summary (or the article itself)
    Review {
        article_id: ArticleId,

        /// accept or reject
        decision: ReviewDecision,

        /// summary or article
        #[arg(long, default_value = "summary")]
        target: ReviewTarget,

        /// Confirm without prompting
        #[arg(long)]
        yes: bool,
    },

    /// Replace an article's revised title, summary or content
    Edit {
        article_id: ArticleId,

        /// title, summary or content
        field: EditField,

        /// New text; empty clears a title or summary
        value: String,

        /// Confirm both prompts without asking
        #[arg(long)]
        yes: bool,
    },

    /// List articles with an accepted summary that are not marked best byte
    AcceptedWithoutBestByte,
}

#[derive(clap::Args)]
struct FilterArgs {
    #[arg(long)]
    year: Option<String>,

    /// none, pending_review, accepted or rejected
    #[arg(long)]
    summary_status: Option<String>,

    /// yes or no
    #[arg(long)]
    has_summary: Option<String>,

    /// Source PDF name
    #[arg(long)]
    edition: Option<String>,

    /// Repeat to match any of several authors
    #[arg(long = "author")]
    authors: Vec<String>,

    #[arg(long)]
    best_byte: Option<String>,

    /// pending_review, accepted or rejected
    #[arg(long)]
    article_status: Option<String>,
}

impl FilterArgs {
    fn selection(&self) -> FilterSelection {
        FilterSelection::from_raw(&RawFilters {
            year: self.year.clone(),
            summary_status: self.summary_status.clone(),
            has_summary: self.has_summary.clone(),
            edition: self.edition.clone(),
            authors: self.authors.clone(),
            best_byte: self.best_byte.clone(),
            article_review_status: self.article_status.clone(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,reviewer_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(page_size = config.page_size, "Configuration loaded");

    // Connect to database
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let store = PgArticleStore::new(pool);
    let session = ReviewSession::new(config.page_size, config.confirmation_policy());

    match cli.command {
        Commands::List {
            filters,
            page,
            sort,
            json,
        } => {
            let mut session = session.with_sort(sort);
            let view = session
                .load_page(&store, filters.selection(), Some(page))
                .await
                .context("Failed to load articles")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_page(&view);
            }
        }
        Commands::Facets { filters } => {
            let mut session = session;
            session
                .load_page(&store, filters.selection(), Some(1))
                .await
                .context("Failed to load articles")?;
            let facets = session.facet_options(&store).await?;
            println!("{}", style("Years").bold());
            for year in facets.years {
                println!("  {}", year);
            }
            println!("{}", style("Editions").bold());
            for edition in facets.editions {
                println!("  {}", edition);
            }
            println!("{}", style("Authors").bold());
            for author in facets.authors {
                println!("  {}", author);
            }
            println!("{}", style("Have summary").bold());
            println!("  yes ({} articles)", facets.with_summary);
            println!("  no ({} articles)", facets.without_summary);
        }
        Commands::Review {
            article_id,
            decision,
            target,
            yes,
        } => review(&store, session, article_id, target, decision, yes).await?,
        Commands::Edit {
            article_id,
            field,
            value,
            yes,
        } => edit(&store, session, article_id, field, &value, yes).await?,
        Commands::AcceptedWithoutBestByte => accepted_without_best_byte(&store, session).await?,
    }

    Ok(())
}

fn print_page(view: &PageView) {
    println!(
        "{}",
        style(format!(
            "Page {} of {} ({} articles)",
            view.page, view.total_pages, view.total_count
        ))
        .bold()
    );
    if view.articles.is_empty() {
        println!("No articles found matching the filters.");
        return;
    }
    for article in &view.articles {
        print_article(article);
    }
}

fn print_article(article: &Article) {
    let status = match article.summary_status {
        SummaryStatus::Accepted => style(article.summary_status.to_string()).green(),
        SummaryStatus::Rejected => style(article.summary_status.to_string()).red(),
        SummaryStatus::PendingReview => style(article.summary_status.to_string()).yellow(),
        SummaryStatus::None => style(article.summary_status.to_string()).dim(),
    };
    println!();
    println!(
        "{} {}",
        style(article.display_title()).bold(),
        style(article.id).dim()
    );
    println!(
        "  {} | {} | {} | best byte: {}",
        article.author.as_deref().unwrap_or("Unknown"),
        article.year,
        article.pdf_name,
        article.best_byte
    );
    println!(
        "  summary: {}  article: {}",
        status, article.article_review_status
    );
    if let Some(summary) = &article.content_summary {
        println!("  {}", summary);
    }
}

async fn review(
    store: &dyn BaseArticleStore,
    mut session: ReviewSession,
    article_id: ArticleId,
    target: ReviewTarget,
    decision: ReviewDecision,
    yes: bool,
) -> Result<()> {
    let article = store
        .find_by_id(article_id)
        .await?
        .with_context(|| format!("Article {} not found", article_id))?;
    print_article(&article);

    let state = session
        .request_review(store, article_id, target, decision)
        .await;
    let state = match state {
        Ok(ReviewState::AwaitingConfirmation { .. }) => {
            let confirmed = yes
                || confirm(format!(
                    "Are you sure you want to {} this {}?",
                    decision, target
                ))?;
            if confirmed {
                session.confirm_review(store, article_id, target).await
            } else {
                session.cancel_review(article_id, target)
            }
        }
        other => other,
    };

    match state {
        Ok(ReviewState::Committed { decision }) => {
            println!("{}", style(format!("{} {}ed", target, decision)).green());
            Ok(())
        }
        Ok(ReviewState::Cancelled) => {
            println!("{}", style("Cancelled, nothing was changed").yellow());
            Ok(())
        }
        Ok(other) => anyhow::bail!("Unexpected review state: {}", other.name()),
        Err(ReviewError::Store(error)) if !error.is_retryable() => {
            anyhow::bail!("{} (refresh the article list)", error)
        }
        Err(error) => Err(error.into()),
    }
}

fn confirm(prompt: String) -> Result<bool> {
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

async fn edit(
    store: &dyn BaseArticleStore,
    mut session: ReviewSession,
    article_id: ArticleId,
    field: EditField,
    value: &str,
    yes: bool,
) -> Result<()> {
    let article = store
        .find_by_id(article_id)
        .await?
        .with_context(|| format!("Article {} not found", article_id))?;
    print_article(&article);

    session.request_edit(article_id, field, value);

    let state = if yes || confirm(format!("Save changes to the {}?", field))? {
        session.confirm_edit(article_id, field)?;
        if yes || confirm(format!("This permanently replaces the {}. Save now?", field))? {
            session.confirm_edit_final(store, article_id, field).await
        } else {
            session.cancel_edit(article_id, field)
        }
    } else {
        session.cancel_edit(article_id, field)
    };

    match state? {
        EditState::Saved => {
            println!("{}", style(format!("{} saved", field)).green());
            Ok(())
        }
        EditState::Cancelled => {
            println!("{}", style("Cancelled, nothing was changed").yellow());
            Ok(())
        }
        other => anyhow::bail!("Unexpected edit state: {}", other.name()),
    }
}

/// Articles with an accepted summary that were not picked as best byte.
async fn accepted_without_best_byte(
    store: &dyn BaseArticleStore,
    mut session: ReviewSession,
) -> Result<()> {
    let selection = FilterSelection::any()
        .with_best_byte(false)
        .with_summary_status(SummaryStatus::Accepted);

    let mut view = session
        .load_page(store, selection, Some(1))
        .await
        .context("Failed to query articles")?;
    let total = view.total_count;

    println!(
        "{}",
        style("Criteria: best_byte = false AND summary_status = accepted").bold()
    );
    println!("Total number of articles: {}", total);

    let mut index = 0;
    loop {
        for article in &view.articles {
            index += 1;
            println!("{:3}. {}", index, article.id);
        }
        if !view.has_next {
            break;
        }
        view = session.next_page(store).await?;
    }

    if index == 0 {
        println!("No articles found matching the criteria.");
    }
    Ok(())
}
