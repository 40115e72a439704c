use readcast::models::ArticleStatus;
use readcast::{App, Config, Result};

const USAGE: &str = "\
Usage: readcast <command>

Commands:
  ingest <url> [--source <tag>]   Add an article to the reading queue
  articles                        List the queue (everything not archived)
  delete <id>                     Remove an article from the queue
  generate                        Turn the processed queue into one episode
  podcasts                        List generated episodes, newest first
  delete-podcast <id>             Remove an episode and its audio file";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str);

    let config = Config::load()?;
    let app = App::new(&config).await?;

    let result = match command {
        Some("ingest") => {
            let Some(url) = args.get(2) else {
                eprintln!("{}", USAGE);
                std::process::exit(2);
            };
            let source = match (args.get(3).map(String::as_str), args.get(4)) {
                (Some("--source"), Some(tag)) => tag.as_str(),
                _ => "web",
            };
            ingest(&app, url, source).await
        }
        Some("articles") => list_articles(&app).await,
        Some("delete") => delete_article(&app, parse_id(&args)).await,
        Some("generate") => generate(&app).await,
        Some("podcasts") => list_podcasts(&app).await,
        Some("delete-podcast") => delete_podcast(&app, parse_id(&args)).await,
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn parse_id(args: &[String]) -> i64 {
    match args.get(2).and_then(|s| s.parse().ok()) {
        Some(id) => id,
        None => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
}

async fn ingest(app: &App, url: &str, source: &str) -> Result<()> {
    let article = app.ingest(url, source).await?;
    println!(
        "[{}] {} ({})",
        article.id,
        article.title.as_deref().unwrap_or(&article.url),
        article.status
    );
    Ok(())
}

async fn list_articles(app: &App) -> Result<()> {
    let articles = app.list_articles().await?;
    if articles.is_empty() {
        println!("Queue is empty.");
        return Ok(());
    }

    let pending = articles
        .iter()
        .filter(|a| a.status == ArticleStatus::Processed)
        .count();
    println!("{} in queue ({} ready for an episode)\n", articles.len(), pending);

    for article in articles {
        println!(
            "[{}] {} {}\n    {}",
            article.id,
            article.status,
            article.title.as_deref().unwrap_or("(untitled)"),
            article.url
        );
    }
    Ok(())
}

async fn delete_article(app: &App, id: i64) -> Result<()> {
    app.delete_article(id).await?;
    println!("Deleted article {}", id);
    Ok(())
}

async fn generate(app: &App) -> Result<()> {
    let podcast = app.generate().await?;
    println!("{}", podcast.title);
    println!("Audio: {}", podcast.audio_path);
    println!("\n{}", podcast.transcript);
    Ok(())
}

async fn list_podcasts(app: &App) -> Result<()> {
    let podcasts = app.list_podcasts().await?;
    if podcasts.is_empty() {
        println!("No episodes yet.");
        return Ok(());
    }
    for podcast in podcasts {
        println!(
            "[{}] {} ({})\n    {}",
            podcast.id,
            podcast.title,
            podcast.created_at.format("%Y-%m-%d %H:%M"),
            podcast.audio_path
        );
    }
    Ok(())
}

async fn delete_podcast(app: &App, id: i64) -> Result<()> {
    let podcast = app.delete_podcast(id).await?;
    println!("Deleted episode {} ({})", podcast.id, podcast.title);
    Ok(())
}
