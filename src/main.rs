use crate::agent::{AgentSession, SessionState};
use crate::catalog::CatalogStore;
use crate::config::{Command, Config};
use crate::domain::{Language, ReportForm, SortKey, SuggestForm};
use crate::error::Result;
use crate::infrastructure::{AgentClient, CatalogApi, CatalogClient};
use reqwest::Client;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

mod agent;
mod catalog;
mod config;
mod domain;
mod error;
mod infrastructure;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::new() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let level = config
        .args
        .log_level
        .parse()
        .unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    if let Err(err) = run(config).await {
        error!("{err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(config: Config) -> Result<()> {
    let Config { args, http_client } = config;
    let command = args.command.unwrap_or_default();

    match command {
        Command::Browse {
            search,
            genre,
            sort,
            limit,
            list_genres,
            json,
        } => {
            browse(
                http_client,
                args.catalog_url,
                search,
                genre,
                sort,
                limit,
                list_genres,
                json,
            )
            .await
        }
        Command::Agent { lang } => run_agent(http_client, args.agent_url, lang).await,
    }
}

#[allow(clippy::too_many_arguments)]
async fn browse(
    http_client: Client,
    catalog_url: String,
    search: String,
    genre: Option<String>,
    sort: SortKey,
    limit: Option<usize>,
    list_genres: bool,
    json: bool,
) -> Result<()> {
    let client = CatalogClient::new(http_client, catalog_url);
    let mut store = CatalogStore::new();

    let ticket = store.begin_load();
    let games = client.fetch_games().await.inspect_err(|err| {
        eprintln!("Could not load the catalog: {err}");
    })?;
    store.complete_load(ticket, games);
    info!("Catalog loaded: {} games", store.counts().1);

    store.set_search(search);
    store.set_genre(genre);
    store.set_sort(sort);

    if list_genres {
        for genre in store.available_genres() {
            println!("{genre}");
        }
        return Ok(());
    }

    let view = store.view();
    let rows = match limit {
        Some(n) => &view[..n.min(view.len())],
        None => view,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }

    for game in rows {
        println!(
            "{:<44} {:>10} {:>8} views {:>8} dl  {}",
            truncate(&game.name, 44),
            game.size,
            game.views,
            game.downloads,
            game.date_added
        );
    }
    let (matching, total) = store.counts();
    if matching == total {
        println!("({matching})");
    } else {
        println!("({matching} / {total})");
    }
    Ok(())
}

/// Thin line-based driver for the agent dialogue. All the flow logic lives
/// in [`AgentSession`]; this loop only renders the current state and turns
/// keystrokes into session events.
async fn run_agent(
    http_client: Client,
    agent_url: String,
    lang: Option<Language>,
) -> Result<()> {
    let api = Arc::new(AgentClient::new(http_client, agent_url));
    let mut session = AgentSession::new(api);
    session.open().await;

    loop {
        let state = session.state().clone();
        match state {
            SessionState::Closed => break,
            SessionState::LanguageSelect => {
                let choice = match lang {
                    Some(lang) => lang,
                    None => {
                        println!("Choose a language / Choisissez une langue [en/fr]:");
                        match prompt()? {
                            Some(line) if line.trim().eq_ignore_ascii_case("fr") => Language::Fr,
                            Some(_) => Language::En,
                            None => {
                                session.close();
                                continue;
                            }
                        }
                    }
                };
                session.choose_language(choice).await;
            }
            SessionState::MenuRoot {
                greeting,
                options,
                genres,
                notice,
            } => {
                if let Some(notice) = notice {
                    println!("* {notice}");
                }
                println!("{greeting}");
                for (i, option) in options.iter().enumerate() {
                    println!("  {}) {}", i + 1, option.label);
                }
                for (i, genre) in genres.iter().enumerate() {
                    println!("  {}) {}", options.len() + i + 1, genre);
                }
                println!("Pick a number, or q to quit.");
                let Some(line) = prompt()? else {
                    session.close();
                    continue;
                };
                let input = line.trim();
                if input.eq_ignore_ascii_case("q") {
                    session.close();
                    continue;
                }
                match input.parse::<usize>() {
                    Ok(n) if (1..=options.len()).contains(&n) => {
                        let id = options[n - 1].id.clone();
                        session.select_option(&id).await;
                    }
                    Ok(n) if n > options.len() && n <= options.len() + genres.len() => {
                        let genre = genres[n - options.len() - 1].clone();
                        session.pick_genre(&genre).await;
                    }
                    _ => println!("?"),
                }
            }
            SessionState::AwaitingSearchText { prompt: question } => {
                println!("{question}");
                let Some(line) = prompt()? else {
                    session.close();
                    continue;
                };
                session.submit_search(line.trim()).await;
            }
            SessionState::ShowingResults { message, results } => {
                println!("{message}");
                for game in &results {
                    println!(
                        "  - {} [{}] ({} views, {} downloads)",
                        game.name, game.size, game.views, game.downloads
                    );
                }
                finish_leaf(&mut session).await?;
            }
            SessionState::FormReport {
                error,
                confirmation,
                ..
            } => {
                if let Some(message) = confirmation {
                    println!("{message}");
                    finish_leaf(&mut session).await?;
                    continue;
                }
                if let Some(error) = error {
                    println!("* {error}");
                }
                println!("Game name (required):");
                let Some(name) = prompt()? else {
                    session.close();
                    continue;
                };
                println!("Broken link URL (optional):");
                let Some(link) = prompt()? else {
                    session.close();
                    continue;
                };
                println!("Comment (optional):");
                let Some(comment) = prompt()? else {
                    session.close();
                    continue;
                };
                session
                    .submit_report(ReportForm {
                        game_name: name.trim().to_string(),
                        game_id: None,
                        link_url: optional(link),
                        user_comment: optional(comment),
                    })
                    .await;
            }
            SessionState::FormSuggest {
                error,
                confirmation,
                ..
            } => {
                if let Some(message) = confirmation {
                    println!("{message}");
                    finish_leaf(&mut session).await?;
                    continue;
                }
                if let Some(error) = error {
                    println!("* {error}");
                }
                println!("Game name (required):");
                let Some(name) = prompt()? else {
                    session.close();
                    continue;
                };
                println!("Link to the game (optional):");
                let Some(link) = prompt()? else {
                    session.close();
                    continue;
                };
                println!("Why should it be added? (optional):");
                let Some(description) = prompt()? else {
                    session.close();
                    continue;
                };
                session
                    .submit_suggest(SuggestForm {
                        game_name: name.trim().to_string(),
                        game_link: optional(link),
                        description: optional(description),
                    })
                    .await;
            }
        }
    }
    Ok(())
}

async fn finish_leaf(session: &mut AgentSession) -> Result<()> {
    println!("b = back to menu, q = quit.");
    match prompt()? {
        Some(line) if line.trim().eq_ignore_ascii_case("b") => {
            session.back().await;
        }
        _ => session.close(),
    }
    Ok(())
}

/// Reads one line from stdin; `None` means EOF.
fn prompt() -> Result<Option<String>> {
    use std::io::Write;
    print!("> ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    if std::io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn optional(line: String) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max - 3).collect();
        format!("{head}...")
    }
}
