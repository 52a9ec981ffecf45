//! services/client/src/bin/client.rs

use std::io::{BufRead, Write};
use std::sync::Arc;

use client_lib::{
    adapters::{FileTokenStore, HttpApiAdapter},
    config::Config,
    error::ClientError,
    sync::{OpKey, SyncController, SyncError},
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Connecting to {}", config.api_base_url);

    // --- 2. Build Adapters & Controller ---
    let tokens = Arc::new(FileTokenStore::new(config.token_path.clone()));
    let http = reqwest::Client::new();
    let api = Arc::new(HttpApiAdapter::new(
        http,
        config.api_base_url.clone(),
        tokens.clone(),
    ));
    let controller = SyncController::new(api, tokens)?;

    if controller.is_authenticated() {
        println!("Session restored from {}.", config.token_path.display());
    }

    // --- 3. Command Loop ---
    println!("Commands: login <email> <password> | register <email> <password> <confirm>");
    println!("          whoami | dates | expand <YYYY-MM-DD> | rate <paper-id> <1-5>");
    println!("          ratings | logout | quit");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();

        match parts.as_slice() {
            ["login", email, password] => {
                report(controller.login(email, password).await.map(|_| ()));
                if controller.is_authenticated() {
                    println!("Logged in.");
                }
            }
            ["register", email, password, confirm] => {
                match controller.register(email, password, confirm).await {
                    Ok(profile) => println!("Registered {}. Log in to continue.", profile.email),
                    Err(e) => println!("error: {}", e),
                }
            }
            ["whoami"] => match controller.fetch_current_user().await {
                Ok(profile) => println!("#{} {}", profile.id, profile.email),
                Err(e) => println!("error: {}", e),
            },
            ["dates"] => {
                report(controller.load_dates().await.map(|_| ()));
                for bucket in controller.dates() {
                    let marker = if controller.is_date_loaded(bucket.date) {
                        "*"
                    } else {
                        " "
                    };
                    println!("{} {} ({} papers)", marker, bucket.date, bucket.count);
                }
            }
            ["expand", raw_date] => match raw_date.parse() {
                Ok(date) => match controller.load_papers_for_date(date).await {
                    Ok(papers) => {
                        for paper in papers {
                            let rating = controller
                                .rating_for(paper.id)
                                .map(|r| format!(" [rated {}]", r))
                                .unwrap_or_default();
                            println!(
                                "#{} [{}] {} (score {:.3}){}",
                                paper.id, paper.arxiv_id, paper.title, paper.score, rating
                            );
                        }
                    }
                    Err(e) => println!("error: {}", e),
                },
                Err(_) => println!("error: expected a date like 2024-01-01"),
            },
            ["rate", raw_id, raw_rating] => {
                match (raw_id.parse::<i64>(), raw_rating.parse::<u8>()) {
                    (Ok(paper_id), Ok(rating)) => {
                        report(controller.rate_paper(paper_id, rating).await)
                    }
                    _ => println!("error: expected a paper id and a rating"),
                }
            }
            ["ratings"] => {
                report(controller.fetch_user_ratings().await.map(|_| ()));
                let mut ratings: Vec<_> = controller.ratings().into_iter().collect();
                ratings.sort_unstable();
                for (paper_id, rating) in ratings {
                    println!("paper {} -> {}", paper_id, rating);
                }
            }
            ["logout"] => match controller.logout() {
                Ok(()) => println!("Logged out."),
                Err(e) => println!("error: {}", e),
            },
            ["quit"] | ["exit"] => break,
            [] => {}
            _ => println!("error: unknown command"),
        }

        // Surface any error the last operation left behind, then reset it.
        for (key, message) in controller.errors() {
            println!("! {}: {}", error_label(key), message);
            controller.clear_error(key);
        }
    }

    Ok(())
}

fn report(result: Result<(), SyncError>) {
    if let Err(e @ SyncError::Validation(_)) = result {
        // Validation failures never reach the status board; print them here.
        println!("error: {}", e);
    }
}

fn error_label(key: OpKey) -> &'static str {
    match key {
        OpKey::Auth => "auth",
        OpKey::Dates => "dates",
        OpKey::Papers(_) => "papers",
        OpKey::Ratings => "ratings",
    }
}
