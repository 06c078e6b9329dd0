// src/main.rs

use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trivia_client::config::load_settings;
use trivia_client::summary::{percentage, performance_feedback, share_text};
use trivia_client::{
    HttpQuizApi, Phase, Result, SaveStatus, SessionControllerHandle, SessionSnapshot,
};
use trivia_shared::{Category, Difficulty, GameMode, GameSettings};

type Input = Lines<BufReader<Stdin>>;

enum Command {
    Restart,
    Quit,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=warn", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = load_settings()?;
    tracing::info!("Configuration loaded: {:?}", settings);

    let api = Arc::new(HttpQuizApi::new(settings.base_url.clone()));
    let controller = SessionControllerHandle::spawn(api, settings.advance_delay());
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!("🇨🇴 Discover Colombia Quiz");
    loop {
        let Some(game_settings) = prompt_settings(&mut input).await? else {
            break;
        };
        controller.start_quiz(game_settings).await?;
        match play(&controller, &mut input).await? {
            Command::Restart => controller.restart_quiz().await?,
            Command::Quit => break,
        }
    }

    println!("¡Hasta luego!");
    Ok(())
}

/// `None` when stdin is closed.
async fn prompt_settings(input: &mut Input) -> Result<Option<GameSettings>> {
    println!();
    let Some(difficulty) = prompt_choice(
        input,
        "Difficulty [beginner/intermediate/advanced] (beginner): ",
        Difficulty::default(),
    )
    .await?
    else {
        return Ok(None);
    };
    let Some(game_mode) =
        prompt_choice(input, "Mode [quick/comprehensive] (quick): ", GameMode::default()).await?
    else {
        return Ok(None);
    };
    let Some(category) = prompt_category(input).await? else {
        return Ok(None);
    };
    Ok(Some(GameSettings::new(difficulty, game_mode, category)))
}

async fn prompt_choice<T: FromStr + Copy>(
    input: &mut Input,
    prompt: &str,
    default: T,
) -> Result<Option<T>> {
    loop {
        print_prompt(prompt);
        let Some(line) = input.next_line().await? else {
            return Ok(None);
        };
        let line = line.trim();
        if line.is_empty() {
            return Ok(Some(default));
        }
        match line.parse() {
            Ok(value) => return Ok(Some(value)),
            Err(_) => println!("Unknown option '{}'", line),
        }
    }
}

async fn prompt_category(input: &mut Input) -> Result<Option<Option<Category>>> {
    let names: Vec<&str> = Category::all().iter().map(|c| c.as_str()).collect();
    let prompt = format!("Topic [all/{}] (all): ", names.join("/"));
    loop {
        print_prompt(&prompt);
        let Some(line) = input.next_line().await? else {
            return Ok(None);
        };
        let line = line.trim();
        if line.is_empty() || line.eq_ignore_ascii_case("all") {
            return Ok(Some(None));
        }
        match line.parse::<Category>() {
            Ok(category) => return Ok(Some(Some(category))),
            Err(e) => println!("{}", e),
        }
    }
}

async fn play(controller: &SessionControllerHandle, input: &mut Input) -> Result<Command> {
    let snapshot = controller.wait_for(|s| !s.loading).await?;
    if let Some(settings) = snapshot.settings {
        println!("\n{}", settings);
    }

    if let Some(error) = &snapshot.load_error {
        println!("Could not load questions: {}", error);
        return prompt_after(input).await;
    }
    if snapshot.is_empty_set() {
        println!("No questions match these settings.");
        return prompt_after(input).await;
    }

    let mut snapshot = snapshot;
    while snapshot.phase == Phase::Quiz {
        let Some(question) = snapshot.current_question.clone() else {
            break;
        };
        println!(
            "\nQuestion {}/{}  {} {}",
            snapshot.current_index + 1,
            snapshot.total_questions,
            question.icon,
            question.question
        );
        for (i, answer) in question.answers.iter().enumerate() {
            println!("  {}) {}", i + 1, answer);
        }

        let answer_index = loop {
            print_prompt("Your answer (1-4, r restart, q quit): ");
            let Some(line) = input.next_line().await? else {
                return Ok(Command::Quit);
            };
            match line.trim() {
                "q" => return Ok(Command::Quit),
                "r" => return Ok(Command::Restart),
                other => match other.parse::<usize>() {
                    Ok(n) if (1..=question.answers.len()).contains(&n) => break n - 1,
                    _ => println!("Pick a number between 1 and {}", question.answers.len()),
                },
            }
        };

        if let Some(feedback) = controller.select_answer(answer_index).await? {
            if feedback.correct {
                println!("✅ Correct!");
            } else {
                println!(
                    "❌ Not quite. The answer is: {}",
                    question.correct_answer_text().unwrap_or("?")
                );
            }
            println!("{}", feedback.explanation);
        }

        let index = snapshot.current_index;
        snapshot = controller
            .wait_for(|s| s.phase != Phase::Quiz || s.current_index != index)
            .await?;
    }

    if snapshot.phase != Phase::Results {
        return prompt_after(input).await;
    }
    let snapshot = controller
        .wait_for(|s| s.save_status != SaveStatus::Saving)
        .await?;
    print_results(&snapshot);
    prompt_after(input).await
}

fn print_results(snapshot: &SessionSnapshot) {
    let total = snapshot.total_questions as u32;
    let pct = percentage(snapshot.score, total);
    println!("\n🏁 You scored {}/{} ({}%)", snapshot.score, total, pct);
    println!("{}", performance_feedback(pct));
    println!("\n{}", share_text(snapshot.score, total));
    match &snapshot.save_status {
        SaveStatus::Saved(attempt) => println!("(attempt saved as {})", attempt.id),
        SaveStatus::Failed(error) => println!("(could not save attempt: {})", error),
        SaveStatus::Idle | SaveStatus::Saving => {}
    }
}

async fn prompt_after(input: &mut Input) -> Result<Command> {
    loop {
        print_prompt("r to play again, q to quit: ");
        let Some(line) = input.next_line().await? else {
            return Ok(Command::Quit);
        };
        match line.trim() {
            "r" | "" => return Ok(Command::Restart),
            "q" => return Ok(Command::Quit),
            _ => {}
        }
    }
}

fn print_prompt(prompt: &str) {
    use std::io::Write;
    print!("{}", prompt);
    let _ = std::io::stdout().flush();
}
