use clap::Parser;
use colored::*;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::LinesStream;
use tokio_stream::{Stream, StreamExt};

use salary_negotiator::cli::{Args, FORM_FIELDS};
use salary_negotiator::config::{ClientConfig, BASE_URL_ENV};
use salary_negotiator::logging::init_logging;
use salary_negotiator::{
    FlowController, NegotiationError, NegotiationForm, Role, SessionId, SessionInitiator, Speaker,
    TranscriptEntry,
};

/// Command typed in the chat to leave the session.
const QUIT: &str = "/quit";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose);
    if args.no_color {
        colored::control::set_override(false);
    }

    let config = ClientConfig::resolve(
        args.config.as_deref(),
        std::env::var(BASE_URL_ENV).ok(),
        args.base_url.as_deref(),
    )?;

    if let Some(id) = &args.inspect {
        return inspect(config, id).await;
    }

    let mut lines = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());
    let mut flow = FlowController::new(config)?;

    println!("{}", "AI Salary Negotiation Bot".bold());

    // -- Role selection -------------------------------------------------------

    let role = match args.role {
        Some(role) => role,
        None => match prompt_role(&mut lines).await? {
            Some(role) => role,
            None => return Ok(()),
        },
    };
    flow.select_role(role)?;

    // -- Parameter entry ------------------------------------------------------

    let mut form = args.prefilled_form();
    println!("\n{}", "Enter Job and Salary Details".bold());
    loop {
        if !fill_form(&mut form, &mut lines).await? {
            return Ok(());
        }
        match flow.submit(&form).await {
            Ok(Some(_)) => break,
            Ok(None) => {
                // Details were logged by the initiator.
                match prompt(&mut lines, "Press Enter to resubmit").await? {
                    Some(_) => continue,
                    None => return Ok(()),
                }
            }
            Err(NegotiationError::InvalidInput { field, reason }) => {
                eprintln!("{} {}", format!("invalid {field}:").red(), reason);
                if let Some(f) = FORM_FIELDS.iter().find(|f| f.key == field) {
                    (f.get)(&mut form).clear();
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    // -- Chat -----------------------------------------------------------------

    let channel = flow.open_channel().await?;
    let mut updates = channel.subscribe();
    println!(
        "\n{} {}",
        "AI Salary Negotiation".bold(),
        format!("(type {QUIT} to leave)").dimmed()
    );

    loop {
        tokio::select! {
            line = lines.next() => match line {
                Some(Ok(text)) if text.trim() == QUIT => break,
                Some(Ok(text)) => {
                    channel.send(&text).await;
                }
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            entry = channel.recv() => {
                if entry.is_none() {
                    drain(&mut updates);
                    println!("{}", "connection closed".dimmed());
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
        drain(&mut updates);
    }

    flow.shutdown().await;
    Ok(())
}

async fn inspect(config: ClientConfig, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let session_id = SessionId::new(id).ok_or("session id must not be blank")?;
    let snapshot = SessionInitiator::new(config)?
        .fetch_session(&session_id)
        .await?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

async fn prompt<S>(lines: &mut S, label: &str) -> io::Result<Option<String>>
where
    S: Stream<Item = io::Result<String>> + Unpin,
{
    print!("{label}: ");
    io::stdout().flush()?;
    lines.next().await.transpose()
}

async fn prompt_role<S>(lines: &mut S) -> io::Result<Option<Role>>
where
    S: Stream<Item = io::Result<String>> + Unpin,
{
    println!("\n{}", "Select Your Role".bold());
    println!("  1) {}", Role::JobSeeker);
    println!("  2) {}", Role::Recruiter);
    loop {
        let Some(answer) = prompt(lines, "Role").await? else {
            return Ok(None);
        };
        match Role::from_str_loose(&answer) {
            Some(role) => return Ok(Some(role)),
            None => eprintln!("{}", "choose 1 (Job Seeker) or 2 (Recruiter)".red()),
        }
    }
}

/// Prompt for every empty field. `false` on end of input.
async fn fill_form<S>(form: &mut NegotiationForm, lines: &mut S) -> io::Result<bool>
where
    S: Stream<Item = io::Result<String>> + Unpin,
{
    for field in FORM_FIELDS {
        while (field.get)(form).trim().is_empty() {
            match prompt(lines, field.label).await? {
                Some(value) => *(field.get)(form) = value,
                None => return Ok(false),
            }
        }
    }
    Ok(true)
}

fn drain(updates: &mut tokio::sync::mpsc::UnboundedReceiver<TranscriptEntry>) {
    while let Ok(entry) = updates.try_recv() {
        print_entry(&entry);
    }
}

fn print_entry(entry: &TranscriptEntry) {
    let line = entry.render();
    let styled = match entry.speaker() {
        Speaker::You => line.cyan(),
        Speaker::Recruiter => line.green(),
        Speaker::JobSeeker => line.yellow(),
        Speaker::Error => line.red(),
        Speaker::Unlabelled => line.normal(),
    };
    println!("{styled}");
}
