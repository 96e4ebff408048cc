//! `jobs` and `stats` commands: browse and manage stored postings.

use console::style;

use crate::config::Settings;
use crate::models::{Job, JobStatus};
use crate::repository::JobRepository;

fn open(settings: &Settings) -> anyhow::Result<JobRepository> {
    Ok(JobRepository::new(&settings.database.path)?)
}

pub fn list(
    settings: &Settings,
    scope: &str,
    status: Option<JobStatus>,
    limit: usize,
    offset: usize,
) -> anyhow::Result<()> {
    let repo = open(settings)?;
    let jobs = repo.list(scope, status, limit, offset)?;
    if jobs.is_empty() {
        println!("No postings found.");
        return Ok(());
    }
    for job in &jobs {
        println!(
            "{}  {}  {} at {}{}",
            &job.id[..12],
            style(job.status.as_str()).cyan(),
            style(&job.title).bold(),
            job.company,
            job.rating
                .map(|r| format!("  [{}]", "*".repeat(r as usize)))
                .unwrap_or_default(),
        );
    }
    Ok(())
}

pub fn show(settings: &Settings, scope: &str, id: &str) -> anyhow::Result<()> {
    let repo = open(settings)?;
    let job = find(&repo, scope, id)?;
    println!("{}", style(&job.title).bold());
    println!("  company:    {}", job.company);
    println!("  url:        {}", job.url);
    println!("  source:     {}", job.source);
    println!("  location:   {}", job.location);
    println!("  status:     {}", job.status.as_str());
    if let Some(posted) = &job.posted_date {
        println!("  posted:     {posted}");
    }
    if let Some(rating) = job.rating {
        println!("  rating:     {rating}/5");
    }
    if let Some(notes) = &job.notes {
        println!("  notes:      {notes}");
    }
    if !job.description.is_empty() {
        println!("\n{}", job.description);
    }
    Ok(())
}

pub fn set_status(
    settings: &Settings,
    scope: &str,
    id: &str,
    status: JobStatus,
    notes: Option<&str>,
) -> anyhow::Result<()> {
    let repo = open(settings)?;
    let job = find(&repo, scope, id)?;
    repo.update_status(&job.id, scope, status, notes)?;
    println!("{} -> {}", job.title, status.as_str());
    Ok(())
}

pub fn rate(settings: &Settings, scope: &str, id: &str, rating: u8) -> anyhow::Result<()> {
    if !(1..=5).contains(&rating) {
        anyhow::bail!("rating must be 1-5");
    }
    let repo = open(settings)?;
    let job = find(&repo, scope, id)?;
    repo.set_rating(&job.id, scope, rating)?;
    println!("{} rated {rating}/5", job.title);
    Ok(())
}

pub fn note(settings: &Settings, scope: &str, id: &str, text: &str) -> anyhow::Result<()> {
    let repo = open(settings)?;
    let job = find(&repo, scope, id)?;
    repo.set_notes(&job.id, scope, text)?;
    println!("Noted.");
    Ok(())
}

pub fn stats(settings: &Settings, scope: &str) -> anyhow::Result<()> {
    let repo = open(settings)?;
    let counts = repo.counts_by_status(scope)?;
    if counts.is_empty() {
        println!("No postings stored yet.");
        return Ok(());
    }
    for (status, count) in counts {
        println!("{count:>6}  {status}");
    }
    Ok(())
}

/// Look up by full fingerprint, falling back to a unique prefix so the
/// short ids printed by `jobs list` are usable directly.
fn find(repo: &JobRepository, scope: &str, id: &str) -> anyhow::Result<Job> {
    if let Some(job) = repo.get(id, scope)? {
        return Ok(job);
    }
    let mut matches: Vec<Job> = repo
        .list(scope, None, 10_000, 0)?
        .into_iter()
        .filter(|job| job.id.starts_with(id))
        .collect();
    match matches.len() {
        0 => anyhow::bail!("no posting with id {id}"),
        1 => Ok(matches.remove(0)),
        n => anyhow::bail!("id prefix {id} is ambiguous ({n} matches)"),
    }
}
