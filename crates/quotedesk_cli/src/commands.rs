use crate::cli::{
    AddArgs, AuthorsCommand, Commands, EnrichArgs, ExportArgs, GroupsCommand, ListArgs,
    SearchArgs, SimilarityArgs, SubjectsCommand,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use quotedesk_core::db::Connection;
use quotedesk_core::enrich::{SourceChain, WikipediaSummarySource};
use quotedesk_core::export::{export_file_name, write_quotes_csv};
use quotedesk_core::{
    calculate_similarity, levenshtein_distance, open_db, search_quotes, AppConfig, AuthorService,
    DuplicateStatus, NewQuote, ProfileOutcome, QuoteListQuery, QuoteSearchQuery, QuoteService,
    SortDirection, SqliteAuthorRepository, SqliteQuoteRepository, SqliteSuperSubjectRepository,
    SuperSubjectService,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

pub fn run(command: Commands, config: &AppConfig) -> Result<()> {
    let mut conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;

    match command {
        Commands::Check(args) => check(&mut conn, config, &args.text),
        Commands::Add(args) => add(&mut conn, config, args),
        Commands::List(args) => list(&mut conn, config, args),
        Commands::Search(args) => search(&conn, args),
        Commands::Subjects { command } => subjects(&mut conn, config, command),
        Commands::Authors { command } => authors(&conn, config, command),
        Commands::Groups { command } => groups(&mut conn, command),
        Commands::Export(args) => export(&mut conn, config, args),
        Commands::Similarity(args) => {
            similarity(&args);
            Ok(())
        }
    }
}

pub fn similarity(args: &SimilarityArgs) {
    println!(
        "distance={} similarity={:.4}",
        levenshtein_distance(&args.first, &args.second),
        calculate_similarity(&args.first, &args.second)
    );
}

fn quote_service<'c>(
    conn: &'c mut Connection,
    config: &AppConfig,
) -> Result<QuoteService<SqliteQuoteRepository<'c>>> {
    let repo = SqliteQuoteRepository::try_new(conn)?;
    Ok(QuoteService::new(repo, config.duplicate_policy))
}

fn print_status(status: &DuplicateStatus) {
    match status.matched() {
        Some(found) => println!(
            "{}: {:.1}% match with {} ({})",
            status.label(),
            found.similarity * 100.0,
            found.candidate.id,
            found.candidate.author
        ),
        None => println!("{}", status.label()),
    }
}

fn check(conn: &mut Connection, config: &AppConfig, text: &str) -> Result<()> {
    let service = quote_service(conn, config)?;
    let status = service.check_duplicate(text)?;
    print_status(&status);
    Ok(())
}

fn add(conn: &mut Connection, config: &AppConfig, args: AddArgs) -> Result<()> {
    let mut service = quote_service(conn, config)?;
    let input = NewQuote {
        subjects: args.subjects,
        author_link: args.author_link,
        video_link: args.video_link,
        contributed_by: args.contributed_by,
        ..NewQuote::new(args.author, args.text)
    };
    let outcome = service.add_quote(input)?;
    println!("added {}", outcome.quote.id);
    if let DuplicateStatus::Similar(_) = outcome.verdict {
        print_status(&outcome.verdict);
    }
    Ok(())
}

fn list(conn: &mut Connection, config: &AppConfig, args: ListArgs) -> Result<()> {
    let service = quote_service(conn, config)?;
    let page = service.list_quotes(QuoteListQuery {
        author: args.author,
        subject: args.subject,
        sort: args.sort.into(),
        direction: if args.asc {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        },
        limit: args.limit,
        offset: args.offset,
    })?;
    for quote in &page.items {
        println!(
            "{}\t{}\t{}\t[{}]",
            quote.id,
            quote.author,
            quote.quote_text,
            quote.subjects.join(", ")
        );
    }
    println!("{} quote(s), limit {}", page.items.len(), page.applied_limit);
    Ok(())
}

fn search(conn: &Connection, args: SearchArgs) -> Result<()> {
    let query = QuoteSearchQuery {
        author: args.author,
        limit: args.limit,
        raw_fts_syntax: args.raw,
        ..QuoteSearchQuery::new(args.text)
    };
    for hit in search_quotes(conn, &query)? {
        println!("{}\t{}\t{}", hit.quote_id, hit.author, hit.snippet);
    }
    Ok(())
}

fn subjects(
    conn: &mut Connection,
    config: &AppConfig,
    command: Option<SubjectsCommand>,
) -> Result<()> {
    let mut service = quote_service(conn, config)?;
    match command.unwrap_or(SubjectsCommand::List) {
        SubjectsCommand::List => {
            for entry in service.subject_counts()? {
                println!("{}\t{}", entry.subject, entry.count);
            }
        }
        SubjectsCommand::Rename { from, to } => {
            let affected = service.rename_subject(&from, &to)?;
            println!("renamed on {affected} quote(s)");
        }
        SubjectsCommand::Remove { subject } => {
            let affected = service.remove_subject(&subject)?;
            println!("removed from {affected} quote(s)");
        }
        SubjectsCommand::Cleanup => {
            let rewritten = service.cleanup_legacy_subjects()?;
            println!("rewrote {rewritten} quote(s)");
        }
    }
    Ok(())
}

fn authors(conn: &Connection, config: &AppConfig, command: Option<AuthorsCommand>) -> Result<()> {
    let service = AuthorService::new(SqliteAuthorRepository::try_new(conn)?);
    match command.unwrap_or(AuthorsCommand::List) {
        AuthorsCommand::List => {
            for author in service.list_authors()? {
                let status = if author.is_profile_complete() {
                    "complete"
                } else {
                    "incomplete"
                };
                println!("{}\t{}\t{status}", author.id, author.name);
            }
        }
        AuthorsCommand::Populate => {
            let created = service.populate_from_quotes()?;
            println!("registered {created} author(s)");
        }
        AuthorsCommand::Enrich(args) => enrich(&service, config, args)?,
    }
    Ok(())
}

fn enrich(
    service: &AuthorService<SqliteAuthorRepository<'_>>,
    config: &AppConfig,
    args: EnrichArgs,
) -> Result<()> {
    let sources = SourceChain::new().with_source(WikipediaSummarySource::new()?);

    if let [name] = args.names.as_slice() {
        let outcome = service.ensure_author_profile(name, &sources)?;
        println!("{name}: {}", outcome.label());
        if let ProfileOutcome::Created(author) | ProfileOutcome::Updated(author) = outcome {
            info!("event=author_enrich module=cli status=ok author_id={}", author.id);
        }
        return Ok(());
    }

    let names: Vec<String> = if args.names.is_empty() {
        service
            .list_authors()?
            .into_iter()
            .map(|author| author.name)
            .collect()
    } else {
        args.names
    };
    let workers = args.workers.unwrap_or(config.enrichment_workers);
    let report = service.ensure_profiles_bulk(&names, &sources, workers)?;
    for failure in &report.failed {
        println!("{}: {}", names[failure.index], failure.message);
    }
    println!(
        "enriched {} of {} author(s)",
        report.succeeded,
        report.total()
    );
    Ok(())
}

fn groups(conn: &mut Connection, command: Option<GroupsCommand>) -> Result<()> {
    let mut service = SuperSubjectService::new(SqliteSuperSubjectRepository::try_new(conn)?);
    match command.unwrap_or(GroupsCommand::List) {
        GroupsCommand::List => {
            for group in service.list_super_subjects()? {
                println!(
                    "{}\tsubjects: {}\tauthors: {}",
                    group.name,
                    group.subjects.join(", "),
                    group.authors.join(", ")
                );
            }
        }
        GroupsCommand::Seed => {
            let inserted = service.seed_defaults()?;
            println!("seeded {inserted} grouping(s)");
        }
    }
    Ok(())
}

/// Export file named after the UTC calendar date of `now`.
fn default_export_path(now: DateTime<Utc>) -> PathBuf {
    export_file_name(now.date_naive()).into()
}

fn export(conn: &mut Connection, config: &AppConfig, args: ExportArgs) -> Result<()> {
    let service = quote_service(conn, config)?;
    let quotes = service.collect_all_quotes()?;
    let path = args
        .out
        .unwrap_or_else(|| default_export_path(Utc::now()));

    let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_quotes_csv(&mut writer, &quotes)?;
    writer.flush()?;
    println!("exported {} quote(s) to {}", quotes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::default_export_path;
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;

    #[test]
    fn default_export_path_uses_utc_date() {
        let late_evening = Utc.with_ymd_and_hms(2024, 5, 1, 23, 30, 0).unwrap();
        assert_eq!(
            default_export_path(late_evening),
            PathBuf::from("quotes_export_2024-05-01.csv")
        );
    }
}
