use std::io::Read;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::ocs;
use crate::io::session::ThreadSession;
use crate::io::store::{Author, FileStore};
use crate::model::comment::Comment;
use crate::model::config::{DisplayConfig, ThreadConfig};
use crate::ops::check;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Everything a command needs once config and store are resolved
struct Context {
    json: bool,
    display: DisplayConfig,
    store: FileStore,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let config = config_io::read_config(cli.config.as_deref())?;
    let mut ctx = open_context(&cli, config)?;

    match cli.command {
        // Read commands
        Commands::Show(args) => cmd_show(&mut ctx, args),
        Commands::Find(args) => cmd_find(&mut ctx, args),
        Commands::Check(args) => cmd_check(&mut ctx, args),

        // Write commands
        Commands::Add(args) => cmd_add(&mut ctx, args),
        Commands::Reply(args) => cmd_reply(&mut ctx, args),
        Commands::Edit(args) => cmd_edit(&mut ctx, args),
        Commands::Delete(args) => cmd_delete(&mut ctx, args),
        Commands::Import(args) => cmd_import(&mut ctx, args),
    }
}

fn open_context(cli: &Cli, config: ThreadConfig) -> Result<Context, Box<dyn std::error::Error>> {
    let dir = cli
        .store
        .clone()
        .unwrap_or_else(|| config_io::store_dir(&config));
    let author = Author {
        id: config.user.id.clone(),
        display_name: config.user.display_name().to_string(),
    };
    tracing::debug!(store = %dir.display(), author = %author.id, "opening store");
    Ok(Context {
        json: cli.json,
        display: config.display,
        store: FileStore::open(&dir, author)?,
    })
}

fn load_thread(ctx: &mut Context, card: i64) -> Result<ThreadSession, Box<dyn std::error::Error>> {
    let mut session = ThreadSession::new(card);
    session.reload(&mut ctx.store)?;
    tracing::debug!(card, comments = session.forest().len(), "thread loaded");
    Ok(session)
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_show(ctx: &mut Context, args: CardArgs) -> CmdResult {
    let session = load_thread(ctx, args.card)?;

    if ctx.json {
        let tj = thread_to_json(args.card, session.forest());
        println!("{}", serde_json::to_string_pretty(&tj)?);
    } else if session.forest().is_empty() {
        println!("(no comments)");
    } else {
        for line in format_outline(session.forest(), &ctx.display) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_find(ctx: &mut Context, args: CommentArgs) -> CmdResult {
    let session = load_thread(ctx, args.card)?;
    let forest = session.forest();
    let node = forest.find(args.id)?;

    if ctx.json {
        let depth = forest.depth_of(args.id)?;
        println!("{}", serde_json::to_string_pretty(&comment_to_json(node, depth))?);
    } else {
        for line in format_comment_detail(forest, node, &ctx.display) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_check(ctx: &mut Context, args: CardArgs) -> CmdResult {
    let session = load_thread(ctx, args.card)?;
    let result = check::check_forest(session.forest());

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for line in format_check_result(&result) {
            println!("{}", line);
        }
    }

    if !result.valid {
        return Err(format!("card {} has {} thread error(s)", args.card, result.errors.len()).into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &mut Context, args: AddArgs) -> CmdResult {
    let mut session = load_thread(ctx, args.card)?;
    let record = session.create(&mut ctx.store, &args.message, None)?;
    tracing::info!(card = args.card, id = record.id, "comment added");
    report_written(ctx, &session, &record, "added")
}

fn cmd_reply(ctx: &mut Context, args: ReplyArgs) -> CmdResult {
    let mut session = load_thread(ctx, args.card)?;
    let record = session.create(&mut ctx.store, &args.message, Some(args.parent))?;
    tracing::info!(card = args.card, id = record.id, parent = args.parent, "reply added");
    report_written(ctx, &session, &record, "added")
}

fn cmd_edit(ctx: &mut Context, args: EditArgs) -> CmdResult {
    let mut session = load_thread(ctx, args.card)?;
    let record = session.update(&mut ctx.store, args.id, &args.message)?;
    tracing::info!(card = args.card, id = record.id, "comment edited");
    report_written(ctx, &session, &record, "edited")
}

fn cmd_delete(ctx: &mut Context, args: CommentArgs) -> CmdResult {
    let mut session = load_thread(ctx, args.card)?;
    let promoted = session.forest().find(args.id)?.children().len();
    session.delete(&mut ctx.store, args.id)?;
    tracing::info!(card = args.card, id = args.id, promoted, "comment deleted");

    if ctx.json {
        let tj = thread_to_json(args.card, session.forest());
        println!("{}", serde_json::to_string_pretty(&tj)?);
    } else if promoted > 0 {
        println!("deleted #{} ({} replies moved up)", args.id, promoted);
    } else {
        println!("deleted #{}", args.id);
    }
    Ok(())
}

fn cmd_import(ctx: &mut Context, args: ImportArgs) -> CmdResult {
    let body = if args.file.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(&args.file)
            .map_err(|e| format!("could not read {}: {}", args.file.display(), e))?
    };

    let comments = ocs::parse_comment_list(&body)?;
    let total = comments.len();
    let added = ctx.store.import(args.card, comments)?;

    // Surface bad data (e.g. duplicate ids) now rather than on next show
    let session = load_thread(ctx, args.card)?;
    let result = check::check_forest(session.forest());
    for warning in &result.warnings {
        tracing::warn!(card = args.card, "{}", format_check_warning(warning));
    }

    if ctx.json {
        let tj = thread_to_json(args.card, session.forest());
        println!("{}", serde_json::to_string_pretty(&tj)?);
    } else {
        println!(
            "imported {} comments into card {} ({} new)",
            total, args.card, added
        );
    }
    Ok(())
}

/// After a write: the record as JSON, or a one-line confirmation
fn report_written(ctx: &Context, session: &ThreadSession, record: &Comment, verb: &str) -> CmdResult {
    let forest = session.forest();
    if ctx.json {
        let node = forest.find(record.id)?;
        let depth = forest.depth_of(record.id)?;
        println!("{}", serde_json::to_string_pretty(&comment_to_json(node, depth))?);
    } else {
        println!("{} #{}", verb, record.id);
    }
    Ok(())
}
