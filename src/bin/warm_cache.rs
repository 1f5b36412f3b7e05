use std::io::{self, Write};
use std::sync::Arc;

use clap::Parser;

use hex_cache::{
    Cache, CacheConfig, Comment, CommentSortType, HttpForumApi, MarkdownRenderer, RenderConfig,
    SortType, UpstreamConfig,
};

#[derive(Parser, Debug)]
#[command(
    name = "warm_cache",
    about = "Warm the forum cache from the upstream API and print what was fetched"
)]
struct Args {
    /// Also fetch the first page of this community.
    #[arg(long)]
    community: Option<String>,

    /// Also fetch this post and print its comment tree.
    #[arg(long)]
    post: Option<i64>,

    /// Also fetch this person.
    #[arg(long)]
    person: Option<String>,

    /// Post listing order (Active, Hot, New, TopDay, ...).
    #[arg(long, default_value = "Active")]
    sort: String,

    /// Comment order (Hot, Top, New, Old).
    #[arg(long, default_value = "Hot")]
    comment_sort: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    hex_cache::init_logger();

    let args = Args::parse();
    let sort: SortType = match args.sort.parse() {
        Ok(sort) => sort,
        Err(()) => {
            writeln!(io::stderr(), "error: unsupported sort '{}'", args.sort)?;
            std::process::exit(1);
        }
    };
    let comment_sort: CommentSortType = match args.comment_sort.parse() {
        Ok(sort) => sort,
        Err(()) => {
            writeln!(
                io::stderr(),
                "error: unsupported comment sort '{}'",
                args.comment_sort
            )?;
            std::process::exit(1);
        }
    };

    let api = HttpForumApi::new(UpstreamConfig::from_env())?;
    let renderer = MarkdownRenderer::new(&RenderConfig::from_env());
    let cache = Cache::initialize(Arc::new(api), Arc::new(renderer), CacheConfig::from_env()).await?;

    let mut out = io::stdout().lock();

    let home = cache.home(1, sort).await?;
    writeln!(out, "home ({sort}): {} posts", home.post_ids.len())?;
    for post in cache.posts_for(&home) {
        writeln!(out, "  [{}] {} ({})", post.id, post.name, post.community_name)?;
    }

    if let Some(name) = args.community.as_deref() {
        let page = cache.community_posts(name, 1, sort).await?;
        writeln!(out, "c/{name} ({sort}): {} posts", page.post_ids.len())?;
    }

    if let Some(id) = args.post {
        let post = cache.post(id).await?;
        let comments = cache.comments(id, comment_sort).await?;
        writeln!(
            out,
            "post {}: {} by {} ({} comments cached)",
            post.id,
            post.name,
            post.creator_display_name,
            comments.len()
        )?;
        for comment in &comments.comments {
            print_comment(&mut out, comment, 1)?;
        }
    }

    if let Some(name) = args.person.as_deref() {
        let person = cache.person(name).await?;
        writeln!(
            out,
            "person {}: {} posts, {} comments",
            person.display_name, person.post_count, person.comment_count
        )?;
    }

    let stats = cache.stats();
    writeln!(
        out,
        "cached: {} communities, {} posts, {} comment sets, {} persons, {} skipped",
        stats.communities, stats.posts, stats.comment_sets, stats.persons, stats.skipped_records
    )?;

    Ok(())
}

fn print_comment(out: &mut impl Write, comment: &Comment, depth: usize) -> io::Result<()> {
    writeln!(
        out,
        "{}- {} (+{}) #{}",
        "  ".repeat(depth),
        comment.creator_display_name,
        comment.upvotes,
        comment.id
    )?;
    for child in &comment.children {
        print_comment(out, child, depth + 1)?;
    }
    Ok(())
}
