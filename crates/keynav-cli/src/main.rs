//! keynav - replay directional keys against an HTML fixture
//!
//! ```text
//! keynav fixtures/hn.html --url https://news.ycombinator.com/ --keys j,j,l,k
//! ```
//!
//! Each `--keys` token is a `KeyboardEvent.key` value, optionally prefixed
//! with modifiers (`ctrl+j`), or one of:
//! - `@<url>`: client-side navigation to `<url>`
//! - `!blur`: blur the focused element

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use keynav::{Config, DocumentSession, IgnoreReason, KeyModifiers, KeyOutcome, KeyboardEvent, ResolvedConfig};
use keynav_dom::{Document, NodeId};
use tracing_subscriber::EnvFilter;

/// Replay directional keys against an HTML fixture
#[derive(Parser, Debug)]
#[command(name = "keynav", version, about)]
struct Args {
    /// HTML fixture; element boxes come from `data-rect` attributes
    #[arg(required_unless_present = "list_patterns")]
    fixture: Option<PathBuf>,

    /// Location the fixture is loaded at
    #[arg(long, default_value = "about:blank")]
    url: String,

    /// JSON config layered over the built-in tables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma-separated key sequence
    #[arg(long, value_delimiter = ',')]
    keys: Vec<String>,

    /// Print the effective site pattern table and exit
    #[arg(long)]
    list_patterns: bool,
}

/// One replay step
#[derive(Debug, PartialEq)]
enum Step<'a> {
    Navigate(&'a str),
    Blur,
    Key(&'a str, KeyModifiers),
}

impl<'a> Step<'a> {
    fn parse(token: &'a str) -> Self {
        if let Some(url) = token.strip_prefix('@') {
            return Self::Navigate(url);
        }
        if token == "!blur" {
            return Self::Blur;
        }

        let mut modifiers = KeyModifiers::default();
        let mut key = token;
        while let Some((prefix, rest)) = key.split_once('+') {
            match prefix.to_ascii_lowercase().as_str() {
                "shift" => modifiers.shift = true,
                "ctrl" => modifiers.ctrl = true,
                "alt" => modifiers.alt = true,
                "meta" => modifiers.meta = true,
                _ => break,
            }
            key = rest;
        }
        Self::Key(key, modifiers)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    let resolved = config.resolve().context("compiling config")?;

    if args.list_patterns {
        print_patterns(&resolved);
        return Ok(());
    }

    let Some(fixture) = &args.fixture else {
        bail!("no fixture given");
    };
    let html = std::fs::read_to_string(fixture)
        .with_context(|| format!("reading fixture {}", fixture.display()))?;
    let mut doc = keynav_html::parse_document(&html, &args.url)
        .with_context(|| format!("parsing fixture {}", fixture.display()))?;

    let mut session = DocumentSession::new(resolved);
    let installed = session.start(&mut doc);
    tracing::info!(url = %args.url, installed, "session started");

    for token in &args.keys {
        let result = match Step::parse(token) {
            Step::Navigate(url) => {
                let installed = session.navigate(&mut doc, url);
                format!("navigated, {installed} listener(s)")
            }
            Step::Blur => {
                doc.blur();
                "blurred".to_string()
            }
            Step::Key(key, modifiers) => {
                let mut event = KeyboardEvent::with_modifiers(key, modifiers);
                describe_outcome(&session.dispatch_keydown(&mut doc, &mut event))
            }
        };
        let focused = doc.active_element().map(|node| describe_element(&doc, node));
        println!("{token:<14} {result:<28} {}", focused.as_deref().unwrap_or("-"));
    }

    Ok(())
}

fn print_patterns(config: &ResolvedConfig) {
    for (index, pattern) in config.patterns.iter().enumerate() {
        println!(
            "{index:>3}  {}\n     item:   {}\n     target: {}",
            pattern.url_pattern(),
            pattern.item_selector(),
            pattern.focus_target_selector(),
        );
    }
}

fn describe_outcome(outcome: &KeyOutcome<NodeId>) -> String {
    match outcome {
        KeyOutcome::Moved { direction, .. } => format!("moved {direction}"),
        KeyOutcome::Ignored(reason) => {
            let reason = match reason {
                IgnoreReason::Editing => "editing",
                IgnoreReason::Modifier => "modifier held",
                IgnoreReason::UnmappedKey => "unmapped key",
                IgnoreReason::NoCandidate => "no candidate",
                IgnoreReason::NoFocusTarget => "no focus target",
                IgnoreReason::NotInstalled => "not installed",
            };
            format!("ignored: {reason}")
        }
    }
}

/// `tag#id.class1.class2`
fn describe_element(doc: &Document, node: NodeId) -> String {
    let Some(elem) = doc.element(node) else {
        return format!("{node:?}");
    };
    let mut out = elem.tag.clone();
    if let Some(id) = &elem.id {
        out.push('#');
        out.push_str(id);
    }
    for class in &elem.classes {
        out.push('.');
        out.push_str(class);
    }
    out
}
