use anyhow::{anyhow, Error, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use oxigraph::model::Term as OxTerm;
use quadstore::{
    BackendConfig, GetOptions, Literal, Pattern, Quad, QuadStore, Range, SledBackend, Slot,
    StoreConfig, Term, WriteOptions,
};
use std::ffi::OsString;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "quadstore")]
#[command(about = "Write and query a quadstore directory")]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Verbose mode - sets the RUST_LOG level to info, defaults to warning level
    #[clap(long, short, action, default_value = "false", global = true)]
    verbose: bool,
    /// Debug mode - sets the RUST_LOG level to debug, defaults to warning level
    #[clap(long, action, default_value = "false", global = true)]
    debug: bool,
    /// Store directory, created on first use
    #[clap(long, default_value = ".quadstore", global = true)]
    store: PathBuf,
    /// JSON store configuration; overrides --store
    #[clap(long, global = true)]
    config: Option<PathBuf>,
    /// Do not flush to disk after every batch
    #[clap(long, action, default_value = "false", global = true)]
    no_sync: bool,
}

/// Terms use N-Triples syntax: `<iri>`, `_:label`, `"v"`, `"v"@en`, `"v"^^<dt>`.
#[derive(Debug, Args)]
struct QuadArgs {
    subject: String,
    predicate: String,
    object: String,
    /// Graph name; the default graph when omitted or `default`
    graph: Option<String>,
}

#[derive(Debug, Args)]
struct PatternArgs {
    #[clap(long, short)]
    subject: Option<String>,
    #[clap(long, short)]
    predicate: Option<String>,
    #[clap(long, short)]
    object: Option<String>,
    #[clap(long, short)]
    graph: Option<String>,
    /// Object strictly greater than this literal
    #[clap(long)]
    gt: Option<String>,
    /// Object greater than or equal to this literal
    #[clap(long)]
    gte: Option<String>,
    /// Object strictly less than this literal
    #[clap(long)]
    lt: Option<String>,
    /// Object less than or equal to this literal
    #[clap(long)]
    lte: Option<String>,
}

#[derive(Debug, Subcommand)]
enum ScopeCommands {
    /// Delete the blank-node mappings of one scope
    Delete { id: String },
    /// Delete the blank-node mappings of every scope
    DeleteAll,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Add a quad
    Put {
        #[command(flatten)]
        quad: QuadArgs,
        /// Rewrite blank nodes through a new scope and print its id
        #[clap(long, action, default_value = "false")]
        scoped: bool,
        /// Rewrite blank nodes through an existing scope
        #[clap(long, conflicts_with = "scoped")]
        scope: Option<String>,
    },
    /// Remove a quad
    Del {
        #[command(flatten)]
        quad: QuadArgs,
    },
    /// Print the quads matching a pattern
    Match {
        #[command(flatten)]
        pattern: PatternArgs,
        /// Result order as slot letters, e.g. `OS`
        #[clap(long)]
        order: Option<String>,
        #[clap(long)]
        limit: Option<usize>,
        #[clap(long, action, default_value = "false")]
        reverse: bool,
        /// Output JSON instead of one quad per line
        #[clap(long, action, default_value = "false")]
        json: bool,
    },
    /// Print the approximate number of quads matching a pattern
    Count {
        #[command(flatten)]
        pattern: PatternArgs,
    },
    /// Manage blank-node scopes
    #[command(subcommand)]
    Scopes(ScopeCommands),
    /// Delete every quad and scope
    Clear,
    /// Flush buffered writes to disk
    Flush,
    /// Print information about the store
    Stats {
        #[clap(long, action, default_value = "false")]
        json: bool,
    },
}

pub fn run() -> Result<()> {
    quadstore::init_logging();
    let cmd = Cli::parse();
    execute(cmd)
}

pub fn run_from_args<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    quadstore::init_logging();
    let cmd = Cli::try_parse_from(args).map_err(Error::from)?;
    execute(cmd)
}

fn parse_term(s: &str) -> Result<Term> {
    let term = OxTerm::from_str(s).map_err(|e| anyhow!("Invalid term '{}': {}", s, e))?;
    Ok(Term::from(&term))
}

fn parse_graph(s: Option<&str>) -> Result<Term> {
    match s {
        None | Some("default") => Ok(Term::DefaultGraph),
        Some(s) => parse_term(s),
    }
}

fn parse_literal(s: &str) -> Result<Literal> {
    match parse_term(s)? {
        Term::Literal(l) => Ok(l),
        other => Err(anyhow!("Range bounds must be literals, got {}", other)),
    }
}

fn parse_order(s: &str) -> Result<Vec<Slot>> {
    s.chars()
        .map(|c| Slot::from_letter(c).ok_or_else(|| anyhow!("Unknown slot '{}' in order", c)))
        .collect()
}

impl QuadArgs {
    fn to_quad(&self) -> Result<Quad> {
        Ok(Quad::new(
            parse_term(&self.subject)?,
            parse_term(&self.predicate)?,
            parse_term(&self.object)?,
            parse_graph(self.graph.as_deref())?,
        )?)
    }
}

impl PatternArgs {
    fn to_pattern(&self) -> Result<Pattern> {
        let mut pattern = Pattern::new();
        if let Some(s) = &self.subject {
            pattern = pattern.subject(parse_term(s)?);
        }
        if let Some(p) = &self.predicate {
            pattern = pattern.predicate(parse_term(p)?);
        }
        if let Some(g) = &self.graph {
            pattern = pattern.graph(parse_graph(Some(g))?);
        }
        let mut range = Range::new();
        range.gt = self.gt.as_deref().map(parse_literal).transpose()?;
        range.gte = self.gte.as_deref().map(parse_literal).transpose()?;
        range.lt = self.lt.as_deref().map(parse_literal).transpose()?;
        range.lte = self.lte.as_deref().map(parse_literal).transpose()?;
        match (&self.object, range.is_empty()) {
            (Some(_), false) => {
                return Err(anyhow!("--object cannot be combined with a range"));
            }
            (Some(o), true) => pattern = pattern.object(parse_term(o)?),
            (None, false) => pattern = pattern.object(range),
            (None, true) => {}
        }
        Ok(pattern)
    }
}

fn quad_json(q: &Quad) -> serde_json::Value {
    serde_json::json!({
        "subject": q.subject.to_string(),
        "predicate": q.predicate.to_string(),
        "object": q.object.to_string(),
        "graph": if q.graph.is_default_graph() { "default".to_string() } else { q.graph.to_string() },
    })
}

fn order_letters(order: &[Slot]) -> String {
    order.iter().map(|s| s.letter()).collect()
}

/// An opened store plus the durable engine behind it, when there is one.
struct Opened {
    store: QuadStore,
    disk: Option<Arc<SledBackend>>,
}

fn open_store(cmd: &Cli) -> Result<Opened> {
    let config = match &cmd.config {
        Some(path) => StoreConfig::from_file(path)?,
        None => StoreConfig::sled(&cmd.store, !cmd.no_sync),
    };
    match &config.backend {
        BackendConfig::Sled { path, sync } => {
            let backend = Arc::new(SledBackend::open(path, *sync)?);
            let store = QuadStore::new(backend.clone(), config.store_options())?;
            Ok(Opened {
                store,
                disk: Some(backend),
            })
        }
        BackendConfig::Memory => Ok(Opened {
            store: QuadStore::open(&config)?,
            disk: None,
        }),
    }
}

fn execute(cmd: Cli) -> Result<()> {
    // The RUST_LOG env var is set by `init_logging` if QUADSTORE_LOG is present.
    // CLI flags for verbosity take precedence. If nothing is set, we default to "warn".
    if cmd.debug {
        std::env::set_var("RUST_LOG", "debug");
    } else if cmd.verbose {
        std::env::set_var("RUST_LOG", "info");
    } else if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "warn");
    }
    let _ = env_logger::try_init();

    let Opened { store, disk } = open_store(&cmd)?;
    info!("Store opened with {} indexes", store.indexes().len());
    let result = run_command(cmd.command, &store, disk.as_deref());
    store.close()?;
    result
}

fn run_command(command: Commands, store: &QuadStore, disk: Option<&SledBackend>) -> Result<()> {
    match command {
        Commands::Put {
            quad,
            scoped,
            scope,
        } => {
            let quad = quad.to_quad()?;
            let mut scope = match (scoped, scope) {
                (_, Some(id)) => Some(store.load_scope(&id)?),
                (true, None) => Some(store.init_scope()),
                (false, None) => None,
            };
            let opts = match scope.as_mut() {
                Some(scope) => WriteOptions::new().scope(scope),
                None => WriteOptions::new(),
            };
            store.put(&quad, opts)?;
            if let Some(scope) = scope {
                println!("{}", scope.id());
            }
        }
        Commands::Del { quad } => {
            store.del(&quad.to_quad()?, WriteOptions::default())?;
        }
        Commands::Match {
            pattern,
            order,
            limit,
            reverse,
            json,
        } => {
            let mut opts = GetOptions::new().reverse(reverse);
            if let Some(order) = order {
                opts = opts.order(parse_order(&order)?);
            }
            if let Some(limit) = limit {
                opts = opts.limit(limit);
            }
            let result = store.get(&pattern.to_pattern()?, &opts)?;
            if json {
                let items: Vec<serde_json::Value> = result.items.iter().map(quad_json).collect();
                let out = serde_json::json!({
                    "order": order_letters(&result.order),
                    "resorted": result.resorted,
                    "items": items,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                for quad in &result.items {
                    println!("{}", quad);
                }
            }
        }
        Commands::Count { pattern } => {
            let size = store.get_approximate_size(&pattern.to_pattern()?, &GetOptions::default())?;
            println!("{}", size.approximate_size);
        }
        Commands::Scopes(ScopeCommands::Delete { id }) => {
            store.delete_scope(&id)?;
        }
        Commands::Scopes(ScopeCommands::DeleteAll) => {
            store.delete_all_scopes()?;
        }
        Commands::Clear => {
            store.clear()?;
        }
        Commands::Flush => {
            store.flush()?;
        }
        Commands::Stats { json } => {
            let quads = store
                .get_approximate_size(&Pattern::new(), &GetOptions::default())?
                .approximate_size;
            let indexes: Vec<String> = store.indexes().iter().map(|i| i.name().to_string()).collect();
            let disk_bytes = disk.map(|d| d.size_on_disk()).transpose()?;
            if json {
                let out = serde_json::json!({
                    "backend": store.backend().backend_type(),
                    "indexes": indexes,
                    "quads": quads,
                    "diskBytes": disk_bytes,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("Backend: {}", store.backend().backend_type());
                println!("Indexes: {}", indexes.join(" "));
                println!("Quads: {}", quads);
                if let Some(bytes) = disk_bytes {
                    println!("Size on disk: {} bytes", bytes);
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_parse_in_ntriples_syntax() {
        assert_eq!(
            parse_term("<http://ex.org/a>").unwrap(),
            Term::named_node("http://ex.org/a")
        );
        assert_eq!(parse_term("_:b0").unwrap(), Term::blank_node("b0"));
        assert_eq!(parse_term("\"chat\"@fr").unwrap(), Term::lang_literal("chat", "fr"));
        assert_eq!(
            parse_term("\"5\"^^<http://www.w3.org/2001/XMLSchema#integer>").unwrap(),
            Term::typed_literal("5", "http://www.w3.org/2001/XMLSchema#integer")
        );
        assert!(parse_term("not a term").is_err());
        assert_eq!(parse_graph(None).unwrap(), Term::DefaultGraph);
        assert_eq!(parse_graph(Some("default")).unwrap(), Term::DefaultGraph);
    }

    #[test]
    fn printed_terms_parse_back() {
        for term in [
            Term::literal("line\nbreak \"quoted\" \\ and \u{1}"),
            Term::lang_literal("tab\there", "en"),
            Term::typed_literal("a\rb", "http://ex.org/dt"),
            Term::named_node("http://ex.org/a"),
        ] {
            assert_eq!(parse_term(&term.to_string()).unwrap(), term);
        }
    }

    #[test]
    fn order_letters_round_trip() {
        let order = parse_order("os").unwrap();
        assert_eq!(order, vec![Slot::Object, Slot::Subject]);
        assert_eq!(order_letters(&order), "OS");
        assert!(parse_order("SX").is_err());
    }

    #[test]
    fn object_and_range_are_exclusive() {
        let args = PatternArgs {
            subject: None,
            predicate: None,
            object: Some("\"a\"".to_string()),
            graph: None,
            gt: Some("\"b\"".to_string()),
            gte: None,
            lt: None,
            lte: None,
        };
        assert!(args.to_pattern().is_err());
    }
}
