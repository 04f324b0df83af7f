// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! h5rest-ls - Browse HDF5 domains on a REST (HSDS) server
//!
//! Lists links, attributes and object metadata of a remote domain.
//!
//! # Usage
//!
//! ```bash
//! # List the root group (endpoint from HSDS_ENDPOINT or ~/.hscfg)
//! h5rest-ls --domain /home/test/data.h5 ls
//!
//! # Every link below /g1, newest first
//! h5rest-ls --domain /home/test/data.h5 ls /g1 --recursive --index crt --order dec
//!
//! # Datatype and shape of a dataset
//! h5rest-ls --domain /home/test/data.h5 type /g1/dset
//! h5rest-ls --domain /home/test/data.h5 shape /g1/dset
//!
//! # Attributes of the root group
//! h5rest-ls --endpoint http://localhost:5101 --domain /home/test/data.h5 attrs
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use h5rest::connector::{Connector, RestConnector};
use h5rest::link::{IndexType, IterOrder, IterParams, LinkEntry, LinkTarget};
use h5rest::{datatype, ConnectionConfig, Extent, ObjectInfo, RemoteObject, Resolution, ShapeDescriptor};
use tabled::{Table, Tabled};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "h5rest-ls")]
#[command(about = "Browse HDF5 domains on a REST (HSDS) server", long_about = None)]
#[command(version)]
struct Args {
    /// Server endpoint (overrides HSDS_ENDPOINT and ~/.hscfg)
    #[arg(short, long, global = true)]
    endpoint: Option<String>,

    /// User name for basic authentication
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Password for basic authentication
    #[arg(short, long, global = true)]
    password: Option<String>,

    /// Domain to open, e.g. /home/user/file.h5
    #[arg(short, long, global = true)]
    domain: Option<String>,

    /// Log filter (RUST_LOG syntax)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the links of a group
    Ls {
        /// Group path (default: root)
        #[arg(default_value = "/")]
        path: String,

        /// Descend into subgroups
        #[arg(short, long)]
        recursive: bool,

        /// Index to order links by
        #[arg(long, value_enum, default_value_t = IndexArg::Name)]
        index: IndexArg,

        /// Iteration direction
        #[arg(long, value_enum, default_value_t = OrderArg::Inc)]
        order: OrderArg,
    },
    /// Show kind, attribute count and link count of an object
    Stat {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Print the datatype of a dataset or committed datatype as JSON
    Type { path: String },
    /// Print the shape of a dataset
    Shape { path: String },
    /// List the attributes of an object
    Attrs {
        #[arg(default_value = "/")]
        path: String,
    },
    /// List every object reachable from a group
    Tree {
        #[arg(default_value = "/")]
        path: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum IndexArg {
    Name,
    Crt,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    Inc,
    Dec,
    Native,
}

impl IndexArg {
    fn index_type(self) -> IndexType {
        match self {
            IndexArg::Name => IndexType::Name,
            IndexArg::Crt => IndexType::CreationOrder,
        }
    }
}

impl OrderArg {
    fn iter_order(self) -> IterOrder {
        match self {
            OrderArg::Inc => IterOrder::Increasing,
            OrderArg::Dec => IterOrder::Decreasing,
            OrderArg::Native => IterOrder::Native,
        }
    }
}

type CmdResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = connect(&args).and_then(|(mut conn, root)| match &args.command {
        Commands::Ls {
            path,
            recursive,
            index,
            order,
        } => cmd_ls(&mut conn, &root, path, *recursive, *index, *order),
        Commands::Stat { path } => cmd_stat(&mut conn, &root, path),
        Commands::Type { path } => cmd_type(&mut conn, &root, path),
        Commands::Shape { path } => cmd_shape(&mut conn, &root, path),
        Commands::Attrs { path } => cmd_attrs(&mut conn, &root, path),
        Commands::Tree { path } => cmd_tree(&mut conn, &root, path),
    });

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn connect(args: &Args) -> Result<(Connector, RemoteObject), Box<dyn std::error::Error>> {
    let mut config = match &args.endpoint {
        Some(endpoint) => ConnectionConfig::new(endpoint.clone()),
        None => ConnectionConfig::load()?,
    };
    if let Some(user) = &args.user {
        config.username = Some(user.clone());
    }
    if let Some(password) = &args.password {
        config.password = Some(password.clone());
    }
    let domain = args
        .domain
        .clone()
        .or_else(|| config.domain.clone())
        .ok_or("no domain given (use --domain)")?;
    config.domain = None;

    let mut conn = Connector::connect(&config)?;
    let root = conn.open_domain(&domain)?;
    Ok((conn, root))
}

/// Resolve `path` to an object, reporting symbolic links as errors.
fn open(
    conn: &mut Connector,
    root: &RemoteObject,
    path: &str,
) -> Result<RemoteObject, Box<dyn std::error::Error>> {
    match conn.open_object(root, path, None)? {
        Resolution::Found { object, .. } => Ok(object),
        Resolution::Symbolic(info) => Err(format!(
            "{} is a {} link to {}",
            path,
            link_class(&info.target),
            describe_target(&info.target)
        )
        .into()),
        Resolution::NotFound => Err(format!("{} not found", path).into()),
    }
}

fn link_class(target: &LinkTarget) -> &'static str {
    match target {
        LinkTarget::Object(_) => "hard",
        LinkTarget::Soft { .. } => "soft",
        LinkTarget::External { .. } => "external",
        LinkTarget::UserDefined => "user-defined",
    }
}

fn describe_target(target: &LinkTarget) -> String {
    match target {
        LinkTarget::Object(obj) => format!("{} {}", obj.kind, obj.uri),
        LinkTarget::Soft { path } => path.clone(),
        LinkTarget::External { domain, path } => format!("{}:{}", domain, path),
        LinkTarget::UserDefined => "-".to_string(),
    }
}

fn format_shape(shape: &ShapeDescriptor) -> String {
    match shape {
        ShapeDescriptor::Null => "null".to_string(),
        ShapeDescriptor::Scalar => "scalar".to_string(),
        ShapeDescriptor::Simple { dims, maxdims } => {
            let dims: Vec<String> = dims.iter().map(u64::to_string).collect();
            let mut out = format!("({})", dims.join(", "));
            if let Some(maxdims) = maxdims {
                let max: Vec<String> = maxdims
                    .iter()
                    .map(|m| match m {
                        Extent::Unlimited => "inf".to_string(),
                        Extent::Fixed(n) => n.to_string(),
                    })
                    .collect();
                out.push_str(&format!(" / ({})", max.join(", ")));
            }
            out
        }
    }
}

#[derive(Tabled)]
struct LinkRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Created")]
    created: String,
}

fn cmd_ls(
    conn: &mut Connector,
    root: &RemoteObject,
    path: &str,
    recursive: bool,
    index: IndexArg,
    order: OrderArg,
) -> CmdResult {
    let group = open(conn, root, path)?;
    let mut rows = Vec::new();
    let mut params = IterParams::new(index.index_type(), order.iter_order());
    let mut collect = |name: &str, entry: &LinkEntry| {
        rows.push(LinkRow {
            name: name.to_string(),
            class: link_class(&entry.info.target).to_string(),
            target: describe_target(&entry.info.target),
            created: format!("{:.3}", entry.creation_time),
        });
        0
    };
    if recursive {
        conn.visit_links(&group, &mut params, &mut collect)?;
    } else {
        conn.iterate_links(&group, &mut params, &mut collect)?;
    }

    println!("{} {}", "Links of".cyan().bold(), path.bold());
    println!("  Count: {}", rows.len());
    println!();
    if rows.is_empty() {
        println!("  {}", "No links".yellow());
    } else {
        println!("{}", Table::new(rows));
    }
    Ok(())
}

fn cmd_stat(conn: &mut Connector, root: &RemoteObject, path: &str) -> CmdResult {
    let object = open(conn, root, path)?;
    let info = conn.object_info(&object)?;

    println!("{}", "Object".cyan().bold());
    println!("  Path:       {}", path);
    println!("  Id:         {}", info.uri);
    println!("  Kind:       {}", info.kind);
    println!("  Fileno:     {:#x}", info.fileno);
    println!("  Attributes: {}", info.num_attrs);
    if object.kind == h5rest::ObjectKind::Group {
        let group = conn.group_info(&object)?;
        println!("  Links:      {}", group.num_links);
    }
    Ok(())
}

fn cmd_type(conn: &mut Connector, root: &RemoteObject, path: &str) -> CmdResult {
    let object = open(conn, root, path)?;
    let ty = conn.object_datatype(&object)?;

    println!("{} {}", "Datatype".cyan().bold(), ty.class_name());
    if let Ok(size) = ty.size() {
        println!("  Size: {} bytes", size);
    }
    println!("{}", serde_json::to_string_pretty(&datatype::encode(&ty)?)?);
    Ok(())
}

fn cmd_shape(conn: &mut Connector, root: &RemoteObject, path: &str) -> CmdResult {
    let object = open(conn, root, path)?;
    let shape = conn.object_shape(&object)?;

    println!("{} {}", "Shape".cyan().bold(), shape.class_name());
    println!("  Dims:   {}", format_shape(&shape));
    match shape.npoints() {
        Some(n) => println!("  Points: {}", n),
        None => println!("  Points: {}", "overflows u64".yellow()),
    }
    Ok(())
}

#[derive(Tabled)]
struct AttrRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    class: String,
    #[tabled(rename = "Shape")]
    shape: String,
    #[tabled(rename = "Bytes")]
    bytes: String,
}

fn cmd_attrs(conn: &mut Connector, root: &RemoteObject, path: &str) -> CmdResult {
    let object = open(conn, root, path)?;
    let mut rows = Vec::new();
    let mut params = IterParams::default();
    conn.iterate_attributes(&object, &mut params, &mut |name: &str, entry: &h5rest::attribute::AttrEntry| {
        rows.push(AttrRow {
            name: name.to_string(),
            class: entry
                .datatype
                .as_ref()
                .map_or("-", |t| t.class_name())
                .to_string(),
            shape: entry.shape.as_ref().map_or_else(|| "-".to_string(), format_shape),
            bytes: entry
                .data_size()
                .map_or_else(|| "-".to_string(), |n| n.to_string()),
        });
        0
    })?;

    println!("{} {}", "Attributes of".cyan().bold(), path.bold());
    println!();
    if rows.is_empty() {
        println!("  {}", "No attributes".yellow());
    } else {
        println!("{}", Table::new(rows));
    }
    Ok(())
}

#[derive(Tabled)]
struct ObjectRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Attrs")]
    attrs: u64,
}

fn cmd_tree(conn: &mut Connector, root: &RemoteObject, path: &str) -> CmdResult {
    let start = open(conn, root, path)?;
    let mut rows = Vec::new();
    let params = IterParams::default();
    conn.visit_objects(&start, &params, &mut |rel: &str, info: &ObjectInfo| {
        rows.push(ObjectRow {
            path: rel.to_string(),
            kind: info.kind.to_string(),
            id: info.uri.clone(),
            attrs: info.num_attrs,
        });
        0
    })?;

    println!("{} {}", "Objects under".cyan().bold(), path.bold());
    println!("  Count: {}", rows.len());
    println!();
    println!("{}", Table::new(rows));
    Ok(())
}
