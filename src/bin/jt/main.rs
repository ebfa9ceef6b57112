//! JT CLI - Tool for inspecting and manipulating JT files.

use std::collections::HashSet;
use std::env;
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};

use tracing_subscriber::prelude::*;

use jt::io::Endian;
use jt::segment::{SEGMENT_TYPE_LSG, SEGMENT_TYPE_META_DATA, SEGMENT_TYPE_SHAPE_LOD};
use jt::util::Mat4;
use jt::{save, GeometricSet, JtFile, PropertyValue, SceneNode};

/// Verbosity level (thread-safe)
const LOG_QUIET: u8 = 0;
const LOG_INFO: u8 = 1;
const LOG_DEBUG: u8 = 2;
const LOG_TRACE: u8 = 3;

static LOG_LEVEL: AtomicU8 = AtomicU8::new(LOG_INFO);

#[inline]
fn log_level() -> u8 {
    LOG_LEVEL.load(Ordering::Relaxed)
}

#[inline]
fn set_log_level(level: u8) {
    LOG_LEVEL.store(level, Ordering::Relaxed);
}

macro_rules! info {
    ($($arg:tt)*) => {
        if log_level() >= LOG_INFO {
            println!("[INFO] {}", format!($($arg)*));
        }
    };
}

macro_rules! debug {
    ($($arg:tt)*) => {
        if log_level() >= LOG_DEBUG {
            println!("[DEBUG] {}", format!($($arg)*));
        }
    };
}

macro_rules! trace {
    ($($arg:tt)*) => {
        if log_level() >= LOG_TRACE {
            println!("[TRACE] {}", format!($($arg)*));
        }
    };
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => set_log_level(LOG_DEBUG),
            "-vv" | "--trace" => set_log_level(LOG_TRACE),
            "-q" | "--quiet" => set_log_level(LOG_QUIET),
            _ => filtered_args.push(arg),
        }
    }

    init_tracing();

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    match filtered_args[0] {
        // Info command - show file summary
        "info" | "i" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: jt-cli info <file.jt>");
                std::process::exit(1);
            }
            cmd_info(filtered_args[1]);
        }

        // Tree command - show hierarchy
        "tree" | "t" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: jt-cli tree <file.jt>");
                std::process::exit(1);
            }
            cmd_tree(filtered_args[1]);
        }

        // Dump command - node details
        "dump" | "d" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: jt-cli dump <file.jt> [pattern] [--json]");
                std::process::exit(1);
            }
            let json_mode = filtered_args.iter().any(|&s| s == "--json" || s == "-j");
            if json_mode {
                set_log_level(LOG_QUIET);
            }
            let pattern = filtered_args.get(2).filter(|&&s| s != "--json" && s != "-j").copied();
            cmd_dump(filtered_args[1], pattern, json_mode);
        }

        // Copy command - round-trip test
        "copy" | "c" => {
            if filtered_args.len() < 3 {
                eprintln!("Error: missing arguments");
                eprintln!("Usage: jt-cli copy <input.jt> <output.jt>");
                std::process::exit(1);
            }
            cmd_copy(filtered_args[1], filtered_args[2]);
        }

        // Version
        "version" | "-V" | "--version" => println!("{}", version_line()),

        // Help
        "help" | "h" | "-h" | "--help" => print_help(),

        // Default: if file exists, show info; otherwise error
        _ => {
            if Path::new(filtered_args[0]).exists() {
                cmd_info(filtered_args[0]);
            } else {
                eprintln!("Unknown command: {}", filtered_args[0]);
                eprintln!();
                print_help();
                std::process::exit(1);
            }
        }
    }
}

/// Route library tracing to stderr at the CLI verbosity, with the
/// `JT_LOG` variable overriding.
fn init_tracing() {
    let directive = match log_level() {
        LOG_QUIET => "jt=error",
        LOG_DEBUG => "jt=debug",
        LOG_TRACE => "jt=trace",
        _ => "jt=info",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_env("JT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(directive));
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false));
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        debug!("tracing already initialized");
    }
}

fn version_line() -> String {
    let date = option_env!("JT_BUILD_DATE").unwrap_or("unknown");
    let time = option_env!("JT_BUILD_TIME").unwrap_or("unknown");
    format!("jt {} (built {} {})", env!("CARGO_PKG_VERSION"), date, time)
}

fn print_help() {
    println!("jt-cli - JT file toolkit");
    println!();
    println!("USAGE:");
    println!("    jt-cli [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info  <file>              Show file info and scene counts");
    println!("    t, tree  <file>              Show the scene hierarchy");
    println!("    d, dump  <file> [pattern]    Dump node details (filter by pattern)");
    println!("    c, copy  <in> <out>          Read a file and write it back out");
    println!("    version                      Show version and build stamp");
    println!("    h, help                      Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Suppress all output");
    println!();
    println!("EXAMPLES:");
    println!("    jt-cli info housing.jt                # Quick overview");
    println!("    jt-cli tree assembly.jt               # See hierarchy");
    println!("    jt-cli dump assembly.jt wheel         # Dump nodes matching 'wheel'");
    println!("    jt-cli dump assembly.jt --json        # Export all nodes as JSON");
    println!("    jt-cli copy input.jt output.jt        # Test round-trip");
    println!("    jt-cli -v info large.jt               # Verbose info");
    println!();
    println!("NOTES:");
    println!("    - Passing a .jt file directly is equivalent to 'info'");
    println!("    - Set JT_LOG for a custom tracing filter");
}

fn cmd_info(path: &str) {
    info!("Opening file: {}", path);

    let file = match JtFile::open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to open {}: {}", path, e);
            std::process::exit(1);
        }
    };

    debug!("File parsed successfully");

    let order = match file.header().byte_order {
        Endian::Little => "little-endian",
        Endian::Big => "big-endian",
    };
    println!("File: {}", path);
    println!("Version: {}", file.header().version);
    println!("Byte order: {}", order);
    println!();

    let counts = segment_counts(&file);
    println!("Segments:");
    println!("  LSG:       {}", counts.lsg);
    println!("  Shape-LOD: {}", counts.shape_lod);
    println!("  Meta-Data: {}", counts.meta_data);
    println!();

    match file.scene() {
        Ok(scene) => {
            let mut stats = SceneStats::default();
            collect_stats(&scene, &mut stats);
            debug!("Counted {} scene nodes", stats.nodes);
            println!("Scene:");
            println!("  Nodes:     {}", stats.nodes);
            println!("  Sets:      {}", stats.sets);
            println!("  Vertices:  {}", stats.vertices);
            println!("  Triangles: {}", stats.triangles);
            if let Ok(partition) = file.root_partition() {
                println!("  Area:      {:.3}", partition.area);
            }
        }
        Err(e) => println!("Scene: not reconstructible ({})", e),
    }
}

/// Segment counts by type, repeated TOC entries counted once.
#[derive(Default)]
struct SegmentCounts {
    lsg: usize,
    shape_lod: usize,
    meta_data: usize,
}

fn segment_counts(file: &JtFile) -> SegmentCounts {
    let mut counts = SegmentCounts::default();
    let mut seen = HashSet::new();
    for entry in &file.toc().entries {
        if !seen.insert(entry.segment_id) {
            continue;
        }
        match entry.segment_type() {
            SEGMENT_TYPE_LSG => counts.lsg += 1,
            SEGMENT_TYPE_SHAPE_LOD => counts.shape_lod += 1,
            SEGMENT_TYPE_META_DATA => counts.meta_data += 1,
            _ => {}
        }
    }
    counts
}

#[derive(Default)]
struct SceneStats {
    nodes: usize,
    sets: usize,
    vertices: i64,
    triangles: i64,
}

fn collect_stats(node: &SceneNode, stats: &mut SceneStats) {
    trace!(
        "Counting node: {} ({} sets)",
        node.label().unwrap_or("<unnamed>"),
        node.geometry.len()
    );
    stats.nodes += 1;
    stats.sets += node.geometry.len();
    for set in &node.geometry {
        stats.vertices += set.vertex_count() as i64;
        stats.triangles += set.triangle_count() as i64;
    }
    for child in &node.children {
        collect_stats(child, stats);
    }
}

fn cmd_tree(path: &str) {
    info!("Opening file: {}", path);

    let file = match JtFile::open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to open {}: {}", path, e);
            std::process::exit(1);
        }
    };
    let scene = match file.scene() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to rebuild scene from {}: {}", path, e);
            std::process::exit(1);
        }
    };

    println!("File: {}", path);
    println!();
    print_tree(&scene, 0);
}

fn print_tree(node: &SceneNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let label = node.label().unwrap_or("<unnamed>");
    let extra = tree_info(node);

    if extra.is_empty() {
        println!("{}{}", indent, label);
    } else {
        println!("{}{} {}", indent, label, extra);
    }

    for child in &node.children {
        print_tree(child, depth + 1);
    }
}

fn tree_info(node: &SceneNode) -> String {
    let mut parts = Vec::new();
    if !node.geometry.is_empty() {
        let triangles: i32 = node.geometry.iter().map(GeometricSet::triangle_count).sum();
        parts.push(format!("{} sets, {} triangles", node.geometry.len(), triangles));
    }
    if node.transform.is_some() {
        parts.push("transform".to_string());
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("[{}]", parts.join(", "))
    }
}

fn cmd_dump(path: &str, pattern: Option<&str>, json_mode: bool) {
    info!("Opening file: {}", path);

    let file = match JtFile::open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to open {}: {}", path, e);
            std::process::exit(1);
        }
    };
    let scene = match file.scene() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to rebuild scene from {}: {}", path, e);
            std::process::exit(1);
        }
    };

    if json_mode {
        let mut nodes = Vec::new();
        collect_dump_json(&scene, pattern, &mut nodes);
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "file": path,
                "nodes": nodes
            }))
            .unwrap_or_default()
        );
    } else {
        println!("File: {}", path);
        println!(
            "Node Dump{}",
            if let Some(p) = pattern { format!(" (filter: {})", p) } else { String::new() }
        );
        println!();
        dump_node(&scene, 0, pattern);
    }
}

fn dump_node(node: &SceneNode, depth: usize, pattern: Option<&str>) {
    let indent = "  ".repeat(depth);
    let label = node.label().unwrap_or("<unnamed>");
    let matches = pattern.map(|p| label.contains(p)).unwrap_or(true);

    if matches {
        println!("{}{}", indent, label);
        println!("{}  unit: {}", indent, node.measurement_unit);
        for (key, value) in &node.attributes {
            println!("{}  {}: {}", indent, key, value_text(value));
        }
        if let Some(m) = node.transform {
            println!("{}  transform:", indent);
            print_matrix(&m, &indent);
        }
        for set in &node.geometry {
            println!(
                "{}  set: {} vertices, {} triangles, colour {}",
                indent,
                set.vertex_count(),
                set.triangle_count(),
                set.colour
            );
        }
        println!();
    }

    for child in &node.children {
        dump_node(child, depth + 1, pattern);
    }
}

fn value_text(value: &PropertyValue) -> String {
    match value {
        PropertyValue::String(s) => s.clone(),
        PropertyValue::Int(v) => v.to_string(),
        PropertyValue::Float(v) => v.to_string(),
        PropertyValue::Date(d) => d.to_string(),
        PropertyValue::GeometrySets(sets) => format!("<{} geometry sets>", sets.len()),
        PropertyValue::SegmentRef(h) => {
            format!("<segment {} type {}>", h.segment_id, h.segment_type)
        }
    }
}

fn print_matrix(m: &Mat4, indent: &str) {
    let cols = m.to_cols_array_2d();
    // Print as rows (transposed view for readability)
    println!("{}    [{:>10.4} {:>10.4} {:>10.4} {:>10.4}]", indent, cols[0][0], cols[1][0], cols[2][0], cols[3][0]);
    println!("{}    [{:>10.4} {:>10.4} {:>10.4} {:>10.4}]", indent, cols[0][1], cols[1][1], cols[2][1], cols[3][1]);
    println!("{}    [{:>10.4} {:>10.4} {:>10.4} {:>10.4}]", indent, cols[0][2], cols[1][2], cols[2][2], cols[3][2]);
    println!("{}    [{:>10.4} {:>10.4} {:>10.4} {:>10.4}]", indent, cols[0][3], cols[1][3], cols[2][3], cols[3][3]);
}

fn collect_dump_json(node: &SceneNode, pattern: Option<&str>, out: &mut Vec<serde_json::Value>) {
    let label = node.label().unwrap_or("<unnamed>");
    let matches = pattern.map(|p| label.contains(p)).unwrap_or(true);

    if matches {
        let attributes: Vec<serde_json::Value> = node
            .attributes
            .iter()
            .map(|(key, value)| serde_json::json!({ "key": key, "value": value_text(value) }))
            .collect();
        let geometry: Vec<serde_json::Value> = node
            .geometry
            .iter()
            .map(|set| {
                serde_json::json!({
                    "vertices": set.vertex_count(),
                    "triangles": set.triangle_count(),
                    "area": set.area(),
                    "colour": set.colour.to_string()
                })
            })
            .collect();
        out.push(serde_json::json!({
            "name": label,
            "unit": node.measurement_unit.as_str(),
            "attributes": attributes,
            "geometry": geometry,
            "transform": node.transform.map(|m| m.to_cols_array_2d()),
            "children": node.children.len()
        }));
    }

    for child in &node.children {
        collect_dump_json(child, pattern, out);
    }
}

fn cmd_copy(input: &str, output: &str) {
    info!("Copying {} -> {}", input, output);

    let file = match JtFile::open(input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to open {}: {}", input, e);
            std::process::exit(1);
        }
    };
    let scene = match file.scene() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to rebuild scene from {}: {}", input, e);
            std::process::exit(1);
        }
    };

    let partition = match save(&scene, output) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to write {}: {}", output, e);
            std::process::exit(1);
        }
    };

    println!("Copied {} -> {}", input, output);
    println!("  Nodes: {}", scene.subtree_len());
    println!("  Area:  {:.3}", partition.area);
}
