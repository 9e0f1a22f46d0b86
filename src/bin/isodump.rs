use clap::{ArgAction, Parser as ClapParser};
use isobmff::{
    BoxNode, ParseOptions, Parser, StringType, hex_payload, json_api::collect_boxes,
    to_json_string, util::uuid_string,
};

#[derive(ClapParser, Debug)]
#[command(version, about = "ISO Base Media File Format box explorer")]
struct Args {
    /// MP4/MOV/HEIF file path
    path: String,

    /// Emit JSON instead of the human-readable tree
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Read string fields as Pascal strings (QuickTime files)
    #[arg(long, action = ArgAction::SetTrue)]
    pascal_strings: bool,

    /// Do not keep mdat payloads in memory
    #[arg(long, action = ArgAction::SetTrue)]
    skip_mdat: bool,

    /// Hex-dump the payload of undecoded boxes of this 4CC (e.g. --raw free)
    /// or uuid:xxxxxxxx...
    #[arg(long = "raw")]
    raw: Option<String>,

    /// Bytes to show per raw dump (0 means the entire payload)
    #[arg(long, default_value_t = 0)]
    bytes: u64,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if args.verbose {
            "isobmff=debug,isodump=debug".to_string()
        } else {
            "isobmff=warn,isodump=info".to_string()
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let mut parser = Parser::new();
    if args.pascal_strings {
        parser.set_string_type(StringType::Pascal);
    }
    if args.skip_mdat {
        parser.add_option(ParseOptions::SKIP_MDAT_DATA);
    }

    let file = parser.parse_file(&args.path)?;
    tracing::info!(path = %args.path, boxes = file.boxes().len(), "parsed");

    if args.json {
        println!("{}", to_json_string(&file)?);
        return Ok(());
    }

    print!("{file}");

    if let Some(sel) = args.raw.as_deref() {
        dump_raw(file.boxes(), sel, args.bytes);
    }
    Ok(())
}

fn dump_raw(boxes: &[BoxNode], sel: &str, limit: u64) {
    let mut matches = Vec::new();
    match sel.strip_prefix("uuid:") {
        Some(prefix) => collect_uuid_boxes(boxes, &prefix.to_ascii_lowercase(), &mut matches),
        None => collect_boxes(boxes, sel, &mut matches),
    }

    if matches.is_empty() {
        tracing::warn!(selector = sel, "no matching boxes");
    }

    for (i, node) in matches.into_iter().enumerate() {
        match hex_payload(node, limit) {
            Some(dump) => {
                println!(
                    "\n== Dump {} ({}) payload: offset={:#x}, len={} ==",
                    i, node.hdr.typ, dump.offset, dump.length
                );
                print!("{}", dump.hex);
            }
            None => {
                tracing::info!(
                    typ = %node.hdr.typ,
                    offset = node.hdr.start,
                    "payload was decoded or skipped, no raw bytes kept"
                );
            }
        }
    }
}

fn collect_uuid_boxes<'a>(boxes: &'a [BoxNode], prefix: &str, out: &mut Vec<&'a BoxNode>) {
    for b in boxes {
        if let Some(u) = &b.hdr.uuid {
            let flat: String = uuid_string(u).chars().filter(|c| *c != '-').collect();
            if flat.starts_with(prefix) {
                out.push(b);
            }
        }
        collect_uuid_boxes(b.children(), prefix, out);
    }
}
