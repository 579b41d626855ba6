use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use disassembler_core::core_api::{
    Engine, EngineConfig, LoadReport, PLUGIN_NAME, PLUGIN_VERSION, Session,
};
use disassembler_core::form::{FormId, parse_hex_u32};
use disassembler_core::lookup::LookupService;
use disassembler_core::overrides::OverridePaths;
use disassembler_core::record::LooseItem;
use disassembler_core::script_api::{ScriptCall, registered_functions};
use disassembler_core::source::GameData;
use disassembler_core::table::{AttachIndex, MappingTable};
use serde_json::{Map as JsonMap, Value as JsonValue, json};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// JSON dump of the host's plugins and records
    #[arg(value_name = "DATA.json")]
    data: PathBuf,
    /// Directory holding the mod map override files; takes precedence over --config
    #[arg(long, env = "AUTOMATRON_PLUGIN_DIR")]
    plugin_dir: Option<PathBuf>,
    /// Plugin that must be loaded before any table is built
    #[arg(long, env = "AUTOMATRON_REQUIRED_PLUGIN")]
    required_plugin: Option<String>,
    /// JSON engine config; override paths are relative to this file
    #[arg(long, value_name = "CONFIG.json")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the load report and every mapping table
    Table {
        #[arg(long)]
        json: bool,
    },
    /// Look up the loose item for one attachment mod
    Resolve {
        #[arg(value_name = "FORM_ID", value_parser = parse_form_id)]
        mod_id: FormId,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        index: i32,
        #[arg(long)]
        json: bool,
    },
    /// Look up loose items for every mod on one robot; `none` is an empty slot
    ResolveAll {
        #[arg(value_name = "FORM_ID|none", value_parser = parse_mod_slot)]
        mods: Vec<ModSlot>,
        #[arg(long)]
        json: bool,
    },
    /// Answer newline-delimited JSON script calls from stdin
    Script,
}

fn parse_form_id(raw: &str) -> Result<FormId, String> {
    parse_hex_u32(raw)
        .map(FormId::new)
        .map_err(|e| format!("invalid form id '{raw}': {e}"))
}

/// One entry of a robot's mod list; `none` is an empty slot.
#[derive(Debug, Clone, Copy)]
struct ModSlot(Option<FormId>);

fn parse_mod_slot(raw: &str) -> Result<ModSlot, String> {
    if raw.eq_ignore_ascii_case("none") {
        return Ok(ModSlot(None));
    }
    parse_form_id(raw).map(|id| ModSlot(Some(id)))
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn engine_config(cli: &Cli) -> EngineConfig {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path).unwrap_or_else(|e| {
            eprintln!("Error loading config: {e}");
            process::exit(1);
        }),
        None => EngineConfig::default(),
    };
    if let Some(dir) = &cli.plugin_dir {
        config.overrides = OverridePaths::in_dir(dir);
    }
    if let Some(plugin) = &cli.required_plugin {
        config.required_plugin = plugin.clone();
    }
    config
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let config = engine_config(&cli);
    let text = fs::read_to_string(&cli.data).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", cli.data.display());
        process::exit(1);
    });
    let data = GameData::from_json(&text).unwrap_or_else(|e| {
        eprintln!("Error parsing record dump: {}", cli.data.display());
        eprintln!("  {}", e);
        process::exit(1);
    });

    tracing::info!("{PLUGIN_NAME} v{PLUGIN_VERSION}: {} records loaded", data.len());
    let engine = Engine::new(config);
    tracing::debug!(
        "required plugin {}, default mod map {}",
        engine.config().required_plugin,
        engine.config().overrides.default.display()
    );
    let session = engine.on_data_ready(&data);

    match cli.command {
        Command::Table { json } => print_tables(&session, json),
        Command::Resolve {
            mod_id,
            index,
            json,
        } => {
            let item = session.service().resolve(Some(mod_id), index);
            if json {
                print_json(&item.map(item_json).unwrap_or(JsonValue::Null));
            } else {
                println!("{}", format_item(item));
            }
        }
        Command::ResolveAll { mods, json } => {
            let mods: Vec<Option<FormId>> = mods.into_iter().map(|slot| slot.0).collect();
            let items = session.service().resolve_all(&mods);
            if json {
                print_json(&JsonValue::Array(items.into_iter().map(item_json).collect()));
            } else {
                for item in items {
                    println!("{}", format_item(Some(item)));
                }
            }
        }
        Command::Script => run_script(session.service()),
    }
}

fn run_script(service: &LookupService) {
    for (class, function) in registered_functions() {
        tracing::info!("Registered {class}.{function}");
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.unwrap_or_else(|e| {
            eprintln!("Error reading stdin: {e}");
            process::exit(1);
        });
        if line.trim().is_empty() {
            continue;
        }

        let value = match ScriptCall::from_json(&line) {
            Ok(call) => serde_json::to_value(call.dispatch(service)),
            Err(e) => {
                eprintln!("{e}");
                Ok(JsonValue::Null)
            }
        };
        let value = value.unwrap_or_else(|e| {
            eprintln!("Error rendering JSON output: {e}");
            process::exit(1);
        });
        writeln!(stdout, "{value}").unwrap_or_else(|e| {
            eprintln!("Error writing stdout: {e}");
            process::exit(1);
        });
    }
}

fn print_tables(session: &Session, json: bool) {
    let service = session.service();
    if json {
        let mut out = JsonMap::new();
        out.insert("report".to_string(), report_json(session.report()));
        out.insert("native".to_string(), table_json(service.native_table()));
        for index in AttachIndex::ALL {
            out.insert(index.as_str().to_string(), table_json(service.table(index)));
        }
        print_json(&JsonValue::Object(out));
        return;
    }

    let report = session.report();
    println!("required_plugin={}", report.required_plugin);
    println!("required_plugin_loaded={}", report.required_plugin_loaded);
    println!("attachment_mods={}", report.attachment_mods);
    println!("matched={}", report.matched);
    for index in AttachIndex::ALL {
        let table = service.table(index);
        println!();
        println!(
            "[{}] {} entries ({} from overrides)",
            index.as_str(),
            table.len(),
            report.overrides_applied.get(index)
        );
        print_table_entries(table);
    }
}

fn print_table_entries(table: &MappingTable) {
    for (mod_id, item) in table.sorted_entries() {
        println!("{mod_id}={}", format_item(Some(item)));
    }
}

fn format_item(item: Option<&LooseItem>) -> String {
    match item {
        Some(item) if item.name.is_empty() => item.form_id.to_string(),
        Some(item) => format!("{} {}", item.form_id, item.name),
        None => "none".to_string(),
    }
}

fn item_json(item: &LooseItem) -> JsonValue {
    json!({
        "form_id": item.form_id,
        "name": item.name,
    })
}

fn table_json(table: &MappingTable) -> JsonValue {
    let mut out = JsonMap::new();
    for (mod_id, item) in table.sorted_entries() {
        out.insert(mod_id.to_string(), item_json(item));
    }
    JsonValue::Object(out)
}

fn report_json(report: &LoadReport) -> JsonValue {
    serde_json::to_value(report).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(1);
    })
}

fn print_json(value: &JsonValue) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(1);
    });
    println!("{rendered}");
}
