//! Command-line host for the template IED import.
//!
//! Loads a project SCL file and one or more template `.icd` files, imports
//! the requested number of IEDs from each template and writes the merged
//! project back out.
//!
//! `scl-import --project station.scd --template relay.icd:2 --output merged.scd`

use clap::Parser;
use log::{error, info, warn};
use scl_template_import::{
    Document, DocumentHost, ImportOptions, ImportQuantity, ImportReport, ImportRequest,
    load_templates, total_ied_count,
};
use serde::Serialize;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

/// Import template IEDs into an SCL project
#[derive(Parser, Debug)]
#[command(name = "scl-import")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Project SCL file to import into
    #[arg(short, long)]
    project: Option<PathBuf>,

    /// Template file, optionally followed by `:<quantity>` (0-99, default 1)
    #[arg(short, long = "template", value_parser = parse_template_arg, required = true)]
    templates: Vec<TemplateArg>,

    /// Do not copy the templates' ConnectedAP definitions
    #[arg(long)]
    no_comms: bool,

    /// JSON file with import options
    #[arg(long)]
    options: Option<PathBuf>,

    /// Where to write the merged project (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the import report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Only list the valid templates and exit
    #[arg(long)]
    list: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TemplateArg {
    path: PathBuf,
    quantity: ImportQuantity,
}

/// Splits `path[:quantity]`. A suffix that is not a number is taken as part
/// of the path.
fn parse_template_arg(value: &str) -> Result<TemplateArg, String> {
    if let Some((path, suffix)) = value.rsplit_once(':') {
        if let Ok(quantity) = suffix.parse::<u32>() {
            let quantity = ImportQuantity::try_from(quantity)?;
            return Ok(TemplateArg {
                path: PathBuf::from(path),
                quantity,
            });
        }
    }
    Ok(TemplateArg {
        path: PathBuf::from(value),
        quantity: ImportQuantity::default(),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TemplateListing<'a> {
    file: &'a str,
    #[serde(flatten)]
    summary: scl_template_import::TemplateSummary,
}

fn read_options(cli: &Cli) -> Result<ImportOptions, Box<dyn Error>> {
    let mut options = match &cli.options {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => ImportOptions::default(),
    };
    if cli.no_comms {
        options.include_comms_addresses = false;
    }
    Ok(options)
}

fn file_label(path: &Path) -> String {
    path.display().to_string()
}

fn read_template_file(path: &Path) -> Result<String, Box<dyn Error>> {
    Ok(String::from_utf8(fs::read(path)?)?)
}

/// Loads every `--template` argument, paired with its own quantity.
///
/// Files that cannot be read, are not UTF-8 or fail validation are skipped
/// with a message; the remaining templates keep argument order.
fn load_template_args(args: &[TemplateArg]) -> Vec<ImportRequest> {
    let mut requests = Vec::with_capacity(args.len());
    for arg in args {
        let label = file_label(&arg.path);
        let contents = match read_template_file(&arg.path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Cannot read template {}: {}", label, e);
                eprintln!("Skipping {}: {}", label, e);
                continue;
            }
        };
        let (mut templates, rejected) = load_templates([(label, contents)]);
        for rejection in &rejected {
            eprintln!("Skipping {}: {}", rejection.file, rejection.reason);
        }
        if let Some(template) = templates.pop() {
            requests.push(ImportRequest::new(template, arg.quantity));
        }
    }
    requests
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let options = read_options(cli)?;
    let requests = load_template_args(&cli.templates);

    if cli.list {
        let listing: Vec<_> = requests
            .iter()
            .map(|r| TemplateListing {
                file: r.template.source_name(),
                summary: r.template.summary(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    let project = cli
        .project
        .as_ref()
        .ok_or("--project is required unless --list is given")?;
    let document = Document::parse(&fs::read_to_string(project)?)?;

    if requests.is_empty() {
        warn!("No valid template to import");
    }
    info!(
        "Importing {} IED(s) into {}",
        total_ied_count(&requests),
        project.display()
    );

    let (document, report) = import(document, &requests, options)?;
    let xml = document.to_xml_string()?;
    match &cli.output {
        Some(path) => fs::write(path, xml)?,
        None if !cli.json => print!("{}", xml),
        None => {}
    }
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for name in report.ied_names() {
            eprintln!("Imported {}", name);
        }
    }
    Ok(())
}

fn import(
    document: Document,
    requests: &[ImportRequest],
    options: ImportOptions,
) -> Result<(Document, ImportReport), Box<dyn Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    let mut host = DocumentHost::new(document);
    let report = runtime.block_on(scl_template_import::import_templates(
        &mut host, requests, options,
    ))?;
    Ok((host.into_document(), report))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        error!("Import failed: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
