use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use prevdoc_core::{
    catalog_rows, validate, AddOutcome, Catalogs, CoreConfig, Document, DocumentKind,
    DocumentRepository, ObjectType, Severity,
};
use prevdoc_types::{EntityId, Libelle};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "prevdoc")]
#[command(about = "prevdoc safety document CLI (PDP / BDT)")]
struct Cli {
    /// Document storage directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new document
    Init {
        /// Document kind: pdp or bdt
        kind: String,
        /// Document name
        #[arg(long)]
        nom: Option<String>,
        /// Associated chantier id
        #[arg(long)]
        chantier: Option<i64>,
        /// Associated entreprise extérieure id
        #[arg(long)]
        entreprise_exterieure: Option<i64>,
        /// Work start date (YYYY-MM-DD)
        #[arg(long)]
        date_debut: Option<String>,
        /// Work end date (YYYY-MM-DD)
        #[arg(long)]
        date_fin: Option<String>,
    },
    /// Print a document and its relations
    Show {
        /// Document kind: pdp or bdt
        kind: String,
        /// Document id
        id: i64,
    },
    /// Link an entity to a document
    Link {
        /// Document kind: pdp or bdt
        kind: String,
        /// Document id
        id: i64,
        /// Entity type: risque, dispositif, permit, audit, analyse-de-risque
        object_type: String,
        /// Entity id
        object_id: i64,
    },
    /// Soft-delete a link
    Unlink {
        /// Document kind: pdp or bdt
        kind: String,
        /// Document id
        id: i64,
        /// Entity type: risque, dispositif, permit, audit, analyse-de-risque
        object_type: String,
        /// Entity id
        object_id: i64,
    },
    /// Apply a multi-select link/unlink batch in one pass
    Reconcile {
        /// Document kind: pdp or bdt
        kind: String,
        /// Document id
        id: i64,
        /// Entity type: risque, dispositif, permit, audit, analyse-de-risque
        object_type: String,
        /// Entity ids to link (comma-separated)
        #[arg(long, value_delimiter = ',')]
        link: Vec<i64>,
        /// Entity ids to unlink (comma-separated)
        #[arg(long, value_delimiter = ',')]
        unlink: Vec<i64>,
    },
    /// Show the permit types the document still requires
    Permits {
        /// Document kind: pdp or bdt
        kind: String,
        /// Document id
        id: i64,
        /// Directory holding the catalog JSON files
        #[arg(long)]
        catalogs: PathBuf,
    },
    /// Validate a document; exits non-zero when saving would be blocked
    Validate {
        /// Document kind: pdp or bdt
        kind: String,
        /// Document id
        id: i64,
        /// Directory holding the catalog JSON files
        #[arg(long)]
        catalogs: PathBuf,
        /// Tolerate warnings (hard errors still block)
        #[arg(long)]
        tolerant: bool,
    },
}

fn repository(data_dir: Option<PathBuf>) -> Result<DocumentRepository, Box<dyn std::error::Error>> {
    let config = match data_dir {
        Some(dir) => CoreConfig::new(dir)?,
        None => CoreConfig::default_dir(),
    };
    Ok(DocumentRepository::new(config))
}

fn parse_kind(kind: &str) -> Result<DocumentKind, Box<dyn std::error::Error>> {
    kind.parse::<DocumentKind>().map_err(Into::into)
}

fn parse_object_type(object_type: &str) -> Result<ObjectType, Box<dyn std::error::Error>> {
    object_type.parse::<ObjectType>().map_err(Into::into)
}

fn parse_id(raw: i64) -> Result<EntityId, Box<dyn std::error::Error>> {
    EntityId::new(raw).map_err(Into::into)
}

fn parse_ids(raw: &[i64]) -> Result<Vec<EntityId>, Box<dyn std::error::Error>> {
    raw.iter().map(|&id| parse_id(id)).collect()
}

fn parse_date(raw: &str) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(Into::into)
}

/// Loads the entity catalogs from `<dir>/{risques,dispositifs,permits,audits,analyses}.json`.
///
/// A missing file yields an empty catalog for that kind.
fn load_catalogs(dir: &std::path::Path) -> Result<Catalogs, Box<dyn std::error::Error>> {
    fn rows<T: serde::de::DeserializeOwned>(
        path: PathBuf,
    ) -> Result<Vec<T>, Box<dyn std::error::Error>> {
        match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)
                .map_err(|e| format!("{}: {e}", path.display()).into()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(format!("{}: {e}", path.display()).into()),
        }
    }

    Ok(Catalogs {
        risques: catalog_rows(rows(dir.join("risques.json"))?),
        dispositifs: catalog_rows(rows(dir.join("dispositifs.json"))?),
        permits: catalog_rows(rows(dir.join("permits.json"))?),
        audits: catalog_rows(rows(dir.join("audits.json"))?),
        analyses: catalog_rows(rows(dir.join("analyses.json"))?),
    })
}

fn print_document(document: &Document) {
    let id = document
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_owned());
    let nom = document
        .nom
        .as_ref()
        .map(Libelle::as_str)
        .unwrap_or("(sans nom)");
    println!("{} #{id}: {nom}", document.kind);
    if let Some(chantier) = document.chantier_id {
        println!("  chantier: {chantier}");
    }
    if let Some(ee) = document.entreprise_exterieure_id {
        println!("  entreprise extérieure: {ee}");
    }
    if let (Some(debut), Some(fin)) = (document.date_debut, document.date_fin) {
        println!("  période: {debut} → {fin}");
    }
    if document.relations.is_empty() {
        println!("  no relations");
        return;
    }
    println!("  relations:");
    for relation in document.relations.iter() {
        let answer = match relation.answer.as_answer() {
            Some(true) => "linked",
            Some(false) => "not applicable",
            None => "removed",
        };
        println!(
            "    {} {} — {answer}",
            relation.object_type, relation.object_id
        );
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let repo = repository(cli.data_dir)?;

    match cli.command {
        None => {
            println!("prevdoc: run with --help for usage");
        }
        Some(Commands::Init {
            kind,
            nom,
            chantier,
            entreprise_exterieure,
            date_debut,
            date_fin,
        }) => {
            let mut document = Document::new(parse_kind(&kind)?);
            if let Some(nom) = nom {
                document.nom = Some(Libelle::new(&nom)?);
            }
            if let Some(chantier) = chantier {
                document.chantier_id = Some(parse_id(chantier)?);
            }
            if let Some(ee) = entreprise_exterieure {
                document.entreprise_exterieure_id = Some(parse_id(ee)?);
            }
            if let Some(raw) = date_debut {
                document.date_debut = Some(parse_date(&raw)?);
            }
            if let Some(raw) = date_fin {
                document.date_fin = Some(parse_date(&raw)?);
            }
            let id = repo.save(&mut document)?;
            println!("Created {} #{id}", document.kind);
        }
        Some(Commands::Show { kind, id }) => {
            let document = repo.load(parse_kind(&kind)?, parse_id(id)?)?;
            print_document(&document);
        }
        Some(Commands::Link {
            kind,
            id,
            object_type,
            object_id,
        }) => {
            let mut document = repo.load(parse_kind(&kind)?, parse_id(id)?)?;
            let object_type = parse_object_type(&object_type)?;
            let object_id = parse_id(object_id)?;
            match document.add_relation(object_type, object_id) {
                AddOutcome::Created => {
                    repo.save(&mut document)?;
                    println!("Linked {object_type} {object_id}");
                }
                AddOutcome::Reactivated => {
                    repo.save(&mut document)?;
                    println!("Re-linked {object_type} {object_id}");
                }
                AddOutcome::AlreadyLinked => {
                    println!("{object_type} {object_id} is already linked");
                }
            }
        }
        Some(Commands::Unlink {
            kind,
            id,
            object_type,
            object_id,
        }) => {
            let mut document = repo.load(parse_kind(&kind)?, parse_id(id)?)?;
            let object_type = parse_object_type(&object_type)?;
            let object_id = parse_id(object_id)?;
            if document.soft_delete_relation(object_type, object_id) {
                repo.save(&mut document)?;
                println!("Unlinked {object_type} {object_id}");
            } else {
                println!("{object_type} {object_id} is not linked");
            }
        }
        Some(Commands::Reconcile {
            kind,
            id,
            object_type,
            link,
            unlink,
        }) => {
            let mut document = repo.load(parse_kind(&kind)?, parse_id(id)?)?;
            let object_type = parse_object_type(&object_type)?;
            let report = document.reconcile_relations(
                object_type,
                &parse_ids(&link)?,
                &parse_ids(&unlink)?,
            );
            if report.is_noop() {
                println!("No changes");
            } else {
                repo.save(&mut document)?;
                println!("Linked {}, unlinked {}", report.added, report.unlinked);
            }
        }
        Some(Commands::Permits { kind, id, catalogs }) => {
            let document = repo.load(parse_kind(&kind)?, parse_id(id)?)?;
            let catalogs = load_catalogs(&catalogs)?;
            let groups = document.required_permits(&catalogs);
            if groups.is_empty() {
                println!("No permit required");
            }
            for group in groups {
                let coverage = match &group.linked_permit {
                    Some(permit) => format!("covered by \"{}\"", permit.titre),
                    None => "MISSING".to_owned(),
                };
                println!(
                    "{}: {} risk(s) — {coverage}",
                    group.permit_type,
                    group.risks.len()
                );
            }
        }
        Some(Commands::Validate {
            kind,
            id,
            catalogs,
            tolerant,
        }) => {
            let document = repo.load(parse_kind(&kind)?, parse_id(id)?)?;
            let catalogs = load_catalogs(&catalogs)?;
            let report = validate(&document, &catalogs, tolerant);
            for issue in &report.issues {
                let label = match issue.severity {
                    Severity::Error => "error",
                    Severity::Warning => "warning",
                };
                println!("{label}: {} (tab {})", issue.message, issue.tab.index());
            }
            if report.save_allowed {
                println!("Save allowed");
            } else {
                println!("Save blocked");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    run(Cli::parse())
}
