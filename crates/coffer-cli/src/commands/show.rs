//! Show command
//!
//! Usage: coffer show <PID> [--db <PATH>]

use clap::Args;

use coffer_core::registry::ObjectType;
use coffer_core_types::Pid;

use super::BackendArgs;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Object identifier (namespace:id)
    pub pid: String,

    #[command(flatten)]
    pub backend: BackendArgs,
}

pub fn execute(args: ShowArgs) -> Result<(), Box<dyn std::error::Error>> {
    let session = super::open_session(&args.backend.db, &args.backend.namespace)?;
    let pid = Pid::parse(&args.pid)?;
    let mut handle = session.load(&ObjectType::generic(), &pid)?;

    let object = handle.object();
    println!("pid:      {}", object.pid());
    println!("label:    {}", object.label);
    println!("state:    {}", object.state.code());
    println!("owner:    {}", object.owner_id);
    if let Some(date) = object.create_date {
        println!("created:  {}", date.to_rfc3339());
    }
    if let Some(date) = object.modified_date {
        println!("modified: {}", date.to_rfc3339());
    }

    println!("\ndatastreams:");
    let streams: Vec<(String, String, String)> = handle
        .datastreams()?
        .iter()
        .map(|ds| {
            (
                ds.dsid.clone(),
                ds.mime_type.clone().unwrap_or_default(),
                ds.label.clone(),
            )
        })
        .collect();
    for (dsid, mime, label) in streams {
        println!("  {dsid:<12} {mime:<24} {label}");
    }

    let relationships = handle.relationships(false)?;
    if !relationships.is_empty() {
        println!("\nrelationships:");
        for (predicate, targets) in relationships {
            for target in targets {
                println!("  {predicate} -> {target}");
            }
        }
    }

    Ok(())
}
