//! Index projection command
//!
//! Usage: coffer index <PID> [--xml] [--publish] [--db <PATH>]

use clap::Args;

use coffer_core::registry::ObjectType;
use coffer_core::render::ProjectionOptions;
use coffer_core_types::Pid;

use super::BackendArgs;

#[derive(Debug, Args)]
pub struct IndexArgs {
    /// Object identifier (namespace:id)
    pub pid: String,

    /// Render the XML fragment instead of the JSON document
    #[arg(long)]
    pub xml: bool,

    /// Publish the document to the index after rendering
    #[arg(long)]
    pub publish: bool,

    /// Restrict the projection to identity and model fields
    #[arg(long)]
    pub model_only: bool,

    #[command(flatten)]
    pub backend: BackendArgs,
}

pub fn execute(args: IndexArgs) -> Result<(), Box<dyn std::error::Error>> {
    let session = super::open_session(&args.backend.db, &args.backend.namespace)?;
    let pid = Pid::parse(&args.pid)?;
    let mut handle = session.load(&ObjectType::generic(), &pid)?;

    if args.xml {
        println!("{}", handle.to_xml()?);
    } else {
        let document = handle.to_index_document(ProjectionOptions {
            model_only: args.model_only,
        })?;
        println!("{}", serde_json::to_string_pretty(&document)?);
    }

    if args.publish {
        handle.publish_index()?;
        println!("published {pid}");
    }

    Ok(())
}
