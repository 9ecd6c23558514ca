//! CLI smoke entry point.
//!
//! # Responsibility
//! - Drive create, filter and delete runners against a configured database.
//! - Print each JSON response on its own line for quick local checks.
//!
//! Usage: `hexagonal_cli [config.json]`

use hexagonal_core::{
    core_version, Actor, CoreConfig, CreateResponse, CreateRunner, DeleteResponse, DeleteRunner,
    FindAllResponse, FilterRunner, JsonResponse, Repository, SqliteAdapter,
};
use log::info;
use serde_json::json;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => CoreConfig::from_path(path)?,
        None => CoreConfig::default(),
    };
    config.init_logging()?;
    info!("event=cli_start module=cli status=ok version={}", core_version());

    let conn = config.open_database()?;
    let adapter = SqliteAdapter::new(&conn);
    let repository = Repository::new(&adapter, "posts");
    let actor = Actor::new();

    let attributes = serde_json::from_value(json!({ "title": "Hi", "body": "hello" }))?;
    let created = CreateRunner::new(CreateResponse::new("post"), &actor, attributes, &repository)
        .with_defaults(serde_json::from_value(json!({ "status": "draft" }))?)
        .run()?;
    print_response("create", &created);

    let listed = FilterRunner::new(
        FindAllResponse::new("posts").with_meta(),
        &actor,
        None,
        &repository,
    )
    .run()?;
    print_response("filter", &listed);

    if let Some(id) = created.body["post"]["id"].as_i64() {
        let deleted = DeleteRunner::new(DeleteResponse, &actor, id, &repository).run()?;
        print_response("delete", &deleted);
    }

    println!("hexagonal_core version={}", core_version());
    Ok(())
}

fn print_response(operation: &str, response: &JsonResponse) {
    println!("{operation} status={} body={}", response.status, response.body);
}
