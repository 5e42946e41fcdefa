#[macro_use]
extern crate rocket;

use yt_warehouse::api;
use yt_warehouse::config::{create_app_state, create_cors, init_logger, load_environment};

#[get("/")]
fn index() -> &'static str {
    "YouTube warehouse harvester is running."
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    load_environment();
    init_logger();

    let state = create_app_state().await?;
    let cors = create_cors()?;

    let _ = rocket::build()
        .manage(state)
        .attach(cors)
        .mount("/", routes![index])
        .mount("/harvest", routes![api::harvest_channels, api::list_bundles])
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Rocket failed: {e}"))?;

    Ok(())
}
