//! Folio - portfolio site runtime
//!
//! This crate is the *composition root*. It builds the adapters, wires them
//! into the application services and boots one page headlessly.

mod composition;
mod run;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run::run().await
}
