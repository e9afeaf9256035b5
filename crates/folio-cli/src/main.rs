//! Binary entrypoint for the Folio CLI.

#[tokio::main]
async fn main() {
    let code = folio_cli::run().await;
    if code != 0 {
        std::process::exit(code);
    }
}
