#[tokio::main]
async fn main() {
    if let Err(err) = wardroom_lib::run().await {
        eprintln!("wardroom: {err}");
        std::process::exit(1);
    }
}
