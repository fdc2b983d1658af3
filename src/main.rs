use std::path::PathBuf;

fn main() -> Result<(), eframe::Error> {
    // Set up logging; RUST_LOG=debug shows snap transitions
    env_logger::init();

    // File dialogs run as tokio tasks
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };
    let _guard = runtime.enter();

    let board_path = std::env::args().nth(1).map(PathBuf::from);
    ragdoll_climber::run_app(board_path)
}
