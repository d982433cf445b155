use registry_auth_probe::cli::{Args, Runner};
use registry_auth_probe::logging::{self, Verbosity};
use std::process;

#[tokio::main]
async fn main() {
    let args = Args::parse_args().from_env();
    logging::init(Verbosity::from_flags(args.verbose, args.quiet));

    let runner = match Runner::new(args) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("❌ {}", e);
            process::exit(2);
        }
    };

    if let Err(e) = runner.run().await {
        eprintln!("❌ {}", e);
        process::exit(1);
    }
}
