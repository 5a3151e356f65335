mod cli;
mod transcode;

use clap::Parser;

use cli::Args;

fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(e) = transcode::run(&args) {
        log::error!("{:#}", e);
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
